//! 数据库迁移模块
//!
//! 管理 SQLite 记录库的版本迁移。
//!
//! ## 迁移策略
//! - 每个迁移在独立事务中执行
//! - 迁移记录存储在 schema_migrations 表中

use chrono::Utc;
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use std::collections::HashSet;

use crate::storage::{StorageError, StorageResult};

/// 当前数据库 schema 版本
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// 初始化 schema SQL (V1)
const INIT_SCHEMA: &str = include_str!("schema.sql");

/// 迁移记录
#[derive(Debug, Clone)]
pub struct Migration {
    /// 迁移版本号
    pub version: i32,
    /// 迁移名称/描述
    pub name: String,
    /// 迁移 SQL 语句
    pub sql: String,
}

impl Migration {
    /// 创建新的迁移
    pub fn new(version: i32, name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            version,
            name: name.into(),
            sql: sql.into(),
        }
    }
}

/// 已应用迁移的历史条目
#[derive(Debug, Clone)]
pub struct MigrationRecord {
    pub version: i32,
    pub name: String,
    pub applied_at: i64,
}

/// 获取所有迁移定义
///
/// 返回按版本号排序的迁移列表
pub fn get_migrations() -> Vec<Migration> {
    vec![
        // V1: 键值记录表
        Migration::new(1, "初始表结构", INIT_SCHEMA),
        // V2: 存储修订号，供重复检测索引缓存判断失效
        Migration::new(
            2,
            "添加存储修订号",
            r#"
            CREATE TABLE IF NOT EXISTS store_meta (
                key TEXT PRIMARY KEY,
                value INTEGER NOT NULL
            );

            INSERT OR IGNORE INTO store_meta (key, value) VALUES ('revision', 0);
            "#,
        ),
    ]
}

/// 确保迁移表存在
fn ensure_migrations_table(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at INTEGER NOT NULL
        );
        "#,
    )
    .map_err(|e| StorageError::Migration(format!("创建迁移表失败: {}", e)))
}

/// 运行数据库迁移
///
/// 跳过 `schema_migrations` 中已有的版本，按版本号执行其余迁移。
/// 返回执行后的最高版本号。
pub fn run_migrations(conn: &Connection) -> StorageResult<i32> {
    let applied: HashSet<i32> = get_migration_history(conn)?
        .into_iter()
        .map(|record| record.version)
        .collect();
    let mut version = applied.iter().copied().max().unwrap_or(0);

    tracing::debug!(current = version, target = CURRENT_SCHEMA_VERSION, "检查数据库版本");

    for migration in get_migrations()
        .into_iter()
        .filter(|m| !applied.contains(&m.version))
    {
        tracing::info!(version = migration.version, name = %migration.name, "运行迁移");

        apply_migration(conn, &migration).map_err(|e| {
            tracing::error!(version = migration.version, error = %e, "迁移失败");
            e
        })?;
        version = version.max(migration.version);
    }

    Ok(version)
}

/// 在一个 IMMEDIATE 事务中执行迁移并写入迁移记录，失败时整体回滚
fn apply_migration(conn: &Connection, migration: &Migration) -> StorageResult<()> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    tx.execute_batch(&migration.sql).map_err(|e| {
        StorageError::Migration(format!("迁移 v{} 执行失败: {}", migration.version, e))
    })?;
    tx.execute(
        "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
        params![migration.version, migration.name, Utc::now().timestamp()],
    )?;

    tx.commit()?;
    Ok(())
}

/// 获取迁移历史（按版本号升序）
pub fn get_migration_history(conn: &Connection) -> StorageResult<Vec<MigrationRecord>> {
    ensure_migrations_table(conn)?;

    let mut stmt =
        conn.prepare("SELECT version, name, applied_at FROM schema_migrations ORDER BY version")?;
    let records = stmt
        .query_map([], |row| {
            Ok(MigrationRecord {
                version: row.get(0)?,
                name: row.get(1)?,
                applied_at: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(records)
}
