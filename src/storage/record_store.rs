//! 键值记录存储
//!
//! 持久化层只暴露按名称读写字符串记录的最小接口，
//! 类型化与 JSON 解析由上层仓库负责。

use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::storage::{StorageError, StorageResult};

/// 按名称读写记录的持久化接口
///
/// `revision` 在每次成功的 `put` / `delete` 后递增，
/// 用作派生索引的失效信号。
pub trait RecordStore: Send + Sync {
    /// 读取记录，不存在时返回 `None`
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// 写入（插入或覆盖）记录
    fn put(&self, key: &str, value: &str) -> StorageResult<()>;

    /// 删除记录，返回是否确实删除了记录
    fn delete(&self, key: &str) -> StorageResult<bool>;

    /// 当前存储修订号
    fn revision(&self) -> StorageResult<u64>;
}

// ============================================================
// SqliteRecordStore
// ============================================================

/// SQLite 记录存储
///
/// 连接需已运行 [`crate::storage::run_migrations`]。
pub struct SqliteRecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRecordStore {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取连接锁
    fn get_conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::LockError(e.to_string()))
    }

    fn bump_revision(conn: &Connection) -> StorageResult<()> {
        conn.execute(
            "UPDATE store_meta SET value = value + 1 WHERE key = 'revision'",
            [],
        )?;
        Ok(())
    }
}

impl RecordStore for SqliteRecordStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let conn = self.get_conn()?;

        let value = conn
            .query_row(
                "SELECT value FROM record_store WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut conn = self.get_conn()?;

        // 记录与修订号在同一事务内更新
        let tx = conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO record_store (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Self::bump_revision(&tx)?;
        tx.commit()?;

        Ok(())
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        let mut conn = self.get_conn()?;

        let tx = conn.transaction()?;
        let affected = tx.execute("DELETE FROM record_store WHERE key = ?1", params![key])?;
        if affected > 0 {
            Self::bump_revision(&tx)?;
        }
        tx.commit()?;

        Ok(affected > 0)
    }

    fn revision(&self) -> StorageResult<u64> {
        let conn = self.get_conn()?;

        let revision: i64 = conn.query_row(
            "SELECT value FROM store_meta WHERE key = 'revision'",
            [],
            |row| row.get(0),
        )?;

        Ok(revision.max(0) as u64)
    }
}

// ============================================================
// MemoryRecordStore
// ============================================================

#[derive(Default)]
struct MemoryState {
    records: HashMap<String, String>,
    revision: u64,
}

/// 进程内记录存储（测试与嵌入使用）
#[derive(Default)]
pub struct MemoryRecordStore {
    state: Mutex<MemoryState>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|e| StorageError::LockError(e.to_string()))
    }
}

impl RecordStore for MemoryRecordStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock()?.records.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut state = self.lock()?;
        state.records.insert(key.to_string(), value.to_string());
        state.revision += 1;
        Ok(())
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        let mut state = self.lock()?;
        let removed = state.records.remove(key).is_some();
        if removed {
            state.revision += 1;
        }
        Ok(removed)
    }

    fn revision(&self) -> StorageResult<u64> {
        Ok(self.lock()?.revision)
    }
}
