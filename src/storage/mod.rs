//! 本地记录存储模块
//!
//! 提供键值记录存储之上的类型化仓库：
//! - 章节目录与章节单词列表
//! - 连续学习（streak）记录
//! - 复习会话历史
//!
//! 所有 JSON 序列化与损坏数据检测都集中在各仓库内部，
//! 调用方只会看到类型化结果或 `StorageError`。

// ============================================================
// 子模块声明
// ============================================================

pub mod chapter;
pub mod history;
pub mod migrations;
pub mod models;
pub mod record_store;
pub mod streak;

// ============================================================
// 重新导出主要类型
// ============================================================

pub use chapter::ChapterRepository;
pub use history::SessionHistoryRepository;
pub use migrations::run_migrations;
pub use models::*;
pub use record_store::{MemoryRecordStore, RecordStore, SqliteRecordStore};
pub use streak::StreakRepository;

// ============================================================
// 依赖导入
// ============================================================

use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

// ============================================================
// 错误类型定义
// ============================================================

/// 存储模块错误类型
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("数据库错误: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("迁移错误: {0}")]
    Migration(String),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("数据未找到: {0}")]
    NotFound(String),

    #[error("锁获取失败: {0}")]
    LockError(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

// ============================================================
// 记录键
// ============================================================

/// 章节目录记录键
pub const CHAPTERS_KEY: &str = "chapters";

/// 连续学习记录键
pub const STREAK_KEY: &str = "streak";

/// 会话历史记录键
pub const SESSION_HISTORY_KEY: &str = "session_history";

/// 单个章节记录键
pub fn chapter_key(chapter_id: &str) -> String {
    format!("chapter:{}", chapter_id)
}

/// 解析 JSON 记录，失败时附带记录键
pub(crate) fn decode_record<T: serde::de::DeserializeOwned>(
    key: &str,
    raw: &str,
) -> StorageResult<T> {
    serde_json::from_str(raw)
        .map_err(|e| StorageError::Serialization(format!("记录 {} 解析失败: {}", key, e)))
}

/// 编码 JSON 记录
pub(crate) fn encode_record<T: serde::Serialize>(key: &str, value: &T) -> StorageResult<String> {
    serde_json::to_string(value)
        .map_err(|e| StorageError::Serialization(format!("记录 {} 编码失败: {}", key, e)))
}

// ============================================================
// Storage - 统一存储结构体
// ============================================================

/// 统一存储结构体
///
/// 持有底层记录存储，并提供对所有仓库的便捷访问。
/// 生命周期由应用的组合根（见 [`crate::service::VocabService`]）管理。
#[derive(Clone)]
pub struct Storage {
    store: Arc<dyn RecordStore>,
    db_path: String,
}

impl Storage {
    /// 打开（或创建）SQLite 数据库
    ///
    /// 自动启用 WAL 模式并运行迁移。
    ///
    /// # Example
    /// ```ignore
    /// let storage = Storage::new("./data/danci.db")?;
    /// let chapters = storage.chapters().list_chapters()?;
    /// ```
    pub fn new<P: AsRef<Path>>(db_path: P) -> StorageResult<Self> {
        let path_str = db_path.as_ref().to_string_lossy().to_string();

        if let Some(parent) = db_path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StorageError::Migration(format!("创建数据目录失败 {}: {}", parent.display(), e))
                })?;
            }
        }

        let connection = Connection::open(&db_path)?;

        // 启用 WAL 模式以提高并发性能
        connection.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA cache_size=-64000;",
        )?;

        Self::from_connection(connection, path_str)
    }

    /// 创建内存数据库（用于测试）
    pub fn in_memory() -> StorageResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::from_connection(connection, ":memory:".to_string())
    }

    /// 使用任意记录存储实现
    pub fn with_store(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            db_path: String::new(),
        }
    }

    fn from_connection(connection: Connection, db_path: String) -> StorageResult<Self> {
        let conn = Arc::new(Mutex::new(connection));

        // 运行迁移
        {
            let guard = conn
                .lock()
                .map_err(|e| StorageError::LockError(e.to_string()))?;
            migrations::run_migrations(&guard)?;
        }

        Ok(Self {
            store: Arc::new(SqliteRecordStore::new(conn)),
            db_path,
        })
    }

    /// 获取数据库路径（非 SQLite 存储为空字符串）
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// 获取底层记录存储
    pub fn store(&self) -> Arc<dyn RecordStore> {
        Arc::clone(&self.store)
    }

    /// 获取章节仓库
    pub fn chapters(&self) -> ChapterRepository {
        ChapterRepository::new(Arc::clone(&self.store))
    }

    /// 获取连续学习记录仓库
    pub fn streaks(&self) -> StreakRepository {
        StreakRepository::new(Arc::clone(&self.store))
    }

    /// 获取会话历史仓库
    pub fn session_history(&self) -> SessionHistoryRepository {
        SessionHistoryRepository::new(Arc::clone(&self.store))
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_in_memory() {
        let storage = Storage::in_memory().expect("Failed to create in-memory storage");
        assert_eq!(storage.db_path(), ":memory:");
        assert_eq!(storage.store().revision().unwrap(), 0);
    }

    #[test]
    fn test_chapter_key() {
        assert_eq!(chapter_key("food"), "chapter:food");
    }

    #[test]
    fn test_decode_record_reports_key() {
        let err = decode_record::<Vec<ChapterSummary>>(CHAPTERS_KEY, "{not json")
            .expect_err("malformed record must fail");
        match err {
            StorageError::Serialization(msg) => assert!(msg.contains(CHAPTERS_KEY)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_repositories_share_store() {
        let storage = Storage::with_store(Arc::new(MemoryRecordStore::new()));
        storage
            .chapters()
            .save_directory(&[ChapterSummary::new("a", "A")])
            .unwrap();

        let listed = storage.chapters().list_chapters().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(storage.store().revision().unwrap(), 1);
    }
}
