//! 复习会话历史记录

use std::sync::Arc;

use crate::storage::models::SessionHistoryEntry;
use crate::storage::{
    decode_record, encode_record, RecordStore, StorageResult, SESSION_HISTORY_KEY,
};

/// 会话历史仓库
///
/// 历史按追加顺序保存在单条记录中。
#[derive(Clone)]
pub struct SessionHistoryRepository {
    store: Arc<dyn RecordStore>,
}

impl SessionHistoryRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// 获取全部历史（不存在时为空）
    pub fn list(&self) -> StorageResult<Vec<SessionHistoryEntry>> {
        match self.store.get(SESSION_HISTORY_KEY)? {
            Some(raw) => decode_record(SESSION_HISTORY_KEY, &raw),
            None => Ok(Vec::new()),
        }
    }

    /// 追加一条历史
    ///
    /// 已有记录损坏时返回错误，不会覆盖原记录。
    pub fn append(&self, entry: SessionHistoryEntry) -> StorageResult<()> {
        let mut history = self.list()?;
        history.push(entry);

        let raw = encode_record(SESSION_HISTORY_KEY, &history)?;
        self.store.put(SESSION_HISTORY_KEY, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryRecordStore, StorageError};

    fn entry(date: &str) -> SessionHistoryEntry {
        SessionHistoryEntry {
            id: date.to_string(),
            date: date.to_string(),
            completed: true,
            total: 2,
            correct: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_append_preserves_order() {
        let repo = SessionHistoryRepository::new(Arc::new(MemoryRecordStore::new()));
        assert!(repo.list().unwrap().is_empty());

        repo.append(entry("2024-01-01")).unwrap();
        repo.append(entry("2024-01-02")).unwrap();

        let dates: Vec<String> = repo.list().unwrap().into_iter().map(|e| e.date).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-02"]);
    }

    #[test]
    fn test_append_refuses_to_overwrite_malformed_history() {
        let store = Arc::new(MemoryRecordStore::new());
        store.put(SESSION_HISTORY_KEY, "{oops").unwrap();
        let repo = SessionHistoryRepository::new(store.clone());

        let result = repo.append(entry("2024-01-01"));
        assert!(matches!(result, Err(StorageError::Serialization(_))));
        assert_eq!(store.get(SESSION_HISTORY_KEY).unwrap().as_deref(), Some("{oops"));
    }

    #[test]
    fn test_entries_without_optional_fields() {
        let store = Arc::new(MemoryRecordStore::new());
        store
            .put(SESSION_HISTORY_KEY, r#"[{"date":"2024-01-01T08:00:00Z","completed":true}]"#)
            .unwrap();
        let repo = SessionHistoryRepository::new(store);

        let history = repo.list().unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].completed);
        assert_eq!(history[0].total, 0);
    }
}
