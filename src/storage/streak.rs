//! 连续学习记录的存取

use std::sync::Arc;

use crate::storage::models::StreakRecord;
use crate::storage::{
    decode_record, encode_record, RecordStore, StorageError, StorageResult, STREAK_KEY,
};

/// 连续学习记录仓库
#[derive(Clone)]
pub struct StreakRepository {
    store: Arc<dyn RecordStore>,
}

impl StreakRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// 读取连续学习记录
    ///
    /// 记录不存在返回 `None`；记录损坏或进度超出 0-100 返回 `StorageError::Serialization`。
    pub fn load(&self) -> StorageResult<Option<StreakRecord>> {
        let Some(raw) = self.store.get(STREAK_KEY)? else {
            return Ok(None);
        };

        let record: StreakRecord = decode_record(STREAK_KEY, &raw)?;
        if record.progress > 100 {
            return Err(StorageError::Serialization(format!(
                "记录 {} 的进度超出范围: {}",
                STREAK_KEY, record.progress
            )));
        }

        Ok(Some(record))
    }

    /// 保存连续学习记录
    pub fn save(&self, record: &StreakRecord) -> StorageResult<()> {
        let raw = encode_record(STREAK_KEY, record)?;
        self.store.put(STREAK_KEY, &raw)
    }
}
