//! 重复单词检测器

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::duplicate::{DuplicateIndex, DuplicateInfo};
use crate::storage::{ChapterRepository, StorageError, StorageResult};

/// 带修订号的索引缓存
struct CachedIndex {
    revision: u64,
    index: Arc<DuplicateIndex>,
}

/// 重复单词检测器
///
/// 默认每次查询都重新扫描存储。使用 [`DuplicateDetector::cached`] 时，
/// 索引按存储修订号缓存：任何在查询开始前完成的写入都会使缓存失效。
pub struct DuplicateDetector {
    chapters: ChapterRepository,
    cache: Option<Mutex<Option<CachedIndex>>>,
}

impl DuplicateDetector {
    /// 不缓存的检测器
    pub fn new(chapters: ChapterRepository) -> Self {
        Self {
            chapters,
            cache: None,
        }
    }

    /// 按存储修订号缓存索引的检测器
    pub fn cached(chapters: ChapterRepository) -> Self {
        Self {
            chapters,
            cache: Some(Mutex::new(None)),
        }
    }

    /// 是否启用了索引缓存
    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    /// 检测 `chapter_id` 中的单词 `word` 是否在其他地方出现
    ///
    /// 目录缺失或损坏时返回空结果，不向调用方报错。
    pub fn check_duplicate(&self, chapter_id: &str, word: &str) -> DuplicateInfo {
        match self.load_index() {
            Ok(index) => index.info(chapter_id, word),
            Err(e) => {
                tracing::warn!(chapter_id, error = %e, "重复检测失败，按无重复处理");
                DuplicateInfo::default()
            }
        }
    }

    /// 检测章节内所有单词，只返回重复的条目（单词 ID → 检测结果）
    pub fn find_duplicates_in_chapter(&self, chapter_id: &str) -> HashMap<String, DuplicateInfo> {
        let record = match self.chapters.get_chapter(chapter_id) {
            Ok(Some(record)) => record,
            Ok(None) => return HashMap::new(),
            Err(e) => {
                tracing::warn!(chapter_id, error = %e, "章节记录读取失败，按无重复处理");
                return HashMap::new();
            }
        };

        let index = match self.load_index() {
            Ok(index) => index,
            Err(e) => {
                tracing::warn!(chapter_id, error = %e, "重复检测失败，按无重复处理");
                return HashMap::new();
            }
        };

        record
            .words
            .iter()
            .filter_map(|word| {
                let info = index.info(chapter_id, &word.text);
                info.is_duplicate.then(|| (word.id.clone(), info))
            })
            .collect()
    }

    /// 丢弃缓存的索引
    pub fn invalidate(&self) {
        if let Some(cache) = &self.cache {
            match cache.lock() {
                Ok(mut guard) => *guard = None,
                Err(poisoned) => *poisoned.into_inner() = None,
            }
        }
    }

    fn load_index(&self) -> StorageResult<Arc<DuplicateIndex>> {
        let Some(cache) = &self.cache else {
            return DuplicateIndex::build(&self.chapters).map(Arc::new);
        };

        // 先读修订号再构建，构建期间的写入会在下次查询时触发重建
        let revision = match self.chapters.revision() {
            Ok(revision) => revision,
            Err(e) => {
                tracing::debug!(error = %e, "无法读取存储修订号，跳过缓存");
                return DuplicateIndex::build(&self.chapters).map(Arc::new);
            }
        };

        let mut guard = cache
            .lock()
            .map_err(|e| StorageError::LockError(e.to_string()))?;

        if let Some(cached) = guard.as_ref() {
            if cached.revision == revision {
                return Ok(Arc::clone(&cached.index));
            }
        }

        let index = Arc::new(DuplicateIndex::build(&self.chapters)?);
        *guard = Some(CachedIndex {
            revision,
            index: Arc::clone(&index),
        });

        Ok(index)
    }
}
