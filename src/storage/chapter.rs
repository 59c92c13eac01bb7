//! 章节目录与章节单词的记录操作
//!
//! 目录记录为 `[{id, title}]` 列表，每个章节的单词保存在 `chapter:<id>` 记录中。

use std::sync::Arc;

use crate::storage::models::{Chapter, ChapterRecord, ChapterSummary};
use crate::storage::{
    chapter_key, decode_record, encode_record, RecordStore, StorageError, StorageResult,
    CHAPTERS_KEY,
};

/// 章节仓库
#[derive(Clone)]
pub struct ChapterRepository {
    store: Arc<dyn RecordStore>,
}

impl ChapterRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// 当前存储修订号
    pub fn revision(&self) -> StorageResult<u64> {
        self.store.revision()
    }

    // ============================================================
    // 目录操作
    // ============================================================

    /// 获取章节目录
    ///
    /// 目录记录不存在时返回空列表；记录损坏时返回 `StorageError::Serialization`。
    pub fn list_chapters(&self) -> StorageResult<Vec<ChapterSummary>> {
        match self.store.get(CHAPTERS_KEY)? {
            Some(raw) => decode_record(CHAPTERS_KEY, &raw),
            None => Ok(Vec::new()),
        }
    }

    /// 覆盖保存章节目录
    pub fn save_directory(&self, chapters: &[ChapterSummary]) -> StorageResult<()> {
        let raw = encode_record(CHAPTERS_KEY, &chapters)?;
        self.store.put(CHAPTERS_KEY, &raw)
    }

    // ============================================================
    // 章节操作
    // ============================================================

    /// 根据 ID 获取章节记录
    pub fn get_chapter(&self, id: &str) -> StorageResult<Option<ChapterRecord>> {
        let key = chapter_key(id);
        match self.store.get(&key)? {
            Some(raw) => decode_record(&key, &raw).map(Some),
            None => Ok(None),
        }
    }

    /// 保存章节记录
    pub fn save_chapter(&self, id: &str, record: &ChapterRecord) -> StorageResult<()> {
        let key = chapter_key(id);
        let raw = encode_record(&key, record)?;
        self.store.put(&key, &raw)
    }

    /// 保存完整章节：写入章节记录，并在目录中插入或更新条目
    pub fn upsert_chapter(&self, chapter: &Chapter) -> StorageResult<()> {
        self.save_chapter(
            &chapter.id,
            &ChapterRecord {
                words: chapter.words.clone(),
            },
        )?;

        let mut directory = self.list_chapters()?;
        match directory.iter_mut().find(|entry| entry.id == chapter.id) {
            Some(entry) => entry.title = chapter.title.clone(),
            None => directory.push(chapter.summary()),
        }
        self.save_directory(&directory)
    }

    /// 删除章节记录及其目录条目
    pub fn delete_chapter(&self, id: &str) -> StorageResult<bool> {
        let mut directory = self.list_chapters()?;
        let before = directory.len();
        directory.retain(|entry| entry.id != id);
        if directory.len() != before {
            self.save_directory(&directory)?;
        }

        let removed = self.store.delete(&chapter_key(id))?;
        Ok(removed || directory.len() != before)
    }

    /// 设置章节中某个单词的收藏状态
    ///
    /// 只修改目标单词的 `is_bookmarked` 字段。
    pub fn set_bookmark(
        &self,
        chapter_id: &str,
        word_id: &str,
        bookmarked: bool,
    ) -> StorageResult<()> {
        let mut record = self
            .get_chapter(chapter_id)?
            .ok_or_else(|| StorageError::NotFound(format!("章节 {}", chapter_id)))?;

        let word = record
            .words
            .iter_mut()
            .find(|w| w.id == word_id)
            .ok_or_else(|| {
                StorageError::NotFound(format!("章节 {} 中的单词 {}", chapter_id, word_id))
            })?;

        if word.is_bookmarked == bookmarked {
            return Ok(());
        }
        word.is_bookmarked = bookmarked;

        self.save_chapter(chapter_id, &record)
    }
}
