//! 规范化键 → 出现位置索引

use std::collections::{HashMap, HashSet};

use crate::duplicate::{DuplicateInfo, Occurrence};
use crate::normalize::normalize;
use crate::storage::{Chapter, ChapterRepository, ChapterSummary, StorageResult, Word};

/// 重复检测索引
///
/// 构建成本为全部章节单词数之和，按需构建。
#[derive(Debug, Clone, Default)]
pub struct DuplicateIndex {
    entries: HashMap<String, Vec<Occurrence>>,
    chapter_count: usize,
    skipped: Vec<String>,
}

impl DuplicateIndex {
    /// 从内存中的章节构建
    pub fn from_chapters<'a, I>(chapters: I) -> Self
    where
        I: IntoIterator<Item = &'a Chapter>,
    {
        let mut index = Self::default();
        let mut seen = HashSet::new();

        for chapter in chapters {
            if !seen.insert(chapter.id.clone()) {
                continue;
            }
            index.insert_chapter(&chapter.summary(), &chapter.words);
        }

        index
    }

    /// 从存储构建
    ///
    /// 目录读取失败时返回错误；单个章节记录损坏时跳过该章节并继续扫描。
    pub fn build(chapters: &ChapterRepository) -> StorageResult<Self> {
        let directory = chapters.list_chapters()?;
        let mut index = Self::default();
        let mut seen = HashSet::new();

        for summary in &directory {
            if !seen.insert(summary.id.as_str()) {
                tracing::debug!(chapter_id = %summary.id, "目录中重复的章节条目，已忽略");
                continue;
            }

            match chapters.get_chapter(&summary.id) {
                Ok(Some(record)) => index.insert_chapter(summary, &record.words),
                Ok(None) => {
                    tracing::debug!(chapter_id = %summary.id, "章节记录不存在，按空章节处理");
                    index.chapter_count += 1;
                }
                Err(e) => {
                    tracing::warn!(chapter_id = %summary.id, error = %e, "章节记录损坏，跳过");
                    index.skipped.push(summary.id.clone());
                }
            }
        }

        tracing::debug!(
            chapters = index.chapter_count,
            keys = index.entries.len(),
            skipped = index.skipped.len(),
            "重复检测索引构建完成"
        );

        Ok(index)
    }

    fn insert_chapter(&mut self, summary: &ChapterSummary, words: &[Word]) {
        self.chapter_count += 1;

        for word in words {
            let key = normalize(&word.text);
            self.entries.entry(key).or_default().push(Occurrence {
                chapter_id: summary.id.clone(),
                chapter_title: summary.title.clone(),
                word_id: word.id.clone(),
            });
        }
    }

    /// 原始单词的全部出现位置
    pub fn occurrences(&self, word: &str) -> &[Occurrence] {
        self.entries
            .get(&normalize(word))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 检测 `chapter_id` 中的 `word` 是否重复
    pub fn info(&self, chapter_id: &str, word: &str) -> DuplicateInfo {
        DuplicateInfo::from_occurrences(chapter_id, self.occurrences(word))
    }

    /// 已索引的章节数（不含跳过的损坏章节）
    pub fn chapter_count(&self) -> usize {
        self.chapter_count
    }

    /// 因记录损坏被跳过的章节 ID
    pub fn skipped_chapters(&self) -> &[String] {
        &self.skipped
    }

    /// 不同规范化键的数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
