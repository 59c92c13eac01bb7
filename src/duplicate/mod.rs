//! 跨章节重复单词检测
//!
//! - [`DuplicateIndex`] 扫描全部章节，按规范化键收集出现位置
//! - [`DuplicateDetector`] 在索引之上回答"某章节的某个词是否在别处出现过"
//!
//! 检测结果只是提示信息，不阻止写入；任何存储故障都退化为"未发现重复"。

pub mod detector;
pub mod index;

pub use detector::DuplicateDetector;
pub use index::DuplicateIndex;

use serde::{Deserialize, Serialize};

use crate::storage::ChapterSummary;

/// 单词在某个章节中的一次出现
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub chapter_id: String,
    pub chapter_title: String,
    pub word_id: String,
}

/// 重复检测结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateInfo {
    /// 出现次数（含被检测章节自身）大于 1
    pub is_duplicate: bool,
    /// 所有章节中的出现次数
    pub occurrence_count: usize,
    /// 出现过该词的其他章节，按首次出现顺序去重
    pub other_chapters: Vec<ChapterSummary>,
}

impl DuplicateInfo {
    /// 由出现列表计算检测结果
    ///
    /// 同一章节内的多次出现也计入 `occurrence_count`。
    pub fn from_occurrences(chapter_id: &str, occurrences: &[Occurrence]) -> Self {
        let mut other_chapters: Vec<ChapterSummary> = Vec::new();

        for occurrence in occurrences {
            if occurrence.chapter_id == chapter_id {
                continue;
            }
            if other_chapters.iter().any(|c| c.id == occurrence.chapter_id) {
                continue;
            }
            other_chapters.push(ChapterSummary::new(
                occurrence.chapter_id.clone(),
                occurrence.chapter_title.clone(),
            ));
        }

        Self {
            is_duplicate: occurrences.len() > 1,
            occurrence_count: occurrences.len(),
            other_chapters,
        }
    }
}
