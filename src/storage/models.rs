//! 数据模型定义
//!
//! 定义持久化记录的数据结构。字段名与记录中的 JSON 键一致（camelCase）。

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// 未设置优先级时使用的默认值
pub const DEFAULT_PRIORITY: i32 = 3;

// ============================================================
// Word - 单词
// ============================================================

/// 单词
///
/// `id` 只在所属章节内唯一。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    /// 章节内唯一标识
    pub id: String,
    /// 单词原文
    pub text: String,
    /// 释义
    #[serde(default)]
    pub translation: String,
    /// 音标
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
    /// 例句
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    /// 备注
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// 是否已收藏
    #[serde(default)]
    pub is_bookmarked: bool,
    /// 是否已掌握（已掌握的单词不进入复习）
    #[serde(default)]
    pub is_known: bool,
    /// 复习优先级，越大越先出现
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

impl Word {
    /// 创建新单词，其余字段取默认值
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        translation: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            translation: translation.into(),
            phonetic: None,
            example: None,
            notes: None,
            is_bookmarked: false,
            is_known: false,
            priority: None,
        }
    }

    /// 设置优先级
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// 标记为已掌握
    pub fn known(mut self) -> Self {
        self.is_known = true;
        self
    }

    /// 实际使用的优先级（缺省为 3）
    pub fn effective_priority(&self) -> i32 {
        self.priority.unwrap_or(DEFAULT_PRIORITY)
    }
}

// ============================================================
// Chapter - 章节
// ============================================================

/// 章节目录条目
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChapterSummary {
    pub id: String,
    pub title: String,
}

impl ChapterSummary {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// 单个章节的持久化记录
///
/// 记录中的其他字段会被忽略。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChapterRecord {
    pub words: Vec<Word>,
}

/// 目录条目与单词列表组合后的完整章节
#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    pub id: String,
    pub title: String,
    pub words: Vec<Word>,
}

impl Chapter {
    pub fn new(id: impl Into<String>, title: impl Into<String>, words: Vec<Word>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            words,
        }
    }

    /// 目录条目
    pub fn summary(&self) -> ChapterSummary {
        ChapterSummary::new(self.id.clone(), self.title.clone())
    }
}

// ============================================================
// StreakRecord - 连续学习记录
// ============================================================

/// 连续学习记录
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakRecord {
    /// 连续学习天数
    pub streak: u32,
    /// 最后学习日期 (YYYY-MM-DD)，从未学习为空
    #[serde(default)]
    pub last_date: String,
    /// 今日目标完成度 (0-100)
    #[serde(default)]
    pub progress: u8,
}

impl StreakRecord {
    /// 解析 `last_date`
    pub fn last_day(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.last_date, "%Y-%m-%d").ok()
    }
}

// ============================================================
// SessionHistoryEntry - 会话历史
// ============================================================

/// 一条复习会话历史
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHistoryEntry {
    #[serde(default)]
    pub id: String,
    /// ISO-8601 时间或日期
    pub date: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub correct: u32,
    #[serde(default)]
    pub incorrect: u32,
    #[serde(default)]
    pub skipped: u32,
    #[serde(default)]
    pub total: u32,
}

impl SessionHistoryEntry {
    /// 记录所在的本地日历日
    ///
    /// 带时区的时间先换算为本地时间；纯日期或无时区时间按字面日期处理。
    pub fn local_day(&self) -> Option<NaiveDate> {
        parse_local_day(&self.date)
    }
}

/// 将 ISO-8601 字符串解析为本地日历日
pub fn parse_local_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).date_naive());
    }

    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}
