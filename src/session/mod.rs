//! 闪卡复习会话引擎
//!
//! 状态机：构造时若筛选后的单词为空则处于 `Empty`，永不进入 `Active`；
//! 否则进入 `Active`，在最后一张卡片上记录结果后进入 `Completed`。
//!
//! 会话只存在于内存中。中途丢弃会话实例即放弃会话，不会留下任何持久化记录。

pub mod ordering;

pub use ordering::{build_queue, ChaChaShuffle, KeepOrder, ShuffleSource};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::Word;

// ============================================================
// 类型定义
// ============================================================

/// 单张卡片的复习结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReviewOutcome {
    Correct,
    Incorrect,
    Skipped,
}

/// 会话进行中的计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResults {
    pub correct: u32,
    pub incorrect: u32,
    pub skipped: u32,
}

impl SessionResults {
    fn counter_mut(&mut self, outcome: ReviewOutcome) -> &mut u32 {
        match outcome {
            ReviewOutcome::Correct => &mut self.correct,
            ReviewOutcome::Incorrect => &mut self.incorrect,
            ReviewOutcome::Skipped => &mut self.skipped,
        }
    }

    /// 已记录结果的卡片数
    pub fn answered(&self) -> u32 {
        self.correct + self.incorrect + self.skipped
    }
}

/// 会话结束时发出的汇总结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub correct: u32,
    pub incorrect: u32,
    pub skipped: u32,
    pub total: u32,
}

impl SessionResult {
    fn from_results(results: SessionResults, total: usize) -> Self {
        Self {
            correct: results.correct,
            incorrect: results.incorrect,
            skipped: results.skipped,
            total: u32::try_from(total).unwrap_or(u32::MAX),
        }
    }
}

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    /// 没有可复习的单词
    Empty,
    Active,
    Completed,
}

/// 记录结果后的会话进展
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordProgress {
    /// 移到了下一张卡片
    Advanced { index: usize },
    /// 会话结束
    Completed(SessionResult),
}

/// 会话进度快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionProgress {
    pub state: SessionState,
    pub current_index: usize,
    pub total: usize,
    pub results: SessionResults,
}

/// 会话调用错误（调用方的前置条件错误）
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("会话没有可复习的单词")]
    Empty,

    #[error("会话已结束")]
    AlreadyCompleted,
}

/// 会话事件监听
///
/// 会话本身不做持久化，收藏切换与会话结束都通过监听器通知外部。
pub trait SessionListener {
    /// 当前卡片的收藏状态被切换（参数为切换后的单词）
    fn on_bookmark_toggled(&mut self, _word: &Word) {}

    /// 会话结束，每个会话最多调用一次
    fn on_completed(&mut self, _result: &SessionResult) {}
}

// ============================================================
// ReviewSession
// ============================================================

/// 复习会话
pub struct ReviewSession {
    words: Vec<Word>,
    outcomes: Vec<Option<ReviewOutcome>>,
    current_index: usize,
    results: SessionResults,
    state: SessionState,
    flipped: bool,
    listener: Option<Box<dyn SessionListener>>,
}

impl ReviewSession {
    /// 创建会话
    ///
    /// 过滤已掌握单词并按优先级排序，同优先级由 `shuffle` 打乱。
    pub fn new<I>(words: I, shuffle: &mut dyn ShuffleSource) -> Self
    where
        I: IntoIterator<Item = Word>,
    {
        let words = build_queue(words, shuffle);
        let state = if words.is_empty() {
            SessionState::Empty
        } else {
            SessionState::Active
        };

        tracing::debug!(cards = words.len(), ?state, "创建复习会话");

        Self {
            outcomes: vec![None; words.len()],
            words,
            current_index: 0,
            results: SessionResults::default(),
            state,
            flipped: false,
            listener: None,
        }
    }

    /// 设置事件监听器
    pub fn with_listener(mut self, listener: Box<dyn SessionListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    // ========== 查询 ==========

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_empty(&self) -> bool {
        self.state == SessionState::Empty
    }

    pub fn is_completed(&self) -> bool {
        self.state == SessionState::Completed
    }

    /// 复习队列
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// 当前卡片（空会话为 `None`）
    pub fn current_word(&self) -> Option<&Word> {
        self.words.get(self.current_index)
    }

    pub fn results(&self) -> SessionResults {
        self.results
    }

    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            state: self.state,
            current_index: self.current_index,
            total: self.words.len(),
            results: self.results,
        }
    }

    // ========== 翻面状态 ==========

    /// 翻转当前卡片
    pub fn flip(&mut self) {
        if self.state == SessionState::Active {
            self.flipped = !self.flipped;
        }
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// 回到正面
    pub fn reset_flip(&mut self) {
        self.flipped = false;
    }

    // ========== 操作 ==========

    fn ensure_active(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Active => Ok(()),
            SessionState::Empty => Err(SessionError::Empty),
            SessionState::Completed => Err(SessionError::AlreadyCompleted),
        }
    }

    fn is_last(&self) -> bool {
        self.current_index + 1 >= self.words.len()
    }

    /// 记录当前卡片的结果
    ///
    /// 不是最后一张时移到下一张；是最后一张时结束会话并通知监听器。
    /// 再次记录已有结果的卡片（后退后）会替换原结果，计数总和不会超过卡片数。
    /// 结束时仍未记录结果的卡片（手动跳过的）计为 `skipped`。
    pub fn record_result(
        &mut self,
        outcome: ReviewOutcome,
    ) -> Result<RecordProgress, SessionError> {
        self.ensure_active()?;

        let slot = &mut self.outcomes[self.current_index];
        if let Some(previous) = slot.replace(outcome) {
            *self.results.counter_mut(previous) -= 1;
        }
        *self.results.counter_mut(outcome) += 1;

        self.flipped = false;

        if !self.is_last() {
            self.current_index += 1;
            return Ok(RecordProgress::Advanced {
                index: self.current_index,
            });
        }

        for slot in self.outcomes.iter_mut().filter(|slot| slot.is_none()) {
            *slot = Some(ReviewOutcome::Skipped);
            self.results.skipped += 1;
        }

        self.state = SessionState::Completed;
        let result = SessionResult::from_results(self.results, self.words.len());

        tracing::info!(
            correct = result.correct,
            incorrect = result.incorrect,
            skipped = result.skipped,
            total = result.total,
            "复习会话完成"
        );

        if let Some(listener) = self.listener.as_mut() {
            listener.on_completed(&result);
        }

        Ok(RecordProgress::Completed(result))
    }

    /// 切换当前卡片的收藏状态，返回切换后的值
    ///
    /// 只修改当前卡片，并通知监听器以便外部持久化。
    pub fn toggle_bookmark(&mut self) -> Result<bool, SessionError> {
        self.ensure_active()?;

        let word = &mut self.words[self.current_index];
        word.is_bookmarked = !word.is_bookmarked;
        let bookmarked = word.is_bookmarked;

        if let Some(listener) = self.listener.as_mut() {
            listener.on_bookmark_toggled(&self.words[self.current_index]);
        }

        Ok(bookmarked)
    }

    /// 手动前进一张，不记录结果；最后一张时不动
    ///
    /// 返回是否移动。导航永远不会结束会话。
    pub fn advance(&mut self) -> bool {
        if self.state != SessionState::Active || self.is_last() {
            return false;
        }
        self.current_index += 1;
        self.flipped = false;
        true
    }

    /// 手动后退一张；第一张时不动
    pub fn retreat(&mut self) -> bool {
        if self.state != SessionState::Active || self.current_index == 0 {
            return false;
        }
        self.current_index -= 1;
        self.flipped = false;
        true
    }
}
