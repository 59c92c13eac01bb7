//! 连续学习天数跟踪
//!
//! 读路径：`get_streak_info` 与 `is_today_completed`，均不会向调用方报错。
//! 写路径：会话结束时由 [`CompletionRecorder`] 调用一次 `apply_session_result`。

use chrono::{Local, NaiveDate};

use crate::session::{SessionListener, SessionResult};
use crate::storage::{
    SessionHistoryEntry, SessionHistoryRepository, StorageError, StorageResult, StreakRecord,
    StreakRepository,
};

/// 今天（本地日期）是否已有完成的会话
pub fn is_today_completed(history: &[SessionHistoryEntry]) -> bool {
    is_completed_on(history, Local::now().date_naive())
}

/// 指定日期是否已有完成的会话
pub fn is_completed_on(history: &[SessionHistoryEntry], day: NaiveDate) -> bool {
    history
        .iter()
        .any(|entry| entry.completed && entry.local_day() == Some(day))
}

/// 连续学习跟踪器
#[derive(Clone)]
pub struct StreakTracker {
    streaks: StreakRepository,
    history: SessionHistoryRepository,
    daily_goal: u32,
}

impl StreakTracker {
    /// `daily_goal` 为每日目标单词数，最小为 1
    pub fn new(
        streaks: StreakRepository,
        history: SessionHistoryRepository,
        daily_goal: u32,
    ) -> Self {
        Self {
            streaks,
            history,
            daily_goal: daily_goal.max(1),
        }
    }

    pub fn daily_goal(&self) -> u32 {
        self.daily_goal
    }

    /// 读取连续学习记录
    ///
    /// 记录缺失或损坏时返回 `{streak: 0, lastDate: "", progress: 0}`。
    pub fn get_streak_info(&self) -> StreakRecord {
        match self.streaks.load() {
            Ok(Some(record)) => record,
            Ok(None) => StreakRecord::default(),
            Err(e) => {
                tracing::warn!(error = %e, "连续学习记录读取失败，使用默认值");
                StreakRecord::default()
            }
        }
    }

    /// 读取会话历史并判断今天是否已完成
    pub fn today_completed(&self) -> bool {
        match self.history.list() {
            Ok(history) => is_today_completed(&history),
            Err(e) => {
                tracing::warn!(error = %e, "会话历史读取失败，按今日未完成处理");
                false
            }
        }
    }

    /// 单次会话对今日进度的贡献 (0-100)
    pub fn session_progress(&self, total: u32) -> u8 {
        let percent = (f64::from(total) * 100.0 / f64::from(self.daily_goal)).round();
        percent.min(100.0) as u8
    }

    /// 根据完成的会话更新连续学习记录
    ///
    /// - 同一天：天数不变，进度累加（上限 100）
    /// - 前一天学习过：天数 +1，进度重新计算
    /// - 其他情况：天数从 1 开始
    ///
    /// 原记录损坏时从默认值重新开始。
    pub fn apply_session_result(
        &self,
        result: &SessionResult,
        today: NaiveDate,
    ) -> StorageResult<StreakRecord> {
        let current = match self.streaks.load() {
            Ok(record) => record.unwrap_or_default(),
            Err(StorageError::Serialization(e)) => {
                tracing::warn!(error = %e, "连续学习记录损坏，重新开始计数");
                StreakRecord::default()
            }
            Err(e) => return Err(e),
        };

        let gained = self.session_progress(result.total);
        let last_day = current.last_day();

        let (streak, progress) = if last_day == Some(today) {
            (
                current.streak.max(1),
                current.progress.saturating_add(gained).min(100),
            )
        } else if last_day.and_then(|d| d.succ_opt()) == Some(today) {
            (current.streak.saturating_add(1), gained)
        } else {
            (1, gained)
        };

        let updated = StreakRecord {
            streak,
            last_date: today.format("%Y-%m-%d").to_string(),
            progress,
        };
        self.streaks.save(&updated)?;

        tracing::info!(
            streak = updated.streak,
            progress = updated.progress,
            "连续学习记录已更新"
        );

        Ok(updated)
    }
}

// ============================================================
// CompletionRecorder - 会话结束处理
// ============================================================

/// 会话结束时写入历史并更新连续学习记录
///
/// 每个实例最多处理一次结束事件；存储失败只记录日志，不影响会话。
pub struct CompletionRecorder {
    tracker: StreakTracker,
    history: SessionHistoryRepository,
    day: Option<NaiveDate>,
    fired: bool,
}

impl CompletionRecorder {
    pub fn new(tracker: StreakTracker, history: SessionHistoryRepository) -> Self {
        Self {
            tracker,
            history,
            day: None,
            fired: false,
        }
    }

    /// 固定会话日期（测试使用）
    pub fn with_day(mut self, day: NaiveDate) -> Self {
        self.day = Some(day);
        self
    }

    /// 是否已处理过结束事件
    pub fn has_fired(&self) -> bool {
        self.fired
    }
}

impl SessionListener for CompletionRecorder {
    fn on_completed(&mut self, result: &SessionResult) {
        if self.fired {
            tracing::warn!("重复的会话结束事件，已忽略");
            return;
        }
        self.fired = true;

        let (day, date) = match self.day {
            Some(day) => (day, day.format("%Y-%m-%d").to_string()),
            None => {
                let now = Local::now();
                (now.date_naive(), now.to_rfc3339())
            }
        };

        let entry = SessionHistoryEntry {
            id: uuid::Uuid::new_v4().to_string(),
            date,
            completed: true,
            correct: result.correct,
            incorrect: result.incorrect,
            skipped: result.skipped,
            total: result.total,
        };

        if let Err(e) = self.history.append(entry) {
            tracing::warn!(error = %e, "会话历史写入失败");
        }

        if let Err(e) = self.tracker.apply_session_result(result, day) {
            tracing::warn!(error = %e, "连续学习记录更新失败");
        }
    }
}
