//! # danci-vocab-core - 词汇一致性与复习会话引擎
//!
//! 本 crate 提供单词本应用的核心逻辑:
//!
//! - **Normalizer** - 单词比较用的规范化键
//! - **Duplicate Detector** - 跨章节重复单词提示
//! - **Review Session** - 闪卡复习会话状态机
//! - **Streak Tracker** - 每日连续学习天数与进度
//!
//! ## 模块结构
//!
//! - [`normalize`] - 规范化 (小写、去除标点与空白)
//! - [`duplicate`] - 重复检测 (索引、检测器、可选缓存)
//! - [`session`] - 复习会话 (排序、结果计数、收藏切换)
//! - [`streak`] - 连续学习 (读取、今日完成判断、会话结束写入)
//! - [`storage`] - 持久化 (键值记录存储、SQLite 迁移、类型化仓库)
//! - [`service`] - 组合根 (把以上模块连接到一个存储上)
//! - [`config`] / [`logging`] - 环境变量配置与 tracing 初始化
//!
//! ## 使用示例
//!
//! ```rust
//! use danci_vocab_core::{Chapter, Config, ReviewOutcome, Storage, VocabService, Word};
//!
//! let service = VocabService::new(Storage::in_memory().unwrap(), Config::default());
//! service
//!     .storage()
//!     .chapters()
//!     .upsert_chapter(&Chapter::new("food", "Food", vec![Word::new("1", "사과", "apple")]))
//!     .unwrap();
//!
//! let mut session = service.start_chapter_session("food");
//! session.record_result(ReviewOutcome::Correct).unwrap();
//! assert!(session.is_completed());
//! assert_eq!(service.streak_info().streak, 1);
//! ```

// ============================================================================
// 模块声明
// ============================================================================

pub mod config;
pub mod duplicate;
pub mod logging;
pub mod normalize;
pub mod service;
pub mod session;
pub mod storage;
pub mod streak;

// ============================================================================
// 重新导出
// ============================================================================

pub use config::Config;

pub use normalize::{is_same_word, normalize};

pub use duplicate::{DuplicateDetector, DuplicateIndex, DuplicateInfo, Occurrence};

pub use session::{
    ChaChaShuffle, KeepOrder, RecordProgress, ReviewOutcome, ReviewSession, SessionError,
    SessionListener, SessionProgress, SessionResult, SessionResults, SessionState, ShuffleSource,
};

pub use streak::{is_completed_on, is_today_completed, CompletionRecorder, StreakTracker};

pub use storage::{
    Chapter, ChapterRecord, ChapterSummary, SessionHistoryEntry, Storage, StorageError,
    StorageResult, StreakRecord, Word,
};

pub use service::{ChapterBookmarkWriter, VocabService};
