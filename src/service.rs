//! 组合根
//!
//! `VocabService` 持有存储与配置，负责把检测器、会话引擎与连续学习跟踪器连接起来。

use crate::config::Config;
use crate::duplicate::{DuplicateDetector, DuplicateInfo};
use crate::session::{ChaChaShuffle, ReviewSession, SessionListener, SessionResult};
use crate::storage::{ChapterRepository, Storage, StorageResult, StreakRecord, Word};
use crate::streak::{CompletionRecorder, StreakTracker};

// ============================================================
// 监听器
// ============================================================

/// 将收藏切换写回所属章节记录
pub struct ChapterBookmarkWriter {
    chapters: ChapterRepository,
    chapter_id: String,
}

impl ChapterBookmarkWriter {
    pub fn new(chapters: ChapterRepository, chapter_id: impl Into<String>) -> Self {
        Self {
            chapters,
            chapter_id: chapter_id.into(),
        }
    }
}

impl SessionListener for ChapterBookmarkWriter {
    fn on_bookmark_toggled(&mut self, word: &Word) {
        if let Err(e) = self
            .chapters
            .set_bookmark(&self.chapter_id, &word.id, word.is_bookmarked)
        {
            tracing::warn!(
                chapter_id = %self.chapter_id,
                word_id = %word.id,
                error = %e,
                "收藏状态写入失败"
            );
        }
    }
}

/// 按顺序转发给多个监听器
struct ListenerChain(Vec<Box<dyn SessionListener>>);

impl SessionListener for ListenerChain {
    fn on_bookmark_toggled(&mut self, word: &Word) {
        for listener in &mut self.0 {
            listener.on_bookmark_toggled(word);
        }
    }

    fn on_completed(&mut self, result: &SessionResult) {
        for listener in &mut self.0 {
            listener.on_completed(result);
        }
    }
}

// ============================================================
// VocabService
// ============================================================

pub struct VocabService {
    storage: Storage,
    config: Config,
    detector: DuplicateDetector,
}

impl VocabService {
    pub fn new(storage: Storage, config: Config) -> Self {
        let detector = if config.duplicate_cache {
            DuplicateDetector::cached(storage.chapters())
        } else {
            DuplicateDetector::new(storage.chapters())
        };

        Self {
            storage,
            config,
            detector,
        }
    }

    /// 按配置打开 SQLite 存储
    pub fn open(config: Config) -> StorageResult<Self> {
        let storage = Storage::new(&config.db_path)?;
        tracing::info!(db_path = %config.db_path.display(), "存储已打开");
        Ok(Self::new(storage, config))
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn detector(&self) -> &DuplicateDetector {
        &self.detector
    }

    pub fn streak_tracker(&self) -> StreakTracker {
        StreakTracker::new(
            self.storage.streaks(),
            self.storage.session_history(),
            self.config.daily_goal,
        )
    }

    // ========== 重复检测 ==========

    pub fn check_duplicate(&self, chapter_id: &str, word: &str) -> DuplicateInfo {
        self.detector.check_duplicate(chapter_id, word)
    }

    // ========== 连续学习 ==========

    pub fn streak_info(&self) -> StreakRecord {
        self.streak_tracker().get_streak_info()
    }

    pub fn is_today_completed(&self) -> bool {
        self.streak_tracker().today_completed()
    }

    // ========== 复习会话 ==========

    fn completion_recorder(&self) -> CompletionRecorder {
        CompletionRecorder::new(self.streak_tracker(), self.storage.session_history())
    }

    /// 用任意单词列表开始会话
    ///
    /// 会话结束时写入历史并更新连续学习记录；`listener` 额外接收会话事件。
    pub fn start_session<I>(
        &self,
        words: I,
        listener: Option<Box<dyn SessionListener>>,
    ) -> ReviewSession
    where
        I: IntoIterator<Item = Word>,
    {
        let mut listeners: Vec<Box<dyn SessionListener>> = Vec::new();
        if let Some(listener) = listener {
            listeners.push(listener);
        }
        listeners.push(Box::new(self.completion_recorder()));

        let mut shuffle = ChaChaShuffle::from_seed_option(self.config.shuffle_seed);
        ReviewSession::new(words, &mut shuffle)
            .with_listener(Box::new(ListenerChain(listeners)))
    }

    /// 用某个章节的单词开始会话，收藏切换会写回该章节
    ///
    /// 章节缺失或损坏时返回空会话。
    pub fn start_chapter_session(&self, chapter_id: &str) -> ReviewSession {
        let chapters = self.storage.chapters();
        let words = match chapters.get_chapter(chapter_id) {
            Ok(Some(record)) => record.words,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(
                    chapter_id,
                    error = %e,
                    "章节记录读取失败，返回空会话"
                );
                Vec::new()
            }
        };

        let writer = ChapterBookmarkWriter::new(chapters, chapter_id);
        self.start_session(words, Some(Box::new(writer)))
    }
}
