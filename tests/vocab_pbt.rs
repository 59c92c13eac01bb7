//! Property-Based Tests for normalization, duplicate detection and review sessions
//!
//! Tests the following invariants:
//! - Normalization is idempotent and never yields whitespace or punctuation
//! - Duplicate detection is symmetric between chapters
//! - Sessions exclude known words, order by priority, and complete exactly once

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;

use danci_vocab_core::{
    is_same_word, normalize, ChaChaShuffle, Chapter, DuplicateIndex, ReviewOutcome,
    ReviewSession, SessionListener, SessionResult, Word,
};

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_text() -> impl Strategy<Value = String> {
    "[A-Za-zÀ-ÿ가-힣0-9 _.,!?'-]{0,16}"
}

fn arb_outcome() -> impl Strategy<Value = ReviewOutcome> {
    prop_oneof![
        Just(ReviewOutcome::Correct),
        Just(ReviewOutcome::Incorrect),
        Just(ReviewOutcome::Skipped),
    ]
}

fn arb_words(max: usize) -> impl Strategy<Value = Vec<Word>> {
    prop::collection::vec(
        (arb_text(), any::<bool>(), proptest::option::of(0i32..=5)),
        0..max,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, (text, is_known, priority))| {
                let mut word = Word::new(format!("w{i}"), text, "");
                word.is_known = is_known;
                word.priority = priority;
                word
            })
            .collect()
    })
}

struct CompletionCounter(Rc<RefCell<Vec<SessionResult>>>);

impl SessionListener for CompletionCounter {
    fn on_completed(&mut self, result: &SessionResult) {
        self.0.borrow_mut().push(*result);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #[test]
    fn normalize_is_idempotent(text in arb_text()) {
        let once = normalize(&text);
        prop_assert_eq!(normalize(&once), once.clone());
        prop_assert!(once.chars().all(|c| c.is_alphanumeric() || c == '_'));
    }

    #[test]
    fn same_word_is_symmetric(a in arb_text(), b in arb_text()) {
        prop_assert_eq!(is_same_word(&a, &b), is_same_word(&b, &a));
        prop_assert!(is_same_word(&a, &a));
        prop_assert_eq!(is_same_word(&a, &b), normalize(&a) == normalize(&b));
    }

    #[test]
    fn duplicate_detection_is_symmetric(
        words_a in arb_words(8),
        words_b in arb_words(8),
        pick in any::<prop::sample::Index>(),
    ) {
        prop_assume!(!words_a.is_empty());
        let target = words_a[pick.index(words_a.len())].text.clone();

        let a = Chapter::new("a", "A", words_a);
        let b = Chapter::new("b", "B", words_b.clone());
        let forward = DuplicateIndex::from_chapters([&a, &b]);
        let backward = DuplicateIndex::from_chapters([&b, &a]);

        let in_b = words_b.iter().any(|w| is_same_word(&w.text, &target));
        let from_a = forward.info("a", &target);
        let from_b = backward.info("b", &target);

        prop_assert_eq!(from_a.other_chapters.iter().any(|c| c.id == "b"), in_b);
        prop_assert_eq!(from_b.other_chapters.iter().any(|c| c.id == "a"), in_b);
        prop_assert_eq!(from_a.occurrence_count, from_b.occurrence_count);
        prop_assert_eq!(from_a.is_duplicate, from_a.occurrence_count > 1);
    }

    #[test]
    fn session_invariants(
        words in arb_words(12),
        seed in any::<u64>(),
        outcomes in prop::collection::vec(arb_outcome(), 12),
    ) {
        let mut expected: Vec<String> = words
            .iter()
            .filter(|w| !w.is_known)
            .map(|w| w.id.clone())
            .collect();
        expected.sort();

        let completions = Rc::new(RefCell::new(Vec::new()));
        let mut session = ReviewSession::new(words, &mut ChaChaShuffle::with_seed(seed))
            .with_listener(Box::new(CompletionCounter(completions.clone())));

        let mut queued: Vec<String> = session.words().iter().map(|w| w.id.clone()).collect();
        let priorities: Vec<i32> = session.words().iter().map(Word::effective_priority).collect();
        prop_assert!(priorities.windows(2).all(|p| p[0] >= p[1]));
        queued.sort();
        prop_assert_eq!(&queued, &expected);
        prop_assert!(session.words().iter().all(|w| !w.is_known));

        for outcome in outcomes.iter().take(session.len()) {
            prop_assert_eq!(session.results().answered() as usize, session.current_index());
            session.record_result(*outcome).unwrap();
        }
        prop_assert!(session.record_result(ReviewOutcome::Correct).is_err());

        let completions = completions.borrow();
        if expected.is_empty() {
            prop_assert!(session.is_empty());
            prop_assert!(completions.is_empty());
        } else {
            prop_assert_eq!(completions.len(), 1);
            let result = completions[0];
            prop_assert_eq!(result.correct + result.incorrect + result.skipped, result.total);
            prop_assert_eq!(result.total as usize, expected.len());
        }
    }
}
