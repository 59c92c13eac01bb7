//! 复习队列的筛选与排序

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::cmp::Reverse;

use crate::storage::Word;

/// 同优先级单词之间的随机打乱来源
///
/// 实现必须产生输入的一个排列（每个单词恰好出现一次）。
pub trait ShuffleSource {
    fn shuffle(&mut self, words: &mut [Word]);
}

/// 基于 ChaCha8 的打乱来源
pub struct ChaChaShuffle {
    rng: ChaCha8Rng,
}

impl ChaChaShuffle {
    /// 使用系统熵作为种子
    pub fn new() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// 使用固定种子（可复现）
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// 有种子时使用固定种子，否则使用系统熵
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map(Self::with_seed).unwrap_or_default()
    }
}

impl Default for ChaChaShuffle {
    fn default() -> Self {
        Self::new()
    }
}

impl ShuffleSource for ChaChaShuffle {
    fn shuffle(&mut self, words: &mut [Word]) {
        words.shuffle(&mut self.rng);
    }
}

/// 保持输入顺序（确定性，测试使用）
#[derive(Debug, Default, Clone, Copy)]
pub struct KeepOrder;

impl ShuffleSource for KeepOrder {
    fn shuffle(&mut self, _words: &mut [Word]) {}
}

/// 构建复习队列
///
/// 去掉已掌握的单词，先打乱再按优先级降序稳定排序，
/// 因此同优先级单词之间保持打乱后的相对顺序。
pub fn build_queue<I>(words: I, shuffle: &mut dyn ShuffleSource) -> Vec<Word>
where
    I: IntoIterator<Item = Word>,
{
    let mut queue: Vec<Word> = words.into_iter().filter(|w| !w.is_known).collect();

    shuffle.shuffle(&mut queue);
    queue.sort_by_key(|w| Reverse(w.effective_priority()));

    queue
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(id: &str, priority: Option<i32>) -> Word {
        let mut w = Word::new(id, id, "");
        w.priority = priority;
        w
    }

    fn ids(words: &[Word]) -> Vec<&str> {
        words.iter().map(|w| w.id.as_str()).collect()
    }

    /// 反转顺序，用于验证打乱发生在排序之前
    struct Reverser;

    impl ShuffleSource for Reverser {
        fn shuffle(&mut self, words: &mut [Word]) {
            words.reverse();
        }
    }

    #[test]
    fn test_filters_known_words() {
        let words = vec![word("a", None), word("b", None).known(), word("c", None)];
        let queue = build_queue(words, &mut KeepOrder);
        assert_eq!(ids(&queue), vec!["a", "c"]);
    }

    #[test]
    fn test_priority_descending_with_default() {
        let words = vec![word("low", Some(1)), word("mid", None), word("high", Some(5))];
        let queue = build_queue(words, &mut KeepOrder);
        assert_eq!(ids(&queue), vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_ties_follow_shuffle_order() {
        let words = vec![word("a", Some(2)), word("b", Some(2)), word("top", Some(9))];
        let queue = build_queue(words, &mut Reverser);
        assert_eq!(ids(&queue), vec!["top", "b", "a"]);
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible_permutation() {
        let words: Vec<Word> = (0..20).map(|i| word(&i.to_string(), None)).collect();

        let first = build_queue(words.clone(), &mut ChaChaShuffle::with_seed(7));
        let second = build_queue(words.clone(), &mut ChaChaShuffle::with_seed(7));
        assert_eq!(first, second);

        let mut sorted = ids(&first);
        sorted.sort();
        let mut expected = ids(&words);
        expected.sort();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_empty_input() {
        assert!(build_queue(Vec::new(), &mut ChaChaShuffle::new()).is_empty());
    }
}
