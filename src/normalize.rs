//! 单词规范化
//!
//! 重复检测唯一的相等判定来源：两个单词当且仅当规范化结果相同时视为同一个词。

/// 是否为单词字符（字母、数字、下划线，Unicode 意义上）
#[inline]
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// 规范化单词
///
/// 转为小写，去掉所有空白与非单词字符。纯函数，不会失败。
///
/// ```
/// use danci_vocab_core::normalize;
///
/// assert_eq!(normalize("Hello, World!"), "helloworld");
/// assert_eq!(normalize(" 사 과 "), "사과");
/// ```
pub fn normalize(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| is_word_char(*c))
        .collect()
}

/// 两个单词规范化后是否相同
pub fn is_same_word(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}
