//! Tokenization and canonical keys.
//!
//! [`Normalize`] turns one line of text into `(CanonicalKey, Token)` pairs. It
//! never fails: short lines, short words and empty splits simply produce
//! nothing.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Characters stripped (at most one, only at the end) from a candidate word.
pub const TRAILING_PUNCTUATION: &[char] = &[',', '.', ';'];

/// A normalized word: trailing punctuation trimmed, ASCII-lowercased.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Borrow<str> for Token {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The characters of a [`Token`] sorted ascending by code point.
///
/// Two tokens are anagrams of each other exactly when their keys are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    #[must_use]
    pub fn of(token: &Token) -> Self {
        Self::from_word(token.as_str())
    }

    /// Key of an arbitrary word, without any normalization.
    #[must_use]
    pub fn from_word(word: &str) -> Self {
        let mut chars: Vec<char> = word.chars().collect();
        chars.sort_unstable();
        Self(chars.into_iter().collect())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether `s` has fewer than `n` characters. Stops counting at `n`.
#[must_use]
pub fn shorter_than(s: &str, n: usize) -> bool {
    n > 0 && s.chars().nth(n - 1).is_none()
}

/// Strip one trailing `,`, `.` or `;` if present.
#[must_use]
pub fn trim_trailing(word: &str) -> &str {
    word.strip_suffix(TRAILING_PUNCTUATION).unwrap_or(word)
}

/// Word separators: Unicode whitespace plus the ASCII information separators,
/// except the no-break spaces and NEL, which stay inside a word.
fn is_separator(c: char) -> bool {
    match c {
        '\u{00A0}' | '\u{2007}' | '\u{202F}' | '\u{0085}' => false,
        '\u{001C}'..='\u{001F}' => true,
        c => c.is_whitespace(),
    }
}

/// Line normalizer with a minimum word length.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Normalize {
    min_len: usize,
}

impl Normalize {
    /// `min_len` below 1 behaves as 1.
    #[must_use]
    pub fn new(min_len: usize) -> Self {
        Self {
            min_len: min_len.max(1),
        }
    }

    #[must_use]
    pub fn min_len(&self) -> usize {
        self.min_len
    }

    /// Normalize one whitespace-free candidate word.
    ///
    /// Returns `None` when the word is shorter than the minimum length, before
    /// or after its trailing punctuation is trimmed.
    #[must_use]
    pub fn normalize_word(&self, raw: &str) -> Option<Token> {
        if shorter_than(raw, self.min_len) {
            return None;
        }
        let trimmed = trim_trailing(raw);
        if trimmed.len() != raw.len() && shorter_than(trimmed, self.min_len) {
            return None;
        }
        Some(Token(trimmed.to_ascii_lowercase()))
    }

    /// Lazily produce the tokens of `line`.
    pub fn tokens<'a>(&'a self, line: &'a str) -> impl Iterator<Item = Token> + 'a {
        // lines too short to hold a single word are never split
        let words = if shorter_than(line, self.min_len) {
            None
        } else {
            Some(line.split(is_separator).filter(|w| !w.is_empty()))
        };
        words
            .into_iter()
            .flatten()
            .filter_map(|w| self.normalize_word(w))
    }

    /// Lazily produce `(CanonicalKey, Token)` pairs for `line`.
    pub fn pairs<'a>(&'a self, line: &'a str) -> impl Iterator<Item = (CanonicalKey, Token)> + 'a {
        self.tokens(line).map(|t| (CanonicalKey::of(&t), t))
    }

    /// Owned pairs for `line`, for use inside a pipeline stage.
    #[must_use]
    pub fn apply(&self, line: &str) -> Vec<(CanonicalKey, Token)> {
        self.pairs(line).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: &Normalize, line: &str) -> Vec<String> {
        n.tokens(line).map(Token::into_string).collect()
    }

    #[test]
    fn lowercases_and_trims_one_trailing_mark() {
        let n = Normalize::new(3);
        assert_eq!(
            words(&n, "Listen, Silent. enlist;; tinsel!"),
            vec!["listen", "silent", "enlist;", "tinsel!"]
        );
    }

    #[test]
    fn short_words_fail_before_or_after_trim() {
        let n = Normalize::new(3);
        assert_eq!(n.normalize_word("in"), None);
        assert_eq!(n.normalize_word("an,"), None);
        assert_eq!(n.normalize_word(",,,"), None);
        assert_eq!(
            Normalize::new(2).normalize_word(",,,").map(Token::into_string),
            Some(",,".into())
        );
        assert_eq!(Normalize::new(1).normalize_word(";"), None);
    }

    #[test]
    fn short_line_is_not_split() {
        let n = Normalize::new(5);
        assert!(n.tokens("a b").next().is_none());
        assert!(n.tokens("").next().is_none());
        assert!(n.tokens("    \t ").next().is_none());
    }

    #[test]
    fn length_counts_characters() {
        assert!(!shorter_than("été", 3));
        assert!(shorter_than("été", 4));
        assert!(!shorter_than("", 0));
    }

    #[test]
    fn key_is_sorted_characters() {
        assert_eq!(CanonicalKey::from_word("race").as_str(), "acer");
        assert_eq!(CanonicalKey::from_word("race"), CanonicalKey::from_word("care"));
        assert_eq!(CanonicalKey::from_word("").as_str(), "");
    }
}
