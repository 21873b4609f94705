//! Result entries and their text rendering.

use super::count::FrequencyMap;
use super::tokenize::CanonicalKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A group that survived the singleton filter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub key: CanonicalKey,
    pub frequencies: FrequencyMap,
}

impl ResultEntry {
    #[must_use]
    pub fn new(key: CanonicalKey, frequencies: FrequencyMap) -> Self {
        Self { key, frequencies }
    }

    /// One output line: `(key,{word=count, word=count})`, words in ascending order.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ResultEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{{", self.key)?;
        for (i, (word, n)) in self.frequencies.sorted().into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{word}={n}")?;
        }
        f.write_str("})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anagram::{Normalize, count};

    #[test]
    fn renders_sorted_words() {
        let n = Normalize::new(1);
        let group: Vec<_> = n.tokens("silent listen silent").collect();
        let entry = ResultEntry::new(CanonicalKey::from_word("listen"), count(&group));
        assert_eq!(entry.render(), "(eilnst,{listen=1, silent=2})");
    }
}
