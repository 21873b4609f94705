//! Per-group frequency aggregation.

use super::tokenize::Token;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Occurrence count of each distinct token in one group.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyMap(HashMap<Token, u64>);

impl FrequencyMap {
    /// Number of distinct tokens.
    #[must_use]
    pub fn distinct(&self) -> usize {
        self.0.len()
    }

    /// Sum of all counts; equals the size of the group it was built from.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    #[must_use]
    pub fn get(&self, word: &str) -> Option<u64> {
        self.0.get(word).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Token, u64)> {
        self.0.iter().map(|(t, c)| (t, *c))
    }

    /// Entries sorted by word.
    #[must_use]
    pub fn sorted(&self) -> Vec<(&Token, u64)> {
        let mut v: Vec<_> = self.iter().collect();
        v.sort_unstable_by(|a, b| a.0.cmp(b.0));
        v
    }
}

impl FromIterator<Token> for FrequencyMap {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        let mut acc: HashMap<Token, u64> = HashMap::new();
        for t in iter {
            *acc.entry(t).or_insert(0) += 1;
        }
        Self(acc)
    }
}

/// Count the occurrences of each token in a group.
#[must_use]
pub fn count(group: &[Token]) -> FrequencyMap {
    group.iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anagram::Normalize;

    #[test]
    fn counts_sum_to_group_size() {
        let n = Normalize::new(1);
        let group: Vec<Token> = n.tokens("Silent listen silent Silent").collect();
        let freq = count(&group);
        assert_eq!(freq.distinct(), 2);
        assert_eq!(freq.get("silent"), Some(3));
        assert_eq!(freq.get("listen"), Some(1));
        assert_eq!(freq.total(), group.len() as u64);
        assert_eq!(freq.sorted()[0].0.as_str(), "listen");
    }
}
