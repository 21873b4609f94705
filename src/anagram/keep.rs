//! Singleton filter.

use super::count::FrequencyMap;

/// Keep a group only if it holds at least two distinct words.
#[must_use]
pub fn keep(freq: &FrequencyMap) -> bool {
    freq.distinct() > 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anagram::{Normalize, count};

    #[test]
    fn repeats_of_one_word_are_dropped() {
        let n = Normalize::new(1);
        let same: Vec<_> = n.tokens("army Army ARMY").collect();
        let pair: Vec<_> = n.tokens("army mary").collect();
        assert!(!keep(&count(&same)));
        assert!(keep(&count(&pair)));
    }
}
