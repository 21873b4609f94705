//! Ready-made inputs for anagram tests.

/// The three-line corpus used throughout the test suite.
#[must_use]
pub fn anagram_corpus() -> Vec<String> {
    vec![
        "Mary and Elvis lives in Detroit army Easter Listen".to_string(),
        "silent eaters Death Hated elvis Mary easter Silent".to_string(),
        "Mary and Elvis are in army Listen Silent detroit".to_string(),
    ]
}

/// Records expected from [`anagram_corpus`] with a minimum length of 3.
#[must_use]
pub fn anagram_corpus_expected() -> Vec<&'static str> {
    vec![
        "(adeht,{death=1, hated=1})",
        "(aeerst,{easter=2, eaters=1})",
        "(amry,{army=2, mary=3})",
        "(eilnst,{listen=2, silent=3})",
        "(eilsv,{elvis=3, lives=1})",
    ]
}

const WORD_FAMILIES: &[&[&str]] = &[
    &["listen", "silent", "enlist", "tinsel"],
    &["stop", "pots", "tops", "spot", "post"],
    &["evil", "vile", "live", "veil"],
    &["dusty", "study"],
    &["alone"],
    &["night", "thing"],
    &["state", "taste"],
    &["angel", "glean", "angle"],
];

/// A deterministic corpus of `lines` lines mixing anagram families,
/// capitalization, trailing punctuation and singleton words.
#[must_use]
pub fn generated_corpus(lines: usize) -> Vec<String> {
    let words: Vec<&str> = WORD_FAMILIES.iter().flat_map(|f| f.iter().copied()).collect();
    // simple LCG; the corpus only needs to be varied and reproducible
    let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
    let mut next = move || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (state >> 33) as usize
    };
    (0..lines)
        .map(|_| {
            let n = 1 + next() % 8;
            (0..n)
                .map(|_| {
                    let w = words[next() % words.len()];
                    match next() % 5 {
                        0 => w.to_ascii_uppercase(),
                        1 => format!("{w},"),
                        2 => format!("{w}."),
                        _ => w.to_string(),
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}
