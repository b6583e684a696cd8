// Lexical heuristics for word-level timing features
//
// Neither heuristic uses a tagger or a pronunciation dictionary. They are
// deliberately crude approximations that can be swapped for real models
// without touching the indicator arithmetic.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Closed-class English words: pronouns, articles, auxiliaries, conjunctions,
/// prepositions and common discourse particles
static FUNCTION_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "the", "this", "that", "these", "those", "i", "me", "my", "mine", "we", "us",
        "our", "ours", "you", "your", "yours", "he", "him", "his", "she", "her", "hers", "it",
        "its", "they", "them", "their", "theirs", "is", "am", "are", "was", "were", "be", "been",
        "being", "have", "has", "had", "do", "does", "did", "will", "would", "shall", "should",
        "may", "might", "can", "could", "must", "and", "but", "or", "nor", "for", "yet", "so",
        "in", "on", "at", "to", "with", "by", "from", "of", "about", "into", "through", "during",
        "before", "after", "above", "below", "between", "under", "over", "up", "down", "out",
        "off", "if", "then", "else", "when", "while", "as", "than", "because", "not", "no",
        "very", "just", "also", "too", "more", "most", "what", "which", "who", "whom", "whose",
        "where", "how", "all", "each", "every", "both", "few", "some", "any", "many", "much",
        "there", "here", "now", "still", "already",
    ]
    .into_iter()
    .collect()
});

/// Punctuation trimmed from both ends before a word is classified
const EDGE_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '"', '\'', '(', ')', '-'];

const VOWELS: &str = "aeiouy";

pub fn is_function_word(word: &str) -> bool {
    FUNCTION_WORDS.contains(word)
}

/// Recogniser output normalized for lookup: trimmed, edge punctuation
/// removed, lower-cased
fn normalize(word: &str) -> String {
    word.trim()
        .trim_matches(EDGE_PUNCTUATION)
        .to_lowercase()
}

/// Content-word guess: longer than `min_chars` characters and not a
/// function word
pub fn is_likely_noun(word: &str, min_chars: usize) -> bool {
    let normalized = normalize(word);
    normalized.chars().count() > min_chars && !is_function_word(&normalized)
}

/// Syllable estimate from orthography
///
/// Counts runs of vowels (`aeiouy`), drops one for a trailing silent "e"
/// when more than one run was found, and never returns less than 1.
pub fn estimate_syllables(word: &str) -> usize {
    let word = word.trim().to_lowercase();
    if word.is_empty() {
        return 1;
    }

    let mut count = 0usize;
    let mut in_vowel_run = false;
    for ch in word.chars() {
        let is_vowel = VOWELS.contains(ch);
        if is_vowel && !in_vowel_run {
            count += 1;
        }
        in_vowel_run = is_vowel;
    }

    if word.ends_with('e') && count > 1 {
        count -= 1;
    }
    count.max(1)
}
