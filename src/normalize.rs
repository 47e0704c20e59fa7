//! Canonical form used to compare a guess with the stored answer.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Decompose, drop combining marks, lowercase, trim and collapse whitespace runs.
///
/// Lowercasing happens before decomposition: some lowercase mappings (`İ`)
/// emit combining marks of their own, which must be stripped in the same pass.
#[must_use]
pub fn normalize(s: &str) -> String {
    let lowered: String = s.chars().flat_map(char::to_lowercase).collect();
    let folded: String = lowered.nfd().filter(|c| !is_combining_mark(*c)).collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Compare a guess against the correct answer after normalizing both sides.
#[must_use]
pub fn answers_match(guess: &str, correct: &str) -> bool {
    normalize(guess) == normalize(correct)
}

/// Count of letters the player has to produce, ignoring whitespace.
#[must_use]
pub fn letter_count(answer: &str) -> usize {
    answer.chars().filter(|c| !c.is_whitespace()).count()
}
