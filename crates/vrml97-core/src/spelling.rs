//! Spelling-distance scoring used to recover from misspelled names.
//!
//! Scoring compares a known-good name with a candidate, case-folded:
//! - 100 points per consonant matching at the same position
//! - 60 points per consonant matching with the candidate shifted one left
//! - 60 points per consonant matching with the candidate shifted one right
//!
//! Vowels never score, and a position consumed by one pass is not reused by
//! a later pass. Scores below `60 * consonants(good)` are forced to zero.

/// Points for an aligned match.
pub const ALIGNED_POINTS: u32 = 100;
/// Points for a match after shifting the candidate by one position.
pub const SHIFTED_POINTS: u32 = 60;
/// A suggestion is accepted when its score exceeds this many points per
/// candidate character.
pub const ACCEPT_POINTS_PER_CHAR: u32 = 40;

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn fold(s: &str) -> Vec<char> {
    s.chars().map(|c| c.to_ascii_lowercase()).collect()
}

fn consonant_count(chars: &[char]) -> u32 {
    chars
        .iter()
        .filter(|c| c.is_alphabetic() && !is_vowel(**c))
        .count() as u32
}

/// Similarity of `candidate` to the known-good name `good`.
pub fn match_score(good: &str, candidate: &str) -> u32 {
    let good = fold(good);
    let candidate = fold(candidate);
    let mut good_used = vec![false; good.len()];
    let mut candidate_used = vec![false; candidate.len()];
    let mut score = 0;

    // Candidate index = good index + shift.
    for (shift, points) in [(0isize, ALIGNED_POINTS), (1, SHIFTED_POINTS), (-1, SHIFTED_POINTS)] {
        for (i, &c) in good.iter().enumerate() {
            let Some(j) = i.checked_add_signed(shift) else {
                continue;
            };
            if j >= candidate.len() || good_used[i] || candidate_used[j] {
                continue;
            }
            if is_vowel(c) || candidate[j] != c {
                continue;
            }
            good_used[i] = true;
            candidate_used[j] = true;
            score += points;
        }
    }

    if score < SHIFTED_POINTS * consonant_count(&good) {
        0
    } else {
        score
    }
}

/// Minimum score (exclusive) a suggestion for `candidate` must reach.
pub fn threshold(candidate: &str) -> u32 {
    ACCEPT_POINTS_PER_CHAR * candidate.chars().count() as u32
}

/// Whether `score` is good enough to substitute for `candidate`.
pub fn is_accepted(candidate: &str, score: u32) -> bool {
    score > threshold(candidate)
}

/// Highest-scoring name among `names`; ties keep the first one seen.
///
/// Returns `None` when the candidate has no letters or nothing scores.
/// The result is not filtered by [`threshold`].
pub fn best_match<'a>(
    candidate: &str,
    names: impl IntoIterator<Item = &'a str>,
) -> Option<(&'a str, u32)> {
    if !candidate.chars().any(|c| c.is_alphabetic()) {
        return None;
    }

    let mut best: Option<(&'a str, u32)> = None;
    for name in names {
        let score = match_score(name, candidate);
        if score == 0 {
            continue;
        }
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((name, score));
        }
    }
    best
}

/// Like [`best_match`], but only returns an accepted suggestion.
pub fn suggest<'a>(candidate: &str, names: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    best_match(candidate, names)
        .filter(|(_, score)| is_accepted(candidate, *score))
        .map(|(name, _)| name)
}
