//! Letter Scoring
//!
//! Per-letter feedback for a guess against an answer. Pure, allocation-light
//! and safe to call from any thread.

use serde::{Serialize, Deserialize};

/// Feedback for a single letter position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterOutcome {
    /// Same letter, same position.
    Hit,
    /// Letter occurs elsewhere and has an unmatched occurrence left.
    Present,
    /// No unmatched occurrence left.
    Miss,
}

/// Hit and Present totals for one outcome row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    /// Number of Hit letters.
    pub hits: usize,
    /// Number of Present letters.
    pub presents: usize,
}

impl OutcomeCounts {
    /// Count hits and presents in an outcome row.
    pub fn of(outcomes: &[LetterOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut acc, o| {
            match o {
                LetterOutcome::Hit => acc.hits += 1,
                LetterOutcome::Present => acc.presents += 1,
                LetterOutcome::Miss => {}
            }
            acc
        })
    }

    /// True when the row revealed anything at all.
    pub fn any(&self) -> bool {
        self.hits > 0 || self.presents > 0
    }
}

/// Score `guess` against `answer`.
///
/// Both must be uppercase ASCII of equal length; callers validate first.
/// Two passes: Hits are matched first, then Presents consume the answer's
/// remaining unmatched letters left to right.
pub fn score(guess: &str, answer: &str) -> Vec<LetterOutcome> {
    let guess = guess.as_bytes();
    let answer = answer.as_bytes();
    debug_assert_eq!(guess.len(), answer.len());

    let mut outcomes = vec![LetterOutcome::Miss; guess.len()];
    let mut remaining = [0u8; 26];

    for (i, (&g, &a)) in guess.iter().zip(answer).enumerate() {
        if g == a {
            outcomes[i] = LetterOutcome::Hit;
        } else {
            remaining[letter_slot(a)] += 1;
        }
    }

    for (i, &g) in guess.iter().enumerate() {
        if outcomes[i] == LetterOutcome::Hit {
            continue;
        }
        let slot = letter_slot(g);
        if remaining[slot] > 0 {
            outcomes[i] = LetterOutcome::Present;
            remaining[slot] -= 1;
        }
    }

    outcomes
}

/// True when every letter is a Hit.
#[inline]
pub fn is_win(outcomes: &[LetterOutcome]) -> bool {
    !outcomes.is_empty() && outcomes.iter().all(|o| *o == LetterOutcome::Hit)
}

#[inline]
fn letter_slot(b: u8) -> usize {
    (b.wrapping_sub(b'A') % 26) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use LetterOutcome::{Hit, Miss, Present};

    #[test]
    fn test_all_hits() {
        assert_eq!(score("APPLE", "APPLE"), vec![Hit; 5]);
        assert!(is_win(&score("APPLE", "APPLE")));
    }

    #[test]
    fn test_all_miss() {
        assert_eq!(score("MANGO", "BERRY"), vec![Miss; 5]);
    }

    #[test]
    fn test_presents() {
        assert_eq!(
            score("GRAPE", "APPLE"),
            vec![Miss, Miss, Present, Present, Hit]
        );
        assert_eq!(score("AAAAZ", "ZBBBB"), vec![Miss, Miss, Miss, Miss, Present]);
    }

    #[test]
    fn test_duplicate_letter_not_over_counted() {
        // One unmatched A in APPLE, so only one Present
        assert_eq!(score("MANGO", "APPLE"), vec![Miss, Present, Miss, Miss, Miss]);
        // Hit consumes the first P, the second P is Present once
        assert_eq!(score("PUPPY", "APPLE"), vec![Present, Miss, Hit, Miss, Miss]);
    }

    #[test]
    fn test_counts() {
        let counts = OutcomeCounts::of(&[Hit, Present, Miss, Hit, Present]);
        assert_eq!(counts, OutcomeCounts { hits: 2, presents: 2 });
        assert!(counts.any());
        assert!(!OutcomeCounts::of(&[Miss, Miss]).any());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&vec![Hit, Present, Miss]).unwrap();
        assert_eq!(json, r#"["hit","present","miss"]"#);
    }

    fn word(len: usize) -> impl Strategy<Value = String> {
        proptest::collection::vec(proptest::char::range('A', 'F'), len)
            .prop_map(|chars| chars.into_iter().collect())
    }

    proptest! {
        #[test]
        fn prop_self_score_is_win(a in word(5)) {
            prop_assert!(is_win(&score(&a, &a)));
        }

        #[test]
        fn prop_letter_credit_is_min_count(g in word(5), a in word(5)) {
            let outcomes = score(&g, &a);
            for letter in b'A'..=b'F' {
                let in_guess = g.bytes().filter(|b| *b == letter).count();
                let in_answer = a.bytes().filter(|b| *b == letter).count();
                let credited = g.bytes().zip(&outcomes)
                    .filter(|(b, o)| *b == letter && **o != Miss)
                    .count();
                prop_assert_eq!(credited, in_guess.min(in_answer));
            }
        }

        #[test]
        fn prop_hits_are_positional(g in word(6), a in word(6)) {
            let outcomes = score(&g, &a);
            for (i, o) in outcomes.iter().enumerate() {
                prop_assert_eq!(*o == Hit, g.as_bytes()[i] == a.as_bytes()[i]);
            }
        }
    }
}
