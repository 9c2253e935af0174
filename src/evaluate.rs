//! Guess scoring.
//!
//! Exact matches are resolved first and consume their target letter. The
//! remaining target letters are then handed out left to right as `Present`
//! marks, so a letter guessed twice against a single occurrence in the
//! target gets one non-absent mark and one `Absent`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LetterStatus {
    Absent,
    Present,
    Correct,
}

/// Score `guess` against `target`, one status per letter.
pub fn evaluate(guess: &str, target: &str) -> Result<Vec<LetterStatus>, GameError> {
    let guess: Vec<char> = guess.chars().map(|c| c.to_ascii_uppercase()).collect();
    let target: Vec<char> = target.chars().map(|c| c.to_ascii_uppercase()).collect();

    if guess.len() != target.len() {
        return Err(GameError::InvalidGuessLength {
            expected: target.len(),
            actual: guess.len(),
        });
    }

    let mut available: HashMap<char, usize> = HashMap::new();
    for &c in &target {
        *available.entry(c).or_insert(0) += 1;
    }

    let mut statuses = vec![LetterStatus::Absent; guess.len()];

    for (i, (&g, &t)) in guess.iter().zip(target.iter()).enumerate() {
        if g == t {
            statuses[i] = LetterStatus::Correct;
            if let Some(n) = available.get_mut(&g) {
                *n -= 1;
            }
        }
    }

    for (i, &g) in guess.iter().enumerate() {
        if statuses[i] == LetterStatus::Correct {
            continue;
        }
        match available.get_mut(&g) {
            Some(n) if *n > 0 => {
                *n -= 1;
                statuses[i] = LetterStatus::Present;
            }
            _ => {}
        }
    }

    Ok(statuses)
}

pub fn is_win(statuses: &[LetterStatus]) -> bool {
    !statuses.is_empty() && statuses.iter().all(|s| *s == LetterStatus::Correct)
}

/// Best status seen for each letter across scored rows, for the on-screen keyboard.
pub fn keyboard_hints<'a, I>(rows: I) -> HashMap<char, LetterStatus>
where
    I: IntoIterator<Item = (&'a str, &'a [LetterStatus])>,
{
    let mut hints: HashMap<char, LetterStatus> = HashMap::new();
    for (word, statuses) in rows {
        for (c, status) in word.chars().zip(statuses.iter()) {
            let entry = hints.entry(c.to_ascii_uppercase()).or_insert(*status);
            if *status > *entry {
                *entry = *status;
            }
        }
    }
    hints
}
