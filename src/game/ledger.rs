//! Player Round Ledger
//!
//! Append-only guess history for one player within one game lifetime.
//! Holds no validation: the owning game mode checks everything before
//! appending.

use crate::game::state::GuessRecord;

/// Per-player guess history with round accounting.
#[derive(Debug, Clone)]
pub struct PlayerRoundLedger {
    guesses: Vec<GuessRecord>,
    max_rounds: u32,
}

impl PlayerRoundLedger {
    /// Empty ledger with the given budget.
    pub fn new(max_rounds: u32) -> Self {
        Self {
            guesses: Vec::new(),
            max_rounds,
        }
    }

    /// Append a record. Earlier records are never touched.
    pub fn add_guess(&mut self, record: GuessRecord) {
        self.guesses.push(record);
    }

    /// Records in chronological order.
    pub fn records(&self) -> &[GuessRecord] {
        &self.guesses
    }

    /// Most recent record.
    pub fn last_guess(&self) -> Option<&GuessRecord> {
        self.guesses.last()
    }

    /// Number of guesses made.
    pub fn guess_count(&self) -> u32 {
        self.guesses.len() as u32
    }

    /// At least one guess made.
    pub fn has_guesses(&self) -> bool {
        !self.guesses.is_empty()
    }

    /// Round the next guess would occupy (1-based).
    pub fn current_round(&self) -> u32 {
        self.guess_count() + 1
    }

    /// Budget minus guesses, floored at zero.
    pub fn remaining_rounds(&self) -> u32 {
        self.max_rounds.saturating_sub(self.guess_count())
    }

    /// Another guess is allowed.
    pub fn has_rounds_left(&self) -> bool {
        self.remaining_rounds() > 0
    }

    /// Any all-Hit record.
    pub fn is_won(&self) -> bool {
        self.guesses.iter().any(|g| g.is_win)
    }

    /// Budget used up without a win.
    pub fn is_lost(&self) -> bool {
        !self.is_won() && self.guess_count() >= self.max_rounds
    }

    /// Configured budget.
    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// Clear history, keep the budget.
    pub fn reset(&mut self) {
        self.guesses.clear();
    }
}
