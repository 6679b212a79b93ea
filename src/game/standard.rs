//! Standard Game Mode
//!
//! One hidden answer drawn uniformly from the word list. Every player races
//! against the same answer with their own round budget; the first all-Hit
//! guess ends the game for everyone.

use std::collections::BTreeMap;
use tracing::debug;

use crate::core::rng::RandomSource;
use crate::game::ledger::PlayerRoundLedger;
use crate::game::outcome::score;
use crate::game::state::{GameConfig, GameError, GameState, GuessRecord, PlayerStatus};

/// Classic Wordle with a shared answer.
pub struct StandardGame {
    state: GameState,
    answer: usize,
    ledgers: BTreeMap<String, PlayerRoundLedger>,
    rng: Box<dyn RandomSource>,
}

impl StandardGame {
    /// Validate the word list and draw the first answer.
    pub fn new(config: &GameConfig, mut rng: Box<dyn RandomSource>) -> Result<Self, GameError> {
        let state = GameState::new(config)?;
        let answer = rng.next_index(state.word_list.len());

        Ok(Self {
            state,
            answer,
            ledgers: BTreeMap::new(),
            rng,
        })
    }

    /// Score a guess for `player_id` against the shared answer.
    pub fn guess(&mut self, player_id: &str, word: &str) -> Result<GuessRecord, GameError> {
        let (normalized, _) = self.state.validate_guess(word)?;

        if let Some(ledger) = self.ledgers.get(player_id) {
            if !ledger.has_rounds_left() {
                return Err(GameError::NoRoundsLeft);
            }
        }

        let answer = self.answer_word().to_string();
        let results = score(&normalized, &answer);
        let record = GuessRecord::new(normalized, results);

        let max_rounds = self.state.max_rounds;
        self.ledgers
            .entry(player_id.to_string())
            .or_insert_with(|| PlayerRoundLedger::new(max_rounds))
            .add_guess(record.clone());

        if record.is_win {
            debug!(player_id, answer = %answer, "standard game won");
            self.state.handle_win(player_id, &answer);
        }

        Ok(record)
    }

    /// Clear every ledger, draw a new answer and reset the game flags.
    pub fn restart_game(&mut self) {
        for ledger in self.ledgers.values_mut() {
            ledger.reset();
        }
        self.answer = self.rng.next_index(self.state.word_list.len());
        self.state.reset();
        debug!(game_id = %self.state.game_id, "standard game restarted");
    }

    /// Force a specific answer. Must be in the word list.
    pub fn force_answer(&mut self, word: &str) -> Result<(), GameError> {
        let upper = word.to_ascii_uppercase();
        self.answer = self
            .state
            .word_list
            .index_of(&upper)
            .ok_or(GameError::NotInWordList)?;
        Ok(())
    }

    /// The hidden answer. Callers must not leak it before game over.
    pub fn answer_word(&self) -> &str {
        self.state.word_list.get(self.answer).unwrap_or_default()
    }

    /// Status for one player.
    pub fn status(&self, player_id: &str) -> PlayerStatus {
        self.state.status_for(self.ledgers.get(player_id))
    }

    /// A player's ledger, if they have guessed this process lifetime.
    pub fn ledger(&self, player_id: &str) -> Option<&PlayerRoundLedger> {
        self.ledgers.get(player_id)
    }

    /// Shared state.
    pub fn state(&self) -> &GameState {
        &self.state
    }
}
