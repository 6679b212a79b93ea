//! Game Events
//!
//! Events pushed to every connected session. No acknowledgement, no replay:
//! a late subscriber simply starts from the next event.

use serde::{Serialize, Deserialize};

use crate::game::outcome::OutcomeCounts;

/// Broadcast event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// A guess revealed at least one Hit or Present.
    /// Delivered to everyone except the guessing player.
    Points {
        /// Guessing player.
        player_id: String,
        /// Guessing player's display name.
        display_name: String,
        /// Letters in the right position.
        hit_count: usize,
        /// Letters in the word but misplaced.
        present_count: usize,
    },

    /// Someone won the current game.
    Win {
        /// Winning player.
        player_id: String,
        /// Winning player's display name.
        display_name: String,
        /// The guess that won.
        winning_guess: String,
        /// Answer of the finished game.
        revealed_answer: String,
    },

    /// Seconds left before the restart.
    Countdown {
        /// Whole seconds until the restart; 0 on the last tick.
        seconds_remaining: u32,
    },

    /// A new game lifetime began.
    Restart,
}

impl GameEvent {
    /// Points event for a scored guess, or None if nothing was revealed.
    pub fn points(player_id: &str, display_name: &str, counts: OutcomeCounts) -> Option<Self> {
        counts.any().then(|| GameEvent::Points {
            player_id: player_id.to_string(),
            display_name: display_name.to_string(),
            hit_count: counts.hits,
            present_count: counts.presents,
        })
    }

    /// Player that caused the event, if any.
    pub fn origin(&self) -> Option<&str> {
        match self {
            GameEvent::Points { player_id, .. } | GameEvent::Win { player_id, .. } => {
                Some(player_id)
            }
            GameEvent::Countdown { .. } | GameEvent::Restart => None,
        }
    }

    /// Whether `player_id` should receive this event.
    ///
    /// Points are not echoed back to their origin; the guesser already has
    /// the result in their own response.
    pub fn is_for(&self, player_id: Option<&str>) -> bool {
        match self {
            GameEvent::Points { player_id: origin, .. } => player_id != Some(origin.as_str()),
            _ => true,
        }
    }
}
