//! Scoreboard
//!
//! Process-lifetime win and round tallies. Never reset by a game restart.

use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap};

use serde::{Serialize, Deserialize};

/// Aggregate score for one player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScore {
    /// Stable player identifier.
    pub player_id: String,
    /// Most recent display name seen for this player.
    pub display_name: String,
    /// Number of wins.
    pub score: u32,
    /// Number of accepted guesses.
    pub rounds_played: u32,
    /// `round(100 * score / rounds_played)`, 0 with no rounds.
    pub accuracy: u32,
}

impl PlayerScore {
    fn new(player_id: &str, display_name: &str) -> Self {
        Self {
            player_id: player_id.to_string(),
            display_name: display_name.to_string(),
            score: 0,
            rounds_played: 0,
            accuracy: 0,
        }
    }

    fn recompute_accuracy(&mut self) {
        self.accuracy = if self.rounds_played == 0 {
            0
        } else {
            ((100.0 * self.score as f64) / self.rounds_played as f64).round() as u32
        };
    }

    /// Ranking order: score desc, accuracy desc, display name asc.
    /// `Ordering::Less` means `self` ranks higher.
    fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| other.accuracy.cmp(&self.accuracy))
            .then_with(|| self.display_name.cmp(&other.display_name))
            .then_with(|| self.player_id.cmp(&other.player_id))
    }
}

/// Heap entry ordered by rank. Greater means better ranked.
struct Ranked<'a>(&'a PlayerScore);

impl PartialEq for Ranked<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked<'_> {}

impl PartialOrd for Ranked<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.rank_cmp(self.0)
    }
}

/// All player scores, keyed by player id.
#[derive(Debug, Default, Clone)]
pub struct Scoreboard {
    scores: BTreeMap<String, PlayerScore>,
}

impl Scoreboard {
    /// Empty scoreboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for a player, created with a zero score on first sight.
    pub fn get_or_init(&mut self, player_id: &str, display_name: &str) -> &PlayerScore {
        self.entry(player_id, display_name)
    }

    /// Drop every entry.
    pub fn reset(&mut self) {
        self.scores.clear();
    }

    fn entry(&mut self, player_id: &str, display_name: &str) -> &mut PlayerScore {
        let entry = self
            .scores
            .entry(player_id.to_string())
            .or_insert_with(|| PlayerScore::new(player_id, display_name));
        if entry.display_name != display_name {
            entry.display_name = display_name.to_string();
        }
        entry
    }

    /// Count one accepted guess.
    pub fn add_round(&mut self, player_id: &str, display_name: &str) {
        let entry = self.entry(player_id, display_name);
        entry.rounds_played += 1;
        entry.recompute_accuracy();
    }

    /// Count one win.
    pub fn add_score(&mut self, player_id: &str, display_name: &str) {
        let entry = self.entry(player_id, display_name);
        entry.score += 1;
        entry.recompute_accuracy();
    }

    /// Score for one player.
    pub fn get(&self, player_id: &str) -> Option<&PlayerScore> {
        self.scores.get(player_id)
    }

    /// Number of tracked players.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// No players tracked yet.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Up to `limit` best entries, best first.
    ///
    /// Bounded min-heap: the worst kept entry sits on top and is evicted
    /// whenever a better one arrives.
    pub fn top_scores(&self, limit: usize) -> Vec<PlayerScore> {
        if limit == 0 {
            return Vec::new();
        }

        let mut heap: BinaryHeap<Reverse<Ranked<'_>>> = BinaryHeap::with_capacity(limit + 1);
        for score in self.scores.values() {
            heap.push(Reverse(Ranked(score)));
            if heap.len() > limit {
                heap.pop();
            }
        }

        heap.into_sorted_vec()
            .into_iter()
            .map(|Reverse(Ranked(score))| score.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_scores(entries: &[(&str, u32, u32)]) -> Scoreboard {
        let mut board = Scoreboard::new();
        for (name, wins, rounds) in entries {
            for _ in 0..*rounds {
                board.add_round(name, name);
            }
            for _ in 0..*wins {
                board.add_score(name, name);
            }
        }
        board
    }

    #[test]
    fn test_get_or_init_creates_once() {
        let mut board = Scoreboard::new();
        let fresh = board.get_or_init("p1", "Ann").clone();
        assert_eq!(fresh.score, 0);
        assert_eq!(fresh.rounds_played, 0);
        assert_eq!(fresh.accuracy, 0);

        board.get_or_init("p1", "Ann");
        assert_eq!(board.len(), 1);

        board.add_round("p1", "Ann");
        board.add_score("p1", "Ann");
        let existing = board.get_or_init("p1", "Ann");
        assert_eq!(existing.score, 1);
        assert_eq!(existing.rounds_played, 1);
        assert_eq!(existing.accuracy, 100);
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_reset_clears_board() {
        let mut board = with_scores(&[("A", 2, 3), ("B", 1, 4)]);
        assert_eq!(board.len(), 2);

        board.reset();
        assert!(board.is_empty());
        assert!(board.get("A").is_none());
        assert!(board.top_scores(5).is_empty());
    }

    #[test]
    fn test_accuracy() {
        let mut board = Scoreboard::new();
        board.add_score("p1", "Ann");
        assert_eq!(board.get("p1").unwrap().accuracy, 0);

        board.add_round("p1", "Ann");
        board.add_round("p1", "Ann");
        board.add_round("p1", "Ann");
        let s = board.get("p1").unwrap();
        assert_eq!(s.rounds_played, 3);
        assert_eq!(s.score, 1);
        assert_eq!(s.accuracy, 33);

        board.add_score("p1", "Ann");
        assert_eq!(board.get("p1").unwrap().accuracy, 67);
    }

    #[test]
    fn test_score_tie_broken_by_accuracy() {
        // A: 3 wins at 90%, B: 3 wins at 95%, C: 1 win at 100%
        let mut board = Scoreboard::new();
        board.scores.insert("A".into(), PlayerScore {
            player_id: "A".into(), display_name: "A".into(), score: 3, rounds_played: 4, accuracy: 90,
        });
        board.scores.insert("B".into(), PlayerScore {
            player_id: "B".into(), display_name: "B".into(), score: 3, rounds_played: 4, accuracy: 95,
        });
        board.scores.insert("C".into(), PlayerScore {
            player_id: "C".into(), display_name: "C".into(), score: 1, rounds_played: 1, accuracy: 100,
        });

        let top: Vec<_> = board.top_scores(2).into_iter().map(|s| s.player_id).collect();
        assert_eq!(top, vec!["B", "A"]);
    }

    #[test]
    fn test_name_breaks_full_ties() {
        let board = with_scores(&[("zed", 1, 2), ("amy", 1, 2), ("max", 1, 2)]);
        let names: Vec<_> = board.top_scores(10).into_iter().map(|s| s.display_name).collect();
        assert_eq!(names, vec!["amy", "max", "zed"]);
    }

    #[test]
    fn test_limit_bounds() {
        let board = with_scores(&[("a", 2, 2), ("b", 1, 2), ("c", 0, 2)]);
        assert!(board.top_scores(0).is_empty());
        assert_eq!(board.top_scores(1)[0].player_id, "a");
        assert_eq!(board.top_scores(50).len(), 3);
        assert!(Scoreboard::new().top_scores(5).is_empty());
    }

    #[test]
    fn test_display_name_follows_latest() {
        let mut board = Scoreboard::new();
        board.add_round("p1", "Ann");
        board.add_round("p1", "Annie");
        assert_eq!(board.get("p1").unwrap().display_name, "Annie");
        assert_eq!(board.len(), 1);
    }
}
