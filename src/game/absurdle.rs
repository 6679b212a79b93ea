//! Absurdle Game Mode
//!
//! Adversarial host: there is no fixed answer. Each player carries their own
//! candidate set, and every guess is answered with the outcome that reveals
//! the least while staying consistent with everything shown so far.
//!
//! ## Elimination
//!
//! For the player's alive candidates `C` and guess `g`:
//!
//! 1. Score `g` against every `c` in `C` and bucket by Hit count.
//! 2. Keep the lowest-Hit bucket. A singleton bucket is adopted directly.
//! 3. Inside it, candidates with zero Presents win outright.
//! 4. Otherwise keep the lowest-Present bucket.
//! 5. If several remain they cannot all survive one emitted outcome, so one
//!    is drawn from the injected [`RandomSource`].
//!
//! Once `C` is a singleton the guess is scored against it directly.

use std::collections::BTreeMap;
use tracing::debug;

use crate::core::rng::RandomSource;
use crate::core::words::WordList;
use crate::game::ledger::PlayerRoundLedger;
use crate::game::outcome::{score, LetterOutcome, OutcomeCounts};
use crate::game::state::{GameConfig, GameError, GameState, GuessRecord, PlayerStatus};

// =============================================================================
// CANDIDATE SET
// =============================================================================

/// Words still consistent with every outcome shown to one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSet {
    /// Word-list indices, in word-list order.
    alive: Vec<usize>,
    /// Outcome of the last accepted guess.
    last_outcome: Option<Vec<LetterOutcome>>,
    /// Guess that collapsed the set to a single word.
    matched_guess: Option<String>,
}

impl CandidateSet {
    /// Every word in the list is alive.
    pub fn full(word_list: &WordList) -> Self {
        Self {
            alive: word_list.all_indices(),
            last_outcome: None,
            matched_guess: None,
        }
    }

    /// Alive word-list indices.
    pub fn alive(&self) -> &[usize] {
        &self.alive
    }

    /// Number of alive candidates.
    pub fn len(&self) -> usize {
        self.alive.len()
    }

    /// True if the set was emptied.
    pub fn is_empty(&self) -> bool {
        self.alive.is_empty()
    }

    /// Outcome of the last accepted guess.
    pub fn last_outcome(&self) -> Option<&[LetterOutcome]> {
        self.last_outcome.as_deref()
    }

    /// Guess that narrowed the set to one word.
    pub fn matched_guess(&self) -> Option<&str> {
        self.matched_guess.as_deref()
    }

    fn narrow(&mut self, survivors: Vec<usize>, outcome: &[LetterOutcome], guess: &str) {
        debug_assert!(survivors.len() <= self.alive.len());
        if survivors.len() == 1 && self.matched_guess.is_none() {
            self.matched_guess = Some(guess.to_string());
        }
        self.alive = survivors;
        self.last_outcome = Some(outcome.to_vec());
    }

    fn reset(&mut self, word_list: &WordList) {
        *self = Self::full(word_list);
    }
}

// =============================================================================
// ELIMINATION
// =============================================================================

/// Result of one elimination step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Elimination {
    /// Outcome shown to the player.
    pub outcome: Vec<LetterOutcome>,
    /// Candidates that stay alive, in word-list order.
    pub survivors: Vec<usize>,
}

#[derive(Debug, Clone)]
struct Scored {
    index: usize,
    outcome: Vec<LetterOutcome>,
    counts: OutcomeCounts,
}

/// Pick the least informative outcome for `guess` over `alive`.
///
/// Pure apart from the tie-break draw.
pub fn eliminate(
    word_list: &WordList,
    alive: &[usize],
    guess: &str,
    rng: &mut dyn RandomSource,
) -> Result<Elimination, GameError> {
    if let [only] = alive {
        let answer = word_list.get(*only).ok_or(GameError::NoCandidatesLeft)?;
        return Ok(Elimination {
            outcome: score(guess, answer),
            survivors: vec![*only],
        });
    }

    let mut by_hits: BTreeMap<usize, Vec<Scored>> = BTreeMap::new();
    for &index in alive {
        let word = word_list.get(index).ok_or(GameError::NoCandidatesLeft)?;
        let outcome = score(guess, word);
        let counts = OutcomeCounts::of(&outcome);
        by_hits.entry(counts.hits).or_default().push(Scored { index, outcome, counts });
    }

    let fewest_hits = by_hits
        .into_iter()
        .next()
        .map(|(_, bucket)| bucket)
        .ok_or(GameError::NoCandidatesLeft)?;

    let chosen = if fewest_hits.len() == 1 {
        fewest_hits
    } else if fewest_hits.iter().any(|s| s.counts.presents == 0) {
        // Zero-Present candidates may still differ in Hit positions; only
        // those matching the adopted outcome stay consistent with it.
        let mut quiet = fewest_hits.into_iter().filter(|s| s.counts.presents == 0);
        let head = quiet.next().ok_or(GameError::NoCandidatesLeft)?;
        let mut same: Vec<Scored> = quiet.filter(|s| s.outcome == head.outcome).collect();
        same.insert(0, head);
        same
    } else {
        let mut by_presents: BTreeMap<usize, Vec<Scored>> = BTreeMap::new();
        for scored in fewest_hits {
            by_presents.entry(scored.counts.presents).or_default().push(scored);
        }
        let mut fewest_presents = by_presents
            .into_iter()
            .next()
            .map(|(_, bucket)| bucket)
            .ok_or(GameError::NoCandidatesLeft)?;

        if fewest_presents.len() > 1 {
            let pick = rng.next_index(fewest_presents.len());
            vec![fewest_presents.swap_remove(pick)]
        } else {
            fewest_presents
        }
    };

    let outcome = chosen
        .first()
        .map(|s| s.outcome.clone())
        .ok_or(GameError::NoCandidatesLeft)?;

    Ok(Elimination {
        outcome,
        survivors: chosen.into_iter().map(|s| s.index).collect(),
    })
}

// =============================================================================
// GAME
// =============================================================================

#[derive(Debug, Clone)]
struct AbsurdlePlayer {
    ledger: PlayerRoundLedger,
    candidates: CandidateSet,
}

/// Adversarial Wordle with per-player candidate sets.
pub struct AbsurdleGame {
    state: GameState,
    players: BTreeMap<String, AbsurdlePlayer>,
    rng: Box<dyn RandomSource>,
}

impl AbsurdleGame {
    /// Validate the word list.
    pub fn new(config: &GameConfig, rng: Box<dyn RandomSource>) -> Result<Self, GameError> {
        Ok(Self {
            state: GameState::new(config)?,
            players: BTreeMap::new(),
            rng,
        })
    }

    /// Answer a guess adversarially for `player_id`.
    pub fn guess(&mut self, player_id: &str, word: &str) -> Result<GuessRecord, GameError> {
        let (normalized, _) = self.state.validate_guess(word)?;

        let full;
        let alive: &[usize] = match self.players.get(player_id) {
            Some(player) => {
                if !player.ledger.has_rounds_left() {
                    return Err(GameError::NoRoundsLeft);
                }
                player.candidates.alive()
            }
            None => {
                full = self.state.word_list.all_indices();
                &full
            }
        };

        if alive.is_empty() {
            return Err(GameError::NoCandidatesLeft);
        }

        let elimination = eliminate(&self.state.word_list, alive, &normalized, self.rng.as_mut())?;
        let record = GuessRecord::new(normalized, elimination.outcome);

        let max_rounds = self.state.max_rounds;
        let word_list = &self.state.word_list;
        let player = self
            .players
            .entry(player_id.to_string())
            .or_insert_with(|| AbsurdlePlayer {
                ledger: PlayerRoundLedger::new(max_rounds),
                candidates: CandidateSet::full(word_list),
            });

        player.candidates.narrow(elimination.survivors, &record.results, &record.guess);
        player.ledger.add_guess(record.clone());

        if record.is_win {
            let answer = record.guess.clone();
            debug!(player_id, answer = %answer, "absurdle game won");
            self.state.handle_win(player_id, &answer);
        }

        Ok(record)
    }

    /// Clear every ledger and reset every candidate set to the full list.
    pub fn restart_game(&mut self) {
        let word_list = &self.state.word_list;
        for player in self.players.values_mut() {
            player.ledger.reset();
            player.candidates.reset(word_list);
        }
        self.state.reset();
        debug!(game_id = %self.state.game_id, "absurdle game restarted");
    }

    /// Alive candidate words for a player, in word-list order.
    pub fn candidates(&self, player_id: &str) -> Option<Vec<&str>> {
        let player = self.players.get(player_id)?;
        Some(
            player
                .candidates
                .alive()
                .iter()
                .filter_map(|i| self.state.word_list.get(*i))
                .collect(),
        )
    }

    /// A player's candidate set.
    pub fn candidate_set(&self, player_id: &str) -> Option<&CandidateSet> {
        self.players.get(player_id).map(|p| &p.candidates)
    }

    /// A player's ledger.
    pub fn ledger(&self, player_id: &str) -> Option<&PlayerRoundLedger> {
        self.players.get(player_id).map(|p| &p.ledger)
    }

    /// Status for one player.
    pub fn status(&self, player_id: &str) -> PlayerStatus {
        self.state.status_for(self.ledger(player_id))
    }

    /// Shared state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[cfg(test)]
    fn set_candidates(&mut self, player_id: &str, alive: Vec<usize>) {
        let max_rounds = self.state.max_rounds;
        let word_list = self.state.word_list.clone();
        let player = self
            .players
            .entry(player_id.to_string())
            .or_insert_with(|| AbsurdlePlayer {
                ledger: PlayerRoundLedger::new(max_rounds),
                candidates: CandidateSet::full(&word_list),
            });
        player.candidates.alive = alive;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::DeterministicRng;
    use crate::game::outcome::LetterOutcome::{Hit, Miss, Present};
    use proptest::prelude::*;

    /// Replays a fixed list of picks.
    struct ScriptedRng(Vec<usize>);

    impl RandomSource for ScriptedRng {
        fn next_index(&mut self, len: usize) -> usize {
            if self.0.is_empty() {
                0
            } else {
                self.0.remove(0) % len.max(1)
            }
        }
    }

    const EIGHT: [&str; 8] = [
        "HELLO", "WORLD", "QUITE", "FANCY", "FRESH", "PANIC", "CRAZY", "BUGGY",
    ];

    fn game_with(words: &[&str], rng: Box<dyn RandomSource>) -> AbsurdleGame {
        let config = GameConfig {
            word_list: words.iter().map(|w| w.to_string()).collect(),
            max_rounds: 6,
        };
        AbsurdleGame::new(&config, rng).unwrap()
    }

    fn game(words: &[&str]) -> AbsurdleGame {
        game_with(words, Box::new(DeterministicRng::new(7)))
    }

    #[test]
    fn test_losing_sequence() {
        let mut g = game(&EIGHT);
        let p = "user1";

        let r1 = g.guess(p, "HELLO").unwrap();
        assert_eq!(r1.results, vec![Miss; 5]);
        assert_eq!(g.candidates(p).unwrap(), vec!["FANCY", "PANIC", "CRAZY", "BUGGY"]);

        let r2 = g.guess(p, "WORLD").unwrap();
        assert_eq!(r2.results, vec![Miss; 5]);
        assert_eq!(g.candidates(p).unwrap(), vec!["FANCY", "PANIC", "BUGGY"]);

        let r3 = g.guess(p, "FRESH").unwrap();
        assert_eq!(r3.results, vec![Miss; 5]);
        assert_eq!(g.candidates(p).unwrap(), vec!["PANIC", "BUGGY"]);

        let r4 = g.guess(p, "CRAZY").unwrap();
        assert_eq!(r4.results, vec![Present, Miss, Present, Miss, Miss]);
        assert_eq!(g.candidates(p).unwrap(), vec!["PANIC"]);
        assert_eq!(g.candidate_set(p).unwrap().matched_guess(), Some("CRAZY"));

        let r5 = g.guess(p, "QUITE").unwrap();
        assert_eq!(r5.results, vec![Miss, Miss, Present, Miss, Miss]);
        assert_eq!(g.candidates(p).unwrap(), vec!["PANIC"]);

        let r6 = g.guess(p, "FANCY").unwrap();
        assert_eq!(r6.results, vec![Miss, Hit, Hit, Present, Miss]);
        assert_eq!(g.candidates(p).unwrap(), vec!["PANIC"]);

        for r in [&r1, &r2, &r3, &r4, &r5, &r6] {
            assert!(!r.is_win);
        }
        assert!(g.ledger(p).unwrap().is_lost());
        assert_eq!(g.guess(p, "PANIC"), Err(GameError::NoRoundsLeft));
        assert!(!g.state().is_game_over());
    }

    #[test]
    fn test_winning_sequence_with_tie_break() {
        let mut words = EIGHT.to_vec();
        words.push("SCARE");
        // The only draw picks WORLD out of the [HELLO, WORLD] tie
        let mut g = game_with(&words, Box::new(ScriptedRng(vec![1])));
        let p = "user1";

        let r1 = g.guess(p, "BUGGY").unwrap();
        assert_eq!(r1.results, vec![Miss; 5]);
        assert_eq!(
            g.candidates(p).unwrap(),
            vec!["HELLO", "WORLD", "FRESH", "PANIC", "SCARE"]
        );

        let r2 = g.guess(p, "SCARE").unwrap();
        assert_eq!(r2.results, vec![Miss, Miss, Miss, Present, Miss]);
        assert_eq!(g.candidates(p).unwrap(), vec!["WORLD"]);

        let r3 = g.guess(p, "WORLD").unwrap();
        assert_eq!(r3.results, vec![Hit; 5]);
        assert!(r3.is_win);
        assert!(g.state().is_game_over());
        assert_eq!(g.state().first_winner_id(), Some(p));
        assert_eq!(g.status(p).answer.as_deref(), Some("WORLD"));
    }

    #[test]
    fn test_forced_singleton_wins() {
        let mut g = game(&["APPLE", "BANJO", "CRANE"]);
        g.set_candidates("winner", vec![0]);
        let record = g.guess("winner", "APPLE").unwrap();
        assert!(record.is_win);
        assert!(g.ledger("winner").unwrap().is_won());
        assert_eq!(g.state().first_winner_id(), Some("winner"));
    }

    #[test]
    fn test_empty_candidates_is_internal_error() {
        let mut g = game(&["APPLE", "BANJO", "CRANE"]);
        g.set_candidates("broken", vec![]);
        let err = g.guess("broken", "APPLE").unwrap_err();
        assert_eq!(err, GameError::NoCandidatesLeft);
        assert!(err.is_internal());
        assert_eq!(g.ledger("broken").unwrap().guess_count(), 0);
    }

    #[test]
    fn test_failed_guess_does_not_narrow() {
        let mut g = game(&EIGHT);
        g.guess("p", "HELLO").unwrap();
        let before = g.candidate_set("p").unwrap().clone();

        assert_eq!(g.guess("p", "ZEBRA"), Err(GameError::NotInWordList));
        assert!(matches!(g.guess("p", "HI"), Err(GameError::InvalidFormat { .. })));

        assert_eq!(g.candidate_set("p").unwrap(), &before);
        assert_eq!(g.ledger("p").unwrap().guess_count(), 1);
    }

    #[test]
    fn test_zero_present_keeps_consistent_outcome_only() {
        // Against guess ABCD: ABXX and XXCD both score 2 Hits, 0 Presents,
        // but in different positions. Only the first stays alive.
        let list = WordList::new(["ABXX", "XXCD", "ABCD"]).unwrap();
        let mut rng = DeterministicRng::new(1);
        let result = eliminate(&list, &[0, 1, 2], "ABCD", &mut rng).unwrap();
        assert_eq!(result.outcome, vec![Hit, Hit, Miss, Miss]);
        assert_eq!(result.survivors, vec![0]);
    }

    #[test]
    fn test_players_are_independent() {
        let mut g = game(&EIGHT);
        g.guess("a", "HELLO").unwrap();
        assert_eq!(g.candidate_set("a").unwrap().len(), 4);
        assert!(g.candidate_set("b").is_none());
        g.guess("b", "CRAZY").unwrap();
        assert_eq!(g.ledger("a").unwrap().guess_count(), 1);
        assert_eq!(g.ledger("b").unwrap().guess_count(), 1);
    }

    #[test]
    fn test_restart_resets_candidates() {
        let mut g = game(&EIGHT);
        g.guess("a", "HELLO").unwrap();
        g.guess("a", "WORLD").unwrap();
        g.set_candidates("b", vec![5]);
        g.guess("b", "PANIC").unwrap();
        assert!(g.state().is_game_over());

        g.restart_game();

        assert!(!g.state().is_game_over());
        assert!(g.state().first_winner_id().is_none());
        for p in ["a", "b"] {
            assert_eq!(g.candidates(p).unwrap(), EIGHT.to_vec());
            assert_eq!(g.ledger(p).unwrap().guess_count(), 0);
            assert!(g.candidate_set(p).unwrap().last_outcome().is_none());
        }
    }

    proptest! {
        #[test]
        fn prop_candidates_shrink_and_stay_consistent(
            seed in any::<u64>(),
            picks in proptest::collection::vec(0usize..9, 1..=6),
        ) {
            let mut words = EIGHT.to_vec();
            words.push("SCARE");
            let mut g = game_with(&words, Box::new(DeterministicRng::new(seed)));
            let mut previous = words.len();

            for pick in picks {
                if g.state().is_game_over() {
                    break;
                }
                g.guess("p", words[pick]).unwrap();
                let alive = g.candidates("p").unwrap();
                prop_assert!(!alive.is_empty());
                prop_assert!(alive.len() <= previous);
                previous = alive.len();

                // Every shown outcome still holds for every alive candidate
                for record in g.ledger("p").unwrap().records() {
                    for candidate in &alive {
                        prop_assert_eq!(&score(&record.guess, candidate), &record.results);
                    }
                }
            }
        }
    }
}
