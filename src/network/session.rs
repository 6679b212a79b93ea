//! Game Session
//!
//! Wraps the game engine and scoreboard in locks and owns the broadcast
//! channel plus the win countdown. One session per server process.
//!
//! Locks are held one at a time, except that starting a countdown reads the
//! game while holding the countdown slot.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::game::events::GameEvent;
use crate::game::mode::{GameMode, GameModeKind};
use crate::game::outcome::OutcomeCounts;
use crate::game::scoreboard::{PlayerScore, Scoreboard};
use crate::game::state::GameError;
use crate::network::protocol::GuessResponse;

/// Default countdown budget in seconds.
pub const DEFAULT_COUNTDOWN_SECS: u32 = 10;

/// Default number of scoreboard entries returned.
pub const DEFAULT_SCOREBOARD_LIMIT: usize = 5;

/// Configuration for the game session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Seconds between a win and the automatic restart.
    pub countdown_secs: u32,
    /// `top_scores` limit when the client sends none.
    pub scoreboard_limit: usize,
    /// Broadcast channel capacity. Lagging receivers drop the oldest events.
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            scoreboard_limit: DEFAULT_SCOREBOARD_LIMIT,
            event_capacity: 256,
        }
    }
}

/// Session errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Guess rejected by the engine.
    #[error(transparent)]
    Game(#[from] GameError),

    /// Connection has not joined yet.
    #[error("join before playing")]
    NotJoined,

    /// Player has no scoreboard entry.
    #[error("no score recorded for player {0}")]
    ScoreNotFound(String),
}

/// Snapshot of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownStatus {
    /// Last broadcast value.
    pub seconds_remaining: u32,
    /// A countdown task is running.
    pub active: bool,
}

/// The single countdown slot. At most one task at a time.
#[derive(Default)]
struct CountdownSlot {
    handle: Option<JoinHandle<()>>,
    game_id: Option<Uuid>,
    seconds_remaining: u32,
}

impl CountdownSlot {
    fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn cancel(&mut self) -> bool {
        let was_active = self.is_active();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.game_id = None;
        self.seconds_remaining = 0;
        was_active
    }
}

/// Shared game session.
pub struct GameSession {
    game: Arc<RwLock<GameMode>>,
    scoreboard: Arc<RwLock<Scoreboard>>,
    event_tx: broadcast::Sender<GameEvent>,
    countdown: Arc<Mutex<CountdownSlot>>,
    config: SessionConfig,
}

impl GameSession {
    /// Wrap a game.
    pub fn new(game: GameMode, config: SessionConfig) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_capacity.max(1));

        Self {
            game: Arc::new(RwLock::new(game)),
            scoreboard: Arc::new(RwLock::new(Scoreboard::new())),
            event_tx,
            countdown: Arc::new(Mutex::new(CountdownSlot::default())),
            config,
        }
    }

    /// Subscribe to broadcast events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.event_tx.subscribe()
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Rule set being played.
    pub async fn mode(&self) -> GameModeKind {
        self.game.read().await.kind()
    }

    /// Current game lifetime.
    pub async fn game_id(&self) -> Uuid {
        self.game.read().await.game_id()
    }

    /// Submit a guess.
    ///
    /// Scoreboard updates and broadcasts happen only after the engine has
    /// accepted and recorded the guess.
    #[instrument(skip(self, display_name))]
    pub async fn handle_guess(
        &self,
        player_id: &str,
        display_name: &str,
        word: &str,
    ) -> Result<GuessResponse, SessionError> {
        let (record, status) = {
            let mut game = self.game.write().await;
            let record = game.guess(player_id, word)?;
            let status = game.status(player_id);
            (record, status)
        };

        {
            let mut scoreboard = self.scoreboard.write().await;
            scoreboard.add_round(player_id, display_name);
            if record.is_win {
                scoreboard.add_score(player_id, display_name);
            }
        }

        let counts = OutcomeCounts::of(&record.results);
        if let Some(event) = GameEvent::points(player_id, display_name, counts) {
            self.publish(event);
        }

        if record.is_win {
            let revealed_answer = status.answer.clone().unwrap_or_else(|| record.guess.clone());
            info!(player_id, answer = %revealed_answer, "player won");
            self.publish(GameEvent::Win {
                player_id: player_id.to_string(),
                display_name: display_name.to_string(),
                winning_guess: record.guess.clone(),
                revealed_answer,
            });
            self.start_countdown(status.game_id).await;
        }

        Ok(GuessResponse::for_guess(record, status))
    }

    /// Status for one player.
    pub async fn status(&self, player_id: &str) -> GuessResponse {
        GuessResponse::for_status(self.game.read().await.status(player_id))
    }

    /// Best scores, using the configured limit when none is given.
    pub async fn top_scores(&self, limit: Option<usize>) -> Vec<PlayerScore> {
        let limit = limit.unwrap_or(self.config.scoreboard_limit);
        self.scoreboard.read().await.top_scores(limit)
    }

    /// One player's score.
    pub async fn user_score(&self, player_id: &str) -> Result<PlayerScore, SessionError> {
        self.scoreboard
            .read()
            .await
            .get(player_id)
            .cloned()
            .ok_or_else(|| SessionError::ScoreNotFound(player_id.to_string()))
    }

    /// Administrative restart. Cancels any running countdown first.
    pub async fn restart(&self) -> Uuid {
        if self.countdown.lock().await.cancel() {
            debug!("countdown cancelled by restart");
        }

        let game_id = {
            let mut game = self.game.write().await;
            game.restart_game();
            game.game_id()
        };

        info!(%game_id, "game restarted");
        self.publish(GameEvent::Restart);
        game_id
    }

    /// Countdown snapshot.
    pub async fn countdown(&self) -> CountdownStatus {
        let slot = self.countdown.lock().await;
        CountdownStatus {
            seconds_remaining: slot.seconds_remaining,
            active: slot.is_active(),
        }
    }

    /// Whether a countdown is running.
    pub async fn countdown_active(&self) -> bool {
        self.countdown.lock().await.is_active()
    }

    /// Stop background work.
    pub async fn shutdown(&self) {
        if self.countdown.lock().await.cancel() {
            debug!("countdown cancelled by shutdown");
        }
    }

    fn publish(&self, event: GameEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }

    /// Start the countdown for `game_id`, replacing any earlier one.
    async fn start_countdown(&self, game_id: Uuid) {
        let mut slot = self.countdown.lock().await;

        // Restarted between the win and here; nothing to count down.
        if self.game.read().await.game_id() != game_id {
            return;
        }

        slot.cancel();
        slot.game_id = Some(game_id);
        slot.seconds_remaining = self.config.countdown_secs;

        info!(%game_id, seconds = self.config.countdown_secs, "countdown started");
        slot.handle = Some(tokio::spawn(run_countdown(
            Arc::clone(&self.game),
            self.event_tx.clone(),
            Arc::clone(&self.countdown),
            game_id,
            self.config.countdown_secs,
        )));
    }
}

/// Broadcast `budget, budget-1, .., 0` once a second, then restart the
/// game if it is still the lifetime the countdown was started for.
async fn run_countdown(
    game: Arc<RwLock<GameMode>>,
    event_tx: broadcast::Sender<GameEvent>,
    slot: Arc<Mutex<CountdownSlot>>,
    game_id: Uuid,
    budget: u32,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    let mut remaining = budget;

    loop {
        interval.tick().await;
        slot.lock().await.seconds_remaining = remaining;
        let _ = event_tx.send(GameEvent::Countdown { seconds_remaining: remaining });
        if remaining == 0 {
            break;
        }
        remaining -= 1;
    }

    let restarted = {
        let mut game = game.write().await;
        if game.game_id() == game_id {
            game.restart_game();
            Some(game.game_id())
        } else {
            None
        }
    };

    match restarted {
        Some(new_id) => {
            info!(old = %game_id, new = %new_id, "countdown restarted game");
            let _ = event_tx.send(GameEvent::Restart);
        }
        None => debug!(%game_id, "stale countdown skipped restart"),
    }

    let mut slot = slot.lock().await;
    if slot.game_id == Some(game_id) {
        // Our own handle; dropping it detaches
        slot.handle = None;
        slot.game_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::DeterministicRng;
    use crate::game::standard::StandardGame;
    use crate::game::state::GameConfig;
    use tokio::sync::broadcast::error::TryRecvError;

    fn session() -> GameSession {
        let config = GameConfig {
            word_list: vec!["APPLE".into(), "GRAPE".into(), "DRUNK".into()],
            max_rounds: 6,
        };
        let mut game = StandardGame::new(&config, Box::new(DeterministicRng::new(7))).unwrap();
        game.force_answer("APPLE").unwrap();
        GameSession::new(GameMode::Standard(game), SessionConfig::default())
    }

    #[tokio::test]
    async fn test_guess_updates_scoreboard_and_broadcasts_points() {
        let session = session();
        let mut rx = session.subscribe();

        let response = session.handle_guess("p1", "Ann", "grape").await.unwrap();
        assert_eq!(response.guess, "GRAPE");
        assert_eq!(response.current_round, 2);
        assert!(!response.game_over);

        match rx.try_recv().unwrap() {
            GameEvent::Points { player_id, hit_count, present_count, .. } => {
                assert_eq!(player_id, "p1");
                assert_eq!(hit_count, 1);
                assert_eq!(present_count, 2);
            }
            other => panic!("unexpected event {other:?}"),
        }

        // Nothing revealed, nothing broadcast
        session.handle_guess("p1", "Ann", "DRUNK").await.unwrap();
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

        let score = session.user_score("p1").await.unwrap();
        assert_eq!(score.rounds_played, 2);
        assert_eq!(score.score, 0);
    }

    #[tokio::test]
    async fn test_rejected_guess_has_no_side_effects() {
        let session = session();
        let mut rx = session.subscribe();

        let err = session.handle_guess("p1", "Ann", "MANGO").await.unwrap_err();
        assert_eq!(err, SessionError::Game(GameError::NotInWordList));
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(
            session.user_score("p1").await,
            Err(SessionError::ScoreNotFound("p1".into()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_win_counts_down_then_restarts() {
        let session = session();
        let mut rx = session.subscribe();
        let first_game = session.game_id().await;

        let response = session.handle_guess("p1", "Ann", "APPLE").await.unwrap();
        assert!(response.win && response.game_over);
        assert_eq!(response.answer.as_deref(), Some("APPLE"));
        assert!(session.countdown_active().await);

        assert!(matches!(rx.recv().await.unwrap(), GameEvent::Points { .. }));
        match rx.recv().await.unwrap() {
            GameEvent::Win { winning_guess, revealed_answer, .. } => {
                assert_eq!(winning_guess, "APPLE");
                assert_eq!(revealed_answer, "APPLE");
            }
            other => panic!("unexpected event {other:?}"),
        }

        // Guesses are rejected while counting down
        assert_eq!(
            session.handle_guess("p2", "Bob", "GRAPE").await.unwrap_err(),
            SessionError::Game(GameError::GameAlreadyOver)
        );

        for expected in (0..=DEFAULT_COUNTDOWN_SECS).rev() {
            assert_eq!(
                rx.recv().await.unwrap(),
                GameEvent::Countdown { seconds_remaining: expected }
            );
        }
        assert_eq!(rx.recv().await.unwrap(), GameEvent::Restart);

        assert_ne!(session.game_id().await, first_game);
        let status = session.status("p1").await;
        assert!(!status.game_over);
        assert_eq!(status.current_round, 1);
        assert!(status.answer.is_none());

        // Scoreboard survives restarts
        assert_eq!(session.user_score("p1").await.unwrap().score, 1);

        tokio::task::yield_now().await;
        assert!(!session.countdown_active().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_admin_restart_cancels_countdown() {
        let session = session();
        let mut rx = session.subscribe();

        session.handle_guess("p1", "Ann", "APPLE").await.unwrap();
        // Points, Win, Countdown 10, 9, 8
        for _ in 0..5 {
            rx.recv().await.unwrap();
        }
        assert_eq!(session.countdown().await.seconds_remaining, 8);

        let new_game = session.restart().await;
        assert_eq!(rx.recv().await.unwrap(), GameEvent::Restart);
        assert!(!session.countdown_active().await);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(session.game_id().await, new_game);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_simultaneous_winners_score_once() {
        let session = Arc::new(session());
        let mut rx = session.subscribe();

        let guesses: Vec<_> = (0..8)
            .map(|i| {
                let session = Arc::clone(&session);
                tokio::spawn(async move {
                    let player = format!("p{i}");
                    session.handle_guess(&player, &player, "APPLE").await
                })
            })
            .collect();

        let mut accepted = 0;
        for guess in guesses {
            match guess.await.unwrap() {
                Ok(response) => {
                    assert!(response.win);
                    accepted += 1;
                }
                Err(err) => assert_eq!(err, SessionError::Game(GameError::GameAlreadyOver)),
            }
        }
        assert_eq!(accepted, 1);

        let mut wins = 0;
        loop {
            match rx.try_recv() {
                Ok(GameEvent::Win { .. }) => wins += 1,
                Ok(_) => {}
                Err(_) => break,
            }
        }
        assert_eq!(wins, 1);

        let total: u32 = session.top_scores(Some(100)).await.iter().map(|s| s.score).sum();
        assert_eq!(total, 1);
        assert!(session.countdown_active().await);

        session.shutdown().await;
        assert!(!session.countdown_active().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_countdown_replaces_first() {
        let session = session();
        let mut rx = session.subscribe();
        let game_id = session.game_id().await;

        session.start_countdown(game_id).await;
        for expected in [10, 9, 8] {
            assert_eq!(rx.recv().await.unwrap(), GameEvent::Countdown { seconds_remaining: expected });
        }

        session.start_countdown(game_id).await;
        assert_eq!(session.countdown().await.seconds_remaining, DEFAULT_COUNTDOWN_SECS);

        // One fresh run from the top, one restart
        for expected in (0..=DEFAULT_COUNTDOWN_SECS).rev() {
            assert_eq!(
                rx.recv().await.unwrap(),
                GameEvent::Countdown { seconds_remaining: expected }
            );
        }
        assert_eq!(rx.recv().await.unwrap(), GameEvent::Restart);
        assert_ne!(session.game_id().await, game_id);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        assert!(!session.countdown_active().await);
    }

    #[tokio::test]
    async fn test_top_scores_default_limit() {
        let session = session();
        session.handle_guess("p1", "Ann", "GRAPE").await.unwrap();
        session.handle_guess("p2", "Bob", "GRAPE").await.unwrap();

        let scores = session.top_scores(None).await;
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].display_name, "Ann");
        assert_eq!(session.top_scores(Some(1)).await.len(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_without_countdown() {
        let session = session();
        session.shutdown().await;
        assert_eq!(
            session.countdown().await,
            CountdownStatus { seconds_remaining: 0, active: false }
        );
    }
}
