//! The competition aggregate.
//!
//! A competition owns its participant set and score ledger behind a
//! per-competition lock, so scoring in unrelated competitions never
//! serializes. Lifecycle transitions (adding players, starting) are only
//! driven by the matchmaker under the engine's core lock; the lock order is
//! always core lock first, competition lock second.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;
use parking_lot::Mutex;
use serde::Serialize;
use skirmish_types::CompetitionId;
use tracing::debug;

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::error::{SkirmishError, SkirmishResult};

pub const COMPETITIONS_CREATED_METRIC: &str = "leaderboard_competitions_created_total";
pub const COMPETITIONS_STARTED_METRIC: &str = "leaderboard_competitions_started_total";

/// Capacity and duration rules a competition enforces, copied from the
/// engine configuration at creation time.
#[derive(Debug, Clone, Copy)]
pub struct CompetitionRules {
    pub max_players: usize,
    pub min_players: usize,
    pub duration: chrono::Duration,
}

impl From<&EngineConfig> for CompetitionRules {
    fn from(config: &EngineConfig) -> Self {
        Self {
            max_players: config.max_players_for_competition,
            min_players: config.min_players_for_competition,
            duration: config.competition_duration_chrono(),
        }
    }
}

/// A player's entry in a competition's ledger.
#[derive(Debug, Clone)]
pub struct Participant {
    player_id: String,
    score: u64,
}

impl Participant {
    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn score(&self) -> u64 {
        self.score
    }
}

/// One row of the sorted leaderboard view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreEntry {
    pub player_id: String,
    pub score: u64,
}

/// Lifecycle timestamps captured in one read.
#[derive(Debug, Clone, Copy)]
pub struct Lifecycle {
    pub started_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct Board {
    started_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
    participants: HashMap<String, Participant>,
    // Materialized at start, kept sorted by (score desc, player_id asc).
    standings: Option<Vec<ScoreEntry>>,
}

/// A short-lived competition among a bounded set of players.
pub struct Competition {
    id: CompetitionId,
    initial_level: u8,
    created_at: DateTime<Utc>,
    rules: CompetitionRules,
    clock: Arc<dyn Clock>,
    board: Mutex<Board>,
}

impl std::fmt::Debug for Competition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Competition")
            .field("id", &self.id)
            .field("initial_level", &self.initial_level)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

impl Competition {
    pub fn new(initial_level: u8, rules: CompetitionRules, clock: Arc<dyn Clock>) -> Self {
        let competition = Self {
            id: CompetitionId::new(),
            initial_level,
            created_at: clock.now(),
            rules,
            clock,
            board: Mutex::new(Board::default()),
        };
        counter!(COMPETITIONS_CREATED_METRIC).increment(1);
        debug!(competition = %competition.id, level = initial_level, "seeded competition");
        competition
    }

    pub fn id(&self) -> CompetitionId {
        self.id
    }

    /// The skill level this competition was seeded at; the key under which
    /// the matchmaker indexes it while it waits.
    pub fn initial_level(&self) -> u8 {
        self.initial_level
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.board.lock().started_at
    }

    pub fn ends_at(&self) -> Option<DateTime<Utc>> {
        self.board.lock().ends_at
    }

    pub fn lifecycle(&self) -> Lifecycle {
        let board = self.board.lock();
        Lifecycle {
            started_at: board.started_at,
            ends_at: board.ends_at,
        }
    }

    pub fn is_started(&self) -> bool {
        self.board.lock().started_at.is_some()
    }

    /// Whether the scoring window has closed.
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        matches!(self.board.lock().ends_at, Some(ends_at) if ends_at < now)
    }

    pub fn participant_count(&self) -> usize {
        self.board.lock().participants.len()
    }

    pub fn has_participant(&self, player_id: &str) -> bool {
        self.board.lock().participants.contains_key(player_id)
    }

    /// A participant's accumulated score.
    pub fn score_of(&self, player_id: &str) -> Option<u64> {
        self.board.lock().participants.get(player_id).map(Participant::score)
    }

    /// Defensive copy of the sorted leaderboard view; `None` while waiting.
    pub fn standings(&self) -> Option<Vec<ScoreEntry>> {
        self.board.lock().standings.clone()
    }

    /// Consistent copy of lifecycle timestamps and the leaderboard view,
    /// taken under one acquisition of the score lock.
    pub fn snapshot(&self) -> (Lifecycle, Vec<ScoreEntry>) {
        let board = self.board.lock();
        (
            Lifecycle {
                started_at: board.started_at,
                ends_at: board.ends_at,
            },
            board.standings.clone().unwrap_or_default(),
        )
    }

    /// Add a player to a waiting competition. Filling the last seat starts
    /// the competition immediately.
    pub fn add_player(&self, player_id: &str) -> SkirmishResult<()> {
        if player_id.is_empty() {
            return Err(SkirmishError::PlayerIdEmpty);
        }
        let mut board = self.board.lock();
        if board.participants.len() >= self.rules.max_players {
            return Err(SkirmishError::CompetitionFull);
        }
        if board.started_at.is_some() {
            return Err(SkirmishError::CompetitionStarted);
        }
        if board.participants.contains_key(player_id) {
            return Err(SkirmishError::PlayerAlreadyInCompetition);
        }
        board.participants.insert(
            player_id.to_owned(),
            Participant {
                player_id: player_id.to_owned(),
                score: 0,
            },
        );

        if board.participants.len() == self.rules.max_players {
            self.start_locked(&mut board)?;
        }
        Ok(())
    }

    /// Remove a player from a waiting competition. Used when the matchmaker
    /// moves a queued player into a neighbor-level competition.
    pub fn remove_player(&self, player_id: &str) -> SkirmishResult<()> {
        let mut board = self.board.lock();
        if board.started_at.is_some() {
            return Err(SkirmishError::CompetitionStarted);
        }
        board
            .participants
            .remove(player_id)
            .map(|_| ())
            .ok_or(SkirmishError::PlayerNotFound)
    }

    /// Transition from waiting to started, materializing the leaderboard
    /// view and fixing the scoring window.
    pub fn start(&self) -> SkirmishResult<()> {
        let mut board = self.board.lock();
        self.start_locked(&mut board)
    }

    fn start_locked(&self, board: &mut Board) -> SkirmishResult<()> {
        if board.started_at.is_some() {
            return Err(SkirmishError::CompetitionStarted);
        }
        if board.participants.len() < self.rules.min_players {
            return Err(SkirmishError::NotEnoughPlayers);
        }

        let mut standings: Vec<ScoreEntry> = board
            .participants
            .values()
            .map(|p| ScoreEntry {
                player_id: p.player_id.clone(),
                score: p.score,
            })
            .collect();
        sort_standings(&mut standings);
        board.standings = Some(standings);

        let started_at = self.clock.now();
        board.started_at = Some(started_at);
        board.ends_at = Some(started_at + self.rules.duration);

        counter!(COMPETITIONS_STARTED_METRIC).increment(1);
        debug!(
            competition = %self.id,
            players = board.participants.len(),
            "competition started"
        );
        Ok(())
    }

    /// Credit points to a participant and re-sort the leaderboard view.
    pub fn add_score(&self, player_id: &str, points: u64) -> SkirmishResult<()> {
        if player_id.is_empty() {
            return Err(SkirmishError::PlayerIdEmpty);
        }
        let mut board = self.board.lock();
        if board.started_at.is_none() {
            return Err(SkirmishError::CompetitionNotStarted);
        }
        let participant = board
            .participants
            .get_mut(player_id)
            .ok_or(SkirmishError::PlayerNotFound)?;
        participant.score += points;
        let score = participant.score;

        let standings = board
            .standings
            .as_mut()
            .expect("standings exist for a started competition");
        if let Some(entry) = standings.iter_mut().find(|e| e.player_id == player_id) {
            entry.score = score;
        }
        sort_standings(standings);
        Ok(())
    }
}

fn sort_standings(standings: &mut [ScoreEntry]) {
    standings.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.player_id.cmp(&b.player_id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::time::Duration;

    fn rules() -> CompetitionRules {
        CompetitionRules::from(&EngineConfig::default())
    }

    fn competition_with_clock() -> (Arc<ManualClock>, Competition) {
        let clock = Arc::new(ManualClock::from_system());
        let competition = Competition::new(2, rules(), clock.clone() as Arc<dyn Clock>);
        (clock, competition)
    }

    fn competition() -> Competition {
        competition_with_clock().1
    }

    #[test]
    fn test_new_competition_is_waiting() {
        let competition = competition();
        assert!(competition.started_at().is_none());
        assert!(competition.ends_at().is_none());
        assert_eq!(competition.participant_count(), 0);
        assert!(competition.standings().is_none());
    }

    #[test]
    fn test_add_player() {
        let competition = competition();
        competition.add_player("bob").unwrap();

        assert_eq!(competition.participant_count(), 1);
        assert!(competition.has_participant("bob"));
        assert_eq!(competition.score_of("bob"), Some(0));
        assert!(!competition.is_started());
    }

    #[test]
    fn test_add_player_rejects_duplicates() {
        let competition = competition();
        competition.add_player("bob").unwrap();

        assert_eq!(
            competition.add_player("bob"),
            Err(SkirmishError::PlayerAlreadyInCompetition)
        );
    }

    #[test]
    fn test_add_player_rejects_empty_id() {
        let competition = competition();
        assert_eq!(competition.add_player(""), Err(SkirmishError::PlayerIdEmpty));
    }

    #[test]
    fn test_filling_last_seat_starts_immediately() {
        let (clock, competition) = competition_with_clock();
        for i in 0..10 {
            competition.add_player(&format!("player_{i}")).unwrap();
        }

        assert!(competition.is_started());
        let lifecycle = competition.lifecycle();
        assert_eq!(lifecycle.started_at, Some(clock.now()));
        assert_eq!(
            lifecycle.ends_at,
            Some(clock.now() + chrono::Duration::hours(1))
        );
        assert_eq!(
            competition.add_player("late"),
            Err(SkirmishError::CompetitionFull)
        );
    }

    #[test]
    fn test_start_requires_minimum_players() {
        let competition = competition();
        competition.add_player("bob").unwrap();

        assert_eq!(competition.start(), Err(SkirmishError::NotEnoughPlayers));
        assert!(!competition.is_started());
    }

    #[test]
    fn test_double_start_is_rejected_and_state_unchanged() {
        let competition = competition();
        competition.add_player("bob").unwrap();
        competition.add_player("alice").unwrap();
        competition.start().unwrap();

        let before = competition.lifecycle();
        assert_eq!(competition.start(), Err(SkirmishError::CompetitionStarted));
        let after = competition.lifecycle();
        assert_eq!(before.started_at, after.started_at);
        assert_eq!(before.ends_at, after.ends_at);
    }

    #[test]
    fn test_add_player_after_start_is_rejected() {
        let competition = competition();
        competition.add_player("bob").unwrap();
        competition.add_player("alice").unwrap();
        competition.start().unwrap();

        assert_eq!(
            competition.add_player("carol"),
            Err(SkirmishError::CompetitionStarted)
        );
    }

    #[test]
    fn test_start_materializes_standings() {
        let competition = competition();
        competition.add_player("bob").unwrap();
        competition.add_player("alice").unwrap();
        competition.start().unwrap();

        let standings = competition.standings().unwrap();
        assert_eq!(standings.len(), 2);
        assert!(standings.iter().all(|e| e.score == 0));
    }

    #[test]
    fn test_add_score_before_start_fails() {
        let competition = competition();
        competition.add_player("bob").unwrap();

        assert_eq!(
            competition.add_score("bob", 5),
            Err(SkirmishError::CompetitionNotStarted)
        );
    }

    #[test]
    fn test_add_score_unknown_participant_fails() {
        let competition = competition();
        competition.add_player("bob").unwrap();
        competition.add_player("alice").unwrap();
        competition.start().unwrap();

        assert_eq!(
            competition.add_score("mallory", 5),
            Err(SkirmishError::PlayerNotFound)
        );
    }

    #[test]
    fn test_scores_accumulate() {
        let competition = competition();
        competition.add_player("bob").unwrap();
        competition.add_player("alice").unwrap();
        competition.start().unwrap();

        competition.add_score("bob", 10).unwrap();
        competition.add_score("bob", 7).unwrap();

        assert_eq!(competition.score_of("bob"), Some(17));
    }

    #[test]
    fn test_standings_order_and_tie_break() {
        let competition = competition();
        for id in ["a", "b", "c"] {
            competition.add_player(id).unwrap();
        }
        competition.start().unwrap();

        competition.add_score("a", 10).unwrap();
        competition.add_score("b", 20).unwrap();
        competition.add_score("c", 30).unwrap();

        let standings = competition.standings().unwrap();
        let ids: Vec<&str> = standings.iter().map(|e| e.player_id.as_str()).collect();
        assert_eq!(ids, ["c", "b", "a"]);

        // "a" catches up to 30: the tie breaks by id ascending.
        competition.add_score("a", 20).unwrap();
        let standings = competition.standings().unwrap();
        let ids: Vec<&str> = standings.iter().map(|e| e.player_id.as_str()).collect();
        assert_eq!(ids, ["a", "c", "b"]);
    }

    #[test]
    fn test_has_ended_tracks_clock() {
        let (clock, competition) = competition_with_clock();
        competition.add_player("bob").unwrap();
        competition.add_player("alice").unwrap();
        competition.start().unwrap();

        assert!(!competition.has_ended(clock.now()));
        clock.advance(Duration::from_secs(3601));
        assert!(competition.has_ended(clock.now()));
    }

    #[test]
    fn test_remove_player_from_waiting() {
        let competition = competition();
        competition.add_player("bob").unwrap();

        competition.remove_player("bob").unwrap();
        assert_eq!(competition.participant_count(), 0);
        assert_eq!(
            competition.remove_player("bob"),
            Err(SkirmishError::PlayerNotFound)
        );
    }

    #[test]
    fn test_remove_player_after_start_is_rejected() {
        let competition = competition();
        competition.add_player("bob").unwrap();
        competition.add_player("alice").unwrap();
        competition.start().unwrap();

        assert_eq!(
            competition.remove_player("bob"),
            Err(SkirmishError::CompetitionStarted)
        );
    }
}
