//! Error taxonomy of the engine.
//!
//! The set is closed: every failure a public operation can report is one of
//! these kinds, and the HTTP shell maps them to status codes without
//! inventing new ones at the boundary.

use thiserror::Error;

/// Errors reported by the engine's public operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkirmishError {
    // Input validation
    #[error("player ID cannot be empty")]
    PlayerIdEmpty,

    #[error("leaderboard ID cannot be empty")]
    LeaderboardIdEmpty,

    #[error("score must be a non-negative integer")]
    PointsNegative,

    // Lookup
    #[error("player not found")]
    PlayerNotFound,

    #[error("competition not found")]
    CompetitionNotFound,

    // State conflict
    #[error("player is already in a competition")]
    PlayerAlreadyInCompetition,

    #[error("competition has already started, cannot add players")]
    CompetitionStarted,

    #[error("competition has not started yet, cannot add score for player")]
    CompetitionNotStarted,

    #[error("competition has ended, cannot add score for player")]
    CompetitionEnded,

    #[error("competition is full, cannot add more players")]
    CompetitionFull,

    #[error("competition has less than the minimum number of players")]
    NotEnoughPlayers,

    #[error("player is not in a competition, cannot add score")]
    PlayerNotInCompetition,

    // Bootstrap registration
    #[error("player {id} has level {level} outside [{min}, {max}]")]
    LevelOutOfRange { id: String, level: u8, min: u8, max: u8 },
}

/// Result type for engine operations.
pub type SkirmishResult<T> = Result<T, SkirmishError>;
