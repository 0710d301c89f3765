//! # Skirmish Core
//!
//! In-memory real-time matchmaking and leaderboard engine for short-lived,
//! skill-segregated player competitions.
//!
//! A player asks to join; the engine either attaches them to the open
//! competition at their skill level, or seeds a new one and enqueues them
//! until it fills or a wait deadline elapses. A missed deadline widens the
//! level search to nearby levels on a retry ticker. Started competitions
//! accept scores for a bounded duration and maintain a stably-ordered
//! leaderboard; ended competitions are evicted from memory in creation
//! order, never while still active.
//!
//! # Example
//!
//! ```ignore
//! use skirmish_core::{Engine, EngineConfig, NewPlayer};
//!
//! let engine = Engine::new(EngineConfig::default());
//! engine.add_players(vec![
//!     NewPlayer::new("alice", "US", 3),
//!     NewPlayer::new("bob", "GB", 3),
//! ])?;
//!
//! let competition = engine.join("alice")?;
//! engine.join("bob")?;
//!
//! // Once the competition starts (capacity or deadline):
//! engine.submit_score("alice", 50)?;
//! let view = engine.leaderboard(&competition.id().to_string())?;
//! ```

pub mod catalog;
pub mod clock;
pub mod competition;
pub mod config;
pub mod demo;
pub mod engine;
pub mod error;
pub mod leaderboard;
mod matchmaker;
pub mod player;

pub use clock::{Clock, ManualClock, SystemClock};
pub use competition::{Competition, Participant, ScoreEntry};
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{SkirmishError, SkirmishResult};
pub use leaderboard::LeaderboardView;
pub use player::NewPlayer;
pub use skirmish_types::CompetitionId;
