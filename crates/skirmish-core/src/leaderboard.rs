//! Read-side leaderboard queries.

use chrono::{DateTime, Utc};
use serde::Serialize;
use skirmish_types::CompetitionId;

use crate::competition::{Competition, ScoreEntry};
use crate::engine::Engine;
use crate::error::{SkirmishError, SkirmishResult};

/// Projection of a competition's state for clients.
///
/// `ends_at` is null and `leaderboard` empty while the competition is
/// still waiting.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardView {
    pub leaderboard_id: CompetitionId,
    pub ends_at: Option<DateTime<Utc>>,
    pub leaderboard: Vec<ScoreEntry>,
}

fn view_of(competition: &Competition) -> LeaderboardView {
    let (lifecycle, leaderboard) = competition.snapshot();
    LeaderboardView {
        leaderboard_id: competition.id(),
        ends_at: lifecycle.ends_at,
        leaderboard,
    }
}

impl Engine {
    /// Leaderboard of a competition by its public id.
    pub fn leaderboard(&self, leaderboard_id: &str) -> SkirmishResult<LeaderboardView> {
        if leaderboard_id.is_empty() {
            return Err(SkirmishError::LeaderboardIdEmpty);
        }
        let id: CompetitionId = leaderboard_id
            .parse()
            .map_err(|_| SkirmishError::CompetitionNotFound)?;
        let competition = self
            .shared
            .core
            .lock()
            .catalog
            .get(&id)
            .ok_or(SkirmishError::CompetitionNotFound)?;
        Ok(view_of(&competition))
    }

    /// Leaderboard of the player's current (or last) competition.
    ///
    /// Returns `Ok(None)` while the player is queued in a competition that
    /// has not started yet; the HTTP shell renders that as an empty 200.
    pub fn player_leaderboard(&self, player_id: &str) -> SkirmishResult<Option<LeaderboardView>> {
        if player_id.is_empty() {
            return Err(SkirmishError::PlayerIdEmpty);
        }
        let competition = {
            let state = self.shared.core.lock();
            let player = state
                .players
                .get(player_id)
                .ok_or(SkirmishError::PlayerNotFound)?;
            let id = player
                .current_competition()
                .ok_or(SkirmishError::PlayerNotInCompetition)?;
            state
                .catalog
                .get(&id)
                .ok_or(SkirmishError::PlayerNotInCompetition)?
        };

        let (lifecycle, leaderboard) = competition.snapshot();
        if lifecycle.started_at.is_none() {
            return Ok(None);
        }
        Ok(Some(LeaderboardView {
            leaderboard_id: competition.id(),
            ends_at: lifecycle.ends_at,
            leaderboard,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_serializes_with_fixed_field_names() {
        let view = LeaderboardView {
            leaderboard_id: CompetitionId::new(),
            ends_at: None,
            leaderboard: vec![ScoreEntry {
                player_id: "bob".into(),
                score: 12,
            }],
        };

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("leaderboard_id").is_some());
        assert!(json.get("ends_at").is_some());
        assert_eq!(json["ends_at"], serde_json::Value::Null);
        assert_eq!(json["leaderboard"][0]["player_id"], "bob");
        assert_eq!(json["leaderboard"][0]["score"], 12);
    }
}
