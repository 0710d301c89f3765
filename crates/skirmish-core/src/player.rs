//! Player records and the process-wide player registry.

use std::collections::HashMap;

use skirmish_types::CompetitionId;
use tracing::info;

use crate::demo;
use crate::error::{SkirmishError, SkirmishResult};

/// A registered player.
///
/// The identity fields are immutable after registration; only the
/// competition back-reference changes, and only under the engine's core
/// lock. The back-reference holds a [`CompetitionId`] rather than an owning
/// handle, so resolving it is a catalog lookup.
#[derive(Debug, Clone)]
pub struct Player {
    id: String,
    level: u8,
    country_code: String,
    current_competition: Option<CompetitionId>,
}

impl Player {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// The competition this player is currently bound to, if any.
    pub fn current_competition(&self) -> Option<CompetitionId> {
        self.current_competition
    }

    pub(crate) fn set_competition(&mut self, id: CompetitionId) {
        self.current_competition = Some(id);
    }

    pub(crate) fn clear_competition(&mut self) {
        self.current_competition = None;
    }
}

/// A registration record accepted by [`PlayerRegistry::add_players`].
#[derive(Debug, Clone)]
pub struct NewPlayer {
    pub id: String,
    pub country_code: String,
    pub level: u8,
}

impl NewPlayer {
    pub fn new(id: impl Into<String>, country_code: impl Into<String>, level: u8) -> Self {
        Self {
            id: id.into(),
            country_code: country_code.into(),
            level,
        }
    }
}

/// Process-wide mapping from player id to player record.
///
/// Not synchronized by itself; every mutation observed by the matchmaker
/// happens under the engine's core lock.
#[derive(Debug)]
pub struct PlayerRegistry {
    players: HashMap<String, Player>,
    min_level: u8,
    max_level: u8,
}

impl PlayerRegistry {
    pub fn new(min_level: u8, max_level: u8) -> Self {
        Self {
            players: HashMap::new(),
            min_level,
            max_level,
        }
    }

    /// Bulk-insert registration records. Duplicate ids overwrite the
    /// existing record; a record with an out-of-range level fails whole.
    pub fn add_players(&mut self, records: Vec<NewPlayer>) -> SkirmishResult<()> {
        for record in records {
            if record.level < self.min_level || record.level > self.max_level {
                return Err(SkirmishError::LevelOutOfRange {
                    id: record.id,
                    level: record.level,
                    min: self.min_level,
                    max: self.max_level,
                });
            }
            self.players.insert(
                record.id.clone(),
                Player {
                    id: record.id,
                    level: record.level,
                    country_code: record.country_code,
                    current_competition: None,
                },
            );
        }
        Ok(())
    }

    /// Load the built-in demo fixture. Fails when the configured level
    /// bounds exclude a fixture level.
    pub fn seed_demo_players(&mut self) -> SkirmishResult<()> {
        let records = demo::demo_players();
        let count = records.len();
        self.add_players(records)?;
        info!(count, "seeded demo players");
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> PlayerRegistry {
        PlayerRegistry::new(1, 10)
    }

    #[test]
    fn test_add_and_get() {
        let mut reg = registry();
        reg.add_players(vec![NewPlayer::new("bob", "GB", 2)]).unwrap();

        let bob = reg.get("bob").unwrap();
        assert_eq!(bob.id(), "bob");
        assert_eq!(bob.level(), 2);
        assert_eq!(bob.country_code(), "GB");
        assert!(bob.current_competition().is_none());
    }

    #[test]
    fn test_duplicate_id_overwrites() {
        let mut reg = registry();
        reg.add_players(vec![NewPlayer::new("bob", "GB", 2)]).unwrap();
        reg.add_players(vec![NewPlayer::new("bob", "US", 5)]).unwrap();

        assert_eq!(reg.len(), 1);
        let bob = reg.get("bob").unwrap();
        assert_eq!(bob.level(), 5);
        assert_eq!(bob.country_code(), "US");
    }

    #[test]
    fn test_out_of_range_level_fails_record() {
        let mut reg = registry();
        let err = reg
            .add_players(vec![NewPlayer::new("zed", "DE", 11)])
            .unwrap_err();

        assert!(matches!(err, SkirmishError::LevelOutOfRange { level: 11, .. }));
        assert!(reg.get("zed").is_none());
    }

    #[test]
    fn test_seed_demo_players() {
        let mut reg = registry();
        reg.seed_demo_players().unwrap();

        assert_eq!(reg.len(), 103);
        assert_eq!(reg.get("alice_smith").unwrap().level(), 7);
        assert_eq!(reg.get("zachary_reed").unwrap().country_code(), "US");
    }
}
