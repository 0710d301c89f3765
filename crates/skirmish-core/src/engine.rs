//! The engine façade.
//!
//! [`Engine`] bundles the player registry, competition catalog and
//! matchmaker indices behind one process-wide core lock and exposes the
//! four public operations the HTTP shell couples to: join, score
//! submission and the two leaderboard reads. It is a cheap-to-clone handle
//! over shared state, constructed once at startup and threaded through the
//! shell.
//!
//! Deadline and retry tasks are spawned on the ambient Tokio runtime, so
//! `join` must be called from within one.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use skirmish_types::CompetitionId;
use tokio::sync::watch;
use tracing::info;

use crate::catalog::Catalog;
use crate::clock::{Clock, SystemClock};
use crate::competition::{Competition, CompetitionRules};
use crate::config::EngineConfig;
use crate::error::{SkirmishError, SkirmishResult};
use crate::player::{NewPlayer, PlayerRegistry};

/// State guarded by the core lock: the matchmaker's per-level open index,
/// the catalog membership and every player back-reference.
pub(crate) struct CoreState {
    pub(crate) players: PlayerRegistry,
    pub(crate) catalog: Catalog,
    pub(crate) open: HashMap<u8, Arc<Competition>>,
}

pub(crate) struct Shared {
    pub(crate) config: EngineConfig,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) core: Mutex<CoreState>,
    pub(crate) shutdown: watch::Sender<bool>,
}

impl Shared {
    pub(crate) fn rules(&self) -> CompetitionRules {
        CompetitionRules::from(&self.config)
    }
}

/// The matchmaking and leaderboard engine.
#[derive(Clone)]
pub struct Engine {
    pub(crate) shared: Arc<Shared>,
}

impl Engine {
    /// Create an engine running on the system wall clock.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create an engine with an injected time source.
    pub fn with_clock(config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        let (shutdown, _) = watch::channel(false);
        let core = CoreState {
            players: PlayerRegistry::new(config.min_level, config.max_level),
            catalog: Catalog::new(config.max_competitions_in_memory),
            open: HashMap::new(),
        };
        Self {
            shared: Arc::new(Shared {
                config,
                clock,
                core: Mutex::new(core),
                shutdown,
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    /// Match the player into an eligible open competition, or seed a new
    /// one and arm its deadline task. Returns the competition the player is
    /// now bound to, which may still be waiting.
    pub fn join(&self, player_id: &str) -> SkirmishResult<Arc<Competition>> {
        crate::matchmaker::join(&self.shared, player_id)
    }

    /// Credit non-negative points to the player's current competition.
    pub fn submit_score(&self, player_id: &str, points: i64) -> SkirmishResult<()> {
        if player_id.is_empty() {
            return Err(SkirmishError::PlayerIdEmpty);
        }
        if points < 0 {
            return Err(SkirmishError::PointsNegative);
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
            // A back-reference whose competition was evicted points at an
            // ended competition.
            state
                .catalog
                .get(&id)
                .ok_or(SkirmishError::CompetitionEnded)?
        };
        if competition.has_ended(self.shared.clock.now()) {
            return Err(SkirmishError::CompetitionEnded);
        }
        competition.add_score(player_id, points as u64)
    }

    /// Bulk-register players. Duplicate ids overwrite.
    pub fn add_players(&self, records: Vec<NewPlayer>) -> SkirmishResult<()> {
        self.shared.core.lock().players.add_players(records)
    }

    /// Load the built-in demo player fixture.
    pub fn seed_demo_players(&self) -> SkirmishResult<()> {
        self.shared.core.lock().players.seed_demo_players()
    }

    /// Stop all live deadline and retry tasks.
    pub fn shutdown(&self) {
        info!("engine shutting down, stopping scheduled matchmaking tasks");
        let _ = self.shared.shutdown.send(true);
    }

    // Inspection accessors, used by operational handlers and tests.

    pub fn competition(&self, id: &CompetitionId) -> Option<Arc<Competition>> {
        self.shared.core.lock().catalog.get(id)
    }

    /// The waiting competition new joiners at this level attach to, if any.
    pub fn open_competition(&self, level: u8) -> Option<Arc<Competition>> {
        self.shared.core.lock().open.get(&level).cloned()
    }

    pub fn open_competition_count(&self) -> usize {
        self.shared.core.lock().open.len()
    }

    pub fn competition_count(&self) -> usize {
        self.shared.core.lock().catalog.len()
    }

    /// Ids of all retained competitions in creation order.
    pub fn competition_ids(&self) -> Vec<CompetitionId> {
        self.shared.core.lock().catalog.ids()
    }

    pub fn registered_player_count(&self) -> usize {
        self.shared.core.lock().players.len()
    }

    /// The competition a player is currently bound to, if any.
    pub fn player_competition(&self, player_id: &str) -> Option<CompetitionId> {
        self.shared
            .core
            .lock()
            .players
            .get(player_id)
            .and_then(|p| p.current_competition())
    }
}
