//! Matchmaking: placement, deadline tasks, widening search, retry ticker.
//!
//! All state transitions here run under the core lock. Scheduled callbacks
//! (the one-shot deadline task armed when a competition is seeded, and the
//! retry ticker armed after a missed deadline) re-acquire the same lock on
//! entry and hold a weak engine handle, so they die with the engine and
//! observe the shutdown signal.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::competition::Competition;
use crate::engine::{CoreState, Shared};
use crate::error::{SkirmishError, SkirmishResult};

/// Outcome of one deadline or ticker attempt for a queued player.
pub(crate) enum MatchProgress {
    /// Nothing left to do: the player's competition started, or the player
    /// left the queue. The ticker stops on this.
    Settled,
    /// The player is still queued below the minimum size with no neighbor
    /// competition to merge with.
    Waiting,
}

/// The join algorithm (runs under the core lock).
pub(crate) fn join(shared: &Arc<Shared>, player_id: &str) -> SkirmishResult<Arc<Competition>> {
    if player_id.is_empty() {
        return Err(SkirmishError::PlayerIdEmpty);
    }

    let competition = {
        let mut guard = shared.core.lock();
        let state = &mut *guard;

        let player = state
            .players
            .get(player_id)
            .ok_or(SkirmishError::PlayerNotFound)?;
        let level = player.level();

        // A back-reference to an ended (or already evicted) competition is
        // cleared here; a live one rejects the join.
        if let Some(current) = player.current_competition() {
            match state.catalog.get(&current) {
                Some(c) if c.has_ended(shared.clock.now()) => {
                    debug!(player = player_id, competition = %current, "clearing ended competition");
                    state
                        .players
                        .get_mut(player_id)
                        .expect("player exists")
                        .clear_competition();
                }
                Some(_) => return Err(SkirmishError::PlayerAlreadyInCompetition),
                None => {
                    state
                        .players
                        .get_mut(player_id)
                        .expect("player exists")
                        .clear_competition();
                }
            }
        }

        if let Some(open) = state.open.get(&level).cloned() {
            open.add_player(player_id)?;
            state
                .players
                .get_mut(player_id)
                .expect("player exists")
                .set_competition(open.id());
            if open.is_started() {
                // Filled to capacity: the competition left the waiting pool
                // inside add_player.
                state.open.remove(&level);
            }
            return Ok(open);
        }

        // No open competition at this level: seed one and enqueue the
        // player until it fills or the wait deadline elapses.
        let competition = Arc::new(Competition::new(
            level,
            shared.rules(),
            Arc::clone(&shared.clock),
        ));
        state.catalog.insert(Arc::clone(&competition));
        state.catalog.ensure_capacity(shared.clock.now());
        competition.add_player(player_id)?;
        state
            .players
            .get_mut(player_id)
            .expect("player exists")
            .set_competition(competition.id());
        state.open.insert(level, Arc::clone(&competition));
        competition
    };

    spawn_deadline(shared, player_id.to_owned());
    Ok(competition)
}

/// One-shot deadline task for the seeding player of a new competition.
fn spawn_deadline(shared: &Arc<Shared>, player_id: String) {
    let weak = Arc::downgrade(shared);
    let mut shutdown = shared.shutdown.subscribe();
    let wait = shared.config.match_wait;
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = shutdown.changed() => return,
        }
        let Some(shared) = weak.upgrade() else { return };
        let progress = {
            let mut state = shared.core.lock();
            shared.attempt_match(&mut state, &player_id)
        };
        if matches!(progress, MatchProgress::Waiting) {
            spawn_ticker(&shared, player_id);
        }
    });
}

/// Periodic widening retries after a missed deadline. Stops once the
/// player's competition starts, the player leaves the queue, shutdown is
/// signalled, or the attempt budget is exhausted.
fn spawn_ticker(shared: &Arc<Shared>, player_id: String) {
    let weak = Arc::downgrade(shared);
    let mut shutdown = shared.shutdown.subscribe();
    let period = shared.config.match_retry_interval;
    let limit = shared.config.match_retry_limit;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of a tokio interval completes immediately.
        ticker.tick().await;

        let mut attempts: u32 = 0;
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => return,
            }
            let Some(shared) = weak.upgrade() else { return };
            let progress = {
                let mut state = shared.core.lock();
                shared.attempt_match(&mut state, &player_id)
            };
            if matches!(progress, MatchProgress::Settled) {
                return;
            }
            attempts += 1;
            if attempts >= limit {
                warn!(
                    player = %player_id,
                    attempts,
                    "giving up on widening retries; player stays queued"
                );
                return;
            }
        }
    });
}

impl Shared {
    /// Try to start the player's waiting competition, widening the level
    /// search when it is still below the minimum size. Shared by the
    /// deadline task and every ticker tick.
    pub(crate) fn attempt_match(&self, state: &mut CoreState, player_id: &str) -> MatchProgress {
        let Some(player) = state.players.get(player_id) else {
            return MatchProgress::Settled;
        };
        let level = player.level();
        let Some(current) = player.current_competition() else {
            return MatchProgress::Settled;
        };
        let Some(competition) = state.catalog.get(&current) else {
            // Evicted while waiting for the timer: nothing left to start.
            if let Some(p) = state.players.get_mut(player_id) {
                p.clear_competition();
            }
            return MatchProgress::Settled;
        };

        if competition.is_started() {
            return MatchProgress::Settled;
        }

        if competition.participant_count() >= self.config.min_players_for_competition {
            match competition.start() {
                Ok(()) => {
                    remove_open_entry(&mut state.open, &competition);
                    info!(
                        player = player_id,
                        competition = %competition.id(),
                        "started competition at wait deadline"
                    );
                }
                Err(error) => {
                    error!(
                        %error,
                        competition = %competition.id(),
                        "deadline start failed"
                    );
                }
            }
            return MatchProgress::Settled;
        }

        if self.widen(state, player_id, level, &competition) {
            MatchProgress::Settled
        } else {
            MatchProgress::Waiting
        }
    }

    /// Widening level search: look for a waiting competition at nearby
    /// levels, preferring the higher neighbor, and merge the player into
    /// it. Returns true when a competition started.
    fn widen(
        &self,
        state: &mut CoreState,
        player_id: &str,
        level: u8,
        seeded: &Arc<Competition>,
    ) -> bool {
        let min = i32::from(self.config.min_level);
        let max = i32::from(self.config.max_level);
        let origin = i32::from(level);

        let mut step = 1;
        loop {
            let above = origin + step;
            let below = origin - step;
            if above > max && below < min {
                return false;
            }
            for candidate in [above, below] {
                if candidate < min || candidate > max {
                    continue;
                }
                let candidate = candidate as u8;
                let Some(target) = state.open.get(&candidate).cloned() else {
                    continue;
                };
                // Skip a neighbor the merge could not start.
                if target.participant_count() + 1 < self.config.min_players_for_competition {
                    continue;
                }
                return self.merge_into(state, player_id, level, seeded, candidate, &target);
            }
            step += 1;
        }
    }

    /// Move the queued player out of their seeded competition into the
    /// neighbor-level one, retire both from the open index and start the
    /// merged competition.
    fn merge_into(
        &self,
        state: &mut CoreState,
        player_id: &str,
        level: u8,
        seeded: &Arc<Competition>,
        target_level: u8,
        target: &Arc<Competition>,
    ) -> bool {
        if let Err(error) = seeded.remove_player(player_id) {
            error!(%error, player = player_id, "queued player missing from seeded competition");
            return false;
        }
        if let Err(error) = target.add_player(player_id) {
            error!(%error, player = player_id, competition = %target.id(), "widening merge failed");
            if let Err(restore) = seeded.add_player(player_id) {
                error!(%restore, player = player_id, "could not restore player after failed merge");
            }
            return false;
        }
        state
            .players
            .get_mut(player_id)
            .expect("player exists")
            .set_competition(target.id());

        state.open.remove(&target_level);
        remove_open_entry(&mut state.open, seeded);

        if !target.is_started() {
            if let Err(error) = target.start() {
                error!(%error, competition = %target.id(), "failed to start merged competition");
                return false;
            }
        }
        info!(
            player = player_id,
            from_level = level,
            to_level = target_level,
            competition = %target.id(),
            "matched player across levels"
        );
        true
    }
}

/// Drop a competition's own entry from the open index, if present.
fn remove_open_entry(open: &mut HashMap<u8, Arc<Competition>>, competition: &Arc<Competition>) {
    let level = competition.initial_level();
    if open.get(&level).is_some_and(|c| c.id() == competition.id()) {
        open.remove(&level);
    }
}
