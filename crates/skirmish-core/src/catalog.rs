//! Process-wide competition catalog with a bounded-memory eviction policy.
//!
//! The catalog keeps every known competition in an id-keyed map plus an
//! insertion-ordered deque. When the map outgrows the memory budget, ended
//! competitions are evicted from the head of the deque in creation order;
//! a head that is still waiting or running blocks further eviction, so an
//! active competition is never removed even if the budget is exceeded.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use skirmish_types::CompetitionId;
use tracing::debug;

use crate::competition::Competition;

#[derive(Debug)]
pub struct Catalog {
    budget: usize,
    competitions: HashMap<CompetitionId, Arc<Competition>>,
    ordered: VecDeque<Arc<Competition>>,
}

impl Catalog {
    pub fn new(budget: usize) -> Self {
        Self {
            budget,
            competitions: HashMap::new(),
            ordered: VecDeque::new(),
        }
    }

    /// Register a newly created competition. Called exactly once per
    /// competition, under the core lock.
    pub fn insert(&mut self, competition: Arc<Competition>) {
        self.competitions
            .insert(competition.id(), Arc::clone(&competition));
        self.ordered.push_back(competition);
    }

    /// Evict ended competitions from the head of the creation order until
    /// the budget holds or the head is still waiting/running. Returns the
    /// number of evicted competitions.
    pub fn ensure_capacity(&mut self, now: DateTime<Utc>) -> usize {
        let mut evicted = 0;
        while self.competitions.len() > self.budget {
            match self.ordered.front() {
                Some(head) if head.has_ended(now) => {
                    let head = self.ordered.pop_front().expect("head exists");
                    self.competitions.remove(&head.id());
                    debug!(competition = %head.id(), "evicted ended competition");
                    evicted += 1;
                }
                _ => break,
            }
        }
        evicted
    }

    pub fn get(&self, id: &CompetitionId) -> Option<Arc<Competition>> {
        self.competitions.get(id).cloned()
    }

    pub fn contains(&self, id: &CompetitionId) -> bool {
        self.competitions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.competitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.competitions.is_empty()
    }

    /// Ids of all retained competitions in creation order.
    pub fn ids(&self) -> Vec<CompetitionId> {
        self.ordered.iter().map(|c| c.id()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::competition::CompetitionRules;
    use crate::config::EngineConfig;
    use std::time::Duration;

    struct Fixture {
        clock: Arc<ManualClock>,
        catalog: Catalog,
    }

    impl Fixture {
        fn new(budget: usize) -> Self {
            Self {
                clock: Arc::new(ManualClock::from_system()),
                catalog: Catalog::new(budget),
            }
        }

        // A competition started two minutes ago that ended one minute ago.
        fn insert_ended(&mut self) -> Arc<Competition> {
            let competition = self.insert_running();
            self.clock.advance(Duration::from_secs(3700));
            competition
        }

        fn insert_running(&mut self) -> Arc<Competition> {
            let competition = self.insert_waiting();
            competition.add_player("a").unwrap();
            competition.add_player("b").unwrap();
            competition.start().unwrap();
            competition
        }

        fn insert_waiting(&mut self) -> Arc<Competition> {
            let rules = CompetitionRules::from(&EngineConfig::default());
            let competition = Arc::new(Competition::new(
                1,
                rules,
                self.clock.clone() as Arc<dyn Clock>,
            ));
            self.catalog.insert(Arc::clone(&competition));
            competition
        }
    }

    #[test]
    fn test_removes_old_ended_competitions() {
        let mut fx = Fixture::new(2);
        for _ in 0..3 {
            fx.insert_ended();
        }
        let kept_a = fx.insert_ended();
        let kept_b = fx.insert_waiting();

        fx.catalog.ensure_capacity(fx.clock.now());

        assert_eq!(fx.catalog.len(), 2);
        assert_eq!(fx.catalog.ids(), vec![kept_a.id(), kept_b.id()]);
        assert!(fx.catalog.contains(&kept_a.id()));
        assert!(fx.catalog.contains(&kept_b.id()));
    }

    #[test]
    fn test_does_not_remove_ongoing_competitions() {
        let mut fx = Fixture::new(1);
        let ended = fx.insert_ended();
        let ongoing_a = fx.insert_running();
        let ongoing_b = fx.insert_running();

        fx.catalog.ensure_capacity(fx.clock.now());

        assert!(!fx.catalog.contains(&ended.id()));
        assert_eq!(fx.catalog.ids(), vec![ongoing_a.id(), ongoing_b.id()]);
    }

    #[test]
    fn test_waiting_head_blocks_eviction_of_newer_ended() {
        let mut fx = Fixture::new(1);
        let barrier = fx.insert_waiting();
        fx.insert_ended();

        // The waiting head blocks eviction entirely, even over budget.
        let evicted = fx.catalog.ensure_capacity(fx.clock.now());
        assert_eq!(evicted, 0);
        assert_eq!(fx.catalog.len(), 2);
        assert!(fx.catalog.contains(&barrier.id()));
    }

    #[test]
    fn test_no_removal_below_budget() {
        let mut fx = Fixture::new(5);
        for _ in 0..3 {
            fx.insert_ended();
        }

        let evicted = fx.catalog.ensure_capacity(fx.clock.now());
        assert_eq!(evicted, 0);
        assert_eq!(fx.catalog.len(), 3);
    }

    #[test]
    fn test_handles_empty_catalog() {
        let mut fx = Fixture::new(2);
        assert_eq!(fx.catalog.ensure_capacity(fx.clock.now()), 0);
        assert!(fx.catalog.is_empty());
    }

    #[test]
    fn test_waiting_competitions_are_never_evicted() {
        let mut fx = Fixture::new(1);
        let waiting = fx.insert_waiting();
        fx.insert_waiting();
        fx.insert_waiting();

        fx.catalog.ensure_capacity(fx.clock.now());

        assert_eq!(fx.catalog.len(), 3);
        assert!(fx.catalog.contains(&waiting.id()));
    }
}
