//! Engine tunables.

use std::time::Duration;

/// Configuration for the matchmaking and competition engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How long a newly seeded competition waits before the deadline task
    /// tries to start it (possibly widening the level search).
    pub match_wait: Duration,
    /// Period of the widening retry ticker armed after a missed deadline.
    pub match_retry_interval: Duration,
    /// Maximum number of widening retries before the ticker gives up.
    pub match_retry_limit: u32,
    /// How long a competition accepts scores once started.
    pub competition_duration: Duration,
    /// Memory budget: ended competitions are evicted beyond this count.
    pub max_competitions_in_memory: usize,
    /// A competition starts immediately when it reaches this many players.
    pub max_players_for_competition: usize,
    /// A competition may not start with fewer players than this.
    pub min_players_for_competition: usize,
    /// Lowest valid player skill level.
    pub min_level: u8,
    /// Highest valid player skill level.
    pub max_level: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            match_wait: Duration::from_secs(30),
            match_retry_interval: Duration::from_secs(1),
            match_retry_limit: 300,
            competition_duration: Duration::from_secs(60 * 60),
            max_competitions_in_memory: 100,
            max_players_for_competition: 10,
            min_players_for_competition: 2,
            min_level: 1,
            max_level: 10,
        }
    }
}

impl EngineConfig {
    /// Check the configuration for values that cannot work together.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_level > self.max_level {
            return Err(format!(
                "min_level {} exceeds max_level {}",
                self.min_level, self.max_level
            ));
        }
        if self.min_players_for_competition < 1 {
            return Err("min_players_for_competition must be at least 1".into());
        }
        if self.max_players_for_competition < self.min_players_for_competition {
            return Err(format!(
                "max_players_for_competition {} is below min_players_for_competition {}",
                self.max_players_for_competition, self.min_players_for_competition
            ));
        }
        if self.max_competitions_in_memory == 0 {
            return Err("max_competitions_in_memory must be at least 1".into());
        }
        if self.match_retry_interval.is_zero() {
            return Err("match_retry_interval must be non-zero".into());
        }
        Ok(())
    }

    /// Competition duration as a chrono duration for timestamp arithmetic.
    pub(crate) fn competition_duration_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.competition_duration)
            .expect("competition duration out of range")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_service_contract() {
        let config = EngineConfig::default();
        assert_eq!(config.match_wait, Duration::from_secs(30));
        assert_eq!(config.match_retry_interval, Duration::from_secs(1));
        assert_eq!(config.competition_duration, Duration::from_secs(3600));
        assert_eq!(config.max_competitions_in_memory, 100);
        assert_eq!(config.max_players_for_competition, 10);
        assert_eq!(config.min_players_for_competition, 2);
        assert_eq!(config.min_level, 1);
        assert_eq!(config.max_level, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_levels() {
        let config = EngineConfig {
            min_level: 5,
            max_level: 2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_capacity_below_minimum() {
        let config = EngineConfig {
            max_players_for_competition: 1,
            min_players_for_competition: 2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
