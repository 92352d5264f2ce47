//! Pre-configured circuit breaker settings for common dependency classes.
//!
//! Grounded on the teacher crate's `riptide_reliability::circuit::presets`
//! module: named presets plus a builder for bespoke configurations.

use crate::circuit_breaker::CircuitBreakerConfig;
use std::time::Duration;

/// Preset tuned for the remote cache tier (§4.6 default values).
pub fn remote_cache() -> CircuitBreakerConfig {
    CircuitBreakerConfig {
        failure_threshold: 5,
        reset_timeout: Duration::from_millis(30_000),
        half_open_max_attempts: 1,
    }
}

/// Preset for outbound HTTP fetches (FetchClient, webhook delivery):
/// slightly more tolerant since transient network blips are common.
pub fn http_external() -> CircuitBreakerConfig {
    CircuitBreakerConfig {
        failure_threshold: 5,
        reset_timeout: Duration::from_secs(30),
        half_open_max_attempts: 3,
    }
}

/// Aggressive preset for critical paths requiring fast failure detection.
pub fn aggressive() -> CircuitBreakerConfig {
    CircuitBreakerConfig {
        failure_threshold: 2,
        reset_timeout: Duration::from_secs(5),
        half_open_max_attempts: 1,
    }
}

/// Builder for bespoke configurations.
#[derive(Debug, Clone)]
pub struct CircuitConfigBuilder {
    failure_threshold: u32,
    reset_timeout: Duration,
    half_open_max_attempts: u32,
}

impl Default for CircuitConfigBuilder {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout: Duration::from_secs(30),
            half_open_max_attempts: 1,
        }
    }
}

impl CircuitConfigBuilder {
    pub fn failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    pub fn reset_timeout(mut self, timeout: Duration) -> Self {
        self.reset_timeout = timeout;
        self
    }

    pub fn half_open_max_attempts(mut self, attempts: u32) -> Self {
        self.half_open_max_attempts = attempts;
        self
    }

    pub fn build(self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.failure_threshold,
            reset_timeout: self.reset_timeout,
            half_open_max_attempts: self.half_open_max_attempts,
        }
    }
}

pub fn custom() -> CircuitConfigBuilder {
    CircuitConfigBuilder::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_cache_preset_matches_spec_defaults() {
        let cfg = remote_cache();
        assert_eq!(cfg.failure_threshold, 5);
        assert_eq!(cfg.reset_timeout, Duration::from_millis(30_000));
        assert_eq!(cfg.half_open_max_attempts, 1);
    }

    #[test]
    fn builder_overrides_defaults() {
        let cfg = custom()
            .failure_threshold(7)
            .reset_timeout(Duration::from_secs(45))
            .half_open_max_attempts(4)
            .build();
        assert_eq!(cfg.failure_threshold, 7);
        assert_eq!(cfg.reset_timeout, Duration::from_secs(45));
        assert_eq!(cfg.half_open_max_attempts, 4);
    }
}
