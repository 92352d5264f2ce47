//! Service-wide tunables, loaded from the environment with the defaults
//! named throughout the spec (cache TTLs, circuit thresholds, watch tick
//! interval, workflow timeouts).

use crate::env::EnvConfigLoader;
use std::time::Duration;

/// Cache tuning (§4.5, §3 `CacheEntry<T>`).
#[derive(Debug, Clone, Copy)]
pub struct CacheSettings {
    pub lru_capacity: usize,
    pub default_ttl_ms: i64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            lru_capacity: 10_000,
            default_ttl_ms: 24 * 60 * 60 * 1000,
        }
    }
}

/// Circuit breaker tuning (§4.6).
#[derive(Debug, Clone, Copy)]
pub struct CircuitSettings {
    pub failure_threshold: u32,
    pub reset_timeout: Duration,
    pub half_open_max_attempts: u32,
}

impl Default for CircuitSettings {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout: Duration::from_millis(30_000),
            half_open_max_attempts: 1,
        }
    }
}

/// Watch manager tuning (§4.7).
#[derive(Debug, Clone, Copy)]
pub struct WatchSettings {
    pub tick_interval: Duration,
    pub min_interval_secs: u64,
    pub default_change_threshold: f64,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(30),
            min_interval_secs: 60,
            default_change_threshold: 1.0,
        }
    }
}

/// Agentic extractor tuning (§4.4).
#[derive(Debug, Clone, Copy)]
pub struct AgenticSettings {
    pub confidence_threshold: f64,
    pub min_content_length: usize,
    pub max_attempts: u32,
    pub timeout: Duration,
}

impl Default for AgenticSettings {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.7,
            min_content_length: 200,
            max_attempts: 3,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Workflow engine tuning (§4.8).
#[derive(Debug, Clone, Copy)]
pub struct WorkflowSettings {
    pub default_timeout: Duration,
    pub default_session_ttl: Duration,
    pub max_loop_iterations: u32,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(60),
            default_session_ttl: Duration::from_secs(300),
            max_loop_iterations: 50,
        }
    }
}

/// All service tunables, aggregated for the composition root to load
/// once at startup (§9 "Singletons": explicit construction, not
/// module-level statics).
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceSettings {
    pub cache: CacheSettings,
    pub circuit: CircuitSettings,
    pub watch: WatchSettings,
    pub agentic: AgenticSettings,
    pub workflow: WorkflowSettings,
}

impl ServiceSettings {
    /// Loads every tunable from `RIPTIDE_*` environment variables,
    /// falling back to the documented defaults when unset.
    pub fn from_env() -> Self {
        let loader = EnvConfigLoader::new().with_prefix("RIPTIDE_");
        let defaults = Self::default();

        Self {
            cache: CacheSettings {
                lru_capacity: loader
                    .get_u64("CACHE_LRU_CAPACITY")
                    .map(|v| v as usize)
                    .unwrap_or(defaults.cache.lru_capacity),
                default_ttl_ms: loader
                    .get_u64("CACHE_TTL_MS")
                    .map(|v| v as i64)
                    .unwrap_or(defaults.cache.default_ttl_ms),
            },
            circuit: CircuitSettings {
                failure_threshold: loader
                    .get_u64("CIRCUIT_FAILURE_THRESHOLD")
                    .map(|v| v as u32)
                    .unwrap_or(defaults.circuit.failure_threshold),
                reset_timeout: loader
                    .get_duration("CIRCUIT_RESET_TIMEOUT")
                    .unwrap_or(defaults.circuit.reset_timeout),
                half_open_max_attempts: loader
                    .get_u64("CIRCUIT_HALF_OPEN_MAX_ATTEMPTS")
                    .map(|v| v as u32)
                    .unwrap_or(defaults.circuit.half_open_max_attempts),
            },
            watch: WatchSettings {
                tick_interval: loader
                    .get_duration("WATCH_TICK_INTERVAL")
                    .unwrap_or(defaults.watch.tick_interval),
                min_interval_secs: loader
                    .get_u64("WATCH_MIN_INTERVAL_SECS")
                    .unwrap_or(defaults.watch.min_interval_secs),
                default_change_threshold: loader
                    .get_f64("WATCH_DEFAULT_CHANGE_THRESHOLD")
                    .unwrap_or(defaults.watch.default_change_threshold),
            },
            agentic: AgenticSettings {
                confidence_threshold: loader
                    .get_f64("AGENTIC_CONFIDENCE_THRESHOLD")
                    .unwrap_or(defaults.agentic.confidence_threshold),
                min_content_length: loader
                    .get_u64("AGENTIC_MIN_CONTENT_LENGTH")
                    .map(|v| v as usize)
                    .unwrap_or(defaults.agentic.min_content_length),
                max_attempts: loader
                    .get_u64("AGENTIC_MAX_ATTEMPTS")
                    .map(|v| v as u32)
                    .unwrap_or(defaults.agentic.max_attempts),
                timeout: loader
                    .get_duration("AGENTIC_TIMEOUT")
                    .unwrap_or(defaults.agentic.timeout),
            },
            workflow: WorkflowSettings {
                default_timeout: loader
                    .get_duration("WORKFLOW_DEFAULT_TIMEOUT")
                    .unwrap_or(defaults.workflow.default_timeout),
                default_session_ttl: loader
                    .get_duration("WORKFLOW_DEFAULT_SESSION_TTL")
                    .unwrap_or(defaults.workflow.default_session_ttl),
                max_loop_iterations: loader
                    .get_u64("WORKFLOW_MAX_LOOP_ITERATIONS")
                    .map(|v| v as u32)
                    .unwrap_or(defaults.workflow.max_loop_iterations),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = ServiceSettings::default();
        assert_eq!(settings.circuit.failure_threshold, 5);
        assert_eq!(settings.watch.min_interval_secs, 60);
        assert_eq!(settings.watch.default_change_threshold, 1.0);
        assert_eq!(settings.agentic.max_attempts, 3);
    }

    #[test]
    fn from_env_falls_back_to_defaults_when_unset() {
        let settings = ServiceSettings::from_env();
        assert_eq!(settings.circuit.failure_threshold, 5);
    }
}
