//! Environment variable loading with type conversion and defaults.
//!
//! Mirrors `riptide-config::env::EnvConfigLoader` in the teacher crate: a
//! prefix-scoped loader with typed getters and a default fallback, rather
//! than a raw `std::env::var` call at every tunable's call site.

use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnvError {
    #[error("environment variable not found: {var}")]
    NotFound { var: String },

    #[error("invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}

/// A prefix-scoped environment variable loader with typed getters and a
/// default-value fallback.
pub struct EnvConfigLoader {
    prefix: Option<String>,
    defaults: HashMap<String, String>,
}

impl EnvConfigLoader {
    pub fn new() -> Self {
        Self {
            prefix: None,
            defaults: HashMap::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn default(mut self, var: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(var.into(), value.into());
        self
    }

    fn make_var_name(&self, var: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}{}", var.to_uppercase()),
            None => var.to_uppercase(),
        }
    }

    pub fn get(&self, var: &str) -> Result<String, EnvError> {
        let full_var = self.make_var_name(var);
        env::var(&full_var).or_else(|_| {
            self.defaults
                .get(var)
                .cloned()
                .ok_or(EnvError::NotFound { var: full_var })
        })
    }

    pub fn get_optional(&self, var: &str) -> Option<String> {
        let full_var = self.make_var_name(var);
        env::var(&full_var).ok().or_else(|| self.defaults.get(var).cloned())
    }

    pub fn get_u64(&self, var: &str) -> Result<u64, EnvError> {
        let value = self.get(var)?;
        value.parse().map_err(|e| EnvError::InvalidValue {
            var: self.make_var_name(var),
            reason: format!("not an unsigned integer: {e}"),
        })
    }

    pub fn get_f64(&self, var: &str) -> Result<f64, EnvError> {
        let value = self.get(var)?;
        value.parse().map_err(|e| EnvError::InvalidValue {
            var: self.make_var_name(var),
            reason: format!("not a float: {e}"),
        })
    }

    pub fn get_bool(&self, var: &str) -> Result<bool, EnvError> {
        let value = self.get(var)?;
        match value.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            other => Err(EnvError::InvalidValue {
                var: self.make_var_name(var),
                reason: format!("not a boolean: {other}"),
            }),
        }
    }

    /// Supports "30s", "5m", "1h", "500ms" and bare seconds.
    pub fn get_duration(&self, var: &str) -> Result<Duration, EnvError> {
        let value = self.get(var)?;
        parse_duration(&value).map_err(|reason| EnvError::InvalidValue {
            var: self.make_var_name(var),
            reason,
        })
    }
}

impl Default for EnvConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_duration(raw: &str) -> Result<Duration, String> {
    let s = raw.trim().to_lowercase();
    if let Some(num) = s.strip_suffix("ms") {
        return num
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| format!("invalid milliseconds: {e}"));
    }
    if let Some(num) = s.strip_suffix('h') {
        return num
            .parse::<u64>()
            .map(|n| Duration::from_secs(n * 3600))
            .map_err(|e| format!("invalid hours: {e}"));
    }
    if let Some(num) = s.strip_suffix('m') {
        return num
            .parse::<u64>()
            .map(|n| Duration::from_secs(n * 60))
            .map_err(|e| format!("invalid minutes: {e}"));
    }
    if let Some(num) = s.strip_suffix('s') {
        return num
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| format!("invalid seconds: {e}"));
    }
    s.parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| format!("invalid duration format: {s}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_default_when_env_var_absent() {
        let loader = EnvConfigLoader::new()
            .with_prefix("RIPTIDE_TEST_NONEXISTENT_")
            .default("TIMEOUT", "30s");
        assert_eq!(loader.get("TIMEOUT").unwrap(), "30s");
    }

    #[test]
    fn parses_duration_suffixes() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("45").unwrap(), Duration::from_secs(45));
    }

    #[test]
    fn rejects_malformed_duration() {
        assert!(parse_duration("not-a-duration").is_err());
    }

    #[test]
    fn missing_var_without_default_is_not_found() {
        let loader = EnvConfigLoader::new().with_prefix("RIPTIDE_TEST_MISSING_");
        assert!(matches!(
            loader.get("UNSET_VALUE"),
            Err(EnvError::NotFound { .. })
        ));
    }
}
