//! Engine configuration.
//!
//! Defaults suit interactive use. Override via environment variables or
//! explicit construction.

use std::time::Duration;

use crate::audit::DEFAULT_AUDIT_CAPACITY;

/// Default per-action handler budget.
pub const DEFAULT_ACTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Runtime knobs of the workflow engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Upper bound on a single handler call.
    pub action_timeout: Duration,
    /// Maximum retained audit entries.
    pub audit_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            action_timeout: DEFAULT_ACTION_TIMEOUT,
            audit_capacity: DEFAULT_AUDIT_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `JURIS_ACTION_TIMEOUT_MS` (default: 5000, must be > 0)
    /// - `JURIS_AUDIT_CAPACITY` (default: 10000, must be > 0)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let action_timeout = match positive(&lookup, "JURIS_ACTION_TIMEOUT_MS")? {
            Some(ms) => Duration::from_millis(ms),
            None => defaults.action_timeout,
        };
        let audit_capacity = match positive(&lookup, "JURIS_AUDIT_CAPACITY")? {
            Some(n) => usize::try_from(n).map_err(|_| ConfigError::Invalid {
                var: "JURIS_AUDIT_CAPACITY".to_string(),
                value: n.to_string(),
                reason: "out of range".to_string(),
            })?,
            None => defaults.audit_capacity,
        };
        Ok(Self {
            action_timeout,
            audit_capacity,
        })
    }

    /// Override the handler timeout.
    pub fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = timeout;
        self
    }

    /// Override the audit capacity.
    pub fn with_audit_capacity(mut self, capacity: usize) -> Self {
        self.audit_capacity = capacity;
        self
    }
}

fn positive(lookup: &impl Fn(&str) -> Option<String>, var: &str) -> Result<Option<u64>, ConfigError> {
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    let invalid = |reason: String| ConfigError::Invalid {
        var: var.to_string(),
        value: raw.clone(),
        reason,
    };
    let value: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| invalid(e.to_string()))?;
    if value == 0 {
        return Err(invalid("must be greater than zero".to_string()));
    }
    Ok(Some(value))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable held an unusable value.
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        /// Name of the environment variable.
        var: String,
        /// The raw value that was read.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.action_timeout, Duration::from_secs(5));
        assert_eq!(cfg.audit_capacity, 10_000);
    }

    #[test]
    fn reads_overrides() {
        let cfg = EngineConfig::from_lookup(lookup(&[
            ("JURIS_ACTION_TIMEOUT_MS", "750"),
            ("JURIS_AUDIT_CAPACITY", " 200 "),
        ]))
        .unwrap();
        assert_eq!(cfg.action_timeout, Duration::from_millis(750));
        assert_eq!(cfg.audit_capacity, 200);
    }

    #[test]
    fn rejects_garbage_and_zero() {
        let err = EngineConfig::from_lookup(lookup(&[("JURIS_ACTION_TIMEOUT_MS", "cinco")])).unwrap_err();
        assert!(err.to_string().contains("JURIS_ACTION_TIMEOUT_MS"));
        assert!(EngineConfig::from_lookup(lookup(&[("JURIS_AUDIT_CAPACITY", "0")])).is_err());
        assert!(EngineConfig::from_lookup(lookup(&[("JURIS_AUDIT_CAPACITY", "-3")])).is_err());
    }

    #[test]
    fn builders() {
        let cfg = EngineConfig::default()
            .with_action_timeout(Duration::from_millis(10))
            .with_audit_capacity(3);
        assert_eq!(cfg.action_timeout, Duration::from_millis(10));
        assert_eq!(cfg.audit_capacity, 3);
    }
}
