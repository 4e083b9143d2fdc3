use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{MAX_CAPACITY, MIN_CAPACITY, PipelineError};

pub const CONFIG_ENV: &str = "SLOTPIPE_CONFIG";
pub const CAPACITY_ENV: &str = "SLOTPIPE_CAPACITY";
pub const PERIOD_ENV: &str = "SLOTPIPE_PERIOD_MS";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    // number of slots in the pool, and therefore the transport queue bound.
    pub capacity: usize,
    pub period_ms: u64,
    pub initial_delay_ms: u64,
    // EnvFilter directive used when RUST_LOG is unset.
    pub log_filter: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            capacity: 8,
            period_ms: 1000,
            initial_delay_ms: 1000,
            log_filter: "info".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, PipelineError> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds a config from the process environment.
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    // from_lookup layers defaults, then inline JSON, then single-value overrides.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PipelineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_ENV) {
            Some(json) => serde_json::from_str(&json)?,
            None => PipelineConfig::default(),
        };
        if let Some(value) = lookup(CAPACITY_ENV) {
            config.capacity = parse_override(CAPACITY_ENV, value)?;
        }
        if let Some(value) = lookup(PERIOD_ENV) {
            config.period_ms = parse_override(PERIOD_ENV, value)?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.capacity < MIN_CAPACITY {
            return Err(PipelineError::CapacityTooSmall(self.capacity));
        }
        if self.capacity > MAX_CAPACITY {
            return Err(PipelineError::CapacityTooLarge(self.capacity));
        }
        if self.period_ms == 0 {
            return Err(PipelineError::ZeroPeriod);
        }
        Ok(())
    }

    /// The pending-count threshold whose upward crossing wakes the consumer.
    pub fn half(&self) -> usize {
        self.capacity / 2
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }
}

fn parse_override<T>(key: &'static str, value: String) -> Result<T, PipelineError>
where
    T: std::str::FromStr,
{
    value
        .trim()
        .parse()
        .map_err(|_| PipelineError::InvalidOverride { key, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> Box<dyn Fn(&str) -> Option<String>> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Box::new(move |key: &str| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.capacity, 8);
        assert_eq!(config.half(), 4);
        assert_eq!(config.period(), Duration::from_secs(1));
        assert_eq!(config.initial_delay(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PipelineConfig::from_json_str(r#"{"capacity": 16}"#).unwrap();
        assert_eq!(config.capacity, 16);
        assert_eq!(config.half(), 8);
        assert_eq!(config.period_ms, 1000);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = PipelineConfig::from_json_str(r#"{"capacity": 8, "depth": 3}"#).unwrap_err();
        assert!(matches!(err, PipelineError::Json(_)));
    }

    #[test]
    fn test_capacity_one_rejected() {
        let err = PipelineConfig::from_json_str(r#"{"capacity": 1}"#).unwrap_err();
        assert!(matches!(err, PipelineError::CapacityTooSmall(1)));
    }

    #[test]
    fn test_huge_capacity_rejected() {
        let max = usize::MAX.to_string();
        let err = PipelineConfig::from_lookup(lookup_from(&[(CAPACITY_ENV, max.as_str())]))
            .unwrap_err();
        assert!(matches!(err, PipelineError::CapacityTooLarge(usize::MAX)));

        let at_limit = format!(r#"{{"capacity": {MAX_CAPACITY}}}"#);
        assert!(PipelineConfig::from_json_str(&at_limit).is_ok());
    }

    #[test]
    fn test_zero_period_rejected() {
        let err = PipelineConfig::from_json_str(r#"{"period_ms": 0}"#).unwrap_err();
        assert!(matches!(err, PipelineError::ZeroPeriod));
    }

    #[test]
    fn test_env_overrides_layer_on_json() {
        let lookup = lookup_from(&[
            (CONFIG_ENV, r#"{"capacity": 4, "period_ms": 50}"#),
            (CAPACITY_ENV, " 12 "),
        ]);
        let config = PipelineConfig::from_lookup(lookup).unwrap();
        assert_eq!(config.capacity, 12);
        assert_eq!(config.period_ms, 50);
    }

    #[test]
    fn test_env_empty_is_default() {
        let config = PipelineConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_bad_override_reports_key() {
        let err = PipelineConfig::from_lookup(lookup_from(&[(PERIOD_ENV, "soon")])).unwrap_err();
        match err {
            PipelineError::InvalidOverride { key, value } => {
                assert_eq!(key, PERIOD_ENV);
                assert_eq!(value, "soon");
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
