use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::errors::{Result, StorageError, StorageErrorType};
use crate::paths::DEFAULT_ROOT_LABEL;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub progress_steps: u32,
    pub step_delay_ms: u64,
    pub settle_delay_ms: u64,
    pub latency_ms: u64,
    pub root_label: String,
    pub notification_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            progress_steps: 10,
            step_delay_ms: 200,
            settle_delay_ms: 1000,
            latency_ms: 500,
            root_label: DEFAULT_ROOT_LABEL.to_string(),
            notification_capacity: 100,
        }
    }
}

impl StoreConfig {
    pub fn load(path: &Path) -> Result<StoreConfig> {
        let contents = std::fs::read_to_string(path)?;
        let config: StoreConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.progress_steps == 0 {
            return Err(StorageError::new(
                StorageErrorType::InternalError,
                "progress_steps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: StoreConfig = serde_json::from_str(r#"{"latency_ms": 5}"#).unwrap();
        assert_eq!(config.latency(), Duration::from_millis(5));
        assert_eq!(config.progress_steps, 10);
        assert_eq!(config.root_label, "Home");
    }

    #[test]
    fn zero_steps_are_rejected() {
        let config = StoreConfig {
            progress_steps: 0,
            ..StoreConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_reads_json_file() {
        let path = std::env::temp_dir().join(format!("breezy-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"step_delay_ms": 50, "root_label": "Drive"}"#).unwrap();
        let config = StoreConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.step_delay(), Duration::from_millis(50));
        assert_eq!(config.root_label, "Drive");
    }
}
