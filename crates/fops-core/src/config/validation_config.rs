use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Validation runner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Per-validator wall-clock budget.
    pub timeout_secs: u64,
    /// Run independent validators concurrently.
    pub concurrent: bool,
    /// Validator names recorded as skipped without being invoked.
    pub disabled: Vec<String>,
    /// Submit proposals whose validators reported failures.
    pub submit_on_failure: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: defaults::DEFAULT_VALIDATOR_TIMEOUT_SECS,
            concurrent: defaults::DEFAULT_CONCURRENT_VALIDATION,
            disabled: Vec::new(),
            submit_on_failure: defaults::DEFAULT_SUBMIT_ON_FAILURE,
        }
    }
}

impl ValidationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn is_disabled(&self, check_name: &str) -> bool {
        self.disabled.iter().any(|d| d == check_name)
    }
}
