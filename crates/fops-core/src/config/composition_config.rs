use serde::{Deserialize, Serialize};

use super::defaults;

/// Composition engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositionConfig {
    /// Include a security-scan section in pipelines.
    pub security_scan: bool,
    /// Environments used when a request names none.
    pub default_environments: Vec<String>,
    /// Environments whose deploy sections only run from the main branch.
    pub protected_environments: Vec<String>,
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            security_scan: defaults::DEFAULT_SECURITY_SCAN,
            default_environments: defaults::DEFAULT_ENVIRONMENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            protected_environments: defaults::DEFAULT_PROTECTED_ENVIRONMENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl CompositionConfig {
    pub fn is_protected(&self, environment: &str) -> bool {
        self.protected_environments.iter().any(|e| e == environment)
    }
}
