use serde::{Deserialize, Serialize};

use super::defaults;

/// Audit log configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// JSONL log path, relative to the working root unless absolute.
    pub log_path: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            log_path: defaults::DEFAULT_AUDIT_LOG_PATH.to_string(),
        }
    }
}
