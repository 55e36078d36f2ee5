use serde::{Deserialize, Serialize};

use super::defaults;

/// Proposal submission configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Directory receiving local change-set bundles.
    pub bundle_dir: String,
    /// Prefix of generated branch names.
    pub branch_prefix: String,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            bundle_dir: defaults::DEFAULT_BUNDLE_DIR.to_string(),
            branch_prefix: defaults::DEFAULT_BRANCH_PREFIX.to_string(),
        }
    }
}
