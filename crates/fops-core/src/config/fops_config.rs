//! Top-level fops configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{
    AuditConfig, CompositionConfig, ObservabilityConfig, RetrievalConfig, SubmissionConfig,
    ValidationConfig,
};
use crate::constants::PROJECT_CONFIG_FILE;
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sections.
///
/// Resolution order (highest priority first):
/// 1. Programmatic overrides (`ConfigOverrides`)
/// 2. Environment variables (`FOPS_*`)
/// 3. Project config (`fops.toml` in the working root)
/// 4. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FopsConfig {
    pub retrieval: RetrievalConfig,
    pub composition: CompositionConfig,
    pub validation: ValidationConfig,
    pub audit: AuditConfig,
    pub submission: SubmissionConfig,
    pub observability: ObservabilityConfig,
}

/// Caller-supplied values that win over every other layer.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub top_k: Option<usize>,
    pub validator_timeout_secs: Option<u64>,
    pub concurrent_validation: Option<bool>,
    pub audit_log_path: Option<String>,
    pub bundle_dir: Option<String>,
    pub environments: Option<Vec<String>>,
}

impl FopsConfig {
    /// Load configuration for the working root `root`.
    pub fn load(root: &Path, overrides: Option<&ConfigOverrides>) -> Result<Self, ConfigError> {
        // Layer 3: project config (replaces compiled defaults key by key)
        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        let mut config = if project_config_path.exists() {
            Self::from_file(&project_config_path)?
        } else {
            Self::default()
        };

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config);

        // Layer 1: programmatic overrides
        if let Some(overrides) = overrides {
            Self::apply_overrides(&mut config, overrides);
        }

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &FopsConfig) -> Result<(), ConfigError> {
        if config.retrieval.top_k == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "retrieval.top_k".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if !(0.0..1.0).contains(&config.retrieval.tie_epsilon) {
            return Err(ConfigError::ValidationFailed {
                field: "retrieval.tie_epsilon".to_string(),
                message: "must be in [0.0, 1.0)".to_string(),
            });
        }
        if config.retrieval.embedding_dimensions < 8 {
            return Err(ConfigError::ValidationFailed {
                field: "retrieval.embedding_dimensions".to_string(),
                message: "must be at least 8".to_string(),
            });
        }
        if config.validation.timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "validation.timeout_secs".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.submission.branch_prefix.trim().is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "submission.branch_prefix".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Apply environment variable overrides.
    /// Pattern: `FOPS_RETRIEVAL_TOP_K`, `FOPS_VALIDATION_TIMEOUT_SECS`, etc.
    fn apply_env_overrides(config: &mut FopsConfig) {
        if let Ok(val) = std::env::var("FOPS_RETRIEVAL_TOP_K") {
            if let Ok(v) = val.parse::<usize>() {
                config.retrieval.top_k = v;
            }
        }
        if let Ok(val) = std::env::var("FOPS_VALIDATION_TIMEOUT_SECS") {
            if let Ok(v) = val.parse::<u64>() {
                config.validation.timeout_secs = v;
            }
        }
        if let Ok(val) = std::env::var("FOPS_VALIDATION_CONCURRENT") {
            if let Ok(v) = val.parse::<bool>() {
                config.validation.concurrent = v;
            }
        }
        if let Ok(val) = std::env::var("FOPS_AUDIT_LOG_PATH") {
            config.audit.log_path = val;
        }
        if let Ok(val) = std::env::var("FOPS_SUBMISSION_BUNDLE_DIR") {
            config.submission.bundle_dir = val;
        }
    }

    fn apply_overrides(config: &mut FopsConfig, overrides: &ConfigOverrides) {
        if let Some(v) = overrides.top_k {
            config.retrieval.top_k = v;
        }
        if let Some(v) = overrides.validator_timeout_secs {
            config.validation.timeout_secs = v;
        }
        if let Some(v) = overrides.concurrent_validation {
            config.validation.concurrent = v;
        }
        if let Some(ref v) = overrides.audit_log_path {
            config.audit.log_path = v.clone();
        }
        if let Some(ref v) = overrides.bundle_dir {
            config.submission.bundle_dir = v.clone();
        }
        if let Some(ref v) = overrides.environments {
            config.composition.default_environments = v.clone();
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}
