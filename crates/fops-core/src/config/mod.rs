//! Configuration for fops.
//! TOML-based, layered resolution: overrides > env > project file > defaults.

pub mod audit_config;
pub mod composition_config;
pub mod defaults;
pub mod fops_config;
pub mod observability_config;
pub mod retrieval_config;
pub mod submission_config;
pub mod validation_config;

pub use audit_config::AuditConfig;
pub use composition_config::CompositionConfig;
pub use fops_config::{ConfigOverrides, FopsConfig};
pub use observability_config::ObservabilityConfig;
pub use retrieval_config::RetrievalConfig;
pub use submission_config::SubmissionConfig;
pub use validation_config::ValidationConfig;
