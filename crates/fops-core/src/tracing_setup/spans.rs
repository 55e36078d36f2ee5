//! Span definitions per pipeline stage.

/// Create the span wrapping one whole run.
#[macro_export]
macro_rules! run_span {
    ($run_id:expr, $family:expr) => {
        tracing::info_span!("fops.run", run_id = %$run_id, family = %$family)
    };
}

/// Create a classification span.
#[macro_export]
macro_rules! classify_span {
    ($file_count:expr) => {
        tracing::info_span!("fops.classify", file_count = $file_count)
    };
}

/// Create a retrieval span.
#[macro_export]
macro_rules! retrieve_span {
    ($partition:expr, $intent:expr) => {
        tracing::info_span!("fops.retrieve", partition = %$partition, intent = %$intent)
    };
}

/// Create a composition span.
#[macro_export]
macro_rules! compose_span {
    ($family:expr, $platform:expr) => {
        tracing::info_span!("fops.compose", family = %$family, platform = %$platform)
    };
}

/// Create a validation span.
#[macro_export]
macro_rules! validate_span {
    ($platform:expr, $file_count:expr) => {
        tracing::info_span!("fops.validate", platform = %$platform, file_count = $file_count)
    };
}

/// Create an audit span.
#[macro_export]
macro_rules! audit_span {
    ($run_id:expr) => {
        tracing::info_span!("fops.audit", run_id = %$run_id)
    };
}

/// Create a submission span.
#[macro_export]
macro_rules! submit_span {
    ($run_id:expr, $branch:expr) => {
        tracing::info_span!("fops.submit", run_id = %$run_id, branch = %$branch)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const RUN: &str = "fops.run";
    pub const CLASSIFY: &str = "fops.classify";
    pub const RETRIEVE: &str = "fops.retrieve";
    pub const COMPOSE: &str = "fops.compose";
    pub const VALIDATE: &str = "fops.validate";
    pub const AUDIT: &str = "fops.audit";
    pub const SUBMIT: &str = "fops.submit";
}
