// Single source of truth for all default values.

// --- Retrieval ---
pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_TIE_EPSILON: f64 = 1e-6;
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 256;

// --- Composition ---
pub const DEFAULT_SECURITY_SCAN: bool = true;
pub const DEFAULT_ENVIRONMENTS: &[&str] = &["staging", "prod"];
pub const DEFAULT_PROTECTED_ENVIRONMENTS: &[&str] = &["prod"];

// --- Validation ---
pub const DEFAULT_VALIDATOR_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CONCURRENT_VALIDATION: bool = true;
pub const DEFAULT_SUBMIT_ON_FAILURE: bool = true;

// --- Audit ---
pub const DEFAULT_AUDIT_LOG_PATH: &str = "audit/fops-audit.jsonl";

// --- Submission ---
pub const DEFAULT_BUNDLE_DIR: &str = "proposals";
pub const DEFAULT_BRANCH_PREFIX: &str = "fops";

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = false;
