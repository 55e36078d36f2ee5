/// fops version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Schema version written into every audit record.
pub const AUDIT_SCHEMA_VERSION: u32 = 1;

/// Project-level config file name, looked up in the working root.
pub const PROJECT_CONFIG_FILE: &str = "fops.toml";

/// Marker files larger than this are listed but never read.
pub const MAX_MARKER_FILE_BYTES: u64 = 256 * 1024;

/// Upper bound on files listed from a repository checkout.
pub const MAX_LISTED_FILES: usize = 20_000;

/// Stderr bytes kept when a validator fails without structured diagnostics.
pub const MAX_RAW_DIAGNOSTIC_BYTES: usize = 2_000;

/// Label used wherever a stack fact could not be determined.
pub const UNKNOWN: &str = "unknown";
