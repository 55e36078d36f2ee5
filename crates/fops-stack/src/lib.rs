//! # fops-stack
//!
//! Stack Classifier. Reads a file listing plus a bounded set of marker files
//! and produces a `StackProfile`. Never fails: missing information becomes
//! explicit `unknown` fields.

pub mod classifier;
pub mod frameworks;
pub mod markers;
pub mod snapshot;

pub use classifier::StackClassifier;
pub use snapshot::{RepositorySnapshot, SnapshotLimits};
