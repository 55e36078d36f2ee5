//! # fops-validation
//!
//! Validation Runner. Stages a draft in a scoped temporary directory, runs
//! the platform's fixed, ordered set of read-only validators under a
//! timeout, and normalizes their output into a `ValidationReport`.

pub mod catalog;
pub mod classify;
pub mod diagnostics;
pub mod process;
pub mod runner;
pub mod syntax;

pub use catalog::ValidatorCatalog;
pub use process::{FileArgs, ProcessTool};
pub use runner::ValidationRunner;
pub use syntax::SyntaxTool;
