//! # fops-pipeline
//!
//! One run, strictly in order:
//! classify → retrieve → cite → compose → validate → audit → submit.
//!
//! Only validation fans out. Degraded inputs never abort a run; a draft
//! that fails its own grammar does, before any validator or submitter is
//! called. Whatever happens, the caller gets a `RunOutcome` and the audit
//! log gets a record.

pub mod outcome;
pub mod pipeline;
pub mod proposal;
pub mod submitter;

pub use outcome::{RunOutcome, RunReport};
pub use pipeline::ProposalPipeline;
pub use submitter::LocalBundleSubmitter;
