use fops_core::models::{
    Citation, DegradationEvent, DraftArtifact, ProposalReference, Stage, StackProfile,
    StageFailure, TerminalStatus, ValidationReport,
};

/// Everything a run produced, whether or not it ended in a proposal.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: String,
    /// run_id of the audit record carrying the final status. Differs from
    /// `run_id` once a submission outcome superseded the first record.
    pub audit_record_id: Option<String>,
    pub stack_profile: StackProfile,
    pub citations: Vec<Citation>,
    /// Absent when composition failed.
    pub draft: Option<DraftArtifact>,
    pub validation_report: ValidationReport,
    pub degradations: Vec<DegradationEvent>,
}

/// What the caller gets back: a proposal reference, or the stage a run
/// stopped at and why. Never a bare error.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Proposed {
        reference: ProposalReference,
        status: TerminalStatus,
        report: RunReport,
    },
    Failed {
        failure: StageFailure,
        status: TerminalStatus,
        report: RunReport,
    },
}

impl RunOutcome {
    pub fn report(&self) -> &RunReport {
        match self {
            Self::Proposed { report, .. } | Self::Failed { report, .. } => report,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.report().run_id
    }

    pub fn status(&self) -> TerminalStatus {
        match self {
            Self::Proposed { status, .. } | Self::Failed { status, .. } => *status,
        }
    }

    pub fn reference(&self) -> Option<&ProposalReference> {
        match self {
            Self::Proposed { reference, .. } => Some(reference),
            Self::Failed { .. } => None,
        }
    }

    /// Stage the run stopped at, if it stopped early.
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            Self::Proposed { .. } => None,
            Self::Failed { failure, .. } => Some(failure.stage),
        }
    }

    pub fn is_proposed(&self) -> bool {
        matches!(self, Self::Proposed { .. })
    }
}
