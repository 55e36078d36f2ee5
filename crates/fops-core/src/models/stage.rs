use serde::{Deserialize, Serialize};

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Classification,
    Retrieval,
    Citation,
    Composition,
    Validation,
    Audit,
    Submission,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Classification => "classification",
            Self::Retrieval => "retrieval",
            Self::Citation => "citation",
            Self::Composition => "composition",
            Self::Validation => "validation",
            Self::Audit => "audit",
            Self::Submission => "submission",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalStatus {
    Succeeded,
    CompositionFailed,
    ValidationIncomplete,
    ValidationFailed,
    SubmissionFailed,
}

impl TerminalStatus {
    pub const ALL: &'static [TerminalStatus] = &[
        Self::Succeeded,
        Self::CompositionFailed,
        Self::ValidationIncomplete,
        Self::ValidationFailed,
        Self::SubmissionFailed,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::CompositionFailed => "composition_failed",
            Self::ValidationIncomplete => "validation_incomplete",
            Self::ValidationFailed => "validation_failed",
            Self::SubmissionFailed => "submission_failed",
        }
    }

    /// Whether the run handed something to the submission collaborator.
    pub fn is_submittable(&self) -> bool {
        matches!(self, Self::Succeeded | Self::ValidationIncomplete)
    }
}

impl std::fmt::Display for TerminalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Stage at which a run stopped and the verbatim reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageFailure {
    pub stage: Stage,
    pub reason: String,
}

impl StageFailure {
    pub fn new(stage: Stage, reason: impl Into<String>) -> Self {
        Self {
            stage,
            reason: reason.into(),
        }
    }
}
