use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Passed,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Parse a validator's level label; unrecognized labels are errors.
    pub fn from_label(label: &str) -> Severity {
        match label.trim().to_ascii_lowercase().as_str() {
            "info" | "note" | "notice" | "hint" => Self::Info,
            "warning" | "warn" => Self::Warning,
            _ => Self::Error,
        }
    }
}

/// Why a validator produced no verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NotInstalled,
    TimedOut,
    Crashed,
    Disabled,
}

impl SkipReason {
    /// Skips caused by a validator misbehaving, as opposed to being absent.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::TimedOut | Self::Crashed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Finding {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            location: None,
        }
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Result of one validator invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub check_name: String,
    pub status: ValidationStatus,
    pub findings: Vec<Finding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<SkipReason>,
    #[serde(default)]
    pub duration_ms: u64,
}

impl ValidationOutcome {
    pub fn skipped(check_name: impl Into<String>, reason: SkipReason, message: String) -> Self {
        Self {
            check_name: check_name.into(),
            status: ValidationStatus::Skipped,
            findings: vec![Finding::new(Severity::Info, message)],
            skip_reason: Some(reason),
            duration_ms: 0,
        }
    }
}

/// All outcomes of a run, in the catalog's canonical order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub outcomes: Vec<ValidationOutcome>,
}

impl ValidationReport {
    pub fn count(&self, status: ValidationStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn any_failed(&self) -> bool {
        self.count(ValidationStatus::Failed) > 0
    }

    /// A validator timed out or crashed.
    pub fn is_incomplete(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| o.skip_reason.is_some_and(|r| r.is_incomplete()))
    }

    pub fn get(&self, check_name: &str) -> Option<&ValidationOutcome> {
        self.outcomes.iter().find(|o| o.check_name == check_name)
    }

    /// One-line summary, e.g. `2 passed, 0 failed, 1 skipped`.
    pub fn summary(&self) -> String {
        format!(
            "{} passed, {} failed, {} skipped",
            self.count(ValidationStatus::Passed),
            self.count(ValidationStatus::Failed),
            self.count(ValidationStatus::Skipped)
        )
    }
}

/// How a validator reports diagnostics on stdout/stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticFormat {
    /// `file:line:col: [level] message`
    LineColumn,
    /// `terraform validate -json`
    TerraformJson,
    /// `[LEVEL] path: message`
    HelmLint,
    /// Free text; non-empty lines mentioning an error become findings.
    PlainText,
}

/// Raw result of invoking a validator. `exit_status` is `None` when the
/// process was terminated by a signal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolOutput {
    pub exit_status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}
