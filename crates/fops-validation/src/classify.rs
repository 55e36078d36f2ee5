//! Exit status and diagnostics to outcome.
//!
//! | Tool result                               | Outcome                    |
//! |-------------------------------------------|----------------------------|
//! | exit 0                                    | passed (warnings kept)     |
//! | non-zero, diagnostics parsed              | failed with findings       |
//! | non-zero, nothing parseable               | failed with raw output     |
//! | killed by a signal / spawn or I/O error   | skipped: crashed           |
//! | binary absent                             | skipped: not_installed     |

use fops_core::constants::MAX_RAW_DIAGNOSTIC_BYTES;
use fops_core::errors::ToolError;
use fops_core::models::{
    DiagnosticFormat, Finding, Severity, SkipReason, ToolOutput, ValidationOutcome,
    ValidationStatus,
};

use crate::diagnostics;

pub fn classify(
    check_name: &str,
    format: DiagnosticFormat,
    output: &ToolOutput,
    duration_ms: u64,
) -> ValidationOutcome {
    let findings = diagnostics::parse(format, output);
    let (status, findings, skip_reason) = match output.exit_status {
        Some(0) => (ValidationStatus::Passed, findings, None),
        Some(code) if findings.is_empty() => (
            ValidationStatus::Failed,
            vec![Finding::new(
                Severity::Error,
                format!("exited with status {code}: {}", raw_tail(output)),
            )],
            None,
        ),
        Some(_) => (ValidationStatus::Failed, findings, None),
        None => (
            ValidationStatus::Skipped,
            vec![Finding::new(
                Severity::Info,
                format!("terminated by a signal: {}", raw_tail(output)),
            )],
            Some(SkipReason::Crashed),
        ),
    };
    ValidationOutcome {
        check_name: check_name.to_string(),
        status,
        findings,
        skip_reason,
        duration_ms,
    }
}

pub fn from_tool_error(check_name: &str, error: &ToolError) -> ValidationOutcome {
    let reason = match error {
        ToolError::NotInstalled { .. } => SkipReason::NotInstalled,
        _ => SkipReason::Crashed,
    };
    ValidationOutcome::skipped(check_name, reason, error.to_string())
}

/// Last bytes of stderr (stdout when stderr is empty), cut on a char boundary.
fn raw_tail(output: &ToolOutput) -> String {
    let raw = if output.stderr.trim().is_empty() {
        output.stdout.trim()
    } else {
        output.stderr.trim()
    };
    if raw.is_empty() {
        return "no output".to_string();
    }
    let mut start = raw.len().saturating_sub(MAX_RAW_DIAGNOSTIC_BYTES);
    while !raw.is_char_boundary(start) {
        start += 1;
    }
    raw[start..].to_string()
}
