//! The request handed to the proposal-submission collaborator: branch,
//! title, and a reviewer-facing markdown description.

use fops_core::models::{
    ArtifactFamily, Citation, DraftArtifact, ProposalRequest, Severity, SkipReason,
    StackProfile, ValidationOutcome, ValidationReport, ValidationStatus,
};

/// Findings listed per validator before the rest are summarized.
const MAX_LISTED_FINDINGS: usize = 10;

/// Inputs to one proposal, borrowed from the run.
pub struct ProposalInputs<'a> {
    pub run_id: &'a str,
    pub repository: &'a str,
    pub service: &'a str,
    pub profile: &'a StackProfile,
    pub draft: &'a DraftArtifact,
    pub validation_report: &'a ValidationReport,
    pub citations: &'a [Citation],
}

pub fn build_request(inputs: &ProposalInputs<'_>, branch_prefix: &str) -> ProposalRequest {
    ProposalRequest {
        target_repository: inputs.repository.to_string(),
        branch_name: branch_name(branch_prefix, inputs.draft.family, inputs.run_id),
        files: inputs.draft.files.clone(),
        title: title(inputs.draft.family, inputs.service),
        description: description(inputs),
        validation_report: inputs.validation_report.clone(),
        citations: inputs.citations.to_vec(),
    }
}

/// `{prefix}/{family}-{first 8 hex digits of the run id}`.
pub fn branch_name(prefix: &str, family: ArtifactFamily, run_id: &str) -> String {
    let short: String = run_id.chars().filter(|c| *c != '-').take(8).collect();
    format!("{}/{family}-{short}", prefix.trim_end_matches('/'))
}

pub fn title(family: ArtifactFamily, service: &str) -> String {
    match family {
        ArtifactFamily::Pipeline => format!("ci: add CI/CD pipeline for {service}"),
        ArtifactFamily::Infrastructure => {
            format!("infra: add infrastructure configuration for {service}")
        }
        ArtifactFamily::Monitoring => format!("monitoring: add SLO alert rules for {service}"),
    }
}

pub fn description(inputs: &ProposalInputs<'_>) -> String {
    let draft = inputs.draft;
    let profile = inputs.profile;
    let stack = match profile.framework.as_deref() {
        Some(framework) => format!("{} ({framework})", profile.primary_language),
        None => profile.primary_language.to_string(),
    };

    let mut out = String::from("## Summary\n\n");
    out.push_str(&format!(
        "Proposed {} configuration for {} on {}, for a {stack} repository{}.\n",
        draft.family,
        inputs.service,
        draft.platform,
        if profile.has_container_descriptor {
            " with a container build"
        } else {
            ""
        },
    ));
    out.push_str(&format!(
        "Generated by fops run `{}`. Nothing has been applied; review before merging.\n",
        inputs.run_id
    ));

    out.push_str("\n## Files\n\n");
    for path in draft.files.keys() {
        out.push_str(&format!("- `{path}`\n"));
    }

    out.push_str("\n## Validation\n\n");
    let report = inputs.validation_report;
    if report.outcomes.is_empty() {
        out.push_str("No validators are configured for this platform.\n");
    } else {
        out.push_str(&format!("{}.\n\n", report.summary()));
        for outcome in &report.outcomes {
            push_outcome(&mut out, outcome);
        }
    }

    out.push_str("\n## Sources\n\n");
    if inputs.citations.is_empty() {
        out.push_str("No knowledge sources were used; generated from built-in templates.\n");
    } else {
        out.push_str(&fops_citation::numbered_markdown(inputs.citations));
    }
    out
}

fn push_outcome(out: &mut String, outcome: &ValidationOutcome) {
    let verdict = match (outcome.status, outcome.skip_reason) {
        (ValidationStatus::Passed, _) => "passed".to_string(),
        (ValidationStatus::Failed, _) => {
            format!("failed, {} finding(s)", outcome.findings.len())
        }
        (ValidationStatus::Skipped, Some(reason)) => format!("skipped ({})", skip_label(reason)),
        (ValidationStatus::Skipped, None) => "skipped".to_string(),
    };
    out.push_str(&format!("- `{}`: {verdict}\n", outcome.check_name));
    if outcome.status != ValidationStatus::Failed {
        return;
    }
    for finding in outcome.findings.iter().take(MAX_LISTED_FINDINGS) {
        let message = finding.message.lines().next().unwrap_or_default();
        match &finding.location {
            Some(location) => out.push_str(&format!(
                "  - {} at `{location}`: {message}\n",
                severity_label(finding.severity)
            )),
            None => out.push_str(&format!(
                "  - {}: {message}\n",
                severity_label(finding.severity)
            )),
        }
    }
    let rest = outcome.findings.len().saturating_sub(MAX_LISTED_FINDINGS);
    if rest > 0 {
        out.push_str(&format!("  - … and {rest} more\n"));
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "info",
        Severity::Warning => "warning",
        Severity::Error => "error",
    }
}

fn skip_label(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::NotInstalled => "not installed",
        SkipReason::TimedOut => "timed out",
        SkipReason::Crashed => "crashed",
        SkipReason::Disabled => "disabled",
    }
}
