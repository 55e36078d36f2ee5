//! Parsers from raw validator output to findings, one per diagnostic format.

use std::sync::LazyLock;

use fops_core::models::{DiagnosticFormat, Finding, Severity, ToolOutput};
use regex::Regex;
use serde::Deserialize;

static LINE_COLUMN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^(?P<file>[^:\s][^:]*):(?P<line>\d+):(?P<col>\d+):\s*(?:\[(?P<level>[A-Za-z]+)\]\s*)?(?P<msg>.+)$").ok()
});

static HELM_LINT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^\[(?P<level>INFO|WARNING|ERROR)\]\s*(?P<path>[^:]+):\s*(?P<msg>.+)$").ok()
});

/// Extract findings from `output`. An empty result for a non-zero exit
/// means the tool spoke a format we could not parse.
pub fn parse(format: DiagnosticFormat, output: &ToolOutput) -> Vec<Finding> {
    match format {
        DiagnosticFormat::LineColumn => line_column(output),
        DiagnosticFormat::TerraformJson => terraform_json(&output.stdout),
        DiagnosticFormat::HelmLint => helm_lint(output),
        DiagnosticFormat::PlainText => plain_text(output),
    }
}

fn lines(output: &ToolOutput) -> impl Iterator<Item = &str> {
    output
        .stdout
        .lines()
        .chain(output.stderr.lines())
        .map(str::trim)
        .filter(|l| !l.is_empty())
}

fn line_column(output: &ToolOutput) -> Vec<Finding> {
    let Some(re) = LINE_COLUMN.as_ref() else {
        return Vec::new();
    };
    lines(output)
        .filter_map(|l| re.captures(l))
        .map(|c| {
            let severity = c
                .name("level")
                .map_or(Severity::Error, |m| Severity::from_label(m.as_str()));
            Finding::new(severity, c["msg"].trim()).at(format!(
                "{}:{}:{}",
                &c["file"], &c["line"], &c["col"]
            ))
        })
        .collect()
}

#[derive(Deserialize)]
struct TerraformReport {
    #[serde(default)]
    diagnostics: Vec<TerraformDiagnostic>,
}

#[derive(Deserialize)]
struct TerraformDiagnostic {
    severity: String,
    summary: String,
    #[serde(default)]
    detail: String,
    #[serde(default)]
    range: Option<TerraformRange>,
}

#[derive(Deserialize)]
struct TerraformRange {
    filename: String,
    start: TerraformPos,
}

#[derive(Deserialize)]
struct TerraformPos {
    line: u64,
}

fn terraform_json(stdout: &str) -> Vec<Finding> {
    let Ok(report) = serde_json::from_str::<TerraformReport>(stdout) else {
        return Vec::new();
    };
    report
        .diagnostics
        .into_iter()
        .map(|d| {
            let message = if d.detail.is_empty() {
                d.summary
            } else {
                format!("{}: {}", d.summary, d.detail)
            };
            let finding = Finding::new(Severity::from_label(&d.severity), message);
            match d.range {
                Some(r) => finding.at(format!("{}:{}", r.filename, r.start.line)),
                None => finding,
            }
        })
        .collect()
}

fn helm_lint(output: &ToolOutput) -> Vec<Finding> {
    let Some(re) = HELM_LINT.as_ref() else {
        return Vec::new();
    };
    lines(output)
        .filter_map(|l| re.captures(l))
        .map(|c| {
            Finding::new(Severity::from_label(&c["level"]), c["msg"].trim()).at(c["path"].trim())
        })
        .collect()
}

fn plain_text(output: &ToolOutput) -> Vec<Finding> {
    lines(output)
        .filter(|l| {
            let lower = l.to_ascii_lowercase();
            lower.contains("error") || lower.contains("failed") || lower.starts_with("--- ")
        })
        .map(|l| Finding::new(Severity::Error, l))
        .collect()
}
