//! Validation runner tests with fake validator tools.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use fops_core::config::ValidationConfig;
use fops_core::errors::ToolError;
use fops_core::models::{
    ArtifactFamily, DiagnosticFormat, DraftArtifact, Platform, SkipReason, ToolOutput,
    ValidationStatus,
};
use fops_core::traits::IValidatorTool;
use fops_validation::{ProcessTool, SyntaxTool, ValidationRunner, ValidatorCatalog};

enum Behavior {
    Pass,
    Fail(&'static str),
    Sleep(Duration),
    NotInstalled,
    RequireStaged,
}

struct FakeTool {
    name: &'static str,
    behavior: Behavior,
    calls: Arc<AtomicUsize>,
}

impl FakeTool {
    fn new(name: &'static str, behavior: Behavior) -> Self {
        Self {
            name,
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl IValidatorTool for FakeTool {
    fn name(&self) -> &str {
        self.name
    }

    fn diagnostics(&self) -> DiagnosticFormat {
        DiagnosticFormat::LineColumn
    }

    async fn invoke(&self, workdir: &Path, files: &[String]) -> Result<ToolOutput, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let ok = ToolOutput {
            exit_status: Some(0),
            ..ToolOutput::default()
        };
        match &self.behavior {
            Behavior::Pass => Ok(ok),
            Behavior::Fail(stdout) => Ok(ToolOutput {
                exit_status: Some(1),
                stdout: stdout.to_string(),
                stderr: String::new(),
            }),
            Behavior::Sleep(d) => {
                tokio::time::sleep(*d).await;
                Ok(ok)
            }
            Behavior::NotInstalled => Err(ToolError::NotInstalled {
                binary: self.name.to_string(),
            }),
            Behavior::RequireStaged => {
                assert!(!files.is_empty());
                for f in files {
                    assert!(workdir.join(f).is_file(), "{f} not staged");
                }
                Ok(ok)
            }
        }
    }
}

fn draft(files: &[(&str, &str)]) -> DraftArtifact {
    DraftArtifact {
        family: ArtifactFamily::Pipeline,
        platform: Platform::GithubActions,
        files: files
            .iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect::<BTreeMap<_, _>>(),
        provenance: Vec::new(),
        generated_at: None,
    }
}

fn workflow() -> DraftArtifact {
    draft(&[(".github/workflows/pipeline.yml", "name: ci\njobs:\n  build:\n    runs-on: ubuntu-latest\n")])
}

fn runner(config: ValidationConfig, tools: Vec<Arc<dyn IValidatorTool>>) -> ValidationRunner {
    ValidationRunner::with_catalog(
        config,
        ValidatorCatalog::empty().with(Platform::GithubActions, tools),
    )
}

fn names(report: &fops_core::models::ValidationReport) -> Vec<&str> {
    report.outcomes.iter().map(|o| o.check_name.as_str()).collect()
}

#[tokio::test]
async fn concurrent_outcomes_keep_catalog_order() {
    let tools: Vec<Arc<dyn IValidatorTool>> = vec![
        Arc::new(FakeTool::new("slow", Behavior::Sleep(Duration::from_millis(300)))),
        Arc::new(FakeTool::new("medium", Behavior::Sleep(Duration::from_millis(100)))),
        Arc::new(FakeTool::new("fast", Behavior::Pass)),
    ];
    let report = runner(ValidationConfig::default(), tools).run(&workflow()).await;
    assert_eq!(names(&report), vec!["slow", "medium", "fast"]);
    assert_eq!(report.count(ValidationStatus::Passed), 3);
}

#[tokio::test]
async fn sequential_mode_matches_concurrent() {
    let make = || -> Vec<Arc<dyn IValidatorTool>> {
        vec![
            Arc::new(FakeTool::new("a", Behavior::Pass)),
            Arc::new(FakeTool::new("b", Behavior::Fail("pipeline.yml:2:1: [error] bad key\n"))),
            Arc::new(FakeTool::new("c", Behavior::NotInstalled)),
        ]
    };
    let sequential = ValidationConfig {
        concurrent: false,
        ..ValidationConfig::default()
    };
    let a = runner(sequential, make()).run(&workflow()).await;
    let b = runner(ValidationConfig::default(), make()).run(&workflow()).await;
    assert_eq!(names(&a), names(&b));
    let statuses = |r: &fops_core::models::ValidationReport| {
        r.outcomes.iter().map(|o| o.status).collect::<Vec<_>>()
    };
    assert_eq!(statuses(&a), statuses(&b));
}

#[tokio::test]
async fn timed_out_validator_is_skipped_within_bound() {
    let config = ValidationConfig {
        timeout_secs: 1,
        ..ValidationConfig::default()
    };
    let tools: Vec<Arc<dyn IValidatorTool>> = vec![
        Arc::new(FakeTool::new("hangs", Behavior::Sleep(Duration::from_secs(60)))),
        Arc::new(FakeTool::new("quick", Behavior::Pass)),
    ];
    let started = Instant::now();
    let report = runner(config, tools).run(&workflow()).await;
    assert!(started.elapsed() < Duration::from_secs(10));

    let hung = report.get("hangs").unwrap();
    assert_eq!(hung.status, ValidationStatus::Skipped);
    assert_eq!(hung.skip_reason, Some(SkipReason::TimedOut));
    assert!(report.is_incomplete());
    assert_eq!(report.get("quick").unwrap().status, ValidationStatus::Passed);
}

#[tokio::test]
async fn missing_validator_is_recorded_not_hidden() {
    let tools: Vec<Arc<dyn IValidatorTool>> = vec![
        Arc::new(SyntaxTool::yaml()),
        Arc::new(ProcessTool::new(
            "imaginary-lint",
            "fops-imaginary-lint-binary",
            DiagnosticFormat::LineColumn,
        )),
    ];
    let report = runner(ValidationConfig::default(), tools).run(&workflow()).await;
    assert_eq!(names(&report), vec!["yaml-syntax", "imaginary-lint"]);
    assert_eq!(report.outcomes[0].status, ValidationStatus::Passed);
    let missing = &report.outcomes[1];
    assert_eq!(missing.status, ValidationStatus::Skipped);
    assert_eq!(missing.skip_reason, Some(SkipReason::NotInstalled));
    assert!(!report.is_incomplete());
}

#[tokio::test]
async fn disabled_validator_is_never_invoked() {
    let tool = FakeTool::new("actionlint", Behavior::Pass);
    let calls = Arc::clone(&tool.calls);
    let config = ValidationConfig {
        disabled: vec!["actionlint".to_string()],
        ..ValidationConfig::default()
    };
    let tool: Arc<dyn IValidatorTool> = Arc::new(tool);
    let report = runner(config, vec![tool]).run(&workflow()).await;
    assert_eq!(report.outcomes[0].skip_reason, Some(SkipReason::Disabled));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failures_carry_findings() {
    let tools: Vec<Arc<dyn IValidatorTool>> = vec![Arc::new(FakeTool::new(
        "yamllint",
        Behavior::Fail(".github/workflows/pipeline.yml:4:5: [error] wrong indentation (indentation)\n"),
    ))];
    let report = runner(ValidationConfig::default(), tools).run(&workflow()).await;
    let outcome = &report.outcomes[0];
    assert_eq!(outcome.status, ValidationStatus::Failed);
    assert_eq!(outcome.findings.len(), 1);
    assert_eq!(
        outcome.findings[0].location.as_deref(),
        Some(".github/workflows/pipeline.yml:4:5")
    );
    assert!(report.any_failed());
}

#[tokio::test]
async fn draft_is_staged_for_every_tool() {
    let d = draft(&[
        ("main.tf", "a = 1\n"),
        ("environments/prod/terraform.tfvars", "environment = \"prod\"\n"),
    ]);
    let tools: Vec<Arc<dyn IValidatorTool>> =
        vec![Arc::new(FakeTool::new("staged", Behavior::RequireStaged))];
    let report = runner(ValidationConfig::default(), tools).run(&d).await;
    assert_eq!(report.outcomes[0].status, ValidationStatus::Passed);
}

#[tokio::test]
async fn syntax_tool_reads_staged_copy() {
    let d = draft(&[(".github/workflows/pipeline.yml", "jobs: [build\n")]);
    let tools: Vec<Arc<dyn IValidatorTool>> = vec![Arc::new(SyntaxTool::yaml())];
    let report = runner(ValidationConfig::default(), tools).run(&d).await;
    let outcome = &report.outcomes[0];
    assert_eq!(outcome.status, ValidationStatus::Failed);
    assert!(outcome.findings[0]
        .location
        .as_deref()
        .unwrap()
        .starts_with(".github/workflows/pipeline.yml:"));
}

#[tokio::test]
async fn platform_without_validators_gives_empty_report() {
    let report = ValidationRunner::with_catalog(ValidationConfig::default(), ValidatorCatalog::empty())
        .run(&workflow())
        .await;
    assert!(report.outcomes.is_empty());
}

#[cfg(unix)]
mod process {
    use super::*;

    fn sh(name: &str, script: &str) -> Arc<dyn IValidatorTool> {
        Arc::new(ProcessTool::new(name, "sh", DiagnosticFormat::LineColumn).args(["-c", script]))
    }

    #[tokio::test]
    async fn process_exit_codes_are_classified() {
        let tools = vec![
            sh("ok", "exit 0"),
            sh("bad", "echo 'pipeline.yml:1:1: [error] nope'; exit 1"),
            sh("opaque", "echo kaboom >&2; exit 3"),
        ];
        let report = runner(ValidationConfig::default(), tools).run(&workflow()).await;
        assert_eq!(report.outcomes[0].status, ValidationStatus::Passed);
        assert_eq!(report.outcomes[1].findings[0].message, "nope");
        assert_eq!(report.outcomes[2].status, ValidationStatus::Failed);
        assert!(report.outcomes[2].findings[0].message.contains("kaboom"));
    }

    #[tokio::test]
    async fn process_runs_in_staging_dir() {
        let tools = vec![sh("ls", "test -f .github/workflows/pipeline.yml")];
        let report = runner(ValidationConfig::default(), tools).run(&workflow()).await;
        assert_eq!(report.outcomes[0].status, ValidationStatus::Passed);
    }

    #[tokio::test]
    async fn hung_process_is_killed_at_timeout() {
        let config = ValidationConfig {
            timeout_secs: 1,
            ..ValidationConfig::default()
        };
        let started = Instant::now();
        let report = runner(config, vec![sh("sleepy", "sleep 30")]).run(&workflow()).await;
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(report.outcomes[0].skip_reason, Some(SkipReason::TimedOut));
    }
}
