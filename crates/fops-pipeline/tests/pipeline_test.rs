//! End-to-end runs with fake collaborators: audit sink, submitter and
//! validator tools. Real classifier, retriever, composer and runner.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use fops_audit::JsonlAuditLog;
use fops_compose::CompositionRequest;
use fops_core::config::RetrievalConfig;
use fops_core::errors::{AuditError, SubmissionError, ToolError};
use fops_core::models::{
    ArtifactFamily, AuditRecord, DiagnosticFormat, KnowledgeItem, KnowledgePartition, Language,
    Platform, ProposalReference, ProposalRequest, SkipReason, Stage, TerminalStatus, ToolOutput,
    ValidationStatus,
};
use fops_core::traits::{IAuditSink, IProposalSubmitter, IValidatorTool};
use fops_core::FopsConfig;
use fops_knowledge::{HashingEmbedder, MemoryKnowledgeStore};
use fops_pipeline::{ProposalPipeline, RunOutcome};
use fops_stack::RepositorySnapshot;
use fops_validation::{SyntaxTool, ValidatorCatalog};

// ---- Fakes ----

#[derive(Default)]
struct MemorySink {
    records: Mutex<Vec<AuditRecord>>,
    fail: bool,
}

impl MemorySink {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl IAuditSink for MemorySink {
    fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
        if self.fail {
            return Err(AuditError::Io {
                path: "memory".into(),
                reason: "disk full".into(),
            });
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

#[derive(Default)]
struct FakeSubmitter {
    requests: Mutex<Vec<ProposalRequest>>,
    unreachable: bool,
}

impl FakeSubmitter {
    fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    fn requests(&self) -> Vec<ProposalRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl IProposalSubmitter for FakeSubmitter {
    fn submit(&self, request: &ProposalRequest) -> Result<ProposalReference, SubmissionError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.unreachable {
            return Err(SubmissionError::Unreachable {
                reason: "connection refused".into(),
            });
        }
        Ok(ProposalReference {
            uri: format!("https://git.example/pr/{}", request.branch_name),
        })
    }
}

enum Behavior {
    Pass,
    Fail,
    Sleep(Duration),
    NotInstalled,
}

struct FakeTool {
    name: &'static str,
    behavior: Behavior,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl IValidatorTool for FakeTool {
    fn name(&self) -> &str {
        self.name
    }

    fn diagnostics(&self) -> DiagnosticFormat {
        DiagnosticFormat::LineColumn
    }

    async fn invoke(&self, _workdir: &Path, _files: &[String]) -> Result<ToolOutput, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let ok = ToolOutput {
            exit_status: Some(0),
            ..ToolOutput::default()
        };
        match self.behavior {
            Behavior::Pass => Ok(ok),
            Behavior::Fail => Ok(ToolOutput {
                exit_status: Some(1),
                stdout: ".github/workflows/pipeline.yml:3:1: [error] bad indentation\n".into(),
                stderr: String::new(),
            }),
            Behavior::Sleep(d) => {
                tokio::time::sleep(d).await;
                Ok(ok)
            }
            Behavior::NotInstalled => Err(ToolError::NotInstalled {
                binary: self.name.to_string(),
            }),
        }
    }
}

fn tool(name: &'static str, behavior: Behavior) -> (Arc<dyn IValidatorTool>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let tool: Arc<dyn IValidatorTool> = Arc::new(FakeTool {
        name,
        behavior,
        calls: Arc::clone(&calls),
    });
    (tool, calls)
}

// ---- Fixtures ----

fn item(id: &str, tags: &[&str], text: &str) -> KnowledgeItem {
    KnowledgeItem {
        id: id.to_string(),
        text: text.to_string(),
        embedding: Vec::new(),
        tags: tags.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>(),
        source_uri: format!("https://kb.example.com/{id}"),
        title: Some(format!("Guide {id}")),
        updated_at: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
    }
}

fn empty_store() -> MemoryKnowledgeStore {
    let config = RetrievalConfig::default();
    MemoryKnowledgeStore::from_config(
        Arc::new(HashingEmbedder::new(config.embedding_dimensions)),
        &config,
    )
    .with_all_partitions()
}

fn pipeline_store() -> Arc<MemoryKnowledgeStore> {
    let mut store = empty_store();
    store
        .insert(
            KnowledgePartition::Pipelines,
            item("py-ci", &["test"], "python pipeline pytest pip install build test container"),
        )
        .unwrap();
    store
        .insert(
            KnowledgePartition::Pipelines,
            item("docker-ci", &["build"], "docker build push container image pipeline"),
        )
        .unwrap();
    store
        .insert(
            KnowledgePartition::Policies,
            item("sast-policy", &["security-scan"], "security scan policy run a SAST scanner on every push"),
        )
        .unwrap();
    Arc::new(store)
}

fn python_container_snapshot() -> RepositorySnapshot {
    RepositorySnapshot::from_entries([
        (
            "pyproject.toml",
            "[project]\nname = \"payments\"\ndependencies = [\"fastapi\"]\n",
        ),
        ("Dockerfile", "FROM python:3.12-slim\n"),
        ("app/main.py", ""),
        ("tests/test_api.py", ""),
    ])
}

fn two_env_request(family: ArtifactFamily) -> CompositionRequest {
    let mut request = CompositionRequest::new(family, "https://github.com/acme/payments");
    request.environments = vec!["staging".to_string(), "prod".to_string()];
    request
}

fn pipeline(
    config: FopsConfig,
    store: Arc<MemoryKnowledgeStore>,
    sink: &Arc<MemorySink>,
    submitter: &Arc<FakeSubmitter>,
    catalog: ValidatorCatalog,
) -> ProposalPipeline {
    let sink: Arc<dyn IAuditSink> = Arc::clone(sink) as Arc<dyn IAuditSink>;
    let submitter: Arc<dyn IProposalSubmitter> = Arc::clone(submitter) as Arc<dyn IProposalSubmitter>;
    ProposalPipeline::new(config, store, sink, submitter).with_catalog(catalog)
}

fn yaml_catalog(extra: Vec<Arc<dyn IValidatorTool>>) -> ValidatorCatalog {
    let mut tools: Vec<Arc<dyn IValidatorTool>> = vec![Arc::new(SyntaxTool::yaml())];
    tools.extend(extra);
    ValidatorCatalog::empty().with(Platform::GithubActions, tools)
}

// ---- Tests ----

#[tokio::test]
async fn python_container_two_environment_pipeline_succeeds() {
    let sink = Arc::new(MemorySink::default());
    let submitter = Arc::new(FakeSubmitter::default());
    let (lint, lint_calls) = tool("lint", Behavior::Pass);
    let (absent, _) = tool("absent-linter", Behavior::NotInstalled);
    let pipeline = pipeline(
        FopsConfig::default(),
        pipeline_store(),
        &sink,
        &submitter,
        yaml_catalog(vec![lint, absent]),
    );

    let outcome = pipeline
        .run(&python_container_snapshot(), &two_env_request(ArtifactFamily::Pipeline))
        .await;

    assert!(outcome.is_proposed(), "{outcome:?}");
    assert_eq!(outcome.status(), TerminalStatus::Succeeded);
    let report = outcome.report();
    assert_eq!(report.stack_profile.primary_language, Language::Python);
    assert!(report.stack_profile.has_container_descriptor);

    let syntax = report.validation_report.get("yaml-syntax").unwrap();
    assert_eq!(syntax.status, ValidationStatus::Passed);
    assert_eq!(lint_calls.load(Ordering::SeqCst), 1);
    let absent = report.validation_report.get("absent-linter").unwrap();
    assert_eq!(absent.skip_reason, Some(SkipReason::NotInstalled));
    assert!(report
        .degradations
        .iter()
        .any(|d| d.failure == "absent-linter: not installed"));

    let draft = report.draft.as_ref().unwrap();
    let workflow = &draft.files[".github/workflows/pipeline.yml"];
    for job in ["build:", "test:", "security-scan:", "deploy-staging:", "deploy-prod:"] {
        assert!(workflow.contains(job), "missing {job}");
    }

    let ids: Vec<&str> = report.citations.iter().map(|c| c.item_id.as_str()).collect();
    let unique: BTreeSet<&str> = ids.iter().copied().collect();
    assert_eq!(ids.len(), unique.len());
    assert!(ids.contains(&"sast-policy"));

    let requests = submitter.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert!(request.branch_name.starts_with("fops/pipeline-"));
    assert_eq!(request.title, "ci: add CI/CD pipeline for payments");
    assert_eq!(request.files, draft.files);
    assert!(request.description.contains("## Sources"));

    let records = sink.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].run_id, outcome.run_id());
    assert_eq!(records[0].terminal_status, TerminalStatus::Succeeded);
    assert_eq!(records[0].draft_artifact_digest.as_deref(), Some(draft.digest().as_str()));
    assert_eq!(records[0].retrieval_queries.len(), 2);
    assert!(records[0].proposal_reference.is_none());
    assert_eq!(records[1].supersedes.as_deref(), Some(outcome.run_id()));
    assert_eq!(records[1].proposal_reference.as_ref(), outcome.reference());
    assert_eq!(report.audit_record_id.as_deref(), Some(records[1].run_id.as_str()));
}

#[tokio::test]
async fn unterminated_block_aborts_before_validation_and_submission() {
    let mut store = empty_store();
    store
        .insert(
            KnowledgePartition::Iac,
            item(
                "iac-extra",
                &["workload"],
                "resource \"kubernetes_config_map_v1\" \"extra\" {\n  metadata {\n    name = \"extra\"\n  }\n",
            ),
        )
        .unwrap();
    let sink = Arc::new(MemorySink::default());
    let submitter = Arc::new(FakeSubmitter::default());
    let (checker, checker_calls) = tool("terraform-check", Behavior::Pass);
    let catalog = ValidatorCatalog::empty().with(Platform::Terraform, vec![checker]);
    let pipeline = pipeline(FopsConfig::default(), Arc::new(store), &sink, &submitter, catalog);

    let outcome = pipeline
        .run(&python_container_snapshot(), &two_env_request(ArtifactFamily::Infrastructure))
        .await;

    assert_eq!(outcome.status(), TerminalStatus::CompositionFailed);
    assert_eq!(outcome.failed_stage(), Some(Stage::Composition));
    assert!(outcome.report().draft.is_none());
    assert_eq!(checker_calls.load(Ordering::SeqCst), 0);
    assert!(submitter.requests().is_empty());

    let records = sink.records();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.terminal_status, TerminalStatus::CompositionFailed);
    assert!(record.draft_artifact_digest.is_none());
    assert!(record.validation_report.outcomes.is_empty());
    let failure = record.failure.as_ref().unwrap();
    assert_eq!(failure.stage, Stage::Composition);
    assert!(failure.reason.contains("main.tf"), "{}", failure.reason);
}

#[tokio::test]
async fn empty_knowledge_store_still_succeeds_without_citations() {
    let sink = Arc::new(MemorySink::default());
    let submitter = Arc::new(FakeSubmitter::default());
    let pipeline = pipeline(
        FopsConfig::default(),
        Arc::new(empty_store()),
        &sink,
        &submitter,
        yaml_catalog(Vec::new()),
    );
    let snapshot = RepositorySnapshot::from_entries([("README.md", "# notes\n"), ("LICENSE", "")]);

    let outcome = pipeline
        .run(&snapshot, &two_env_request(ArtifactFamily::Pipeline))
        .await;

    assert_eq!(outcome.status(), TerminalStatus::Succeeded);
    let report = outcome.report();
    assert!(report.stack_profile.is_unknown());
    assert!(report.citations.is_empty());
    let components: Vec<&str> = report.degradations.iter().map(|d| d.component.as_str()).collect();
    assert!(components.contains(&"stack_classifier"));
    assert!(components.contains(&"knowledge_retriever"));
    assert!(report.draft.as_ref().unwrap().provenance.is_empty());

    let requests = submitter.requests();
    assert!(requests[0].citations.is_empty());
    assert!(requests[0].description.contains("generated from built-in templates"));
    assert_eq!(sink.records()[0].degradations.len(), report.degradations.len());
}

#[tokio::test]
async fn timed_out_validator_marks_run_incomplete_but_still_proposes() {
    let mut config = FopsConfig::default();
    config.validation.timeout_secs = 1;
    let sink = Arc::new(MemorySink::default());
    let submitter = Arc::new(FakeSubmitter::default());
    let (slow, _) = tool("slow-linter", Behavior::Sleep(Duration::from_secs(30)));
    let pipeline = pipeline(config, pipeline_store(), &sink, &submitter, yaml_catalog(vec![slow]));

    let started = Instant::now();
    let outcome = pipeline
        .run(&python_container_snapshot(), &two_env_request(ArtifactFamily::Pipeline))
        .await;

    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(outcome.is_proposed());
    assert_eq!(outcome.status(), TerminalStatus::ValidationIncomplete);
    let slow = outcome.report().validation_report.get("slow-linter").unwrap();
    assert_eq!(slow.status, ValidationStatus::Skipped);
    assert_eq!(slow.skip_reason, Some(SkipReason::TimedOut));
    assert_eq!(submitter.requests().len(), 1);
    assert_eq!(sink.records()[0].terminal_status, TerminalStatus::ValidationIncomplete);
}

#[tokio::test]
async fn failed_validator_blocks_submission_when_configured() {
    let mut config = FopsConfig::default();
    config.validation.submit_on_failure = false;
    let sink = Arc::new(MemorySink::default());
    let submitter = Arc::new(FakeSubmitter::default());
    let (strict, _) = tool("strict-linter", Behavior::Fail);
    let pipeline = pipeline(config, pipeline_store(), &sink, &submitter, yaml_catalog(vec![strict]));

    let outcome = pipeline
        .run(&python_container_snapshot(), &two_env_request(ArtifactFamily::Pipeline))
        .await;

    assert_eq!(outcome.status(), TerminalStatus::ValidationFailed);
    assert_eq!(outcome.failed_stage(), Some(Stage::Validation));
    assert!(submitter.requests().is_empty());
    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].terminal_status, TerminalStatus::ValidationFailed);
    assert!(records[0]
        .failure
        .as_ref()
        .unwrap()
        .reason
        .contains("strict-linter"));
}

#[tokio::test]
async fn failed_validator_is_submitted_by_default() {
    let sink = Arc::new(MemorySink::default());
    let submitter = Arc::new(FakeSubmitter::default());
    let (strict, _) = tool("strict-linter", Behavior::Fail);
    let pipeline = pipeline(
        FopsConfig::default(),
        pipeline_store(),
        &sink,
        &submitter,
        yaml_catalog(vec![strict]),
    );

    let outcome = pipeline
        .run(&python_container_snapshot(), &two_env_request(ArtifactFamily::Pipeline))
        .await;

    assert_eq!(outcome.status(), TerminalStatus::Succeeded);
    let requests = submitter.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].description.contains("`strict-linter`: failed, 1 finding(s)"));
}

#[tokio::test]
async fn submission_failure_is_appended_as_a_correction() {
    let dir = tempfile::tempdir().unwrap();
    let log = Arc::new(JsonlAuditLog::open(dir.path().join("audit.jsonl")).unwrap());
    let submitter = Arc::new(FakeSubmitter::unreachable());
    let pipeline = ProposalPipeline::new(
        FopsConfig::default(),
        pipeline_store(),
        Arc::clone(&log) as Arc<dyn IAuditSink>,
        Arc::clone(&submitter) as Arc<dyn IProposalSubmitter>,
    )
    .with_catalog(yaml_catalog(Vec::new()));

    let outcome = pipeline
        .run(&python_container_snapshot(), &two_env_request(ArtifactFamily::Pipeline))
        .await;

    assert_eq!(outcome.status(), TerminalStatus::SubmissionFailed);
    assert_eq!(outcome.failed_stage(), Some(Stage::Submission));
    assert_eq!(submitter.requests().len(), 1);

    let records = log.read_all().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].terminal_status, TerminalStatus::Succeeded);
    assert_eq!(records[1].terminal_status, TerminalStatus::SubmissionFailed);
    let resolved = log.resolve(outcome.run_id()).unwrap().unwrap();
    assert_eq!(resolved.run_id, records[1].run_id);
    assert!(resolved
        .failure
        .as_ref()
        .unwrap()
        .reason
        .contains("connection refused"));

    let stats = log.stats().unwrap();
    assert_eq!(stats.count(TerminalStatus::SubmissionFailed), 1);
    assert_eq!(stats.count(TerminalStatus::Succeeded), 0);
}

#[tokio::test]
async fn audit_failure_prevents_submission() {
    let sink = Arc::new(MemorySink::failing());
    let submitter = Arc::new(FakeSubmitter::default());
    let pipeline = pipeline(
        FopsConfig::default(),
        pipeline_store(),
        &sink,
        &submitter,
        yaml_catalog(Vec::new()),
    );

    let outcome = pipeline
        .run(&python_container_snapshot(), &two_env_request(ArtifactFamily::Pipeline))
        .await;

    assert_eq!(outcome.failed_stage(), Some(Stage::Audit));
    assert!(outcome.report().audit_record_id.is_none());
    assert!(submitter.requests().is_empty());
}

#[tokio::test]
async fn runs_get_distinct_ids() {
    let sink = Arc::new(MemorySink::default());
    let submitter = Arc::new(FakeSubmitter::default());
    let pipeline = pipeline(
        FopsConfig::default(),
        pipeline_store(),
        &sink,
        &submitter,
        yaml_catalog(Vec::new()),
    );
    let snapshot = python_container_snapshot();
    let request = two_env_request(ArtifactFamily::Pipeline);

    let a = pipeline.run(&snapshot, &request).await;
    let b = pipeline.run(&snapshot, &request).await;

    assert_ne!(a.run_id(), b.run_id());
    let requests = submitter.requests();
    assert_ne!(requests[0].branch_name, requests[1].branch_name);
    assert_eq!(requests[0].files, requests[1].files);
    assert!(matches!(a, RunOutcome::Proposed { .. }));
}

#[tokio::test]
async fn local_pipeline_writes_log_and_bundle_under_the_checkout() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(
        root.path().join("pyproject.toml"),
        "[project]\nname = \"payments\"\n",
    )
    .unwrap();
    std::fs::write(root.path().join("Dockerfile"), "FROM python:3.12-slim\n").unwrap();

    let pipeline = ProposalPipeline::local(FopsConfig::default(), root.path(), pipeline_store())
        .unwrap()
        .with_catalog(yaml_catalog(Vec::new()));
    let outcome = pipeline
        .run_checkout(root.path(), &two_env_request(ArtifactFamily::Pipeline))
        .await;

    assert_eq!(outcome.status(), TerminalStatus::Succeeded);
    let reference = outcome.reference().unwrap();
    assert!(reference.uri.starts_with("file://"));
    let bundle = Path::new(reference.uri.trim_start_matches("file://"));
    assert!(bundle.join("changes.diff").is_file());
    assert!(bundle.join("files/.github/workflows/pipeline.yml").is_file());

    let log = JsonlAuditLog::open(root.path().join("audit/fops-audit.jsonl")).unwrap();
    let records = log.read_all().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(
        records[1].proposal_reference.as_ref().map(|r| r.uri.as_str()),
        Some(reference.uri.as_str())
    );
}
