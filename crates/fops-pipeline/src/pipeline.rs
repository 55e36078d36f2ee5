//! Run orchestrator.
//!
//! Classify → Retrieve → Cite → Compose → Validate → Audit → Submit.
//! Each stage consumes the whole output of the previous one. The audit
//! record is durably written before the submitter is called; the
//! submission outcome is appended as a record superseding it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use fops_audit::JsonlAuditLog;
use fops_citation::CitationTracker;
use fops_compose::{CompositionEngine, CompositionRequest};
use fops_core::constants::AUDIT_SCHEMA_VERSION;
use fops_core::errors::{AuditError, FopsResult};
use fops_core::models::{
    AuditRecord, DegradationEvent, SkipReason, Stage, StageFailure, TerminalStatus,
    ValidationReport, ValidationStatus,
};
use fops_core::traits::{IAuditSink, IKnowledgeStore, IProposalSubmitter};
use fops_core::tracing_setup::events;
use fops_core::{run_span, submit_span, FopsConfig};
use fops_knowledge::{retrieval_plan, KnowledgeRetriever};
use fops_stack::{RepositorySnapshot, SnapshotLimits, StackClassifier};
use fops_validation::{ValidationRunner, ValidatorCatalog};
use tracing::Instrument;
use uuid::Uuid;

use crate::outcome::{RunOutcome, RunReport};
use crate::proposal::{self, ProposalInputs};
use crate::submitter::LocalBundleSubmitter;

const CLASSIFIER: &str = "stack_classifier";
const VALIDATOR: &str = "validation_runner";

pub struct ProposalPipeline {
    config: FopsConfig,
    classifier: StackClassifier,
    retriever: KnowledgeRetriever,
    composer: CompositionEngine,
    validator: ValidationRunner,
    audit: Arc<dyn IAuditSink>,
    submitter: Arc<dyn IProposalSubmitter>,
}

impl ProposalPipeline {
    /// Pipeline with the standard validator catalog. Each stage gets its
    /// own section of `config`.
    pub fn new(
        config: FopsConfig,
        store: Arc<dyn IKnowledgeStore>,
        audit: Arc<dyn IAuditSink>,
        submitter: Arc<dyn IProposalSubmitter>,
    ) -> Self {
        Self {
            classifier: StackClassifier::new(),
            retriever: KnowledgeRetriever::new(store, &config.retrieval),
            composer: CompositionEngine::new(config.composition.clone()),
            validator: ValidationRunner::new(config.validation.clone()),
            audit,
            submitter,
            config,
        }
    }

    /// Pipeline for a checkout at `root`: JSONL audit log and local bundle
    /// submitter at the configured paths, relative to `root` unless absolute.
    pub fn local(
        config: FopsConfig,
        root: &Path,
        store: Arc<dyn IKnowledgeStore>,
    ) -> FopsResult<Self> {
        let log = JsonlAuditLog::open(under(root, &config.audit.log_path))?;
        let submitter =
            LocalBundleSubmitter::new(under(root, &config.submission.bundle_dir)).with_checkout(root);
        Ok(Self::new(config, store, Arc::new(log), Arc::new(submitter)))
    }

    pub fn with_catalog(mut self, catalog: ValidatorCatalog) -> Self {
        self.validator = ValidationRunner::with_catalog(self.config.validation.clone(), catalog);
        self
    }

    pub fn config(&self) -> &FopsConfig {
        &self.config
    }

    /// Snapshot the checkout at `root`, then run.
    pub async fn run_checkout(&self, root: &Path, request: &CompositionRequest) -> RunOutcome {
        let snapshot = RepositorySnapshot::from_dir(root, &SnapshotLimits::default());
        self.run(&snapshot, request).await
    }

    /// Run once. Always returns an outcome; every outcome has been audited
    /// unless the audit sink itself failed.
    pub async fn run(&self, snapshot: &RepositorySnapshot, request: &CompositionRequest) -> RunOutcome {
        let run_id = Uuid::new_v4().to_string();
        let span = run_span!(run_id, request.family);
        let outcome = self.run_inner(run_id, snapshot, request).instrument(span).await;
        events::run_finished(
            outcome.run_id(),
            outcome.status().name(),
            outcome.report().citations.len(),
        );
        outcome
    }

    async fn run_inner(
        &self,
        run_id: String,
        snapshot: &RepositorySnapshot,
        request: &CompositionRequest,
    ) -> RunOutcome {
        let mut degradations = Vec::new();

        // Stage 1: classification.
        let profile = self.classifier.classify(snapshot);
        if profile.is_unknown() {
            degradations.push(degrade(
                CLASSIFIER,
                "no recognizable stack markers".to_string(),
                "generic template family",
            ));
        }

        // Stage 2: retrieval.
        let plan = retrieval_plan(request.resolved_platform(), &profile);
        let retrieval = self.retriever.retrieve_all(&profile, &plan);
        degradations.extend(retrieval.degradations);

        // Stage 3: citations.
        let citations = CitationTracker::collect(&retrieval.results);
        tracing::info!(queries = plan.len(), citations = citations.len(), "retrieval complete");

        let mut record = AuditRecord {
            schema_version: AUDIT_SCHEMA_VERSION,
            run_id: run_id.clone(),
            timestamp: Utc::now(),
            target_repository: request.repository.clone(),
            stack_profile: profile.clone(),
            retrieval_queries: retrieval.queries,
            citations: citations.clone(),
            draft_artifact_digest: None,
            validation_report: ValidationReport::default(),
            terminal_status: TerminalStatus::Succeeded,
            failure: None,
            degradations: Vec::new(),
            proposal_reference: None,
            supersedes: None,
        };
        let mut report = RunReport {
            run_id: run_id.clone(),
            audit_record_id: None,
            stack_profile: profile,
            citations,
            draft: None,
            validation_report: ValidationReport::default(),
            degradations: Vec::new(),
        };

        // Stage 4: composition. A draft that fails its own grammar ends the
        // run before any validator or the submitter sees it.
        let draft = match self
            .composer
            .compose(&report.stack_profile, &retrieval.results, request)
        {
            Ok(draft) => draft,
            Err(e) => {
                tracing::error!(error = %e, "composition failed");
                let failure = StageFailure::new(Stage::Composition, e.to_string());
                record.terminal_status = TerminalStatus::CompositionFailed;
                record.failure = Some(failure.clone());
                record.degradations = degradations.clone();
                report.degradations = degradations;
                if self.append(&record).is_ok() {
                    report.audit_record_id = Some(run_id);
                }
                return RunOutcome::Failed {
                    failure,
                    status: TerminalStatus::CompositionFailed,
                    report,
                };
            }
        };

        // Stage 5: validation.
        let validation_report = self.validator.run(&draft).await;
        degradations.extend(skip_degradations(&validation_report));
        let status = self.terminal_status(&validation_report);
        tracing::info!(
            summary = %validation_report.summary(),
            status = %status,
            "validation complete"
        );

        // Stage 6: audit, before anything leaves the pipeline.
        record.draft_artifact_digest = Some(draft.digest());
        record.validation_report = validation_report.clone();
        record.terminal_status = status;
        record.degradations = degradations.clone();
        if status == TerminalStatus::ValidationFailed {
            record.failure = Some(StageFailure::new(
                Stage::Validation,
                failed_checks(&validation_report),
            ));
        }
        report.validation_report = validation_report;
        report.degradations = degradations;

        if let Err(e) = self.append(&record) {
            report.draft = Some(draft);
            return RunOutcome::Failed {
                failure: StageFailure::new(Stage::Audit, e.to_string()),
                status,
                report,
            };
        }
        report.audit_record_id = Some(run_id.clone());

        if let Some(failure) = record.failure.clone() {
            report.draft = Some(draft);
            return RunOutcome::Failed {
                failure,
                status,
                report,
            };
        }

        // Stage 7: submission. One call, never retried.
        let service = request.service_name();
        let proposal = proposal::build_request(
            &ProposalInputs {
                run_id: &run_id,
                repository: &request.repository,
                service: &service,
                profile: &report.stack_profile,
                draft: &draft,
                validation_report: &report.validation_report,
                citations: &report.citations,
            },
            &self.config.submission.branch_prefix,
        );
        report.draft = Some(draft);
        let submitted = {
            let _span = submit_span!(run_id, proposal.branch_name).entered();
            self.submitter.submit(&proposal)
        };

        let mut correction = record.superseded_by(Uuid::new_v4().to_string(), Utc::now());
        match submitted {
            Ok(reference) => {
                tracing::info!(reference = %reference, "proposal submitted");
                correction.proposal_reference = Some(reference.clone());
                if self.append(&correction).is_ok() {
                    report.audit_record_id = Some(correction.run_id);
                }
                RunOutcome::Proposed {
                    reference,
                    status,
                    report,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "proposal submission failed");
                let failure = StageFailure::new(Stage::Submission, e.to_string());
                correction.terminal_status = TerminalStatus::SubmissionFailed;
                correction.failure = Some(failure.clone());
                if self.append(&correction).is_ok() {
                    report.audit_record_id = Some(correction.run_id);
                }
                RunOutcome::Failed {
                    failure,
                    status: TerminalStatus::SubmissionFailed,
                    report,
                }
            }
        }
    }

    fn terminal_status(&self, report: &ValidationReport) -> TerminalStatus {
        if report.any_failed() && !self.config.validation.submit_on_failure {
            TerminalStatus::ValidationFailed
        } else if report.is_incomplete() {
            TerminalStatus::ValidationIncomplete
        } else {
            TerminalStatus::Succeeded
        }
    }

    fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
        self.audit.append(record).inspect_err(|e| {
            tracing::error!(run_id = %record.run_id, error = %e, "audit append failed");
        })
    }
}

/// Validators that gave no verdict for reasons other than configuration.
fn skip_degradations(report: &ValidationReport) -> Vec<DegradationEvent> {
    report
        .outcomes
        .iter()
        .filter_map(|o| {
            let reason = match o.skip_reason? {
                SkipReason::Disabled => return None,
                SkipReason::NotInstalled => "not installed",
                SkipReason::TimedOut => "timed out",
                SkipReason::Crashed => "crashed",
            };
            Some(degrade(
                VALIDATOR,
                format!("{}: {reason}", o.check_name),
                "validator skipped",
            ))
        })
        .collect()
}

fn failed_checks(report: &ValidationReport) -> String {
    let names: Vec<&str> = report
        .outcomes
        .iter()
        .filter(|o| o.status == ValidationStatus::Failed)
        .map(|o| o.check_name.as_str())
        .collect();
    format!("validators reported failures: {}", names.join(", "))
}

fn degrade(component: &str, failure: String, fallback: &str) -> DegradationEvent {
    events::degradation_triggered(component, &failure, fallback);
    DegradationEvent::now(component, failure, fallback)
}

fn under(root: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
