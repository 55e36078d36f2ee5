use std::collections::{BTreeMap, BTreeSet};

use chrono::{TimeZone, Utc};
use fops_core::errors::*;
use fops_core::models::*;

fn item(id: &str, title: Option<&str>) -> KnowledgeItem {
    KnowledgeItem {
        id: id.to_string(),
        text: "run pytest".to_string(),
        embedding: Vec::new(),
        tags: BTreeSet::from(["test".to_string()]),
        source_uri: format!("https://kb.example/{id}"),
        title: title.map(str::to_string),
        updated_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
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

#[test]
fn citation_label_prefers_title() {
    let c = Citation::from_item(&item("pipelines/py-ci", Some("Python CI")));
    assert_eq!(c.item_id, "pipelines/py-ci");
    assert_eq!(c.display_label, "Python CI (https://kb.example/pipelines/py-ci)");
}

#[test]
fn citation_label_is_single_line() {
    let c = Citation::from_item(&item("build", Some("Build guide\nsecond line\tof title\u{7}")));
    assert_eq!(
        c.display_label,
        "Build guide second line of title (https://kb.example/build)"
    );
    assert!(!c.display_label.chars().any(char::is_control));
}

#[test]
fn citation_label_falls_back_to_id() {
    let c = Citation::from_item(&item("policies/sast", Some("   ")));
    assert_eq!(c.display_label, "policies/sast (https://kb.example/policies/sast)");
}

#[test]
fn knowledge_item_deserializes_without_optional_fields() {
    let json = r#"{"id":"a","text":"t","source_uri":"s","updated_at":"2024-01-01T00:00:00Z"}"#;
    let item: KnowledgeItem = serde_json::from_str(json).unwrap();
    assert!(item.embedding.is_empty());
    assert!(item.tags.is_empty());
    assert!(item.title.is_none());
}

#[test]
fn digest_is_stable_and_content_sensitive() {
    let a = draft(&[("a.yml", "x: 1\n"), ("b.yml", "y: 2\n")]);
    let b = draft(&[("b.yml", "y: 2\n"), ("a.yml", "x: 1\n")]);
    let c = draft(&[("a.yml", "x: 2\n"), ("b.yml", "y: 2\n")]);
    assert_eq!(a.digest(), b.digest());
    assert_ne!(a.digest(), c.digest());
    assert_eq!(a.digest().len(), 64);
}

#[test]
fn digest_distinguishes_path_content_boundary() {
    let a = draft(&[("ab", "c")]);
    let b = draft(&[("a", "bc")]);
    assert_ne!(a.digest(), b.digest());
}

#[test]
fn platform_family_mapping_is_consistent() {
    for family in ArtifactFamily::ALL {
        for platform in family.platforms() {
            assert_eq!(platform.family(), *family);
        }
    }
    assert_eq!(Platform::ci_for_repository("https://gitlab.com/acme/api"), Platform::GitlabCi);
    assert_eq!(Platform::ci_for_repository("https://github.com/acme/api"), Platform::GithubActions);
}

#[test]
fn terminal_status_serializes_snake_case() {
    for status in TerminalStatus::ALL {
        let json = serde_json::to_string(status).unwrap();
        assert_eq!(json, format!("\"{}\"", status.name()));
    }
}

#[test]
fn validation_report_helpers() {
    let report = ValidationReport {
        outcomes: vec![
            ValidationOutcome {
                check_name: "yaml-syntax".into(),
                status: ValidationStatus::Passed,
                findings: vec![],
                skip_reason: None,
                duration_ms: 1,
            },
            ValidationOutcome::skipped("actionlint", SkipReason::NotInstalled, "missing".into()),
        ],
    };
    assert!(!report.any_failed());
    assert!(!report.is_incomplete());
    assert_eq!(report.summary(), "1 passed, 0 failed, 1 skipped");

    let mut timed_out = report.clone();
    timed_out
        .outcomes
        .push(ValidationOutcome::skipped("yamllint", SkipReason::TimedOut, "slow".into()));
    assert!(timed_out.is_incomplete());
    assert_eq!(timed_out.get("yamllint").unwrap().status, ValidationStatus::Skipped);
}

#[test]
fn severity_labels() {
    assert_eq!(Severity::from_label("WARNING"), Severity::Warning);
    assert_eq!(Severity::from_label("note"), Severity::Info);
    assert_eq!(Severity::from_label("fatal"), Severity::Error);
}

#[test]
fn superseding_record_points_back() {
    let record = AuditRecord {
        schema_version: 1,
        run_id: "run-1".into(),
        timestamp: Utc::now(),
        target_repository: "acme/api".into(),
        stack_profile: StackProfile::unknown(),
        retrieval_queries: vec![],
        citations: vec![],
        draft_artifact_digest: None,
        validation_report: ValidationReport::default(),
        terminal_status: TerminalStatus::Succeeded,
        failure: None,
        degradations: vec![],
        proposal_reference: None,
        supersedes: None,
    };
    let next = record.superseded_by("run-2".into(), Utc::now());
    assert_eq!(next.run_id, "run-2");
    assert_eq!(next.supersedes.as_deref(), Some("run-1"));
    assert_eq!(next.target_repository, "acme/api");

    let line = serde_json::to_string(&next).unwrap();
    let back: AuditRecord = serde_json::from_str(&line).unwrap();
    assert_eq!(back, next);
}

#[test]
fn errors_carry_codes_and_context() {
    let err: FopsError = CompositionError::ParseFailure {
        file: "main.tf".into(),
        format: "hcl".into(),
        line: 12,
        message: "unterminated block".into(),
    }
    .into();
    assert_eq!(err.error_code(), "COMPOSITION_PARSE_ERROR");
    let msg = err.to_string();
    assert!(msg.contains("main.tf"));
    assert!(msg.contains("12"));

    let err: FopsError = SubmissionError::AlreadyExists { branch: "fops/x".into() }.into();
    assert_eq!(err.error_code(), "SUBMISSION_ERROR");
    assert!(err.to_string().contains("fops/x"));

    let err = KnowledgeError::DimensionMismatch { expected: 256, actual: 3 };
    assert_eq!(err.error_code(), "KNOWLEDGE_ERROR");
}

#[test]
fn unknown_profile() {
    let p = StackProfile::unknown();
    assert!(p.is_unknown());
    assert_eq!(p.primary_language.name(), "unknown");
    assert_eq!(Language::from_extension("py"), Some(Language::Python));
    assert_eq!(Language::from_extension("xyz"), None);
}
