//! Composition engine tests: determinism, self-parse gate, section inclusion,
//! guidance splicing, and dispatch over every platform and language.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use fops_compose::{grammar, CompositionEngine, CompositionRequest};
use fops_core::config::CompositionConfig;
use fops_core::errors::CompositionError;
use fops_core::models::{
    ArtifactFamily, DeployTarget, KnowledgeItem, KnowledgePartition, Language, PackageManager,
    Platform, RetrievalHit, RetrievalResult, StackProfile,
};
use serde_yaml::Value;

fn item(id: &str, tags: &[&str], text: &str) -> Arc<KnowledgeItem> {
    Arc::new(KnowledgeItem {
        id: id.to_string(),
        text: text.to_string(),
        embedding: Vec::new(),
        tags: tags.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>(),
        source_uri: format!("https://kb.example.com/{id}"),
        title: Some(format!("Guide {id}")),
        updated_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
    })
}

fn result(partition: KnowledgePartition, items: Vec<Arc<KnowledgeItem>>) -> RetrievalResult {
    let hits = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| RetrievalHit {
            item,
            score: 0.9 - i as f64 * 0.1,
        })
        .collect();
    RetrievalResult {
        partition,
        intent: "test intent".to_string(),
        hits,
    }
}

fn python_container() -> StackProfile {
    StackProfile {
        primary_language: Language::Python,
        framework: Some("fastapi".to_string()),
        has_container_descriptor: true,
        has_tests: true,
        package_manager: PackageManager::Pip,
        build_entry_points: vec!["requirements.txt".to_string(), "Dockerfile".to_string()],
    }
}

fn two_env_request(family: ArtifactFamily) -> CompositionRequest {
    let mut request = CompositionRequest::new(family, "https://github.com/acme/payments-api");
    request.environments = vec!["staging".to_string(), "prod".to_string()];
    request
}

fn engine() -> CompositionEngine {
    CompositionEngine::new(CompositionConfig::default())
}

fn jobs(body: &str) -> Vec<String> {
    let doc: Value = serde_yaml::from_str(body).unwrap();
    doc["jobs"]
        .as_mapping()
        .unwrap()
        .keys()
        .map(|k| k.as_str().unwrap().to_string())
        .collect()
}

#[test]
fn python_container_pipeline_has_all_sections() {
    let draft = engine()
        .compose(&python_container(), &[], &two_env_request(ArtifactFamily::Pipeline))
        .unwrap();

    assert_eq!(draft.platform, Platform::GithubActions);
    let body = &draft.files[".github/workflows/pipeline.yml"];
    assert_eq!(
        jobs(body),
        vec!["build", "test", "security-scan", "deploy-staging", "deploy-prod"]
    );
    assert!(body.contains("pip install -r requirements.txt"));
    assert!(body.contains("docker build -f Dockerfile"));
    assert!(body.contains("refs/heads/main"));
    assert!(draft.provenance.is_empty());
}

#[test]
fn composition_is_deterministic() {
    let results = vec![result(
        KnowledgePartition::Pipelines,
        vec![item("ci-test", &["test"], "pytest -q")],
    )];
    let first = engine()
        .compose(&python_container(), &results, &two_env_request(ArtifactFamily::Pipeline))
        .unwrap();
    let second = engine()
        .compose(&python_container(), &results, &two_env_request(ArtifactFamily::Pipeline))
        .unwrap();
    assert_eq!(first.files, second.files);
    assert_eq!(first.digest(), second.digest());
}

#[test]
fn injected_timestamp_only_changes_header() {
    let mut request = two_env_request(ArtifactFamily::Monitoring);
    let plain = engine().compose(&python_container(), &[], &request).unwrap();
    request.generated_at = Some(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());
    let stamped = engine().compose(&python_container(), &[], &request).unwrap();

    let a = &plain.files["monitoring/alerts.yml"];
    let b = &stamped.files["monitoring/alerts.yml"];
    assert_ne!(a, b);
    let stripped: String = b
        .lines()
        .filter(|l| !l.starts_with("# Generated at:"))
        .map(|l| format!("{l}\n"))
        .collect();
    assert_eq!(a, &stripped);
    assert!(stamped.generated_at.is_some());
}

#[test]
fn every_platform_and_language_round_trips() {
    let config = CompositionConfig::default();
    let engine = CompositionEngine::new(config);
    for platform in Platform::ALL {
        for language in Language::ALL {
            for target in [DeployTarget::Kubernetes, DeployTarget::Serverless, DeployTarget::Static] {
                for container in [false, true] {
                    let profile = StackProfile {
                        primary_language: *language,
                        has_container_descriptor: container,
                        has_tests: container,
                        build_entry_points: if container {
                            vec!["Dockerfile".to_string()]
                        } else {
                            Vec::new()
                        },
                        ..StackProfile::unknown()
                    };
                    let mut request = two_env_request(platform.family());
                    request.platform = Some(*platform);
                    request.deploy_target = target;

                    let draft = engine
                        .compose(&profile, &[], &request)
                        .unwrap_or_else(|e| panic!("{platform}/{language}/{target}: {e}"));
                    assert!(!draft.files.is_empty());
                    for (path, body) in &draft.files {
                        grammar::check(path, body).unwrap();
                    }
                }
            }
        }
    }
}

#[test]
fn unknown_stack_gets_generic_template() {
    let draft = engine()
        .compose(&StackProfile::unknown(), &[], &two_env_request(ArtifactFamily::Pipeline))
        .unwrap();
    let body = &draft.files[".github/workflows/pipeline.yml"];
    assert!(body.contains("make build"));
    // No tests professed, so no test job.
    assert_eq!(
        jobs(body),
        vec!["build", "security-scan", "deploy-staging", "deploy-prod"]
    );
}

#[test]
fn sections_follow_config_flags() {
    let config = CompositionConfig {
        security_scan: false,
        ..CompositionConfig::default()
    };
    let mut profile = python_container();
    profile.has_tests = false;
    let draft = CompositionEngine::new(config)
        .compose(&profile, &[], &two_env_request(ArtifactFamily::Pipeline))
        .unwrap();
    assert_eq!(
        jobs(&draft.files[".github/workflows/pipeline.yml"]),
        vec!["build", "deploy-staging", "deploy-prod"]
    );
}

#[test]
fn guidance_is_spliced_and_cited() {
    let results = vec![
        result(
            KnowledgePartition::Pipelines,
            vec![
                item("ci-test", &["test"], "pytest -q --maxfail=1"),
                item("ci-deploy-prod", &["deploy:prod"], "make deploy-prod"),
                item("ci-deploy", &["deploy"], "make deploy"),
            ],
        ),
        result(KnowledgePartition::Policies, vec![item("ci-test", &["test"], "pytest -q --maxfail=1")]),
    ];
    let draft = engine()
        .compose(&python_container(), &results, &two_env_request(ArtifactFamily::Pipeline))
        .unwrap();
    let body = &draft.files[".github/workflows/pipeline.yml"];

    assert!(body.contains("pytest -q --maxfail=1"));
    assert!(body.contains("make deploy-prod"));
    assert!(body.contains("make deploy\n") || body.contains("run: make deploy\n"));
    assert!(body.starts_with("# Generated by fops."));
    assert!(body.contains("# Sources:\n#   [1] Guide ci-test (https://kb.example.com/ci-test)\n"));

    let sections: Vec<(&str, &str)> = draft
        .provenance
        .iter()
        .map(|p| (p.section.as_str(), p.item_id.as_str()))
        .collect();
    assert_eq!(
        sections,
        vec![
            ("test", "ci-test"),
            ("deploy-staging", "ci-deploy"),
            ("deploy-prod", "ci-deploy-prod"),
        ]
    );
    assert_eq!(draft.influencing_items(), vec!["ci-test", "ci-deploy", "ci-deploy-prod"]);
}

#[test]
fn multi_line_source_title_still_parses() {
    let mut guide = (*item("build-guide", &["build"], "make build")).clone();
    guide.title = Some("Build guide\nsecond line of title".to_string());
    let results = vec![result(KnowledgePartition::Pipelines, vec![Arc::new(guide)])];
    let draft = engine()
        .compose(&python_container(), &results, &two_env_request(ArtifactFamily::Pipeline))
        .unwrap();
    let body = &draft.files[".github/workflows/pipeline.yml"];

    assert!(body.contains("#   [1] Build guide second line of title (https://kb.example.com/build-guide)\n"));
    assert!(serde_yaml::from_str::<Value>(body).is_ok());
}

#[test]
fn unterminated_block_in_spliced_snippet_fails_composition() {
    let snippet = "resource \"kubernetes_config_map_v1\" \"extra\" {\n  metadata {\n    name = \"extra\"\n  }\n";
    let results = vec![result(KnowledgePartition::Iac, vec![item("iac-extra", &["workload"], snippet)])];
    let err = engine()
        .compose(&python_container(), &results, &two_env_request(ArtifactFamily::Infrastructure))
        .unwrap_err();
    match err {
        CompositionError::ParseFailure { file, format, .. } => {
            assert_eq!(file, "main.tf");
            assert_eq!(format, "hcl");
        }
        other => panic!("expected parse failure, got {other:?}"),
    }
}

#[test]
fn prose_guidance_becomes_a_comment() {
    let results = vec![result(
        KnowledgePartition::Iac,
        vec![item("iac-subnets", &["workload"], "Run workloads in private subnets.")],
    )];
    let draft = engine()
        .compose(&python_container(), &results, &two_env_request(ArtifactFamily::Infrastructure))
        .unwrap();
    assert!(draft.files["main.tf"].contains("# Run workloads in private subnets.\n"));
    assert_eq!(draft.provenance[0].file, "main.tf");
}

#[test]
fn terraform_layout_per_environment() {
    let draft = engine()
        .compose(&python_container(), &[], &two_env_request(ArtifactFamily::Infrastructure))
        .unwrap();
    let paths: Vec<&str> = draft.files.keys().map(String::as_str).collect();
    assert_eq!(
        paths,
        vec![
            "environments/prod/terraform.tfvars",
            "environments/staging/terraform.tfvars",
            "main.tf",
            "outputs.tf",
            "variables.tf",
        ]
    );
    assert!(draft.files["environments/prod/terraform.tfvars"].contains("replicas    = 3"));
    assert!(draft.files["main.tf"].contains("kubernetes_network_policy_v1"));
}

#[test]
fn helm_values_merge_mapping_guidance() {
    let results = vec![result(
        KnowledgePartition::Iac,
        vec![item("helm-prod", &["environment:prod"], "replicaCount: 5\nautoscaling:\n  enabled: true\n")],
    )];
    let mut request = two_env_request(ArtifactFamily::Infrastructure);
    request.platform = Some(Platform::Helm);
    let draft = engine().compose(&python_container(), &results, &request).unwrap();

    let values: Value = serde_yaml::from_str(&draft.files["chart/values-prod.yaml"]).unwrap();
    assert_eq!(values["replicaCount"].as_i64(), Some(5));
    assert_eq!(values["autoscaling"]["enabled"].as_bool(), Some(true));
    assert!(draft.files.contains_key("chart/templates/deployment.yaml"));
    assert!(!draft.files["chart/templates/_helpers.tpl"].starts_with('#'));
}

#[test]
fn monitoring_rules_per_environment() {
    let draft = engine()
        .compose(&python_container(), &[], &two_env_request(ArtifactFamily::Monitoring))
        .unwrap();
    let doc: Value = serde_yaml::from_str(&draft.files["monitoring/alerts.yml"]).unwrap();
    let groups = doc["groups"].as_sequence().unwrap();
    assert_eq!(groups.len(), 2);
    let prod_rules = groups[1]["rules"].as_sequence().unwrap();
    assert_eq!(prod_rules.len(), 3);
    assert_eq!(prod_rules[0]["alert"].as_str(), Some("PaymentsApiProdHighErrorRate"));
    assert_eq!(prod_rules[0]["labels"]["severity"].as_str(), Some("page"));
}

#[test]
fn gitlab_repository_gets_gitlab_ci() {
    let mut request = two_env_request(ArtifactFamily::Pipeline);
    request.repository = "https://gitlab.com/acme/web".to_string();
    let draft = engine().compose(&python_container(), &[], &request).unwrap();
    let doc: Value = serde_yaml::from_str(&draft.files[".gitlab-ci.yml"]).unwrap();
    assert_eq!(doc["deploy-prod"]["rules"][0]["when"].as_str(), Some("manual"));
    assert_eq!(doc["deploy-prod"]["needs"][0].as_str(), Some("deploy-staging"));
}

#[test]
fn platform_must_match_family() {
    let mut request = two_env_request(ArtifactFamily::Monitoring);
    request.platform = Some(Platform::Terraform);
    let err = engine().compose(&python_container(), &[], &request).unwrap_err();
    assert!(matches!(err, CompositionError::UnsupportedCombination { .. }));
}

#[test]
fn environments_fall_back_to_config_and_must_exist() {
    let request = CompositionRequest::new(ArtifactFamily::Pipeline, "acme/api");
    let draft = engine().compose(&python_container(), &[], &request).unwrap();
    assert!(jobs(&draft.files[".github/workflows/pipeline.yml"]).contains(&"deploy-prod".to_string()));

    let config = CompositionConfig {
        default_environments: Vec::new(),
        ..CompositionConfig::default()
    };
    let err = CompositionEngine::new(config)
        .compose(&python_container(), &[], &request)
        .unwrap_err();
    assert!(matches!(err, CompositionError::NoEnvironments { .. }));
}
