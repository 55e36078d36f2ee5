//! Which partitions each artifact family consults, and with what intent.

use fops_core::models::{ArtifactFamily, KnowledgePartition, Platform, StackProfile};

/// One knowledge query issued by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalQuery {
    pub partition: KnowledgePartition,
    pub intent: String,
}

impl RetrievalQuery {
    pub fn new(partition: KnowledgePartition, intent: impl Into<String>) -> Self {
        Self {
            partition,
            intent: intent.into(),
        }
    }
}

/// Queries for composing `platform` for a repository with `profile`.
pub fn retrieval_plan(platform: Platform, profile: &StackProfile) -> Vec<RetrievalQuery> {
    let language = profile.primary_language.name();
    let subject = match profile.framework.as_deref() {
        Some(framework) => format!("{language} {framework}"),
        None => language.to_string(),
    };
    let container = if profile.has_container_descriptor {
        " container"
    } else {
        ""
    };

    match platform.family() {
        ArtifactFamily::Pipeline => vec![
            RetrievalQuery::new(
                KnowledgePartition::Pipelines,
                format!("CI pipeline for {subject}{container} targeting {platform} build test deploy"),
            ),
            RetrievalQuery::new(
                KnowledgePartition::Policies,
                format!("security scan policy for {language} pipelines on {platform}"),
            ),
        ],
        ArtifactFamily::Infrastructure => vec![
            RetrievalQuery::new(
                KnowledgePartition::Iac,
                format!("{platform} infrastructure module for {subject}{container} service"),
            ),
            RetrievalQuery::new(
                KnowledgePartition::Policies,
                format!("infrastructure security policy for {platform} deployments"),
            ),
        ],
        ArtifactFamily::Monitoring => vec![
            RetrievalQuery::new(
                KnowledgePartition::Slo,
                format!("SLO availability latency error budget alerts for {subject} service"),
            ),
            RetrievalQuery::new(
                KnowledgePartition::Incidents,
                format!("incident alerting lessons for {language} service"),
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_platform_has_two_queries() {
        let profile = StackProfile::unknown();
        for platform in Platform::ALL {
            let plan = retrieval_plan(*platform, &profile);
            assert_eq!(plan.len(), 2, "{platform}");
        }
    }

    #[test]
    fn pipeline_plan_mentions_stack() {
        let mut profile = StackProfile::unknown();
        profile.primary_language = fops_core::models::Language::Python;
        profile.framework = Some("fastapi".into());
        let plan = retrieval_plan(Platform::GithubActions, &profile);
        assert_eq!(plan[0].partition, KnowledgePartition::Pipelines);
        assert!(plan[0].intent.contains("python fastapi"));
        assert_eq!(plan[1].partition, KnowledgePartition::Policies);
    }
}
