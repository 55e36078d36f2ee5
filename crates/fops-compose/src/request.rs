use chrono::{DateTime, Utc};
use fops_core::models::{ArtifactFamily, DeployTarget, Platform};
use serde::{Deserialize, Serialize};

/// Organization-wide naming used in generated artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgProfile {
    pub name: String,
    /// Container registry prefix, e.g. `ghcr.io/acme`.
    pub registry: String,
    /// Base DNS domain for environment hostnames.
    pub domain: String,
}

impl Default for OrgProfile {
    fn default() -> Self {
        Self {
            name: "example".to_string(),
            registry: "ghcr.io/example".to_string(),
            domain: "example.com".to_string(),
        }
    }
}

/// What to compose, plus explicit overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionRequest {
    pub family: ArtifactFamily,
    /// Target repository; names the service and picks the CI platform.
    pub repository: String,
    /// Overrides the family's default platform.
    #[serde(default)]
    pub platform: Option<Platform>,
    /// Deploy environments in promotion order. Empty means config defaults.
    #[serde(default)]
    pub environments: Vec<String>,
    #[serde(default)]
    pub deploy_target: DeployTarget,
    #[serde(default)]
    pub org: OrgProfile,
    /// The only time-dependent input; rendered as a header line when set.
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
}

impl CompositionRequest {
    pub fn new(family: ArtifactFamily, repository: impl Into<String>) -> Self {
        Self {
            family,
            repository: repository.into(),
            platform: None,
            environments: Vec::new(),
            deploy_target: DeployTarget::default(),
            org: OrgProfile::default(),
            generated_at: None,
        }
    }

    /// Explicit platform, or the family's default for this repository.
    pub fn resolved_platform(&self) -> Platform {
        match self.platform {
            Some(platform) => platform,
            None => match self.family {
                ArtifactFamily::Pipeline => Platform::ci_for_repository(&self.repository),
                ArtifactFamily::Infrastructure => Platform::Terraform,
                ArtifactFamily::Monitoring => Platform::Prometheus,
            },
        }
    }

    /// DNS-safe service name derived from the repository's last path segment.
    pub fn service_name(&self) -> String {
        let last = self
            .repository
            .trim_end_matches('/')
            .trim_end_matches(".git")
            .rsplit(['/', ':'])
            .next()
            .unwrap_or_default();
        let mut name = String::with_capacity(last.len());
        for c in last.chars() {
            if c.is_ascii_alphanumeric() {
                name.push(c.to_ascii_lowercase());
            } else if !name.ends_with('-') {
                name.push('-');
            }
        }
        let name = name.trim_matches('-');
        if name.is_empty() {
            "service".to_string()
        } else {
            name.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_name_from_url() {
        let r = CompositionRequest::new(ArtifactFamily::Pipeline, "https://github.com/acme/Payments_API.git");
        assert_eq!(r.service_name(), "payments-api");
        let r = CompositionRequest::new(ArtifactFamily::Pipeline, "git@gitlab.com:acme/web");
        assert_eq!(r.service_name(), "web");
        let r = CompositionRequest::new(ArtifactFamily::Pipeline, "///");
        assert_eq!(r.service_name(), "service");
    }

    #[test]
    fn default_platforms() {
        let r = CompositionRequest::new(ArtifactFamily::Pipeline, "https://gitlab.com/acme/web");
        assert_eq!(r.resolved_platform(), Platform::GitlabCi);
        let r = CompositionRequest::new(ArtifactFamily::Monitoring, "acme/web");
        assert_eq!(r.resolved_platform(), Platform::Prometheus);
    }
}
