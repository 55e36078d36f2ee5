use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of configuration artifact a run proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactFamily {
    Pipeline,
    Infrastructure,
    Monitoring,
}

impl ArtifactFamily {
    pub const ALL: &'static [ArtifactFamily] =
        &[Self::Pipeline, Self::Infrastructure, Self::Monitoring];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Pipeline => "pipeline",
            Self::Infrastructure => "infrastructure",
            Self::Monitoring => "monitoring",
        }
    }

    /// Platforms that can render this family, default first.
    pub fn platforms(&self) -> &'static [Platform] {
        match self {
            Self::Pipeline => &[Platform::GithubActions, Platform::GitlabCi],
            Self::Infrastructure => &[Platform::Terraform, Platform::Helm],
            Self::Monitoring => &[Platform::Prometheus],
        }
    }
}

impl std::fmt::Display for ArtifactFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Concrete target format within a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    GithubActions,
    GitlabCi,
    Terraform,
    Helm,
    Prometheus,
}

impl Platform {
    pub const ALL: &'static [Platform] = &[
        Self::GithubActions,
        Self::GitlabCi,
        Self::Terraform,
        Self::Helm,
        Self::Prometheus,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::GithubActions => "github_actions",
            Self::GitlabCi => "gitlab_ci",
            Self::Terraform => "terraform",
            Self::Helm => "helm",
            Self::Prometheus => "prometheus",
        }
    }

    pub fn family(&self) -> ArtifactFamily {
        match self {
            Self::GithubActions | Self::GitlabCi => ArtifactFamily::Pipeline,
            Self::Terraform | Self::Helm => ArtifactFamily::Infrastructure,
            Self::Prometheus => ArtifactFamily::Monitoring,
        }
    }

    /// Pick the CI platform from a repository URL the way hosting providers
    /// are told apart: anything not on GitLab gets GitHub Actions.
    pub fn ci_for_repository(repository: &str) -> Platform {
        if repository.to_ascii_lowercase().contains("gitlab") {
            Self::GitlabCi
        } else {
            Self::GithubActions
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Where deploy sections ship the workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployTarget {
    #[default]
    Kubernetes,
    Serverless,
    Static,
}

impl DeployTarget {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Kubernetes => "kubernetes",
            Self::Serverless => "serverless",
            Self::Static => "static",
        }
    }
}

impl std::fmt::Display for DeployTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Which knowledge item was spliced into which section of which file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionProvenance {
    pub file: String,
    pub section: String,
    pub item_id: String,
}

/// Generated configuration files before validation or review.
///
/// Every file body has round-tripped through its format's parser before a
/// `DraftArtifact` leaves the composition engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftArtifact {
    pub family: ArtifactFamily,
    pub platform: Platform,
    /// Repository-relative path to complete file body.
    pub files: BTreeMap<String, String>,
    pub provenance: Vec<SectionProvenance>,
    /// Explicitly injected generation timestamp; the only non-deterministic input.
    pub generated_at: Option<DateTime<Utc>>,
}

impl DraftArtifact {
    /// blake3 digest over the canonical `(path, content)` sequence.
    pub fn digest(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for (path, content) in &self.files {
            hasher.update(&(path.len() as u64).to_le_bytes());
            hasher.update(path.as_bytes());
            hasher.update(&(content.len() as u64).to_le_bytes());
            hasher.update(content.as_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }

    /// Item ids spliced into any section, first-seen order.
    pub fn influencing_items(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for p in &self.provenance {
            if !seen.contains(&p.item_id.as_str()) {
                seen.push(p.item_id.as_str());
            }
        }
        seen
    }
}
