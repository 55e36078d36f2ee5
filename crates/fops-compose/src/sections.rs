//! Structural sections of a skeleton and the guidance spliced into them.

use std::sync::Arc;

use fops_core::config::CompositionConfig;
use fops_core::models::{ArtifactFamily, KnowledgeItem, RetrievalResult, StackProfile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionKind {
    Build,
    Test,
    SecurityScan,
    Deploy { environment: String },
    Workload,
    SecurityPolicy,
    Environment { environment: String },
    Availability,
    Latency,
    ErrorBudget,
}

impl SectionKind {
    /// Knowledge tag that selects guidance for this section.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Test => "test",
            Self::SecurityScan => "security-scan",
            Self::Deploy { .. } => "deploy",
            Self::Workload => "workload",
            Self::SecurityPolicy => "security-policy",
            Self::Environment { .. } => "environment",
            Self::Availability => "availability",
            Self::Latency => "latency",
            Self::ErrorBudget => "error-budget",
        }
    }

    pub fn environment(&self) -> Option<&str> {
        match self {
            Self::Deploy { environment } | Self::Environment { environment } => {
                Some(environment)
            }
            _ => None,
        }
    }

    /// Unique name within a draft, e.g. `deploy-prod`.
    pub fn name(&self) -> String {
        match self.environment() {
            Some(env) => format!("{}-{env}", self.tag()),
            None => self.tag().to_string(),
        }
    }
}

/// A retrieved item spliced into a section in place of the generic default.
#[derive(Debug, Clone)]
pub struct Guidance {
    pub item: Arc<KnowledgeItem>,
}

impl Guidance {
    pub fn item_id(&self) -> &str {
        &self.item.id
    }

    pub fn text(&self) -> &str {
        self.item.text.trim()
    }
}

#[derive(Debug, Clone)]
pub struct Section {
    pub kind: SectionKind,
    pub guidance: Option<Guidance>,
}

impl Section {
    pub fn name(&self) -> String {
        self.kind.name()
    }

    /// Spliced guidance text, or `default`.
    pub fn text_or(&self, default: &str) -> String {
        match &self.guidance {
            Some(g) if !g.text().is_empty() => g.text().to_string(),
            _ => default.to_string(),
        }
    }
}

/// Ordered sections for `family`, with inclusion decided by stack facts and
/// configuration flags.
pub fn plan(
    family: ArtifactFamily,
    profile: &StackProfile,
    config: &CompositionConfig,
    environments: &[String],
    results: &[RetrievalResult],
) -> Vec<Section> {
    let mut kinds = Vec::new();
    match family {
        ArtifactFamily::Pipeline => {
            kinds.push(SectionKind::Build);
            if profile.has_tests {
                kinds.push(SectionKind::Test);
            }
            if config.security_scan {
                kinds.push(SectionKind::SecurityScan);
            }
            kinds.extend(environments.iter().map(|env| SectionKind::Deploy {
                environment: env.clone(),
            }));
        }
        ArtifactFamily::Infrastructure => {
            kinds.push(SectionKind::Workload);
            if config.security_scan {
                kinds.push(SectionKind::SecurityPolicy);
            }
            kinds.extend(environments.iter().map(|env| SectionKind::Environment {
                environment: env.clone(),
            }));
        }
        ArtifactFamily::Monitoring => {
            kinds.extend([
                SectionKind::Availability,
                SectionKind::Latency,
                SectionKind::ErrorBudget,
            ]);
        }
    }

    kinds
        .into_iter()
        .map(|kind| {
            let guidance = guidance_for(&kind, results);
            Section { kind, guidance }
        })
        .collect()
}

/// Best hit for the section's environment-specific tag (`deploy:prod`),
/// then for its plain tag, searching results in query order.
fn guidance_for(kind: &SectionKind, results: &[RetrievalResult]) -> Option<Guidance> {
    let mut tags = Vec::with_capacity(2);
    if let Some(env) = kind.environment() {
        tags.push(format!("{}:{env}", kind.tag()));
    }
    tags.push(kind.tag().to_string());

    tags.iter().find_map(|tag| {
        results.iter().find_map(|r| {
            r.best_for_tag(tag).map(|hit| Guidance {
                item: Arc::clone(&hit.item),
            })
        })
    })
}
