use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Logically separated subset of the embedded corpus, searched independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgePartition {
    Pipelines,
    Iac,
    Docs,
    Slo,
    Incidents,
    Policies,
}

impl KnowledgePartition {
    pub const ALL: &'static [KnowledgePartition] = &[
        Self::Pipelines,
        Self::Iac,
        Self::Docs,
        Self::Slo,
        Self::Incidents,
        Self::Policies,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Pipelines => "pipelines",
            Self::Iac => "iac",
            Self::Docs => "docs",
            Self::Slo => "slo",
            Self::Incidents => "incidents",
            Self::Policies => "policies",
        }
    }
}

impl std::fmt::Display for KnowledgePartition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An embedded template or policy snippet. Owned by the knowledge store;
/// the pipeline only holds `Arc` references for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeItem {
    /// Stable, source-scoped identifier.
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub source_uri: String,
    #[serde(default)]
    pub title: Option<String>,
    /// When the source was last updated. Breaks similarity ties.
    pub updated_at: DateTime<Utc>,
}

impl KnowledgeItem {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// One ranked hit.
#[derive(Debug, Clone)]
pub struct RetrievalHit {
    pub item: Arc<KnowledgeItem>,
    /// Cosine similarity.
    pub score: f64,
}

/// Ranked (descending) hits for one query, capped at top-K.
#[derive(Debug, Clone)]
pub struct RetrievalResult {
    pub partition: KnowledgePartition,
    pub intent: String,
    pub hits: Vec<RetrievalHit>,
}

impl RetrievalResult {
    pub fn empty(partition: KnowledgePartition, intent: impl Into<String>) -> Self {
        Self {
            partition,
            intent: intent.into(),
            hits: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Highest-ranked hit carrying `tag`.
    pub fn best_for_tag(&self, tag: &str) -> Option<&RetrievalHit> {
        self.hits.iter().find(|h| h.item.has_tag(tag))
    }
}
