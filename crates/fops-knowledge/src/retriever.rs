//! Knowledge Retriever. Never fails a run: an empty or unavailable
//! partition yields an empty result plus a degradation event.

use std::sync::Arc;

use fops_core::config::RetrievalConfig;
use fops_core::models::{
    DegradationEvent, KnowledgePartition, RetrievalQueryLog, RetrievalResult, StackProfile,
};
use fops_core::retrieve_span;
use fops_core::tracing_setup::events;
use fops_core::traits::IKnowledgeStore;

use crate::plan::RetrievalQuery;
use crate::ranking;

const COMPONENT: &str = "knowledge_retriever";
const FALLBACK: &str = "template-only composition";

/// Results of every query a run issued, in plan order.
#[derive(Debug, Default)]
pub struct RetrievalOutcome {
    pub results: Vec<RetrievalResult>,
    pub queries: Vec<RetrievalQueryLog>,
    pub degradations: Vec<DegradationEvent>,
}

pub struct KnowledgeRetriever {
    store: Arc<dyn IKnowledgeStore>,
    top_k: usize,
    tie_epsilon: f64,
}

impl KnowledgeRetriever {
    pub fn new(store: Arc<dyn IKnowledgeStore>, config: &RetrievalConfig) -> Self {
        Self {
            store,
            top_k: config.top_k,
            tie_epsilon: config.tie_epsilon,
        }
    }

    /// Embed the intent, search one partition, rank, cap at top-K.
    pub fn retrieve(
        &self,
        profile: &StackProfile,
        partition: KnowledgePartition,
        intent: &str,
    ) -> (RetrievalResult, Option<DegradationEvent>) {
        let span = retrieve_span!(partition, intent);
        let _guard = span.enter();

        let query = query_text(profile, intent);
        let searched = self
            .store
            .embed(&query)
            .and_then(|embedding| self.store.search(partition, &embedding, self.top_k));

        match searched {
            Ok(hits) => {
                // Re-rank: the store's own ordering is not trusted for ties.
                let hits = ranking::rank(hits, self.tie_epsilon, self.top_k);
                tracing::debug!(hits = hits.len(), "retrieval complete");
                let degradation = hits.is_empty().then(|| {
                    degrade(format!("partition {partition} returned no items"))
                });
                (
                    RetrievalResult {
                        partition,
                        intent: intent.to_string(),
                        hits,
                    },
                    degradation,
                )
            }
            Err(e) => (
                RetrievalResult::empty(partition, intent),
                Some(degrade(format!("partition {partition}: {e}"))),
            ),
        }
    }

    /// Run every query of a plan in order.
    pub fn retrieve_all(&self, profile: &StackProfile, queries: &[RetrievalQuery]) -> RetrievalOutcome {
        let mut outcome = RetrievalOutcome::default();
        for query in queries {
            let (result, degradation) = self.retrieve(profile, query.partition, &query.intent);
            outcome.queries.push(RetrievalQueryLog {
                partition: query.partition,
                intent: query.intent.clone(),
                hit_count: result.len(),
            });
            outcome.results.push(result);
            outcome.degradations.extend(degradation);
        }
        outcome
    }
}

/// The intent, plus stack facts it does not already mention.
fn query_text(profile: &StackProfile, intent: &str) -> String {
    let mut query = intent.to_string();
    let lower = intent.to_lowercase();
    let facts = [
        (!profile.is_unknown()).then(|| profile.primary_language.name().to_string()),
        profile.framework.clone(),
    ];
    for fact in facts.into_iter().flatten() {
        if !lower.contains(&fact.to_lowercase()) {
            query.push(' ');
            query.push_str(&fact);
        }
    }
    query
}

fn degrade(failure: String) -> DegradationEvent {
    events::degradation_triggered(COMPONENT, &failure, FALLBACK);
    DegradationEvent::now(COMPONENT, failure, FALLBACK)
}
