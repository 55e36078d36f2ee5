//! Composition engine: skeleton selection, section inclusion, guidance
//! splicing, and the self-parse gate every draft must pass.

use std::collections::BTreeMap;

use fops_core::compose_span;
use fops_core::config::CompositionConfig;
use fops_core::errors::CompositionError;
use fops_core::models::{
    Citation, DraftArtifact, RetrievalResult, SectionProvenance, StackProfile,
};

use crate::grammar::{self, Grammar};
use crate::platforms::{self, Context};
use crate::request::CompositionRequest;
use crate::sections;
use crate::toolchain::Toolchain;

/// First line of every generated file that accepts comments.
pub const GENERATED_HEADER: &str = "Generated by fops. Review before merging.";

pub struct CompositionEngine {
    config: CompositionConfig,
}

impl CompositionEngine {
    pub fn new(config: CompositionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompositionConfig {
        &self.config
    }

    /// Compose a draft. Identical inputs give byte-identical files; the only
    /// time-dependent content is `request.generated_at`.
    pub fn compose(
        &self,
        profile: &StackProfile,
        results: &[RetrievalResult],
        request: &CompositionRequest,
    ) -> Result<DraftArtifact, CompositionError> {
        let platform = request.resolved_platform();
        let _span = compose_span!(request.family, platform).entered();

        if platform.family() != request.family {
            return Err(CompositionError::UnsupportedCombination {
                family: request.family.to_string(),
                platform: platform.to_string(),
            });
        }

        let environments = if request.environments.is_empty() {
            self.config.default_environments.clone()
        } else {
            request.environments.clone()
        };
        if environments.is_empty() {
            return Err(CompositionError::NoEnvironments {
                family: request.family.to_string(),
            });
        }

        let sections = sections::plan(request.family, profile, &self.config, &environments, results);
        let toolchain = Toolchain::for_profile(profile);
        if toolchain.is_generic() {
            tracing::debug!(language = %profile.primary_language, "using generic toolchain");
        }

        let ctx = Context {
            profile,
            toolchain: &toolchain,
            request,
            config: &self.config,
            environments: &environments,
            sections: &sections,
            service: request.service_name(),
        };
        let rendered = platforms::renderer_for(platform)(&ctx)?;

        let mut files = BTreeMap::new();
        let mut provenance = Vec::new();
        for file in rendered {
            let mut cited: Vec<Citation> = Vec::new();
            for kind in &file.sections {
                let Some(guidance) = sections
                    .iter()
                    .find(|s| &s.kind == kind)
                    .and_then(|s| s.guidance.as_ref())
                else {
                    continue;
                };
                provenance.push(SectionProvenance {
                    file: file.path.clone(),
                    section: kind.name(),
                    item_id: guidance.item_id().to_string(),
                });
                if !cited.iter().any(|c| c.item_id == guidance.item_id()) {
                    cited.push(Citation::from_item(&guidance.item));
                }
            }

            let body = with_header(&file.path, &file.body, request, &cited);
            grammar::check(&file.path, &body).inspect_err(|e| {
                tracing::warn!(file = %file.path, error = %e, "composed file failed its own grammar");
            })?;
            files.insert(file.path, body);
        }

        tracing::info!(
            files = files.len(),
            sections = sections.len(),
            spliced = provenance.len(),
            "draft composed"
        );

        Ok(DraftArtifact {
            family: request.family,
            platform,
            files,
            provenance,
            generated_at: request.generated_at,
        })
    }
}

fn with_header(path: &str, body: &str, request: &CompositionRequest, cited: &[Citation]) -> String {
    let Some(comment) = Grammar::for_path(path).and_then(|g| g.line_comment()) else {
        return body.to_string();
    };
    let mut out = format!("{comment} {GENERATED_HEADER}\n");
    if let Some(at) = request.generated_at {
        out.push_str(&format!("{comment} Generated at: {}\n", at.to_rfc3339()));
    }
    out.push_str(&fops_citation::citation_comment_block(comment, cited));
    out.push_str(body);
    out
}
