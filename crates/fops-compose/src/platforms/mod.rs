//! Per-platform skeletons.
//!
//! Dispatch is a closed match over `Platform`; language-specific commands
//! come from `Toolchain`, itself an exhaustive match over `Language`.

mod github_actions;
mod gitlab_ci;
mod helm;
mod prometheus;
mod terraform;

use fops_core::config::CompositionConfig;
use fops_core::errors::CompositionError;
use fops_core::models::{DeployTarget, Platform, StackProfile};

use crate::request::CompositionRequest;
use crate::sections::{Section, SectionKind};
use crate::toolchain::Toolchain;

/// Everything a renderer reads. Renderers are pure functions of this.
pub struct Context<'a> {
    pub profile: &'a StackProfile,
    pub toolchain: &'a Toolchain,
    pub request: &'a CompositionRequest,
    pub config: &'a CompositionConfig,
    pub environments: &'a [String],
    pub sections: &'a [Section],
    pub service: String,
}

impl Context<'_> {
    pub fn section(&self, kind: &SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| &s.kind == kind)
    }

    pub fn has(&self, kind: &SectionKind) -> bool {
        self.section(kind).is_some()
    }

    pub fn deploy_section(&self, environment: &str) -> Option<&Section> {
        self.section(&SectionKind::Deploy {
            environment: environment.to_string(),
        })
    }

    pub fn environment_section(&self, environment: &str) -> Option<&Section> {
        self.section(&SectionKind::Environment {
            environment: environment.to_string(),
        })
    }

    /// Image repository without tag, e.g. `ghcr.io/acme/api`.
    pub fn image(&self) -> String {
        format!("{}/{}", self.request.org.registry.trim_end_matches('/'), self.service)
    }

    /// Registry host used for `docker login`.
    pub fn registry_host(&self) -> &str {
        self.request
            .org
            .registry
            .split('/')
            .next()
            .unwrap_or_default()
    }

    /// Container descriptor to build from, if the repository has one.
    pub fn dockerfile(&self) -> Option<&str> {
        if !self.profile.has_container_descriptor {
            return None;
        }
        self.profile
            .build_entry_points
            .iter()
            .map(String::as_str)
            .find(|p| {
                let name = p.rsplit('/').next().unwrap_or(p);
                name.starts_with("Dockerfile") || name.starts_with("Containerfile")
            })
    }

    pub fn host(&self, environment: &str) -> String {
        format!("{}.{environment}.{}", self.service, self.request.org.domain)
    }

    pub fn is_protected(&self, environment: &str) -> bool {
        self.config.is_protected(environment)
    }

    /// Environments are deployed in order; each one waits for the previous.
    pub fn previous_environment(&self, environment: &str) -> Option<&str> {
        let pos = self.environments.iter().position(|e| e == environment)?;
        pos.checked_sub(1).map(|p| self.environments[p].as_str())
    }

    /// Generic deploy command for `environment`, `tag` being the CI's
    /// commit-sha expression.
    pub fn deploy_command(&self, environment: &str, tag: &str) -> String {
        let service = &self.service;
        match self.request.deploy_target {
            DeployTarget::Kubernetes => format!(
                "helm upgrade --install {service} ./chart \
                 --namespace {service}-{environment} --create-namespace \
                 -f chart/values-{environment}.yaml --set image.tag={tag} --wait"
            ),
            DeployTarget::Serverless => {
                format!("npx serverless deploy --stage {environment}")
            }
            DeployTarget::Static => {
                format!("aws s3 sync ./dist s3://{service}-{environment} --delete")
            }
        }
    }
}

/// One generated file and the sections rendered into it.
#[derive(Debug, Clone)]
pub struct RenderedFile {
    pub path: String,
    pub body: String,
    pub sections: Vec<SectionKind>,
}

impl RenderedFile {
    pub fn new(path: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            body: body.into(),
            sections: Vec::new(),
        }
    }

    pub fn with_sections(mut self, sections: impl IntoIterator<Item = SectionKind>) -> Self {
        self.sections.extend(sections);
        self
    }
}

pub type Renderer = fn(&Context<'_>) -> Result<Vec<RenderedFile>, CompositionError>;

pub fn renderer_for(platform: Platform) -> Renderer {
    match platform {
        Platform::GithubActions => github_actions::render,
        Platform::GitlabCi => gitlab_ci::render,
        Platform::Terraform => terraform::render,
        Platform::Helm => helm::render,
        Platform::Prometheus => prometheus::render,
    }
}

/// `payments-api` → `PaymentsApi`.
pub(crate) fn camel(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Prefix every line of `text` with `# `.
pub(crate) fn comment_lines(text: &str) -> String {
    text.lines()
        .map(|l| {
            if l.trim().is_empty() {
                "#\n".to_string()
            } else {
                format!("# {}\n", l.trim_end())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case() {
        assert_eq!(camel("payments-api"), "PaymentsApi");
        assert_eq!(camel("web"), "Web");
        assert_eq!(camel("a--b"), "AB");
    }

    #[test]
    fn comments() {
        assert_eq!(comment_lines("one\n\ntwo"), "# one\n#\n# two\n");
    }
}
