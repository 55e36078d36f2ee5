//! Fixed, ordered validator sets per platform.

use std::collections::BTreeMap;
use std::sync::Arc;

use fops_core::models::{DiagnosticFormat, Platform};
use fops_core::traits::IValidatorTool;

use crate::process::{FileArgs, ProcessTool};
use crate::syntax::SyntaxTool;

pub type Tool = Arc<dyn IValidatorTool>;

/// Validators per platform, in canonical report order.
#[derive(Clone, Default)]
pub struct ValidatorCatalog {
    tools: BTreeMap<Platform, Vec<Tool>>,
}

impl ValidatorCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in syntax check first, then the platform's external tools.
    pub fn standard() -> Self {
        let mut catalog = Self::empty();
        for platform in Platform::ALL {
            catalog = catalog.with(*platform, standard_tools(*platform));
        }
        catalog
    }

    /// Replace the validators for `platform`.
    pub fn with(mut self, platform: Platform, tools: Vec<Tool>) -> Self {
        self.tools.insert(platform, tools);
        self
    }

    pub fn tools(&self, platform: Platform) -> &[Tool] {
        self.tools.get(&platform).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn check_names(&self, platform: Platform) -> Vec<&str> {
        self.tools(platform).iter().map(|t| t.name()).collect()
    }
}

fn standard_tools(platform: Platform) -> Vec<Tool> {
    let yamllint = || {
        tool(
            ProcessTool::new("yamllint", "yamllint", DiagnosticFormat::LineColumn)
                .args(["-f", "parsable"])
                .files(FileArgs::Yaml),
        )
    };
    match platform {
        Platform::GithubActions => vec![
            tool(SyntaxTool::yaml()),
            yamllint(),
            tool(
                ProcessTool::new("actionlint", "actionlint", DiagnosticFormat::LineColumn)
                    .args(["-no-color"])
                    .files(FileArgs::Yaml),
            ),
        ],
        Platform::GitlabCi => vec![tool(SyntaxTool::yaml()), yamllint()],
        Platform::Terraform => vec![
            tool(SyntaxTool::hcl()),
            tool(
                ProcessTool::new("terraform-fmt", "terraform", DiagnosticFormat::PlainText)
                    .args(["fmt", "-check", "-recursive", "-diff", "-no-color"]),
            ),
            tool(
                ProcessTool::new("terraform-validate", "terraform", DiagnosticFormat::TerraformJson)
                    .prepare(["init", "-backend=false", "-input=false", "-no-color"])
                    .args(["validate", "-json", "-no-color"]),
            ),
        ],
        Platform::Helm => vec![
            tool(SyntaxTool::helm_template()),
            tool(
                ProcessTool::new("helm-lint", "helm", DiagnosticFormat::HelmLint)
                    .args(["lint", "chart"]),
            ),
            tool(
                ProcessTool::new("helm-template", "helm", DiagnosticFormat::PlainText)
                    .args(["template", "fops-dry-run", "chart"]),
            ),
        ],
        Platform::Prometheus => vec![
            tool(SyntaxTool::yaml()),
            tool(
                ProcessTool::new("promtool", "promtool", DiagnosticFormat::PlainText)
                    .args(["check", "rules"])
                    .files(FileArgs::Yaml),
            ),
        ],
    }
}

fn tool(t: impl IValidatorTool + 'static) -> Tool {
    Arc::new(t)
}
