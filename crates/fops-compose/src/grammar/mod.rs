//! Format grammars every composed file must satisfy before it leaves the engine.

pub mod hcl;
pub mod helm;
pub mod yaml;

use fops_core::errors::CompositionError;

/// Grammar a generated file is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    Yaml,
    Hcl,
    /// Chart template: balanced actions, then YAML once actions are neutralized.
    HelmTemplate,
    /// Helper or notes file: balanced actions only.
    HelmText,
}

impl Grammar {
    pub fn for_path(path: &str) -> Option<Grammar> {
        let in_templates = path.contains("templates/");
        if path.ends_with(".tf") || path.ends_with(".tfvars") {
            Some(Self::Hcl)
        } else if in_templates && (path.ends_with(".yaml") || path.ends_with(".yml")) {
            Some(Self::HelmTemplate)
        } else if in_templates && (path.ends_with(".tpl") || path.ends_with(".txt")) {
            Some(Self::HelmText)
        } else if path.ends_with(".yaml") || path.ends_with(".yml") {
            Some(Self::Yaml)
        } else {
            None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Hcl => "hcl",
            Self::HelmTemplate | Self::HelmText => "helm-template",
        }
    }

    /// Comment prefix usable at the top of a file, if the format has one.
    pub fn line_comment(&self) -> Option<&'static str> {
        match self {
            Self::Yaml | Self::Hcl | Self::HelmTemplate => Some("#"),
            Self::HelmText => None,
        }
    }
}

/// Check `content` against the grammar chosen by `path`'s extension.
/// Files with no known grammar pass.
pub fn check(path: &str, content: &str) -> Result<(), CompositionError> {
    match Grammar::for_path(path) {
        Some(Grammar::Yaml) => yaml::check(path, content),
        Some(Grammar::Hcl) => hcl::check(path, content),
        Some(Grammar::HelmTemplate) => helm::check_template(path, content),
        Some(Grammar::HelmText) => helm::check_text(path, content),
        None => Ok(()),
    }
}

pub(crate) fn failure(file: &str, grammar: Grammar, line: usize, message: impl Into<String>) -> CompositionError {
    CompositionError::ParseFailure {
        file: file.to_string(),
        format: grammar.name().to_string(),
        line,
        message: message.into(),
    }
}
