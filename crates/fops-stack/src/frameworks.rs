//! Framework detection from manifest content.

use std::sync::LazyLock;

use fops_core::models::Language;
use regex::Regex;

/// (language family, pattern, framework). First match in table order wins.
const FRAMEWORK_PATTERNS: &[(Language, &str, &str)] = &[
    (Language::Python, r"(?im)(?:^|[\s\x22'\[,])fastapi\b", "fastapi"),
    (Language::Python, r"(?im)(?:^|[\s\x22'\[,])django\b", "django"),
    (Language::Python, r"(?im)(?:^|[\s\x22'\[,])flask\b", "flask"),
    (Language::JavaScript, r#""next"\s*:"#, "next"),
    (Language::JavaScript, r#""express"\s*:"#, "express"),
    (Language::JavaScript, r#""react"\s*:"#, "react"),
    (Language::Go, r"github\.com/gin-gonic/gin\b", "gin"),
    (Language::Go, r"github\.com/labstack/echo\b", "echo"),
    (Language::Rust, r"(?m)^\s*axum\s*=", "axum"),
    (Language::Rust, r"(?m)^\s*actix-web\s*=", "actix-web"),
    (Language::Java, r"spring-boot", "spring-boot"),
    (Language::Ruby, r#"(?m)^\s*gem\s+['"]rails['"]"#, "rails"),
];

static COMPILED: LazyLock<Vec<(Language, Regex, &'static str)>> = LazyLock::new(|| {
    FRAMEWORK_PATTERNS
        .iter()
        .filter_map(|(lang, pattern, name)| Regex::new(pattern).ok().map(|re| (*lang, re, *name)))
        .collect()
});

/// Languages sharing a manifest format are matched against the same rows.
fn pattern_family(language: Language) -> Language {
    match language {
        Language::TypeScript => Language::JavaScript,
        Language::Kotlin => Language::Java,
        other => other,
    }
}

/// Detect a framework for `language` from manifest contents, in the order given.
pub fn detect<'a>(language: Language, manifests: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let family = pattern_family(language);
    let manifests: Vec<&str> = manifests.into_iter().collect();
    COMPILED
        .iter()
        .filter(|(lang, _, _)| *lang == family)
        .find(|(_, re, _)| manifests.iter().any(|m| re.is_match(m)))
        .map(|(_, _, name)| name.to_string())
}
