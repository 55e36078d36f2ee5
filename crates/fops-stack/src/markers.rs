//! Marker-file priority table.

use fops_core::models::{Language, PackageManager};

use crate::snapshot::file_name;

/// Explicit build manifest.
pub const RANK_BUILD_MANIFEST: u32 = 100;
/// Loose dependency list without build semantics.
pub const RANK_LOOSE_MANIFEST: u32 = 80;
/// File-extension majority.
pub const RANK_EXTENSION: u32 = 10;

/// One row of the priority table. Higher rank wins; ties go to table order.
#[derive(Debug, Clone, Copy)]
pub struct MarkerRule {
    pub file_name: &'static str,
    pub language: Language,
    pub package_manager: PackageManager,
    pub rank: u32,
}

const fn rule(
    file_name: &'static str,
    language: Language,
    package_manager: PackageManager,
    rank: u32,
) -> MarkerRule {
    MarkerRule {
        file_name,
        language,
        package_manager,
        rank,
    }
}

pub const MARKER_RULES: &[MarkerRule] = &[
    rule("pyproject.toml", Language::Python, PackageManager::Pip, RANK_BUILD_MANIFEST),
    rule("Cargo.toml", Language::Rust, PackageManager::Cargo, RANK_BUILD_MANIFEST),
    rule("go.mod", Language::Go, PackageManager::Go, RANK_BUILD_MANIFEST),
    rule("package.json", Language::JavaScript, PackageManager::Npm, RANK_BUILD_MANIFEST),
    rule("pom.xml", Language::Java, PackageManager::Maven, RANK_BUILD_MANIFEST),
    rule("build.gradle", Language::Java, PackageManager::Gradle, RANK_BUILD_MANIFEST),
    rule("build.gradle.kts", Language::Kotlin, PackageManager::Gradle, RANK_BUILD_MANIFEST),
    rule("Gemfile", Language::Ruby, PackageManager::Bundler, RANK_BUILD_MANIFEST),
    rule("composer.json", Language::Php, PackageManager::Composer, RANK_BUILD_MANIFEST),
    rule("requirements.txt", Language::Python, PackageManager::Pip, RANK_LOOSE_MANIFEST),
    rule("Pipfile", Language::Python, PackageManager::Pipenv, RANK_LOOSE_MANIFEST),
    rule("setup.py", Language::Python, PackageManager::Pip, RANK_LOOSE_MANIFEST),
];

/// Lock files refine the package manager of the winning manifest.
pub const LOCK_FILES: &[(&str, PackageManager)] = &[
    ("yarn.lock", PackageManager::Yarn),
    ("pnpm-lock.yaml", PackageManager::Pnpm),
    ("package-lock.json", PackageManager::Npm),
    ("poetry.lock", PackageManager::Poetry),
    ("Pipfile.lock", PackageManager::Pipenv),
];

const COMPOSE_FILES: &[&str] = &[
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];

/// Position of `path` in the priority table, if it is a manifest.
pub fn rule_for(path: &str) -> Option<(usize, &'static MarkerRule)> {
    let name = file_name(path);
    MARKER_RULES
        .iter()
        .enumerate()
        .find(|(_, r)| r.file_name == name)
}

/// Whether a path names a container descriptor.
pub fn is_container_descriptor(path: &str) -> bool {
    let name = file_name(path);
    name == "Containerfile"
        || name == "Dockerfile"
        || name.starts_with("Dockerfile.")
        || name.ends_with(".Dockerfile")
        || COMPOSE_FILES.contains(&name)
}

/// Whether the classifier needs this file's content.
pub fn is_marker_path(path: &str) -> bool {
    rule_for(path).is_some() || is_container_descriptor(path)
}

/// Whether a path looks like a test file or lives in a test directory.
pub fn is_test_path(path: &str) -> bool {
    let mut components = path.split('/').peekable();
    while let Some(component) = components.next() {
        if components.peek().is_some() {
            if matches!(component, "test" | "tests" | "__tests__" | "spec" | "specs") {
                return true;
            }
            continue;
        }
        let name = component;
        let stem_ends = |suffix: &str| {
            name.rsplit_once('.')
                .is_some_and(|(stem, _)| stem.ends_with(suffix))
        };
        return (name.starts_with("test_") && name.ends_with(".py"))
            || stem_ends("_test")
            || stem_ends(".test")
            || stem_ends(".spec")
            || stem_ends("_spec")
            || (name.ends_with("Test.java") || name.ends_with("Test.kt"));
    }
    false
}
