//! Stack Classifier: `RepositorySnapshot` in, `StackProfile` out.

use std::collections::BTreeMap;

use fops_core::classify_span;
use fops_core::models::{Language, PackageManager, StackProfile};

use crate::frameworks;
use crate::markers::{self, MarkerRule, LOCK_FILES, RANK_EXTENSION};
use crate::snapshot::{depth, file_name, RepositorySnapshot};

/// Infers technology-stack facts from a repository snapshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct StackClassifier;

/// A manifest present in the snapshot, with its sort key.
struct Candidate<'a> {
    path: &'a str,
    rule: &'static MarkerRule,
    table_index: usize,
}

impl StackClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify. Never fails; unknown facts are reported as such.
    pub fn classify(&self, snapshot: &RepositorySnapshot) -> StackProfile {
        let span = classify_span!(snapshot.files.len());
        let _guard = span.enter();

        let mut candidates: Vec<Candidate<'_>> = snapshot
            .files
            .iter()
            .filter_map(|path| {
                markers::rule_for(path).map(|(table_index, rule)| Candidate {
                    path,
                    rule,
                    table_index,
                })
            })
            .collect();
        // Highest rank, then shallowest, then table order, then path.
        candidates.sort_by(|a, b| {
            b.rule
                .rank
                .cmp(&a.rule.rank)
                .then_with(|| depth(a.path).cmp(&depth(b.path)))
                .then_with(|| a.table_index.cmp(&b.table_index))
                .then_with(|| a.path.cmp(b.path))
        });

        let has_container_descriptor = snapshot
            .files
            .iter()
            .any(|p| markers::is_container_descriptor(p));
        let has_tests = snapshot.files.iter().any(|p| markers::is_test_path(p));

        let (primary_language, package_manager) = match candidates.first() {
            Some(best) => {
                let language = refine_language(best.rule.language, snapshot);
                let pm = refine_package_manager(best, snapshot);
                (language, pm)
            }
            None => match extension_majority(snapshot) {
                Some(language) => {
                    tracing::debug!(language = %language, rank = RANK_EXTENSION, "language from extension majority");
                    (language, PackageManager::Unknown)
                }
                None => (Language::Unknown, PackageManager::Unknown),
            },
        };

        let framework = if primary_language == Language::Unknown {
            None
        } else {
            frameworks::detect(
                primary_language,
                candidates
                    .iter()
                    .filter(|c| same_family(c.rule.language, primary_language))
                    .filter_map(|c| snapshot.marker(c.path)),
            )
        };

        let mut build_entry_points: Vec<String> =
            candidates.iter().map(|c| c.path.to_string()).collect();
        build_entry_points.extend(
            snapshot
                .files
                .iter()
                .filter(|p| markers::is_container_descriptor(p))
                .cloned(),
        );

        let profile = StackProfile {
            primary_language,
            framework,
            has_container_descriptor,
            has_tests,
            package_manager,
            build_entry_points,
        };
        tracing::info!(
            language = %profile.primary_language,
            framework = profile.framework.as_deref().unwrap_or("none"),
            container = profile.has_container_descriptor,
            has_tests = profile.has_tests,
            "stack classified"
        );
        profile
    }
}

fn same_family(a: Language, b: Language) -> bool {
    let family = |l: Language| match l {
        Language::TypeScript => Language::JavaScript,
        Language::Kotlin => Language::Java,
        other => other,
    };
    family(a) == family(b)
}

/// `package.json` with a TypeScript config is TypeScript.
fn refine_language(language: Language, snapshot: &RepositorySnapshot) -> Language {
    if language == Language::JavaScript
        && snapshot
            .files
            .iter()
            .any(|p| file_name(p) == "tsconfig.json")
    {
        return Language::TypeScript;
    }
    language
}

fn refine_package_manager(best: &Candidate<'_>, snapshot: &RepositorySnapshot) -> PackageManager {
    if best.rule.file_name == "pyproject.toml" {
        let poetry = snapshot
            .marker(best.path)
            .is_some_and(|content| content.contains("[tool.poetry]"));
        if poetry {
            return PackageManager::Poetry;
        }
    }
    let dir = best.path.rsplit_once('/').map(|(d, _)| d);
    for (lock, pm) in LOCK_FILES {
        let lock_path = match dir {
            Some(d) => format!("{d}/{lock}"),
            None => lock.to_string(),
        };
        if snapshot.contains(&lock_path) && same_ecosystem(best.rule.package_manager, *pm) {
            return *pm;
        }
    }
    best.rule.package_manager
}

fn same_ecosystem(a: PackageManager, b: PackageManager) -> bool {
    use PackageManager::*;
    let eco = |pm: PackageManager| match pm {
        Npm | Yarn | Pnpm => 0,
        Pip | Poetry | Pipenv => 1,
        _ => 2,
    };
    eco(a) == eco(b) && eco(a) != 2
}

/// Most common source language by file extension; ties go to `Language::ALL` order.
fn extension_majority(snapshot: &RepositorySnapshot) -> Option<Language> {
    let mut counts: BTreeMap<Language, usize> = BTreeMap::new();
    for path in &snapshot.files {
        let name = file_name(path);
        if let Some((_, ext)) = name.rsplit_once('.') {
            if let Some(language) = Language::from_extension(ext) {
                *counts.entry(language).or_insert(0) += 1;
            }
        }
    }
    let max = counts.values().copied().max()?;
    Language::ALL
        .iter()
        .copied()
        .find(|l| counts.get(l) == Some(&max))
}
