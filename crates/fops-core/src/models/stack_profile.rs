use serde::{Deserialize, Serialize};

/// Primary language of a repository. `Unknown` is a valid classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Go,
    Rust,
    Java,
    Kotlin,
    Ruby,
    Php,
    Unknown,
}

impl Language {
    pub const ALL: &'static [Language] = &[
        Self::Python,
        Self::JavaScript,
        Self::TypeScript,
        Self::Go,
        Self::Rust,
        Self::Java,
        Self::Kotlin,
        Self::Ruby,
        Self::Php,
        Self::Unknown,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Go => "go",
            Self::Rust => "rust",
            Self::Java => "java",
            Self::Kotlin => "kotlin",
            Self::Ruby => "ruby",
            Self::Php => "php",
            Self::Unknown => crate::constants::UNKNOWN,
        }
    }

    /// Detect language from a file extension string.
    pub fn from_extension(ext: &str) -> Option<Language> {
        match ext {
            "py" | "pyi" => Some(Self::Python),
            "js" | "jsx" | "mjs" | "cjs" => Some(Self::JavaScript),
            "ts" | "tsx" | "mts" | "cts" => Some(Self::TypeScript),
            "go" => Some(Self::Go),
            "rs" => Some(Self::Rust),
            "java" => Some(Self::Java),
            "kt" | "kts" => Some(Self::Kotlin),
            "rb" | "rake" | "gemspec" => Some(Self::Ruby),
            "php" => Some(Self::Php),
            _ => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Package managers recognized from manifests and lock files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageManager {
    Npm,
    Yarn,
    Pnpm,
    Pip,
    Poetry,
    Pipenv,
    Cargo,
    Go,
    Maven,
    Gradle,
    Bundler,
    Composer,
    Unknown,
}

impl PackageManager {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
            Self::Pip => "pip",
            Self::Poetry => "poetry",
            Self::Pipenv => "pipenv",
            Self::Cargo => "cargo",
            Self::Go => "go",
            Self::Maven => "maven",
            Self::Gradle => "gradle",
            Self::Bundler => "bundler",
            Self::Composer => "composer",
            Self::Unknown => crate::constants::UNKNOWN,
        }
    }
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Technology-stack facts inferred from a repository. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackProfile {
    pub primary_language: Language,
    pub framework: Option<String>,
    pub has_container_descriptor: bool,
    /// Whether the repository professes to have tests.
    pub has_tests: bool,
    pub package_manager: PackageManager,
    /// Ordered repository-relative entry points (build files, main modules).
    pub build_entry_points: Vec<String>,
}

impl StackProfile {
    /// Profile for a repository with no recognizable markers.
    pub fn unknown() -> Self {
        Self {
            primary_language: Language::Unknown,
            framework: None,
            has_container_descriptor: false,
            has_tests: false,
            package_manager: PackageManager::Unknown,
            build_entry_points: Vec::new(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.primary_language == Language::Unknown
    }
}
