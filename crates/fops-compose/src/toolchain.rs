//! Per-language build commands. The match over `Language` is exhaustive, so
//! a new language cannot be added without deciding how it builds.

use fops_core::models::{Language, PackageManager, StackProfile};

/// How a language is set up, built, tested and scanned in CI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// GitHub setup action and its inputs, if the language needs one.
    pub setup_action: Option<(&'static str, Vec<(&'static str, &'static str)>)>,
    /// Container image for image-based CI systems.
    pub ci_image: &'static str,
    pub install: String,
    pub build: String,
    pub test: String,
    pub security_scan: String,
    /// Port the service listens on by convention.
    pub port: u16,
}

const GENERIC_BUILD: &str =
    "if [ -f Makefile ]; then make build; else echo \"no build step detected\"; fi";
const GENERIC_TEST: &str =
    "if [ -f Makefile ]; then make test; else echo \"no test step detected\"; fi";
const GENERIC_SCAN: &str = "trivy fs --severity HIGH,CRITICAL --exit-code 1 .";

impl Toolchain {
    pub fn for_profile(profile: &StackProfile) -> Toolchain {
        let pm = profile.package_manager;
        match profile.primary_language {
            Language::Python => python(profile),
            Language::JavaScript | Language::TypeScript => node(pm),
            Language::Go => Toolchain {
                setup_action: Some(("actions/setup-go@v5", vec![("go-version", "1.22")])),
                ci_image: "golang:1.22",
                install: "go mod download".into(),
                build: "go build ./...".into(),
                test: "go test ./...".into(),
                security_scan:
                    "go install golang.org/x/vuln/cmd/govulncheck@latest && govulncheck ./...".into(),
                port: 8080,
            },
            Language::Rust => Toolchain {
                setup_action: Some(("dtolnay/rust-toolchain@stable", Vec::new())),
                ci_image: "rust:1.79",
                install: "cargo fetch --locked".into(),
                build: "cargo build --release --locked".into(),
                test: "cargo test --locked".into(),
                security_scan: "cargo install cargo-audit --locked && cargo audit".into(),
                port: 8080,
            },
            Language::Java | Language::Kotlin => jvm(pm),
            Language::Ruby => Toolchain {
                setup_action: Some(("ruby/setup-ruby@v1", vec![("ruby-version", "3.3")])),
                ci_image: "ruby:3.3",
                install: "bundle install --jobs 4".into(),
                build: "bundle exec rake build || echo \"no build task\"".into(),
                test: "bundle exec rspec".into(),
                security_scan: "gem install bundler-audit && bundle-audit check --update".into(),
                port: 3000,
            },
            Language::Php => Toolchain {
                setup_action: Some(("shivammathur/setup-php@v2", vec![("php-version", "8.3")])),
                ci_image: "php:8.3-cli",
                install: "composer install --no-interaction --prefer-dist".into(),
                build: "composer dump-autoload --optimize".into(),
                test: "vendor/bin/phpunit".into(),
                security_scan: "composer audit".into(),
                port: 8080,
            },
            Language::Unknown => Toolchain {
                setup_action: None,
                ci_image: "ubuntu:24.04",
                install: "echo \"no package manager detected\"".into(),
                build: GENERIC_BUILD.into(),
                test: GENERIC_TEST.into(),
                security_scan: GENERIC_SCAN.into(),
                port: 8080,
            },
        }
    }

    pub fn is_generic(&self) -> bool {
        self.build == GENERIC_BUILD
    }
}

fn python(profile: &StackProfile) -> Toolchain {
    let (install, runner) = match profile.package_manager {
        PackageManager::Poetry => ("pip install poetry && poetry install".to_string(), "poetry run "),
        PackageManager::Pipenv => ("pip install pipenv && pipenv install --dev".to_string(), "pipenv run "),
        _ => {
            let requirements = profile
                .build_entry_points
                .iter()
                .find(|p| p.ends_with("requirements.txt"));
            let install = match requirements {
                Some(path) => format!("pip install -r {path}"),
                None => "pip install .".to_string(),
            };
            (install, "")
        }
    };
    Toolchain {
        setup_action: Some(("actions/setup-python@v5", vec![("python-version", "3.12")])),
        ci_image: "python:3.12-slim",
        install,
        build: format!("{runner}python -m compileall -q ."),
        test: format!("{runner}pytest"),
        security_scan: "pip install bandit && bandit -r . -x ./tests".into(),
        port: 8000,
    }
}

fn node(pm: PackageManager) -> Toolchain {
    let (install, run) = match pm {
        PackageManager::Yarn => ("yarn install --frozen-lockfile", "yarn"),
        PackageManager::Pnpm => ("corepack enable && pnpm install --frozen-lockfile", "pnpm"),
        _ => ("npm ci", "npm"),
    };
    Toolchain {
        setup_action: Some(("actions/setup-node@v4", vec![("node-version", "20")])),
        ci_image: "node:20-alpine",
        install: install.into(),
        build: format!("{run} run build --if-present"),
        test: format!("{run} test"),
        security_scan: format!("{run} audit --audit-level=high"),
        port: 3000,
    }
}

fn jvm(pm: PackageManager) -> Toolchain {
    let setup = Some((
        "actions/setup-java@v4",
        vec![("distribution", "temurin"), ("java-version", "21")],
    ));
    match pm {
        PackageManager::Gradle => Toolchain {
            setup_action: setup,
            ci_image: "gradle:8-jdk21",
            install: "./gradlew dependencies".into(),
            build: "./gradlew assemble".into(),
            test: "./gradlew test".into(),
            security_scan: "./gradlew dependencyCheckAnalyze".into(),
            port: 8080,
        },
        _ => Toolchain {
            setup_action: setup,
            ci_image: "maven:3.9-eclipse-temurin-21",
            install: "mvn -B dependency:go-offline".into(),
            build: "mvn -B package -DskipTests".into(),
            test: "mvn -B test".into(),
            security_scan: "mvn -B org.owasp:dependency-check-maven:check".into(),
            port: 8080,
        },
    }
}
