use fops_core::errors::CompositionError;
use fops_core::models::DeployTarget;
use serde_yaml::Value;

use super::{Context, RenderedFile};
use crate::sections::SectionKind;
use crate::yaml::{s, seq, strs, to_yaml, Map};

pub(super) const PATH: &str = ".gitlab-ci.yml";

const SHA: &str = "$CI_COMMIT_SHA";
const ON_BRANCH: &str = "$CI_COMMIT_BRANCH";
const ON_MAIN: &str = "$CI_COMMIT_BRANCH == \"main\"";

pub(super) fn render(ctx: &Context<'_>) -> Result<Vec<RenderedFile>, CompositionError> {
    let mut doc = Map::new()
        .with("stages", strs(["build", "test", "security", "deploy"]))
        .with("default", Map::new().with("image", ctx.toolchain.ci_image));
    if ctx.dockerfile().is_some() {
        doc.insert("variables", Map::new().with("IMAGE", ctx.image()));
    }

    if let Some(build) = ctx.section(&SectionKind::Build) {
        doc.insert(
            "build",
            Map::new()
                .with("stage", "build")
                .with("script", script(ctx, &build.text_or(&ctx.toolchain.build))),
        );
        if let Some(dockerfile) = ctx.dockerfile() {
            doc.insert(
                "build-image",
                Map::new()
                    .with("stage", "build")
                    .with("image", "docker:24")
                    .with("services", strs(["docker:24-dind"]))
                    .with(
                        "script",
                        strs([
                            "echo \"$REGISTRY_TOKEN\" | docker login \"$CI_REGISTRY\" -u \"$CI_REGISTRY_USER\" --password-stdin",
                            format!("docker build -f {dockerfile} -t \"$IMAGE:{SHA}\" .").as_str(),
                            format!("docker push \"$IMAGE:{SHA}\"").as_str(),
                        ]),
                    )
                    .with("rules", rules(ON_BRANCH, false)),
            );
        }
    }

    for (kind, default, stage) in [
        (SectionKind::Test, &ctx.toolchain.test, "test"),
        (SectionKind::SecurityScan, &ctx.toolchain.security_scan, "security"),
    ] {
        if let Some(section) = ctx.section(&kind) {
            doc.insert(
                &section.name(),
                Map::new()
                    .with("stage", stage)
                    .with("script", script(ctx, &section.text_or(default))),
            );
        }
    }

    for env in ctx.environments {
        let Some(section) = ctx.deploy_section(env) else {
            continue;
        };
        let command = section.text_or(&ctx.deploy_command(env, SHA));
        let mut job = Map::new()
            .with("stage", "deploy")
            .with("image", deploy_image(ctx.request.deploy_target));
        if let Some(prev) = ctx.previous_environment(env) {
            job.insert("needs", strs([format!("deploy-{prev}").as_str()]));
        }
        job.insert(
            "environment",
            Map::new()
                .with("name", env.as_str())
                .with("url", format!("https://{}", ctx.host(env))),
        );
        job.insert("script", seq([s(command)]));
        let protected = ctx.is_protected(env);
        job.insert("rules", rules(if protected { ON_MAIN } else { ON_BRANCH }, protected));
        doc.insert(&section.name(), job);
    }

    let body = to_yaml(PATH, &doc.build())?;
    let sections = ctx.sections.iter().map(|s| s.kind.clone());
    Ok(vec![RenderedFile::new(PATH, body).with_sections(sections)])
}

fn script(ctx: &Context<'_>, command: &str) -> Value {
    strs([ctx.toolchain.install.as_str(), command])
}

fn rules(condition: &str, manual: bool) -> Value {
    let mut rule = Map::new().with("if", condition);
    if manual {
        rule.insert("when", "manual");
    }
    seq([rule.build()])
}

fn deploy_image(target: DeployTarget) -> &'static str {
    match target {
        DeployTarget::Kubernetes => "alpine/helm:3.14",
        DeployTarget::Serverless => "node:20-alpine",
        DeployTarget::Static => "amazon/aws-cli:2.15.0",
    }
}
