use fops_core::errors::CompositionError;
use serde_yaml::Value;

use super::{Context, RenderedFile};
use crate::sections::SectionKind;
use crate::yaml::{s, seq, strs, to_yaml, Map};

pub(super) const PATH: &str = ".github/workflows/pipeline.yml";

const SHA: &str = "${{ github.sha }}";
const ON_PUSH: &str = "github.event_name == 'push'";
const ON_MAIN: &str = "github.event_name == 'push' && github.ref == 'refs/heads/main'";

pub(super) fn render(ctx: &Context<'_>) -> Result<Vec<RenderedFile>, CompositionError> {
    let mut jobs = Map::new();
    let mut gate = Vec::new();

    if let Some(build) = ctx.section(&SectionKind::Build) {
        let mut steps = setup_steps(ctx);
        steps.push(run_step("Build", &build.text_or(&ctx.toolchain.build)));
        if let Some(dockerfile) = ctx.dockerfile() {
            steps.push(run_step(
                "Build image",
                &format!("docker build -f {dockerfile} -t \"$IMAGE:{SHA}\" ."),
            ));
            steps.push(
                Map::new()
                    .with("name", "Push image")
                    .with("if", ON_PUSH)
                    .with(
                        "run",
                        format!(
                            "echo \"${{{{ secrets.REGISTRY_TOKEN }}}}\" | docker login {} -u \"${{{{ github.actor }}}}\" --password-stdin\ndocker push \"$IMAGE:{SHA}\"\n",
                            ctx.registry_host()
                        ),
                    )
                    .build(),
            );
        }
        jobs.insert("build", job(None, steps));
    }

    for (kind, default, label) in [
        (SectionKind::Test, &ctx.toolchain.test, "Test"),
        (SectionKind::SecurityScan, &ctx.toolchain.security_scan, "Security scan"),
    ] {
        if let Some(section) = ctx.section(&kind) {
            let mut steps = setup_steps(ctx);
            steps.push(run_step(label, &section.text_or(default)));
            jobs.insert(&section.name(), job(Some(strs(["build"])), steps));
            gate.push(section.name());
        }
    }
    if gate.is_empty() {
        gate.push("build".to_string());
    }

    for env in ctx.environments {
        let Some(section) = ctx.deploy_section(env) else {
            continue;
        };
        let needs = match ctx.previous_environment(env) {
            Some(prev) => s(format!("deploy-{prev}")),
            None => seq(gate.iter().map(|g| s(g.as_str()))),
        };
        let command = section.text_or(&ctx.deploy_command(env, SHA));
        let steps = vec![
            Map::new().with("uses", "actions/checkout@v4").build(),
            run_step(&format!("Deploy to {env}"), &command),
        ];
        let mut deploy = Map::new()
            .with("needs", needs)
            .with("if", if ctx.is_protected(env) { ON_MAIN } else { ON_PUSH })
            .with("runs-on", "ubuntu-latest")
            .with(
                "environment",
                Map::new()
                    .with("name", env.as_str())
                    .with("url", format!("https://{}", ctx.host(env))),
            );
        deploy.insert("steps", seq(steps));
        jobs.insert(&section.name(), deploy);
    }

    let mut permissions = Map::new().with("contents", "read");
    if ctx.dockerfile().is_some() {
        permissions.insert("packages", "write");
    }

    let mut workflow = Map::new()
        .with("name", format!("{} pipeline", ctx.service))
        .with(
            "on",
            Map::new()
                .with("push", Map::new().with("branches", strs(["main"])))
                .with("pull_request", Map::new().with("branches", strs(["main"]))),
        )
        .with("permissions", permissions);
    if ctx.dockerfile().is_some() {
        workflow.insert("env", Map::new().with("IMAGE", ctx.image()));
    }
    workflow.insert("jobs", jobs);

    let body = to_yaml(PATH, &workflow.build())?;
    let sections = ctx.sections.iter().map(|s| s.kind.clone());
    Ok(vec![RenderedFile::new(PATH, body).with_sections(sections)])
}

fn job(needs: Option<Value>, steps: Vec<Value>) -> Map {
    let mut job = Map::new();
    if let Some(needs) = needs {
        job.insert("needs", needs);
    }
    job.insert("runs-on", "ubuntu-latest");
    job.insert("steps", seq(steps));
    job
}

fn setup_steps(ctx: &Context<'_>) -> Vec<Value> {
    let mut steps = vec![Map::new().with("uses", "actions/checkout@v4").build()];
    if let Some((action, inputs)) = &ctx.toolchain.setup_action {
        let mut step = Map::new().with("uses", *action);
        if !inputs.is_empty() {
            let mut with = Map::new();
            for (key, value) in inputs {
                with.insert(key, *value);
            }
            step.insert("with", with);
        }
        steps.push(step.build());
    }
    steps.push(run_step("Install dependencies", &ctx.toolchain.install));
    steps
}

fn run_step(name: &str, command: &str) -> Value {
    Map::new().with("name", name).with("run", command).build()
}
