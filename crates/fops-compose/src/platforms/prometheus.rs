use fops_core::errors::CompositionError;
use serde_yaml::Value;

use super::{camel, Context, RenderedFile};
use crate::sections::{Section, SectionKind};
use crate::yaml::{seq, to_yaml, Map};

pub(super) const PATH: &str = "monitoring/alerts.yml";

/// Fast-burn multiplier for a 1h/5m multi-window error-budget alert.
const FAST_BURN: f64 = 14.4;

struct Objective {
    availability: f64,
    latency_seconds: f64,
    severity: &'static str,
}

pub(super) fn render(ctx: &Context<'_>) -> Result<Vec<RenderedFile>, CompositionError> {
    let service = ctx.service.as_str();
    let alert_prefix = camel(service);

    let mut groups = Vec::new();
    for env in ctx.environments {
        let objective = if ctx.is_protected(env) {
            Objective {
                availability: 0.999,
                latency_seconds: 0.3,
                severity: "page",
            }
        } else {
            Objective {
                availability: 0.99,
                latency_seconds: 0.5,
                severity: "ticket",
            }
        };
        let selector = format!("job=\"{service}\",environment=\"{env}\"");
        let env_prefix = format!("{alert_prefix}{}", camel(env));
        let budget = 1.0 - objective.availability;

        let mut rules = Vec::new();
        if let Some(section) = ctx.section(&SectionKind::Availability) {
            rules.push(rule(
                &format!("{env_prefix}HighErrorRate"),
                &format!(
                    "sum(rate(http_requests_total{{{selector},code=~\"5..\"}}[5m])) / sum(rate(http_requests_total{{{selector}}}[5m])) > {budget:.4}"
                ),
                "5m",
                &objective,
                service,
                env,
                &format!("{service} in {env} is failing more than {:.1}% of requests", budget * 100.0),
                section,
            ));
        }
        if let Some(section) = ctx.section(&SectionKind::Latency) {
            rules.push(rule(
                &format!("{env_prefix}HighLatency"),
                &format!(
                    "histogram_quantile(0.99, sum by (le) (rate(http_request_duration_seconds_bucket{{{selector}}}[5m]))) > {}",
                    objective.latency_seconds
                ),
                "10m",
                &objective,
                service,
                env,
                &format!("p99 latency of {service} in {env} is above {}s", objective.latency_seconds),
                section,
            ));
        }
        if let Some(section) = ctx.section(&SectionKind::ErrorBudget) {
            let threshold = FAST_BURN * budget;
            let ratio = |window: &str| {
                format!(
                    "(sum(rate(http_requests_total{{{selector},code=~\"5..\"}}[{window}])) / sum(rate(http_requests_total{{{selector}}}[{window}])))"
                )
            };
            rules.push(rule(
                &format!("{env_prefix}ErrorBudgetBurn"),
                &format!("{} > {threshold:.4} and {} > {threshold:.4}", ratio("1h"), ratio("5m")),
                "2m",
                &objective,
                service,
                env,
                &format!("{service} in {env} is burning its error budget {FAST_BURN}x faster than sustainable"),
                section,
            ));
        }

        groups.push(
            Map::new()
                .with("name", format!("{service}-{env}-slo"))
                .with("rules", seq(rules))
                .build(),
        );
    }

    let doc = Map::new().with("groups", seq(groups)).build();
    let body = to_yaml(PATH, &doc)?;
    let sections = ctx.sections.iter().map(|s| s.kind.clone());
    Ok(vec![RenderedFile::new(PATH, body).with_sections(sections)])
}

#[allow(clippy::too_many_arguments)]
fn rule(
    alert: &str,
    expr: &str,
    pending: &str,
    objective: &Objective,
    service: &str,
    env: &str,
    summary: &str,
    section: &Section,
) -> Value {
    Map::new()
        .with("alert", alert)
        .with("expr", expr)
        .with("for", pending)
        .with(
            "labels",
            Map::new()
                .with("severity", objective.severity)
                .with("service", service)
                .with("environment", env),
        )
        .with(
            "annotations",
            Map::new()
                .with("summary", summary)
                .with("description", section.text_or(summary)),
        )
        .build()
}
