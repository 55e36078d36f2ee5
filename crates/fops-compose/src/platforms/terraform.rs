use fops_core::errors::CompositionError;
use fops_core::models::DeployTarget;

use super::{comment_lines, Context, RenderedFile};
use crate::sections::{Section, SectionKind};

pub(super) fn render(ctx: &Context<'_>) -> Result<Vec<RenderedFile>, CompositionError> {
    let mut main = String::new();
    main.push_str(&terraform_block(ctx.request.deploy_target));
    main.push_str(&locals(ctx));

    let mut main_sections = Vec::new();
    if let Some(workload) = ctx.section(&SectionKind::Workload) {
        main.push_str("\n# Section: workload\n");
        main.push_str(&workload_resources(ctx));
        main.push_str(&splice(workload));
        main_sections.push(workload.kind.clone());
    }
    if let Some(policy) = ctx.section(&SectionKind::SecurityPolicy) {
        main.push_str("\n# Section: security-policy\n");
        main.push_str(&policy_resources(ctx));
        main.push_str(&splice(policy));
        main_sections.push(policy.kind.clone());
    }

    let mut files = vec![
        RenderedFile::new("main.tf", main).with_sections(main_sections),
        RenderedFile::new("variables.tf", variables(ctx)),
        RenderedFile::new("outputs.tf", outputs(ctx.request.deploy_target)),
    ];

    for env in ctx.environments {
        let replicas = if ctx.is_protected(env) { 3 } else { 1 };
        let mut body = format!("environment = \"{env}\"\n");
        match ctx.request.deploy_target {
            DeployTarget::Kubernetes => {
                body.push_str(&format!("replicas    = {replicas}\n"));
                body.push_str(&format!("image       = \"{}:latest\"\n", ctx.image()));
            }
            DeployTarget::Serverless => {
                body.push_str(&format!("memory_size = {}\n", if replicas > 1 { 512 } else { 256 }));
            }
            DeployTarget::Static => {}
        }
        let mut file = RenderedFile::new(format!("environments/{env}/terraform.tfvars"), String::new());
        if let Some(section) = ctx.environment_section(env) {
            body.push_str(&splice(section));
            file.sections.push(section.kind.clone());
        }
        file.body = body;
        files.push(file);
    }

    Ok(files)
}

/// Guidance that reads as HCL statements is inserted as-is and must parse;
/// prose becomes a comment.
fn splice(section: &Section) -> String {
    let Some(guidance) = &section.guidance else {
        return String::new();
    };
    let text = guidance.text();
    if looks_like_hcl(text) {
        format!("\n{text}\n")
    } else {
        format!("\n{}", comment_lines(text))
    }
}

fn looks_like_hcl(text: &str) -> bool {
    let first = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with("//"));
    let Some(first) = first else {
        return false;
    };
    if first.ends_with('{') {
        return true;
    }
    match first.split_once('=') {
        Some((name, _)) => {
            let name = name.trim();
            !name.is_empty()
                && name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        }
        None => false,
    }
}

fn terraform_block(target: DeployTarget) -> String {
    let (provider, source, version) = match target {
        DeployTarget::Kubernetes => ("kubernetes", "hashicorp/kubernetes", "~> 2.27"),
        DeployTarget::Serverless | DeployTarget::Static => ("aws", "hashicorp/aws", "~> 5.40"),
    };
    let config = match target {
        DeployTarget::Kubernetes => "  config_path = var.kubeconfig_path\n",
        DeployTarget::Serverless | DeployTarget::Static => "  region = var.region\n",
    };
    format!(
        r#"terraform {{
  required_version = ">= 1.5.0"

  required_providers {{
    {provider} = {{
      source  = "{source}"
      version = "{version}"
    }}
  }}
}}

provider "{provider}" {{
{config}}}
"#
    )
}

fn locals(ctx: &Context<'_>) -> String {
    format!(
        r#"
locals {{
  name = "{service}-${{var.environment}}"
  labels = {{
    "app.kubernetes.io/name"       = "{service}"
    "app.kubernetes.io/managed-by" = "terraform"
    "environment"                  = var.environment
  }}
}}
"#,
        service = ctx.service
    )
}

fn workload_resources(ctx: &Context<'_>) -> String {
    match ctx.request.deploy_target {
        DeployTarget::Kubernetes => format!(
            r#"resource "kubernetes_deployment_v1" "this" {{
  metadata {{
    name   = local.name
    labels = local.labels
  }}

  spec {{
    replicas = var.replicas

    selector {{
      match_labels = local.labels
    }}

    template {{
      metadata {{
        labels = local.labels
      }}

      spec {{
        container {{
          name  = "{service}"
          image = var.image

          port {{
            container_port = {port}
          }}

          resources {{
            requests = {{
              cpu    = "100m"
              memory = "128Mi"
            }}
            limits = {{
              memory = "512Mi"
            }}
          }}
        }}
      }}
    }}
  }}
}}

resource "kubernetes_service_v1" "this" {{
  metadata {{
    name   = local.name
    labels = local.labels
  }}

  spec {{
    selector = local.labels

    port {{
      port        = 80
      target_port = {port}
    }}
  }}
}}
"#,
            service = ctx.service,
            port = ctx.toolchain.port
        ),
        DeployTarget::Serverless => r#"resource "aws_iam_role" "this" {
  name = local.name

  assume_role_policy = jsonencode({
    Version = "2012-10-17"
    Statement = [{
      Action    = "sts:AssumeRole"
      Effect    = "Allow"
      Principal = { Service = "lambda.amazonaws.com" }
    }]
  })
}

resource "aws_lambda_function" "this" {
  function_name = local.name
  role          = aws_iam_role.this.arn
  package_type  = "Image"
  image_uri     = var.image
  memory_size   = var.memory_size
  timeout       = 30
  tags          = local.labels
}
"#
        .to_string(),
        DeployTarget::Static => r#"resource "aws_s3_bucket" "this" {
  bucket = local.name
  tags   = local.labels
}

resource "aws_s3_bucket_website_configuration" "this" {
  bucket = aws_s3_bucket.this.id

  index_document {
    suffix = "index.html"
  }
}
"#
        .to_string(),
    }
}

fn policy_resources(ctx: &Context<'_>) -> String {
    match ctx.request.deploy_target {
        DeployTarget::Kubernetes => r#"resource "kubernetes_network_policy_v1" "this" {
  metadata {
    name = "${local.name}-default-deny"
  }

  spec {
    pod_selector {
      match_labels = local.labels
    }

    policy_types = ["Ingress"]

    ingress {
      from {
        namespace_selector {}
      }
    }
  }
}
"#
        .to_string(),
        DeployTarget::Serverless => r#"resource "aws_iam_role_policy_attachment" "logs" {
  role       = aws_iam_role.this.name
  policy_arn = "arn:aws:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole"
}
"#
        .to_string(),
        DeployTarget::Static => r#"resource "aws_s3_bucket_server_side_encryption_configuration" "this" {
  bucket = aws_s3_bucket.this.id

  rule {
    apply_server_side_encryption_by_default {
      sse_algorithm = "AES256"
    }
  }
}
"#
        .to_string(),
    }
}

fn variables(ctx: &Context<'_>) -> String {
    let mut out = String::from(
        r#"variable "environment" {
  type        = string
  description = "Deployment environment name."
}
"#,
    );
    match ctx.request.deploy_target {
        DeployTarget::Kubernetes => out.push_str(&format!(
            r#"
variable "image" {{
  type        = string
  description = "Container image including tag."
  default     = "{image}:latest"
}}

variable "replicas" {{
  type    = number
  default = 1
}}

variable "kubeconfig_path" {{
  type    = string
  default = "~/.kube/config"
}}
"#,
            image = ctx.image()
        )),
        DeployTarget::Serverless => out.push_str(&format!(
            r#"
variable "image" {{
  type    = string
  default = "{image}:latest"
}}

variable "memory_size" {{
  type    = number
  default = 256
}}

variable "region" {{
  type    = string
  default = "us-east-1"
}}
"#,
            image = ctx.image()
        )),
        DeployTarget::Static => out.push_str(
            r#"
variable "region" {
  type    = string
  default = "us-east-1"
}
"#,
        ),
    }
    out
}

fn outputs(target: DeployTarget) -> String {
    let (name, value) = match target {
        DeployTarget::Kubernetes => ("service_name", "kubernetes_service_v1.this.metadata[0].name"),
        DeployTarget::Serverless => ("function_arn", "aws_lambda_function.this.arn"),
        DeployTarget::Static => ("website_endpoint", "aws_s3_bucket_website_configuration.this.website_endpoint"),
    };
    format!("output \"{name}\" {{\n  value = {value}\n}}\n")
}
