use fops_core::errors::CompositionError;
use serde_yaml::Value;

use super::{comment_lines, Context, RenderedFile};
use crate::sections::{Section, SectionKind};
use crate::yaml::{strs, to_yaml, Map};

pub(super) fn render(ctx: &Context<'_>) -> Result<Vec<RenderedFile>, CompositionError> {
    let service = ctx.service.as_str();

    let chart = Map::new()
        .with("apiVersion", "v2")
        .with("name", service)
        .with("description", format!("Helm chart for {service}"))
        .with("type", "application")
        .with("version", "0.1.0")
        .with("appVersion", "latest")
        .build();

    let mut values = Map::new()
        .with("replicaCount", Value::from(1))
        .with(
            "image",
            Map::new()
                .with("repository", ctx.image())
                .with("tag", "latest")
                .with("pullPolicy", "IfNotPresent"),
        )
        .with(
            "service",
            Map::new()
                .with("type", "ClusterIP")
                .with("port", Value::from(80))
                .with("targetPort", Value::from(ctx.toolchain.port)),
        )
        .with(
            "ingress",
            Map::new().with("enabled", false).with("host", ""),
        )
        .with(
            "resources",
            Map::new()
                .with("requests", Map::new().with("cpu", "100m").with("memory", "128Mi"))
                .with("limits", Map::new().with("memory", "512Mi")),
        );
    let mut values_sections = Vec::new();
    if ctx.has(&SectionKind::SecurityPolicy) {
        values.insert(
            "podSecurityContext",
            Map::new()
                .with("runAsNonRoot", true)
                .with("seccompProfile", Map::new().with("type", "RuntimeDefault")),
        );
        values.insert(
            "securityContext",
            Map::new()
                .with("allowPrivilegeEscalation", false)
                .with("readOnlyRootFilesystem", true)
                .with("capabilities", Map::new().with("drop", strs(["ALL"]))),
        );
    }
    let mut values = values.build();
    let mut notes = String::new();
    for kind in [SectionKind::Workload, SectionKind::SecurityPolicy] {
        if let Some(section) = ctx.section(&kind) {
            notes.push_str(&splice(section, &mut values));
            values_sections.push(kind);
        }
    }

    let mut files = vec![
        RenderedFile::new("chart/Chart.yaml", to_yaml("chart/Chart.yaml", &chart)?),
        RenderedFile::new(
            "chart/values.yaml",
            notes + &to_yaml("chart/values.yaml", &values)?,
        )
        .with_sections(values_sections),
    ];

    for env in ctx.environments {
        let path = format!("chart/values-{env}.yaml");
        let replicas = if ctx.is_protected(env) { 3 } else { 1 };
        let mut env_values = Map::new()
            .with("replicaCount", Value::from(replicas))
            .with(
                "ingress",
                Map::new()
                    .with("enabled", true)
                    .with("host", ctx.host(env)),
            )
            .build();
        let mut file = RenderedFile::new(path.clone(), String::new());
        let mut notes = String::new();
        if let Some(section) = ctx.environment_section(env) {
            notes = splice(section, &mut env_values);
            file.sections.push(section.kind.clone());
        }
        file.body = notes + &to_yaml(&path, &env_values)?;
        files.push(file);
    }

    files.push(RenderedFile::new("chart/templates/_helpers.tpl", helpers(service)));
    files.push(RenderedFile::new(
        "chart/templates/deployment.yaml",
        DEPLOYMENT.replace("SERVICE", service),
    ));
    files.push(RenderedFile::new(
        "chart/templates/service.yaml",
        SERVICE.replace("SERVICE", service),
    ));
    files.push(RenderedFile::new(
        "chart/templates/ingress.yaml",
        INGRESS.replace("SERVICE", service),
    ));
    Ok(files)
}

/// Guidance that parses as a YAML mapping is merged into `values`; anything
/// else is kept as a comment above them.
fn splice(section: &Section, values: &mut Value) -> String {
    let Some(guidance) = &section.guidance else {
        return String::new();
    };
    if let Ok(Value::Mapping(overrides)) = serde_yaml::from_str::<Value>(guidance.text()) {
        if let Value::Mapping(target) = values {
            for (key, value) in overrides {
                target.insert(key, value);
            }
            return String::new();
        }
    }
    format!("# {}:\n{}", section.name(), comment_lines(guidance.text()))
}

fn helpers(service: &str) -> String {
    format!(
        r#"{{{{- define "{service}.fullname" -}}}}
{{{{- printf "%s-%s" .Release.Name .Chart.Name | trunc 63 | trimSuffix "-" -}}}}
{{{{- end -}}}}

{{{{- define "{service}.labels" -}}}}
app.kubernetes.io/name: {{{{ .Chart.Name }}}}
app.kubernetes.io/instance: {{{{ .Release.Name }}}}
app.kubernetes.io/managed-by: {{{{ .Release.Service }}}}
{{{{- end -}}}}

{{{{- define "{service}.selectorLabels" -}}}}
app.kubernetes.io/name: {{{{ .Chart.Name }}}}
app.kubernetes.io/instance: {{{{ .Release.Name }}}}
{{{{- end -}}}}
"#
    )
}

const DEPLOYMENT: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: {{ include "SERVICE.fullname" . }}
  labels:
    {{- include "SERVICE.labels" . | nindent 4 }}
spec:
  replicas: {{ .Values.replicaCount }}
  selector:
    matchLabels:
      {{- include "SERVICE.selectorLabels" . | nindent 6 }}
  template:
    metadata:
      labels:
        {{- include "SERVICE.selectorLabels" . | nindent 8 }}
    spec:
      {{- with .Values.podSecurityContext }}
      securityContext:
        {{- toYaml . | nindent 8 }}
      {{- end }}
      containers:
        - name: {{ .Chart.Name }}
          image: "{{ .Values.image.repository }}:{{ .Values.image.tag }}"
          imagePullPolicy: {{ .Values.image.pullPolicy }}
          ports:
            - name: http
              containerPort: {{ .Values.service.targetPort }}
          {{- with .Values.securityContext }}
          securityContext:
            {{- toYaml . | nindent 12 }}
          {{- end }}
          resources:
            {{- toYaml .Values.resources | nindent 12 }}
"#;

const SERVICE: &str = r#"apiVersion: v1
kind: Service
metadata:
  name: {{ include "SERVICE.fullname" . }}
  labels:
    {{- include "SERVICE.labels" . | nindent 4 }}
spec:
  type: {{ .Values.service.type }}
  ports:
    - port: {{ .Values.service.port }}
      targetPort: http
      name: http
  selector:
    {{- include "SERVICE.selectorLabels" . | nindent 4 }}
"#;

const INGRESS: &str = r#"{{- if .Values.ingress.enabled }}
apiVersion: networking.k8s.io/v1
kind: Ingress
metadata:
  name: {{ include "SERVICE.fullname" . }}
  labels:
    {{- include "SERVICE.labels" . | nindent 4 }}
spec:
  rules:
    - host: {{ .Values.ingress.host | quote }}
      http:
        paths:
          - path: /
            pathType: Prefix
            backend:
              service:
                name: {{ include "SERVICE.fullname" . }}
                port:
                  name: http
{{- end }}
"#;
