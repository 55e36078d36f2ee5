//! Helm chart template grammar.
//!
//! Templates are checked in two passes: `{{ }}` actions must be balanced and
//! control blocks closed, then the body with every action replaced by a
//! placeholder must parse as YAML.

use fops_core::errors::CompositionError;

use super::{failure, yaml, Grammar};

const PLACEHOLDER: &str = "__fops_tpl__";

/// Chart template (`templates/*.yaml`): actions and YAML body.
pub fn check_template(file: &str, text: &str) -> Result<(), CompositionError> {
    let neutral = neutralize(text)
        .map_err(|(line, message)| failure(file, Grammar::HelmTemplate, line, message))?;
    yaml::check_as(file, &neutral, Grammar::HelmTemplate)
}

/// Helpers and notes (`_helpers.tpl`, `NOTES.txt`): actions only.
pub fn check_text(file: &str, text: &str) -> Result<(), CompositionError> {
    neutralize(text)
        .map(|_| ())
        .map_err(|(line, message)| failure(file, Grammar::HelmText, line, message))
}

const OPENERS: &[&str] = &["if", "range", "with", "define", "block"];

/// Replace each action with a placeholder, keeping line structure, and blank
/// lines that held nothing but actions.
fn neutralize(text: &str) -> Result<String, (usize, String)> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut open_blocks: Vec<(String, usize)> = Vec::new();
    let mut line = 1;
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '{' && chars.get(i + 1) == Some(&'{') {
            let start_line = line;
            let (body, end, newlines) = read_action(&chars, i + 2, start_line)?;
            line += newlines;
            i = end;

            let keyword = action_keyword(&body);
            if OPENERS.contains(&keyword.as_str()) {
                open_blocks.push((keyword, start_line));
            } else if keyword == "else" {
                if open_blocks.is_empty() {
                    return Err((start_line, "'else' outside of a block".to_string()));
                }
            } else if keyword == "end" && open_blocks.pop().is_none() {
                return Err((start_line, "'end' without an open block".to_string()));
            }

            out.push_str(PLACEHOLDER);
            for _ in 0..newlines {
                out.push('\n');
            }
            continue;
        }
        if chars[i] == '}' && chars.get(i + 1) == Some(&'}') {
            return Err((line, "'}}' without matching '{{'".to_string()));
        }
        if chars[i] == '\n' {
            line += 1;
        }
        out.push(chars[i]);
        i += 1;
    }

    if let Some((keyword, opened)) = open_blocks.pop() {
        return Err((opened, format!("'{keyword}' block is never closed with 'end'")));
    }

    let mut neutral = String::with_capacity(out.len());
    for l in out.split_inclusive('\n') {
        let content = l.trim_end_matches('\n');
        if content.contains(PLACEHOLDER) && content.replace(PLACEHOLDER, "").trim().is_empty() {
            if l.ends_with('\n') {
                neutral.push('\n');
            }
        } else {
            neutral.push_str(l);
        }
    }
    Ok(neutral)
}

/// Read an action body starting after `{{`. Returns the body, the index just
/// past `}}`, and how many newlines the action spans.
fn read_action(
    chars: &[char],
    mut i: usize,
    start_line: usize,
) -> Result<(String, usize, usize), (usize, String)> {
    let mut body = String::new();
    let mut newlines = 0;
    let mut quote: Option<char> = None;

    while i < chars.len() {
        let c = chars[i];
        if c == '\n' {
            newlines += 1;
        }
        match quote {
            Some('"') if c == '\\' => {
                body.push(c);
                if let Some(&next) = chars.get(i + 1) {
                    body.push(next);
                }
                i += 2;
                continue;
            }
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => {
                if c == '"' || c == '`' {
                    quote = Some(c);
                } else if c == '{' && chars.get(i + 1) == Some(&'{') {
                    return Err((start_line, "nested '{{' inside an action".to_string()));
                } else if c == '}' && chars.get(i + 1) == Some(&'}') {
                    return Ok((body, i + 2, newlines));
                }
            }
        }
        body.push(c);
        i += 1;
    }
    Err((start_line, "unterminated action, missing '}}'".to_string()))
}

/// First word of an action with trim markers and comments removed.
fn action_keyword(body: &str) -> String {
    let body = body.trim();
    let body = body.strip_prefix('-').unwrap_or(body);
    let body = body.strip_suffix('-').unwrap_or(body).trim();
    if body.starts_with("/*") {
        return String::new();
    }
    body.split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEPLOYMENT: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: {{ include "api.fullname" . }}
  labels:
    {{- include "api.labels" . | nindent 4 }}
spec:
  replicas: {{ .Values.replicaCount }}
  template:
    spec:
      containers:
        - name: api
          image: "{{ .Values.image.repository }}:{{ .Values.image.tag }}"
          {{- with .Values.resources }}
          resources:
            {{- toYaml . | nindent 12 }}
          {{- end }}
"#;

    #[test]
    fn chart_template_passes() {
        assert!(check_template("chart/templates/deployment.yaml", DEPLOYMENT).is_ok());
    }

    #[test]
    fn unclosed_action() {
        let text = "metadata:\n  name: {{ include \"api.fullname\" .\n";
        assert!(check_template("t.yaml", text).is_err());
    }

    #[test]
    fn unclosed_block() {
        let err = check_text("_helpers.tpl", "{{- define \"api.name\" -}}\napi\n").unwrap_err();
        match err {
            CompositionError::ParseFailure { line, format, .. } => {
                assert_eq!(line, 1);
                assert_eq!(format, "helm-template");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn stray_end_and_else() {
        assert!(check_text("t.tpl", "{{ end }}\n").is_err());
        assert!(check_text("t.tpl", "{{ else }}\n").is_err());
        assert!(check_text("t.tpl", "{{ if .x }}a{{ else }}b{{ end }}\n").is_ok());
    }

    #[test]
    fn braces_inside_strings_are_not_actions() {
        assert!(check_text("t.tpl", "{{ printf \"}}\" }}\n").is_ok());
    }

    #[test]
    fn yaml_errors_survive_neutralizing() {
        let text = "spec:\n  ports: [{{ .Values.port }}\n";
        assert!(check_template("t.yaml", text).is_err());
    }
}
