use fops_core::errors::CompositionError;
use serde::Deserialize;

use super::{failure, Grammar};

/// Every document in `text` must parse as YAML.
pub fn check(file: &str, text: &str) -> Result<(), CompositionError> {
    check_as(file, text, Grammar::Yaml)
}

pub(crate) fn check_as(file: &str, text: &str, grammar: Grammar) -> Result<(), CompositionError> {
    for document in serde_yaml::Deserializer::from_str(text) {
        serde_yaml::Value::deserialize(document).map_err(|e| {
            let line = e.location().map(|l| l.line()).unwrap_or(0);
            failure(file, grammar, line, e.to_string())
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_multi_document() {
        assert!(check("a.yml", "a: 1\n---\nb: [1, 2]\n").is_ok());
    }

    #[test]
    fn unterminated_flow_sequence() {
        let err = check("a.yml", "jobs:\n  build: [a, b\n").unwrap_err();
        assert!(matches!(err, CompositionError::ParseFailure { ref format, .. } if format == "yaml"));
    }

    #[test]
    fn nested_mapping_on_one_line() {
        assert!(check("a.yml", "a: b: c\n").is_err());
    }
}
