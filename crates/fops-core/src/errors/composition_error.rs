use super::error_code::{self, FopsErrorCode};

/// Composition errors. Every variant is fatal to the run.
#[derive(Debug, thiserror::Error)]
pub enum CompositionError {
    /// The draft did not round-trip through its own format's grammar.
    #[error("{file}: {format} parse error at line {line}: {message}")]
    ParseFailure {
        file: String,
        format: String,
        line: usize,
        message: String,
    },

    #[error("no composer for {family} on {platform}")]
    UnsupportedCombination { family: String, platform: String },

    #[error("composition requires at least one environment for {family}")]
    NoEnvironments { family: String },
}

impl FopsErrorCode for CompositionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ParseFailure { .. } => error_code::COMPOSITION_PARSE_ERROR,
            Self::UnsupportedCombination { .. } | Self::NoEnvironments { .. } => {
                error_code::COMPOSITION_UNSUPPORTED
            }
        }
    }
}
