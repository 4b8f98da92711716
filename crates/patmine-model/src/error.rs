use thiserror::Error;

/// Errors raised when constructing model values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid source name: {0:?}")]
    InvalidSourceName(String),
    #[error("unknown complexity label: {0}")]
    UnknownComplexity(String),
    #[error("unknown source kind: {0:?}")]
    UnknownSourceKind(String),
}

/// Errors that reject an analysis run before any pattern is computed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("no data sources supplied")]
    EmptySources,
    #[error("invalid data sources:\n{}", format_violations(.errors))]
    InvalidSources { errors: Vec<String> },
}

impl AnalysisError {
    /// Every violation carried by the error, in detection order.
    pub fn violations(&self) -> Vec<String> {
        match self {
            Self::EmptySources => vec![self.to_string()],
            Self::InvalidSources { errors } => errors.clone(),
        }
    }
}

fn format_violations(errors: &[String]) -> String {
    errors
        .iter()
        .map(|error| format!("- {error}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
