use std::{error::Error, fmt, io, path::PathBuf};

use model::ModelErr;

/// Why a request produced a `FAIL` result.
#[derive(Debug)]
pub enum PredictionErr {
    /// A required request key is absent.
    MissingField(&'static str),
    /// A required request key holds the wrong kind of value.
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
    /// The payload on the input topic isn't a JSON object.
    NotAnObject,
    /// Resolving, binding or evaluating the model failed.
    Evaluation { model: String, source: ModelErr },
    /// The model panicked while being resolved, bound or evaluated.
    Panicked { model: String, detail: String },
}

impl fmt::Display for PredictionErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required data '{field}'"),
            Self::InvalidField { field, expected } => {
                write!(f, "required data '{field}' must be {expected}")
            }
            Self::NotAnObject => f.write_str("the request is not a JSON object"),
            Self::Evaluation { model, source } => {
                write!(f, "failed to evaluate model {model}: {source}")
            }
            Self::Panicked { model, detail } => {
                write!(f, "model {model} panicked during evaluation: {detail}")
            }
        }
    }
}

impl Error for PredictionErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Evaluation { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Failures while loading the service configuration.
#[derive(Debug)]
pub enum ConfigErr {
    Io { path: PathBuf, source: io::Error },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    InvalidEnv { var: &'static str, value: String },
}

impl fmt::Display for ConfigErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read '{}': {source}", path.display()),
            Self::Parse { path, source } => {
                write!(f, "invalid config in '{}': {source}", path.display())
            }
            Self::InvalidEnv { var, value } => write!(f, "invalid value for {var}: '{value}'"),
        }
    }
}

impl Error for ConfigErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidEnv { .. } => None,
        }
    }
}
