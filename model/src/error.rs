use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used in the entire model module.
pub type Result<T> = std::result::Result<T, ModelErr>;

/// Failures while resolving or evaluating a model.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelErr {
    UnknownModel {
        name: String,
    },
    DuplicateModel {
        name: String,
    },
    MissingInput {
        model: String,
        field: String,
    },
    InvalidInput {
        model: String,
        field: String,
        expected: &'static str,
    },
    Evaluation {
        model: String,
        detail: String,
    },
}

impl Display for ModelErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelErr::UnknownModel { name } => write!(f, "no model registered as '{name}'"),
            ModelErr::DuplicateModel { name } => {
                write!(f, "a model is already registered as '{name}'")
            }
            ModelErr::MissingInput { model, field } => {
                write!(f, "model '{model}' requires input field '{field}'")
            }
            ModelErr::InvalidInput {
                model,
                field,
                expected,
            } => write!(
                f,
                "model '{model}' expects input field '{field}' to be {expected}"
            ),
            ModelErr::Evaluation { model, detail } => {
                write!(f, "model '{model}' failed to evaluate: {detail}")
            }
        }
    }
}

impl Error for ModelErr {}
