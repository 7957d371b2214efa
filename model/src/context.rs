use serde_json::Value;

use crate::{InputData, ModelErr, Result};

/// The inputs of one evaluation bound to the model that will evaluate them.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionContext {
    model: String,
    input_data: InputData,
}

impl PredictionContext {
    pub fn new(model: impl Into<String>, input_data: InputData) -> Self {
        Self {
            model: model.into(),
            input_data,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The raw value of `field`, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.input_data.get(field)
    }

    /// The value of `field` as a number.
    ///
    /// # Returns
    /// `MissingInput` if the field is absent, `InvalidInput` if it isn't a number.
    pub fn number(&self, field: &str) -> Result<f64> {
        let value = self.get(field).ok_or_else(|| ModelErr::MissingInput {
            model: self.model.clone(),
            field: field.to_string(),
        })?;

        value.as_f64().ok_or_else(|| ModelErr::InvalidInput {
            model: self.model.clone(),
            field: field.to_string(),
            expected: "a number",
        })
    }
}
