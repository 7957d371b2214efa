use model::InputData;
use serde_json::{Map, Value};

use crate::PredictionErr;

/// A request as it arrives on the input topic.
pub type RawInput = Map<String, Value>;

/// The key holding the name of the model to evaluate.
pub const PMML_MODEL: &str = "pmmlModel";
/// The key holding the inputs of the evaluation.
pub const INPUT_DATA: &str = "inputData";

/// A validated prediction request.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    pub model_name: String,
    pub input_data: InputData,
}

impl PredictionRequest {
    /// Extracts the request fields from `raw`.
    ///
    /// Presence is checked first, `pmmlModel` before `inputData`, then the kind
    /// of each value.
    ///
    /// # Returns
    /// The request, `MissingField` naming the first absent key or
    /// `InvalidField` if a key holds the wrong kind of value.
    pub fn from_raw(raw: &RawInput) -> Result<Self, PredictionErr> {
        let model_name = raw
            .get(PMML_MODEL)
            .ok_or(PredictionErr::MissingField(PMML_MODEL))?;
        let input_data = raw
            .get(INPUT_DATA)
            .ok_or(PredictionErr::MissingField(INPUT_DATA))?;

        let Value::String(model_name) = model_name else {
            return Err(PredictionErr::InvalidField {
                field: PMML_MODEL,
                expected: "a string",
            });
        };
        let Value::Object(input_data) = input_data else {
            return Err(PredictionErr::InvalidField {
                field: INPUT_DATA,
                expected: "an object",
            });
        };

        Ok(Self {
            model_name: model_name.clone(),
            input_data: input_data.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn raw(value: Value) -> RawInput {
        let Value::Object(map) = value else {
            panic!("raw input must be an object");
        };
        map
    }

    #[test]
    fn extracts_both_fields() {
        let request =
            PredictionRequest::from_raw(&raw(json!({ "pmmlModel": "Sample", "inputData": { "age": 30 } })))
                .unwrap();

        assert_eq!(request.model_name, "Sample");
        assert_eq!(request.input_data["age"], json!(30));
    }

    #[test]
    fn model_is_checked_before_inputs() {
        let err = PredictionRequest::from_raw(&raw(json!({}))).unwrap_err();
        assert!(matches!(err, PredictionErr::MissingField(PMML_MODEL)));

        let err = PredictionRequest::from_raw(&raw(json!({ "inputData": {} }))).unwrap_err();
        assert!(matches!(err, PredictionErr::MissingField(PMML_MODEL)));
    }

    #[test]
    fn missing_inputs() {
        let err = PredictionRequest::from_raw(&raw(json!({ "pmmlModel": "Sample" }))).unwrap_err();
        assert!(matches!(err, PredictionErr::MissingField(INPUT_DATA)));
    }

    #[test]
    fn presence_is_checked_before_kinds() {
        let err = PredictionRequest::from_raw(&raw(json!({ "pmmlModel": 3 }))).unwrap_err();
        assert!(matches!(err, PredictionErr::MissingField(INPUT_DATA)));
    }

    #[test]
    fn wrong_kinds() {
        let err =
            PredictionRequest::from_raw(&raw(json!({ "pmmlModel": null, "inputData": {} }))).unwrap_err();
        assert!(matches!(err, PredictionErr::InvalidField { field: PMML_MODEL, .. }));

        let err = PredictionRequest::from_raw(&raw(json!({ "pmmlModel": "Sample", "inputData": [1] })))
            .unwrap_err();
        assert!(matches!(err, PredictionErr::InvalidField { field: INPUT_DATA, .. }));
    }
}
