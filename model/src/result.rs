use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The outcome code of an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResultCode {
    Ok,
    Fail,
}

/// The outcome of one evaluation.
///
/// Only `result_code` is meaningful on a `FAIL` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub result_code: ResultCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_objective_name: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub result_variables: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl PredictionResult {
    /// A successful result carrying `result_variables`.
    pub fn ok(result_variables: Map<String, Value>) -> Self {
        Self {
            result_code: ResultCode::Ok,
            result_objective_name: None,
            result_variables,
            correlation_id: None,
        }
    }

    /// A failed result, nothing but the code is populated.
    pub fn fail() -> Self {
        Self {
            result_code: ResultCode::Fail,
            result_objective_name: None,
            result_variables: Map::new(),
            correlation_id: None,
        }
    }

    pub fn with_objective_name(mut self, name: impl Into<String>) -> Self {
        self.result_objective_name = Some(name.into());
        self
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn is_ok(&self) -> bool {
        self.result_code == ResultCode::Ok
    }
}
