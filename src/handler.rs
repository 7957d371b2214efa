use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use log::{Level, error, info, log_enabled};
use model::{InputData, ModelRegistry, PredictionResult};
use serde_json::{Value, json};

use crate::{PredictionErr, PredictionRequest, RawInput};

/// Turns prediction requests into prediction results.
///
/// Every failure is absorbed here: a request that is malformed, names an
/// unknown model or fails to evaluate yields a `FAIL` result, never an error.
/// The handler keeps no state between calls, so it can be invoked
/// concurrently from any amount of threads.
pub struct PredictionRequestHandler {
    registry: Arc<dyn ModelRegistry>,
}

impl PredictionRequestHandler {
    /// Creates a new `PredictionRequestHandler`.
    ///
    /// # Arguments
    /// * `registry` - Resolves the model names found in the requests.
    ///
    /// # Returns
    /// A new handler instance.
    pub fn new(registry: Arc<dyn ModelRegistry>) -> Self {
        Self { registry }
    }

    /// Validates `raw_input` and evaluates the model it names.
    ///
    /// # Arguments
    /// * `raw_input` - A request carrying `pmmlModel` and `inputData`.
    ///
    /// # Returns
    /// The result of the evaluation as produced by the model, or a `FAIL`
    /// result if a field is missing or the evaluation failed.
    pub fn process(&self, raw_input: &RawInput) -> PredictionResult {
        if log_enabled!(Level::Info) {
            let received = serde_json::to_string(raw_input)
                .unwrap_or_else(|e| format!("<unprintable request: {e}>"));
            info!("received {received}");
        }

        match PredictionRequest::from_raw(raw_input) {
            Ok(request) => self.evaluate(&request.model_name, request.input_data),
            Err(e) => {
                error!("{e}");
                PredictionResult::fail()
            }
        }
    }

    /// Resolves `model_name` and evaluates it over `input_data`.
    ///
    /// An unknown model, inputs the model rejects, an evaluation fault or a
    /// panic inside the model all yield the same `FAIL` result.
    ///
    /// # Returns
    /// The model's result unchanged on success, a `FAIL` result otherwise.
    pub fn evaluate(&self, model_name: &str, input_data: InputData) -> PredictionResult {
        match self.try_evaluate(model_name, input_data) {
            Ok(result) => result,
            Err(e) => {
                error!(model = model_name; "{e} (detail: {e:?})");
                PredictionResult::fail()
            }
        }
    }

    /// Processes a payload taken from the input topic into the payload to publish.
    ///
    /// A payload that isn't a JSON object is answered with a `FAIL` result.
    pub fn handle(&self, payload: Value) -> Value {
        let result = match payload {
            Value::Object(raw_input) => self.process(&raw_input),
            other => {
                info!("received {other}");
                error!("{}", PredictionErr::NotAnObject);
                PredictionResult::fail()
            }
        };

        serde_json::to_value(&result).unwrap_or_else(|e| {
            error!("failed to serialize the result: {e}");
            json!({ "resultCode": "FAIL" })
        })
    }

    fn try_evaluate(
        &self,
        model_name: &str,
        input_data: InputData,
    ) -> Result<PredictionResult, PredictionErr> {
        let evaluation = panic::catch_unwind(AssertUnwindSafe(
            || -> model::Result<PredictionResult> {
                let model = self.registry.get_model(model_name)?;
                let context = model.new_context(input_data)?;
                model.evaluate_all(&context)
            },
        ));

        match evaluation {
            Ok(result) => result.map_err(|source| PredictionErr::Evaluation {
                model: model_name.to_string(),
                source,
            }),
            Err(payload) => Err(PredictionErr::Panicked {
                model: model_name.to_string(),
                detail: panic_detail(&*payload),
            }),
        }
    }
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
