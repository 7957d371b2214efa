#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use model::{
    InMemoryRegistry, InputData, ModelErr, ModelRegistry, PredictionContext, PredictionModel,
    PredictionResult, RegressionModel, RegressionSpec,
};
use prediction_tracer::RawInput;
use serde_json::Value;

/// A registry that counts how many lookups it served.
pub struct CountingRegistry {
    inner: InMemoryRegistry,
    calls: AtomicUsize,
}

impl CountingRegistry {
    pub fn new(models: Vec<Arc<dyn PredictionModel>>) -> Arc<Self> {
        let mut inner = InMemoryRegistry::new();
        for model in models {
            inner.register(model).unwrap();
        }

        Arc::new(Self {
            inner,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ModelRegistry for CountingRegistry {
    fn get_model(&self, name: &str) -> model::Result<Arc<dyn PredictionModel>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_model(name)
    }
}

/// `fld4 = 1 + 2 * age`
pub fn sample() -> Arc<dyn PredictionModel> {
    Arc::new(RegressionModel::new(
        RegressionSpec::new("Sample", "fld4")
            .intercept(1.0)
            .coefficient("age", 2.0),
    ))
}

/// Always answers with the same result.
pub struct FixedModel {
    pub name: &'static str,
    pub result: PredictionResult,
}

impl PredictionModel for FixedModel {
    fn name(&self) -> &str {
        self.name
    }

    fn new_context(&self, input_data: InputData) -> model::Result<PredictionContext> {
        Ok(PredictionContext::new(self.name, input_data))
    }

    fn evaluate_all(&self, _context: &PredictionContext) -> model::Result<PredictionResult> {
        Ok(self.result.clone())
    }
}

/// Fails every evaluation.
pub struct FaultyModel;

impl PredictionModel for FaultyModel {
    fn name(&self) -> &str {
        "Faulty"
    }

    fn new_context(&self, input_data: InputData) -> model::Result<PredictionContext> {
        Ok(PredictionContext::new("Faulty", input_data))
    }

    fn evaluate_all(&self, _context: &PredictionContext) -> model::Result<PredictionResult> {
        Err(ModelErr::Evaluation {
            model: "Faulty".into(),
            detail: "internal fault".into(),
        })
    }
}

/// Panics while evaluating.
pub struct PanickingModel;

impl PredictionModel for PanickingModel {
    fn name(&self) -> &str {
        "Panicking"
    }

    fn new_context(&self, input_data: InputData) -> model::Result<PredictionContext> {
        Ok(PredictionContext::new("Panicking", input_data))
    }

    fn evaluate_all(&self, _context: &PredictionContext) -> model::Result<PredictionResult> {
        panic!("evaluation exploded");
    }
}

pub fn raw(value: Value) -> RawInput {
    let Value::Object(map) = value else {
        panic!("raw input must be an object");
    };
    map
}
