//! A linear regression model evaluated in process.
//!
//! The predicted value is `intercept + sum(coefficient * field)` over the
//! numeric predictors, plus the coefficient of every categorical term whose
//! field equals its value, passed through the configured normalization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::{InputData, ModelErr, PredictionContext, PredictionModel, PredictionResult, Result};

/// Transformation applied to the raw linear combination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    #[default]
    None,
    Logit,
    Exp,
}

impl Normalization {
    fn apply(self, x: f64) -> f64 {
        match self {
            Normalization::None => x,
            Normalization::Logit => 1.0 / (1.0 + (-x).exp()),
            Normalization::Exp => x.exp(),
        }
    }
}

/// Adds `coefficient` when the input `field` equals `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalTerm {
    pub field: String,
    pub value: String,
    pub coefficient: f64,
}

/// The definition of a `RegressionModel`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionSpec {
    pub name: String,
    pub target: String,
    #[serde(default)]
    pub intercept: f64,
    #[serde(default)]
    pub coefficients: BTreeMap<String, f64>,
    #[serde(default)]
    pub categorical: Vec<CategoricalTerm>,
    #[serde(default)]
    pub normalization: Normalization,
}

impl RegressionSpec {
    /// A spec with no predictors, which always predicts the intercept.
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            intercept: 0.0,
            coefficients: BTreeMap::new(),
            categorical: Vec::new(),
            normalization: Normalization::None,
        }
    }

    pub fn intercept(mut self, intercept: f64) -> Self {
        self.intercept = intercept;
        self
    }

    pub fn coefficient(mut self, field: impl Into<String>, coefficient: f64) -> Self {
        self.coefficients.insert(field.into(), coefficient);
        self
    }

    pub fn categorical(
        mut self,
        field: impl Into<String>,
        value: impl Into<String>,
        coefficient: f64,
    ) -> Self {
        self.categorical.push(CategoricalTerm {
            field: field.into(),
            value: value.into(),
            coefficient,
        });
        self
    }

    pub fn normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }
}

#[derive(Debug, Clone)]
pub struct RegressionModel {
    spec: RegressionSpec,
}

impl RegressionModel {
    pub fn new(spec: RegressionSpec) -> Self {
        Self { spec }
    }

    fn evaluation_err(&self, detail: impl Into<String>) -> ModelErr {
        ModelErr::Evaluation {
            model: self.spec.name.clone(),
            detail: detail.into(),
        }
    }
}

impl PredictionModel for RegressionModel {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn new_context(&self, input_data: InputData) -> Result<PredictionContext> {
        let context = PredictionContext::new(&self.spec.name, input_data);

        for field in self.spec.coefficients.keys() {
            context.number(field)?;
        }

        for term in &self.spec.categorical {
            match context.get(&term.field) {
                None | Some(Value::String(_)) => {}
                Some(_) => {
                    return Err(ModelErr::InvalidInput {
                        model: self.spec.name.clone(),
                        field: term.field.clone(),
                        expected: "a string",
                    });
                }
            }
        }

        Ok(context)
    }

    fn evaluate_all(&self, context: &PredictionContext) -> Result<PredictionResult> {
        if context.model() != self.spec.name {
            return Err(self.evaluation_err(format!(
                "context was built for model '{}'",
                context.model()
            )));
        }

        let mut sum = self.spec.intercept;

        for (field, coefficient) in &self.spec.coefficients {
            sum += coefficient * context.number(field)?;
        }

        for term in &self.spec.categorical {
            if context.get(&term.field).and_then(Value::as_str) == Some(term.value.as_str()) {
                sum += term.coefficient;
            }
        }

        let predicted = self.spec.normalization.apply(sum);
        let number = Number::from_f64(predicted)
            .ok_or_else(|| self.evaluation_err(format!("predicted a non-finite value {predicted}")))?;

        let mut variables = Map::new();
        variables.insert(self.spec.target.clone(), Value::Number(number));

        Ok(PredictionResult::ok(variables).with_objective_name(&self.spec.target))
    }
}
