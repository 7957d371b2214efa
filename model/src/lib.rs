//! The prediction model seam: the traits a model registry and its models
//! implement, the result they produce and the in-process implementations
//! the service ships with.

mod builder;
mod context;
mod error;
mod registry;
mod regression;
mod result;

use std::sync::Arc;

pub use builder::{ModelSpec, RegistryBuilder};
pub use context::PredictionContext;
pub use error::{ModelErr, Result};
pub use registry::InMemoryRegistry;
pub use regression::{CategoricalTerm, Normalization, RegressionModel, RegressionSpec};
pub use result::{PredictionResult, ResultCode};

/// The named inputs of a single evaluation.
pub type InputData = serde_json::Map<String, serde_json::Value>;

/// A loaded predictive model.
pub trait PredictionModel: Send + Sync {
    /// The name the model is registered under.
    fn name(&self) -> &str;

    /// Binds `input_data` to this model, validating it on the way.
    ///
    /// # Arguments
    /// * `input_data` - The named inputs of the evaluation.
    ///
    /// # Returns
    /// A context ready to be evaluated or a `ModelErr` if the inputs don't fit the model.
    fn new_context(&self, input_data: InputData) -> Result<PredictionContext>;

    /// Runs the full evaluation of the model over `context`.
    fn evaluate_all(&self, context: &PredictionContext) -> Result<PredictionResult>;
}

/// Resolves model names to loaded models.
pub trait ModelRegistry: Send + Sync {
    /// Looks up the model registered as `name`.
    ///
    /// # Returns
    /// The model or `ModelErr::UnknownModel` if nothing is registered under that name.
    fn get_model(&self, name: &str) -> Result<Arc<dyn PredictionModel>>;
}
