use std::sync::Arc;

use log::info;
use serde::{Deserialize, Serialize};

use crate::{InMemoryRegistry, PredictionModel, RegressionModel, RegressionSpec, Result};

/// The definition of a model to load into the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    Regression(RegressionSpec),
}

/// Builds an `InMemoryRegistry` given a list of specifications.
#[derive(Debug, Default)]
pub struct RegistryBuilder;

impl RegistryBuilder {
    /// Creates a new `RegistryBuilder`.
    ///
    /// # Returns
    /// A new `RegistryBuilder` instance.
    pub fn new() -> Self {
        Self
    }

    /// Builds a registry holding one model per spec.
    ///
    /// # Arguments
    /// * `specs` - The specifications of the models.
    ///
    /// # Returns
    /// The registry or `ModelErr::DuplicateModel` if two specs share a name.
    pub fn build(&self, specs: Vec<ModelSpec>) -> Result<InMemoryRegistry> {
        let mut registry = InMemoryRegistry::new();

        for spec in specs {
            let model = self.resolve_model(spec);
            info!(model = model.name(); "registering model");
            registry.register(model)?;
        }

        Ok(registry)
    }

    /// Resolves the concrete model for `spec`.
    fn resolve_model(&self, spec: ModelSpec) -> Arc<dyn PredictionModel> {
        match spec {
            ModelSpec::Regression(spec) => Arc::new(RegressionModel::new(spec)),
        }
    }
}
