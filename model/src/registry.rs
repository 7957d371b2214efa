use std::{collections::HashMap, fmt, sync::Arc};

use crate::{ModelErr, ModelRegistry, PredictionModel, Result};

/// A `ModelRegistry` backed by a map of already loaded models.
///
/// Models are registered up front, the registry is then shared read-only.
#[derive(Default)]
pub struct InMemoryRegistry {
    models: HashMap<String, Arc<dyn PredictionModel>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `model` under its own name.
    ///
    /// # Arguments
    /// * `model` - The loaded model.
    ///
    /// # Returns
    /// `ModelErr::DuplicateModel` if the name is already taken.
    pub fn register(&mut self, model: Arc<dyn PredictionModel>) -> Result<()> {
        let name = model.name().to_string();

        if self.models.contains_key(&name) {
            return Err(ModelErr::DuplicateModel { name });
        }

        self.models.insert(name, model);
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl ModelRegistry for InMemoryRegistry {
    fn get_model(&self, name: &str) -> Result<Arc<dyn PredictionModel>> {
        self.models
            .get(name)
            .cloned()
            .ok_or_else(|| ModelErr::UnknownModel {
                name: name.to_string(),
            })
    }
}

impl fmt::Debug for InMemoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RegressionModel, RegressionSpec};

    fn regression(name: &str) -> Arc<dyn PredictionModel> {
        Arc::new(RegressionModel::new(RegressionSpec::new(name, "y")))
    }

    #[test]
    fn resolves_registered_models() {
        let mut registry = InMemoryRegistry::new();
        registry.register(regression("Sample")).unwrap();

        let model = registry.get_model("Sample").unwrap();
        assert_eq!(model.name(), "Sample");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_names_fail() {
        let registry = InMemoryRegistry::new();

        let err = registry.get_model("Unknown").err().unwrap();
        assert_eq!(
            err,
            ModelErr::UnknownModel {
                name: "Unknown".into()
            }
        );
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = InMemoryRegistry::new();
        registry.register(regression("Sample")).unwrap();

        let err = registry.register(regression("Sample")).unwrap_err();
        assert!(matches!(err, ModelErr::DuplicateModel { name } if name == "Sample"));
        assert_eq!(registry.len(), 1);
    }
}
