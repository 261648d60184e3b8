//! Set of upstream models clients may request.

use rand::seq::SliceRandom;

use crate::error::GatewayError;

/// Ordered, non-empty list of model identifiers.
///
/// The first model is the default used when a request does not name one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    models: Vec<String>,
}

impl ModelCatalog {
    /// Builds a catalog from the configured model list.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if `models` is empty.
    pub fn new(models: Vec<String>) -> Result<Self, GatewayError> {
        if models.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "model catalog must not be empty".to_string(),
            ));
        }
        Ok(Self { models })
    }

    /// All models in configured order.
    #[must_use]
    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// The default model.
    #[must_use]
    pub fn default_model(&self) -> &str {
        self.models.first().map_or("", String::as_str)
    }

    /// Returns `true` if `model` is offered.
    #[must_use]
    pub fn contains(&self, model: &str) -> bool {
        self.models.iter().any(|m| m == model)
    }

    /// Resolves an optional requested model against the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnknownModel`] if the model is not offered.
    pub fn resolve(&self, requested: Option<&str>) -> Result<String, GatewayError> {
        match requested.map(str::trim).filter(|m| !m.is_empty()) {
            None => Ok(self.default_model().to_string()),
            Some(model) if self.contains(model) => Ok(model.to_string()),
            Some(model) => Err(GatewayError::UnknownModel {
                requested: model.to_string(),
                allowed: self.models.join(", "),
            }),
        }
    }

    /// Picks a model uniformly at random.
    #[must_use]
    pub fn random(&self) -> &str {
        self.models
            .choose(&mut rand::thread_rng())
            .map_or_else(|| self.default_model(), String::as_str)
    }
}
