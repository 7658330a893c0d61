//! Representation controller factories selected by a configuration key.

use std::collections::BTreeMap;

use hlod_lod::{ControllerHandle, ResidentController};
use tracing::debug;

use crate::error::SceneError;

/// Free-form options handed to a controller factory.
pub type StreamingOptions = BTreeMap<String, String>;

/// Key of the built-in always-resident controller.
pub const RESIDENT_STREAMING: &str = "resident";

type ControllerFactory = Box<dyn Fn(&str, &StreamingOptions) -> ControllerHandle>;

/// Maps a stable string key to a controller factory.
///
/// Factories receive the name of the representation root they are created for
/// and the streaming options from the configuration.
#[derive(Default)]
pub struct ControllerRegistry {
    factories: BTreeMap<String, ControllerFactory>,
}

impl ControllerRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `"resident"` controller.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(RESIDENT_STREAMING, |_, _| {
            ResidentController::new().into_handle()
        });
        registry
    }

    /// Register a factory. Returns `true` if it replaced an existing one.
    pub fn register<F>(&mut self, key: impl Into<String>, factory: F) -> bool
    where
        F: Fn(&str, &StreamingOptions) -> ControllerHandle + 'static,
    {
        let key = key.into();
        debug!(%key, "registered controller factory");
        self.factories.insert(key, Box::new(factory)).is_some()
    }

    /// Whether a factory is registered under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    /// Registered keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Instantiate the controller registered under `key`.
    pub fn create(
        &self,
        key: &str,
        root_name: &str,
        options: &StreamingOptions,
    ) -> Result<ControllerHandle, SceneError> {
        let factory = self
            .factories
            .get(key)
            .ok_or_else(|| SceneError::UnknownStrategy(key.to_string()))?;
        Ok(factory(root_name, options))
    }
}
