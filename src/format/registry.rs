//! Format registry for discovering and accessing label formats.

use std::collections::HashMap;

use crate::config::LabelConfig;
use crate::format::formats::{CentroidFormat, KittiFormat, VerticesFormat};
use crate::format::traits::LabelFormat;

/// Registry of available label formats.
///
/// All built-in formats are registered on creation, each constructed with
/// its own copy of the configuration.
pub struct FormatRegistry {
    formats: HashMap<&'static str, Box<dyn LabelFormat>>,
}

impl FormatRegistry {
    /// Create a registry with all built-in formats registered.
    pub fn new(config: &LabelConfig) -> Self {
        let mut registry = Self {
            formats: HashMap::new(),
        };

        registry.register(Box::new(CentroidFormat::absolute(config.clone())));
        registry.register(Box::new(CentroidFormat::relative(config.clone())));
        registry.register(Box::new(VerticesFormat::new(config.clone())));
        registry.register(Box::new(KittiFormat::transformed(config.clone())));
        registry.register(Box::new(KittiFormat::untransformed(config.clone())));

        registry
    }

    /// Register a format implementation.
    pub fn register(&mut self, format: Box<dyn LabelFormat>) {
        self.formats.insert(format.id(), format);
    }

    /// Get a format by its ID.
    pub fn get(&self, id: &str) -> Option<&dyn LabelFormat> {
        self.formats.get(id).map(|f| f.as_ref())
    }

    /// All registered formats.
    pub fn all(&self) -> Vec<&dyn LabelFormat> {
        self.formats.values().map(|f| f.as_ref()).collect()
    }

    /// All format IDs.
    pub fn ids(&self) -> Vec<&'static str> {
        self.formats.keys().copied().collect()
    }
}
