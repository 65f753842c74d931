//! plugin::registry
//!
//! The plugin registry.
//!
//! # Design
//!
//! The registry is an explicitly constructed mapping from plugin name to
//! implementation, built once at assembly time and passed into the
//! dispatcher - there is no process-wide mutable plugin state. Registration
//! validates every declared schema, so structural defects (duplicate names,
//! a parameter that is both required and a switch) are caught as
//! configuration errors before the first dispatch.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use super::schema::SchemaError;
use super::traits::Plugin;

/// Errors from registry construction.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two plugins registered under the same name.
    #[error("duplicate plugin '{0}'")]
    DuplicatePlugin(String),

    /// A plugin declared a structurally invalid schema.
    #[error("invalid schema for operation '{operation}' of plugin '{plugin}': {source}")]
    InvalidSchema {
        /// Plugin name
        plugin: String,
        /// Operation name
        operation: String,
        /// The underlying schema defect
        source: SchemaError,
    },
}

/// Immutable name -> plugin mapping.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use peon::plugin::{MockPlugin, PluginRegistry};
///
/// let mut registry = PluginRegistry::new();
/// registry.register(Arc::new(MockPlugin::new("instances"))).unwrap();
///
/// assert!(registry.get("instances").is_some());
/// assert!(registry.get("nope").is_none());
/// ```
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: BTreeMap<String, Arc<dyn Plugin>>,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .finish()
    }
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        PluginRegistry::default()
    }

    /// Register a plugin under its own name.
    ///
    /// # Errors
    ///
    /// - `DuplicatePlugin` if the name is already taken
    /// - `InvalidSchema` if any declared operation schema fails validation
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) -> Result<(), RegistryError> {
        let name = plugin.name().to_string();
        if self.plugins.contains_key(&name) {
            return Err(RegistryError::DuplicatePlugin(name));
        }
        for (operation, schema) in plugin.schema() {
            schema
                .validate()
                .map_err(|source| RegistryError::InvalidSchema {
                    plugin: name.clone(),
                    operation: operation.clone(),
                    source,
                })?;
        }
        self.plugins.insert(name, plugin);
        Ok(())
    }

    /// Look up a plugin by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Plugin>> {
        self.plugins.get(name)
    }

    /// Registered plugin names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.keys().map(String::as_str).collect()
    }

    /// Number of registered plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
