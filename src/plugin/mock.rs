//! plugin::mock
//!
//! Mock plugin implementation for deterministic testing.
//!
//! # Design
//!
//! The mock plugin provides a deterministic implementation of the
//! [`Plugin`] trait. Operations are declared with a schema and a canned
//! response; invocations are recorded for verification, and individual
//! operations can be configured to fail.
//!
//! It enforces the same calling contract as a real plugin: undeclared
//! operations are rejected, and declared required parameters must be
//! present. That makes it a faithful stand-in for resolver tests.
//!
//! # Example
//!
//! ```
//! use peon::dispatch::ParameterSet;
//! use peon::plugin::{MockPlugin, OperationSchema, Plugin};
//!
//! # tokio_test::block_on(async {
//! let plugin = MockPlugin::new("instances").with_operation(
//!     "instance_state",
//!     OperationSchema::new(&["instance_name"], &["dry_run"]),
//!     "Instance state: running",
//! );
//!
//! let mut params = ParameterSet::new();
//! params.insert_direct("instance_name", peon::dispatch::ParamValue::Text("web-1".into()));
//!
//! let out = plugin.invoke("instance_state", &params).await.unwrap();
//! assert_eq!(out, "Instance state: running");
//! assert_eq!(plugin.invocation_count("instance_state"), 1);
//! # });
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::dispatch::ParameterSet;

use super::schema::{OperationSchema, SchemaMap};
use super::traits::{Plugin, PluginError};

/// A recorded invocation, for test verification.
#[derive(Debug, Clone)]
pub struct MockInvocation {
    /// The operation that was invoked.
    pub operation: String,
    /// The parameter set it received.
    pub params: ParameterSet,
}

/// Internal mutable state.
#[derive(Debug, Default)]
struct MockPluginInner {
    /// Canned response per operation.
    responses: BTreeMap<String, String>,
    /// Error to return instead, per operation.
    failures: BTreeMap<String, PluginError>,
    /// Recorded invocations in call order.
    invocations: Vec<MockInvocation>,
}

/// Mock plugin for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone)]
pub struct MockPlugin {
    name: String,
    schema: SchemaMap,
    inner: Arc<Mutex<MockPluginInner>>,
}

impl MockPlugin {
    /// Create a mock plugin with no operations.
    pub fn new(name: impl Into<String>) -> Self {
        MockPlugin {
            name: name.into(),
            schema: SchemaMap::new(),
            inner: Arc::new(Mutex::new(MockPluginInner::default())),
        }
    }

    /// Declare an operation with its schema and canned response.
    pub fn with_operation(
        mut self,
        operation: impl Into<String>,
        schema: OperationSchema,
        response: impl Into<String>,
    ) -> Self {
        let operation = operation.into();
        self.schema.insert(operation.clone(), schema);
        self.inner
            .lock()
            .unwrap()
            .responses
            .insert(operation, response.into());
        self
    }

    /// Configure an operation to fail with the given error.
    pub fn with_failure(self, operation: impl Into<String>, error: PluginError) -> Self {
        self.inner
            .lock()
            .unwrap()
            .failures
            .insert(operation.into(), error);
        self
    }

    /// All recorded invocations, in call order.
    pub fn invocations(&self) -> Vec<MockInvocation> {
        self.inner.lock().unwrap().invocations.clone()
    }

    /// Number of times `operation` was invoked.
    pub fn invocation_count(&self, operation: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .invocations
            .iter()
            .filter(|i| i.operation == operation)
            .count()
    }
}

#[async_trait]
impl Plugin for MockPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> &SchemaMap {
        &self.schema
    }

    async fn invoke(&self, operation: &str, params: &ParameterSet) -> Result<String, PluginError> {
        let schema = self
            .schema
            .get(operation)
            .ok_or_else(|| PluginError::UnknownOperation(operation.to_string()))?;

        if let Some(missing) = schema.required().iter().find(|r| !params.contains(r)) {
            return Err(PluginError::MissingArgument(missing.clone()));
        }

        let mut inner = self.inner.lock().unwrap();
        inner.invocations.push(MockInvocation {
            operation: operation.to_string(),
            params: params.clone(),
        });

        if let Some(error) = inner.failures.get(operation) {
            return Err(error.clone());
        }

        // Declared operations always have a response recorded.
        inner
            .responses
            .get(operation)
            .cloned()
            .ok_or_else(|| PluginError::UnknownOperation(operation.to_string()))
    }
}
