//! plugin::schema
//!
//! Declared operation schemas.
//!
//! # Design
//!
//! Every operation a plugin exposes declares its calling contract up front:
//! an ordered list of required parameter names, a set of boolean switches,
//! and optional help text. The order of `required` is significant - it
//! defines how positional arguments bind.
//!
//! Schemas are plain data; construction never fails. Structural rules
//! (`required` and `switches` disjoint, no duplicate names) are checked by
//! [`validate`](OperationSchema::validate), which the plugin registry runs
//! at registration time so a defective schema is a configuration error
//! caught before the first dispatch.

use std::collections::BTreeMap;

use thiserror::Error;

/// Errors from schema validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// A parameter name appears twice in `required` or twice in `switches`.
    #[error("duplicate parameter '{0}'")]
    Duplicate(String),

    /// A parameter name appears in both `required` and `switches`.
    #[error("parameter '{0}' declared both required and switch")]
    RequiredSwitchOverlap(String),
}

/// Map from operation name to its declared schema.
pub type SchemaMap = BTreeMap<String, OperationSchema>;

/// Declared calling contract for a single operation.
///
/// # Example
///
/// ```
/// use peon::plugin::OperationSchema;
///
/// let schema = OperationSchema::new(&["instance_name"], &["dry_run"])
///     .with_help("Returns the state of the named instance.");
///
/// assert_eq!(schema.required(), ["instance_name"]);
/// assert!(schema.is_switch("dry_run"));
/// assert!(schema.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSchema {
    /// Required parameter names, in positional binding order.
    required: Vec<String>,
    /// Boolean switch names. Present or absent, never value-bearing.
    switches: Vec<String>,
    /// Explicit parameter -> producing-operation overrides. Parameters not
    /// listed here follow the convention that the producing operation has
    /// the parameter's own name.
    producers: BTreeMap<String, String>,
    /// Optional help text shown by the `help` command.
    help: Option<String>,
}

impl OperationSchema {
    /// Create a schema from required parameter names and switch names.
    ///
    /// The order of `required` defines positional binding order.
    pub fn new(required: &[&str], switches: &[&str]) -> Self {
        OperationSchema {
            required: required.iter().map(|s| (*s).to_string()).collect(),
            switches: switches.iter().map(|s| (*s).to_string()).collect(),
            producers: BTreeMap::new(),
            help: None,
        }
    }

    /// Attach help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Declare which operation produces `parameter` when the caller omits
    /// it, overriding the name convention.
    pub fn with_producer(
        mut self,
        parameter: impl Into<String>,
        operation: impl Into<String>,
    ) -> Self {
        self.producers.insert(parameter.into(), operation.into());
        self
    }

    /// Required parameter names in declaration order.
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Declared switch names.
    pub fn switches(&self) -> &[String] {
        &self.switches
    }

    /// Help text, if declared.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Whether `name` is a declared switch.
    pub fn is_switch(&self, name: &str) -> bool {
        self.switches.iter().any(|s| s == name)
    }

    /// Whether `name` is a declared required parameter.
    pub fn requires(&self, name: &str) -> bool {
        self.required.iter().any(|s| s == name)
    }

    /// The operation that produces `name` during resolution: an explicit
    /// override if declared, otherwise the parameter's own name.
    pub fn producer_for<'a>(&'a self, name: &'a str) -> &'a str {
        self.producers.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Check structural rules.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::Duplicate`] if a name repeats within a list
    /// - [`SchemaError::RequiredSwitchOverlap`] if a name is in both lists
    pub fn validate(&self) -> Result<(), SchemaError> {
        for (i, name) in self.required.iter().enumerate() {
            if self.required[..i].contains(name) {
                return Err(SchemaError::Duplicate(name.clone()));
            }
        }
        for (i, name) in self.switches.iter().enumerate() {
            if self.switches[..i].contains(name) {
                return Err(SchemaError::Duplicate(name.clone()));
            }
        }
        if let Some(name) = self.required.iter().find(|r| self.is_switch(r)) {
            return Err(SchemaError::RequiredSwitchOverlap(name.clone()));
        }
        Ok(())
    }
}
