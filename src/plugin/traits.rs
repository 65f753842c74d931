//! plugin::traits
//!
//! The plugin capability interface.
//!
//! # Design
//!
//! A plugin is a named capability unit exposing zero or more operations,
//! each described by an [`OperationSchema`]. The dispatcher addresses
//! operations by name through a single indirection - `schema()` to read the
//! declared contract, `invoke()` to call - rather than any reflective
//! attribute lookup.
//!
//! The trait is async because plugin operations typically involve network
//! I/O against a remote control plane. All methods return `Result` so
//! failures surface as structured [`PluginError`]s.
//!
//! # Example
//!
//! ```ignore
//! use peon::plugin::Plugin;
//!
//! async fn state_of(plugin: &dyn Plugin, params: &ParameterSet) -> Result<String, PluginError> {
//!     plugin.invoke("instance_state", params).await
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::dispatch::ParameterSet;

use super::schema::SchemaMap;

/// Errors from plugin operations.
///
/// These map to the common failure modes of a remote control plane, plus the
/// two contract violations a caller can commit (unknown operation, missing
/// argument).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PluginError {
    /// A deliberate no-op invocation: the `dry_run` switch was honored by
    /// the backing service. Distinct from success so the dispatcher can
    /// acknowledge it without claiming a state change happened.
    #[error("dry run requested; no changes were made")]
    DryRun,

    /// The named operation is not declared by this plugin.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// A declared required parameter was absent at invocation time.
    #[error("missing argument: {0}")]
    MissingArgument(String),

    /// Authentication failed (invalid token, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backing API returned an error.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    Network(String),
}

/// A named capability unit exposing schema-described operations.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; a plugin is shared read-only
/// across concurrent dispatches.
///
/// # Calling Contract
///
/// `invoke` receives keyword-style arguments in a [`ParameterSet`]. The
/// dispatcher passes the fully resolved set for the target operation; the
/// requirement resolver passes a set restricted to the producing operation's
/// declared `required` names. Switches that were absent simply read as
/// `false`. Operations return a human-readable string on success.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// The plugin name commands are registered against.
    fn name(&self) -> &str;

    /// Declared schemas, one per operation.
    fn schema(&self) -> &SchemaMap;

    /// Invoke the named operation with the given parameters.
    ///
    /// # Errors
    ///
    /// - `UnknownOperation` if `operation` is not declared
    /// - `MissingArgument` if a declared required parameter is absent
    /// - `DryRun` for honored dry-run invocations
    /// - the remaining variants for backing-service failures
    async fn invoke(&self, operation: &str, params: &ParameterSet) -> Result<String, PluginError>;
}
