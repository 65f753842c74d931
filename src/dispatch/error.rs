//! dispatch::error
//!
//! The dispatch error taxonomy.
//!
//! # Classification
//!
//! - `MalformedInput`, `UnknownCommand` - caller mistakes, reported verbatim
//! - `UnsatisfiableRequirement`, `CyclicRequirement`, `MissingPlugin`,
//!   `UnknownOperation` - registry/configuration defects; still answered
//!   with a structured reply, never a crash
//! - `Plugin` - the invoked operation failed for a domain reason; the
//!   message passes through prefixed with the plugin's name
//!
//! Every kind surfaces only in the private half of a reply and is never
//! retried.

use thiserror::Error;

use crate::plugin::PluginError;

/// Errors from dispatching a command line.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Unterminated quoting, empty input, or a trailing flag with no value.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The first token does not match any registered command.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A required parameter has no caller-supplied value and no producing
    /// operation exists on the target plugin.
    #[error("no way to satisfy required parameter '{0}'")]
    UnsatisfiableRequirement(String),

    /// Resolution of a parameter transitively depends on itself.
    #[error("cyclic requirement while resolving '{0}'")]
    CyclicRequirement(String),

    /// A command references a plugin that is not in the registry.
    #[error("command references unregistered plugin '{0}'")]
    MissingPlugin(String),

    /// A command references an operation its plugin does not declare.
    #[error("plugin '{plugin}' does not declare operation '{operation}'")]
    UnknownOperation {
        /// Plugin name
        plugin: String,
        /// Operation name
        operation: String,
    },

    /// The invoked operation failed.
    #[error("plugin {plugin}: {source}")]
    Plugin {
        /// The plugin that failed
        plugin: String,
        /// The underlying failure
        source: PluginError,
    },
}

impl DispatchError {
    /// Render this error as the private half of a reply.
    pub fn to_private_message(&self) -> String {
        match self {
            DispatchError::Plugin { plugin, source } => {
                format!("error with plugin {}: {}", plugin, source)
            }
            other => format!("error: {}", other),
        }
    }
}
