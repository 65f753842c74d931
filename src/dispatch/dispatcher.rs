//! dispatch::dispatcher
//!
//! The dispatcher: ties tokenizer, command table, extraction, and
//! resolution together and shapes the outcome into a reply.
//!
//! # Response Shaping
//!
//! A successful broadcast command returns both halves: the operation's
//! output as `public` and a random acknowledgment phrase as `private`. A
//! non-broadcast command returns only `private` - the `public` field is
//! entirely absent, not present-but-empty. Failures of any kind are
//! private-only regardless of the broadcast flag.
//!
//! # The Builtin Pseudo-Plugin
//!
//! The dispatcher itself is addressable as the pseudo-plugin `peon`. It
//! backs the `help` operation, which enumerates every registered command
//! with its declared help text, required parameters, and switches, in
//! registration order.

use serde::Serialize;

use crate::plugin::{OperationSchema, PluginError, PluginRegistry, SchemaMap};

use super::error::DispatchError;
use super::extract::extract;
use super::params::ParamValue;
use super::phrases::{AckSource, RandomAck};
use super::resolve::{requirements_of, resolve_requirements};
use super::table::{Command, CommandTable};
use super::tokenize::tokenize;

/// Plugin name the dispatcher registers itself under.
pub const BUILTIN_PLUGIN: &str = "peon";

/// Banner line opening the help output.
const HELP_BANNER: &str = "Peon is your friendly worker that helps control things for you!\n\n";

/// Dispatcher-owned context for one dispatch: who asked, and where.
///
/// These values are seeded into the parameter set as always-already-known
/// context parameters (`channel`, `user`) and never trigger resolution.
#[derive(Debug, Clone)]
pub struct DispatchContext {
    /// The invoking channel identity.
    pub channel: String,
    /// The invoking user identity.
    pub user: String,
}

impl DispatchContext {
    /// Create a context.
    pub fn new(channel: impl Into<String>, user: impl Into<String>) -> Self {
        DispatchContext {
            channel: channel.into(),
            user: user.into(),
        }
    }
}

/// The shaped result of one dispatch.
///
/// `public` is present exactly when a broadcast command succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReply {
    /// The caller-only half. Always present.
    private: String,
    /// The broadcastable half, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    public: Option<String>,
}

impl DispatchReply {
    /// A private-only reply.
    pub fn private_only(private: impl Into<String>) -> Self {
        DispatchReply {
            private: private.into(),
            public: None,
        }
    }

    /// A broadcast reply: acknowledgment for the caller, output for the
    /// channel.
    pub fn broadcast(private: impl Into<String>, public: impl Into<String>) -> Self {
        DispatchReply {
            private: private.into(),
            public: Some(public.into()),
        }
    }

    /// The caller-only message.
    pub fn private(&self) -> &str {
        &self.private
    }

    /// The broadcastable message, if any.
    pub fn public(&self) -> Option<&str> {
        self.public.as_deref()
    }
}

/// The command dispatcher.
///
/// Holds the command table, the plugin registry, and the acknowledgment
/// source - all read-only across dispatches, so one dispatcher serves
/// concurrent dispatches without locking.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use peon::dispatch::{Command, CommandTable, DispatchContext, Dispatcher};
/// use peon::plugin::{MockPlugin, OperationSchema, PluginRegistry};
///
/// # tokio_test::block_on(async {
/// let mut registry = PluginRegistry::new();
/// registry
///     .register(Arc::new(MockPlugin::new("instances").with_operation(
///         "instance_state",
///         OperationSchema::new(&["instance_name"], &["dry_run"]),
///         "Instance state: running",
///     )))
///     .unwrap();
///
/// let mut table = CommandTable::new();
/// table
///     .register(Command::new("status", "instances", "instance_state", false))
///     .unwrap();
///
/// let dispatcher = Dispatcher::new(table, registry);
/// let ctx = DispatchContext::new("ABCDE33", "test-user");
///
/// let reply = dispatcher.dispatch("status test-instance", &ctx).await;
/// assert_eq!(reply.private(), "Instance state: running");
/// assert_eq!(reply.public(), None);
/// # });
/// ```
pub struct Dispatcher {
    table: CommandTable,
    registry: PluginRegistry,
    acks: Box<dyn AckSource>,
    builtin: SchemaMap,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("commands", &self.table.len())
            .field("plugins", &self.registry.names())
            .finish()
    }
}

impl Dispatcher {
    /// Create a dispatcher over the given table and registry.
    pub fn new(table: CommandTable, registry: PluginRegistry) -> Self {
        let mut builtin = SchemaMap::new();
        builtin.insert(
            "help".to_string(),
            OperationSchema::new(&[], &[]).with_help("A simple help function."),
        );
        Dispatcher {
            table,
            registry,
            acks: Box::new(RandomAck),
            builtin,
        }
    }

    /// Substitute the acknowledgment source (deterministic tests).
    pub fn with_ack_source(mut self, acks: Box<dyn AckSource>) -> Self {
        self.acks = acks;
        self
    }

    /// Dispatch one raw command line.
    ///
    /// Never fails: every error is classified and shaped into a
    /// private-only reply.
    pub async fn dispatch(&self, raw: &str, ctx: &DispatchContext) -> DispatchReply {
        match self.try_dispatch(raw, ctx).await {
            Ok(reply) => reply,
            Err(err) => DispatchReply::private_only(err.to_private_message()),
        }
    }

    /// The fallible dispatch pipeline.
    async fn try_dispatch(
        &self,
        raw: &str,
        ctx: &DispatchContext,
    ) -> Result<DispatchReply, DispatchError> {
        let tokens = tokenize(raw)?;
        let word = tokens
            .first()
            .ok_or_else(|| DispatchError::MalformedInput("empty command".to_string()))?;
        let command = self
            .table
            .get(word)
            .ok_or_else(|| DispatchError::UnknownCommand(word.clone()))?;

        let schema = self.operation_schema(command)?;
        let mut extraction = extract(&tokens[1..], schema)?;

        // Context parameters are always already known.
        extraction
            .params
            .insert_context("channel", ParamValue::Text(ctx.channel.clone()));
        extraction
            .params
            .insert_context("user", ParamValue::Text(ctx.user.clone()));

        let missing = requirements_of(schema, &extraction.params);
        if !missing.is_empty() {
            let plugin = self.target_plugin(command)?;
            resolve_requirements(plugin, missing, &mut extraction.params).await?;
        }

        let output = if command.plugin() == BUILTIN_PLUGIN {
            self.invoke_builtin(command.operation())?
        } else {
            let plugin = self.target_plugin(command)?;
            match plugin.invoke(command.operation(), &extraction.params).await {
                Ok(output) => output,
                Err(PluginError::DryRun) => {
                    // A deliberate no-op. Positive acknowledgment, labeled
                    // with the command, and never broadcast.
                    return Ok(DispatchReply::private_only(format!(
                        "{}: dry run successful, no changes were made",
                        command.name()
                    )));
                }
                Err(source) => {
                    return Err(DispatchError::Plugin {
                        plugin: command.plugin().to_string(),
                        source,
                    });
                }
            }
        };

        if command.broadcast() {
            Ok(DispatchReply::broadcast(self.acks.ack(), output))
        } else {
            Ok(DispatchReply::private_only(output))
        }
    }

    /// The registered plugin a command targets.
    fn target_plugin(&self, command: &Command) -> Result<&dyn crate::plugin::Plugin, DispatchError> {
        self.registry
            .get(command.plugin())
            .map(|p| p.as_ref())
            .ok_or_else(|| DispatchError::MissingPlugin(command.plugin().to_string()))
    }

    /// The declared schema of a command's target operation.
    fn operation_schema(&self, command: &Command) -> Result<&OperationSchema, DispatchError> {
        let schema_map = if command.plugin() == BUILTIN_PLUGIN {
            &self.builtin
        } else {
            self.target_plugin(command)?.schema()
        };
        schema_map
            .get(command.operation())
            .ok_or_else(|| DispatchError::UnknownOperation {
                plugin: command.plugin().to_string(),
                operation: command.operation().to_string(),
            })
    }

    /// Invoke an operation on the builtin pseudo-plugin.
    fn invoke_builtin(&self, operation: &str) -> Result<String, DispatchError> {
        match operation {
            "help" => self.render_help(),
            other => Err(DispatchError::UnknownOperation {
                plugin: BUILTIN_PLUGIN.to_string(),
                operation: other.to_string(),
            }),
        }
    }

    /// Enumerate every registered command with its declared contract.
    fn render_help(&self) -> Result<String, DispatchError> {
        let mut msg = String::from(HELP_BANNER);
        for command in self.table.iter() {
            let schema = self.operation_schema(command)?;
            msg.push_str(command.name());
            msg.push_str(": ");
            msg.push_str(schema.help().unwrap_or(""));
            msg.push('\n');
            for req in schema.required() {
                msg.push_str(&format!("\t- {}: required\n", req));
            }
            for switch in schema.switches() {
                msg.push_str(&format!("\t- {}: switch\n", switch));
            }
            msg.push('\n');
        }
        Ok(msg)
    }
}
