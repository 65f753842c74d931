//! dispatch::table
//!
//! The command table: user-facing command word -> target operation.
//!
//! # Design
//!
//! The table is an explicitly constructed, immutable mapping handed to the
//! dispatcher at assembly time. Registration order is preserved - it drives
//! the ordering of `help` output. Lookup is a case-sensitive exact match;
//! no fuzzy matching, no abbreviation.

use thiserror::Error;

/// Errors from command table construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    /// Two commands registered under the same word.
    #[error("duplicate command '{0}'")]
    DuplicateCommand(String),
}

/// A registered command: a user-facing word selecting a plugin operation,
/// plus the broadcast flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: String,
    plugin: String,
    operation: String,
    broadcast: bool,
}

impl Command {
    /// Create a command entry.
    pub fn new(
        name: impl Into<String>,
        plugin: impl Into<String>,
        operation: impl Into<String>,
        broadcast: bool,
    ) -> Self {
        Command {
            name: name.into(),
            plugin: plugin.into(),
            operation: operation.into(),
            broadcast,
        }
    }

    /// The user-facing command word.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The target plugin name.
    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    /// The target operation name.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Whether a successful result is broadcast to the channel.
    pub fn broadcast(&self) -> bool {
        self.broadcast
    }
}

/// Ordered, immutable set of registered commands.
///
/// # Example
///
/// ```
/// use peon::dispatch::{Command, CommandTable};
///
/// let mut table = CommandTable::new();
/// table
///     .register(Command::new("status", "instances", "instance_state", true))
///     .unwrap();
///
/// assert_eq!(table.get("status").unwrap().operation(), "instance_state");
/// assert!(table.get("Status").is_none()); // case-sensitive
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    commands: Vec<Command>,
}

impl CommandTable {
    /// Create an empty table.
    pub fn new() -> Self {
        CommandTable::default()
    }

    /// Register a command.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::DuplicateCommand`] if the word is taken.
    pub fn register(&mut self, command: Command) -> Result<(), TableError> {
        if self.get(command.name()).is_some() {
            return Err(TableError::DuplicateCommand(command.name().to_string()));
        }
        self.commands.push(command);
        Ok(())
    }

    /// Look up a command by its exact word.
    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.name == name)
    }

    /// Iterate over commands in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
