//! cli
//!
//! Command-line entry point.
//!
//! # Responsibilities
//!
//! - Parse arguments and global flags
//! - Load configuration and tokens
//! - Assemble the registry, command table, dispatcher, and gateway
//! - Wrap the arguments into a command envelope, dispatch once, print
//!
//! This is the local stand-in for the chat-command integration: the same
//! gateway surface a webhook receiver would call, driven from a terminal.

pub mod args;

pub use args::Cli;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::auth::{Auth, COMPUTE_TOKEN_VAR};
use crate::config::BotConfig;
use crate::dispatch::{Command, CommandTable, Dispatcher, TableError, BUILTIN_PLUGIN};
use crate::gateway::{CommandEvent, Gateway};
use crate::notify::{ChatWebhook, Notifier};
use crate::plugin::{instances, InstanceControl, PluginRegistry};
use crate::ui::{self, Verbosity};

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub async fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);

    let config = BotConfig::load(cli.config.as_deref())?;
    let auth = Auth::from_env()?;
    let gateway = assemble(&config, auth.clone(), cli.no_notify, verbosity)?;

    let event = CommandEvent {
        command: config.command().to_string(),
        text: cli.text.join(" "),
        user_name: cli.user,
        channel_id: cli.channel,
        token: auth.app_token().to_string(),
    };
    ui::debug(format!("dispatching: {}", event.text), verbosity);

    let reply = gateway.handle(&event).await?;
    println!("{}", reply.private());
    if let Some(public) = reply.public() {
        println!("{}", public);
    }
    Ok(())
}

/// Assemble the gateway from configuration.
fn assemble(
    config: &BotConfig,
    auth: Auth,
    no_notify: bool,
    verbosity: Verbosity,
) -> Result<Gateway> {
    let api_base = config
        .compute_api_base()
        .context("compute.api_base is not configured")?;
    let compute_token = std::env::var(COMPUTE_TOKEN_VAR).ok();

    let mut registry = PluginRegistry::new();
    registry.register(Arc::new(InstanceControl::new(api_base, compute_token)))?;

    let dispatcher = Dispatcher::new(command_table()?, registry);

    let notifier: Option<Arc<dyn Notifier>> = if no_notify {
        None
    } else {
        config
            .webhook_url()
            .map(|url| Arc::new(ChatWebhook::new(url, auth.bot_token())) as Arc<dyn Notifier>)
    };

    Ok(Gateway::new(
        dispatcher,
        notifier,
        auth,
        config.command(),
        verbosity,
    ))
}

/// The shipped command table.
pub fn command_table() -> Result<CommandTable, TableError> {
    let mut table = CommandTable::new();
    table.register(Command::new(
        "list-instances",
        instances::PLUGIN_NAME,
        "instance_names",
        false,
    ))?;
    table.register(Command::new(
        "status",
        instances::PLUGIN_NAME,
        "instance_state",
        true,
    ))?;
    table.register(Command::new(
        "start",
        instances::PLUGIN_NAME,
        "start_instance",
        true,
    ))?;
    table.register(Command::new(
        "stop",
        instances::PLUGIN_NAME,
        "stop_instance",
        true,
    ))?;
    table.register(Command::new(
        "reboot",
        instances::PLUGIN_NAME,
        "reboot_instance",
        true,
    ))?;
    table.register(Command::new("help", BUILTIN_PLUGIN, "help", false))?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_table_registers_the_six_commands() {
        let table = command_table().unwrap();
        let names: Vec<_> = table.iter().map(Command::name).collect();
        assert_eq!(
            names,
            ["list-instances", "status", "start", "stop", "reboot", "help"]
        );
    }

    #[test]
    fn only_listing_and_help_are_private() {
        let table = command_table().unwrap();
        for command in table.iter() {
            let expect_broadcast = !matches!(command.name(), "list-instances" | "help");
            assert_eq!(command.broadcast(), expect_broadcast, "{}", command.name());
        }
    }

    #[test]
    fn every_command_targets_a_known_plugin() {
        let table = command_table().unwrap();
        for command in table.iter() {
            assert!(
                command.plugin() == instances::PLUGIN_NAME || command.plugin() == BUILTIN_PLUGIN,
                "{} targets unexpected plugin {}",
                command.name(),
                command.plugin()
            );
        }
    }
}
