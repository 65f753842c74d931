//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! Everything after the flags is the chat command line itself, passed
//! through to the dispatcher verbatim - including its own `--switch`
//! tokens, which is why the trailing arguments allow hyphen values.

use clap::Parser;
use std::path::PathBuf;

/// Peon - a chat-command dispatcher for cloud instance control
#[derive(Parser, Debug)]
#[command(name = "peon")]
#[command(author, version, long_about = None)]
pub struct Cli {
    /// Path to the config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Channel identity to dispatch as
    #[arg(long, default_value = "local")]
    pub channel: String,

    /// User identity to dispatch as
    #[arg(long, default_value = "local-user")]
    pub user: String,

    /// Skip webhook delivery for broadcast results
    #[arg(long)]
    pub no_notify: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long)]
    pub quiet: bool,

    /// The command line to dispatch, e.g. `status web-1 --dry_run`
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "COMMAND"
    )]
    pub text: Vec<String>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}
