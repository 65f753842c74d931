//! Peon - a chat-command dispatcher for cloud instance control
//!
//! Peon is a single-binary bot core that turns free-form chat command lines
//! ("stop web-1 --force") into calls against schema-described plugin
//! operations, and shapes the outcome into a private (caller-only) and an
//! optional public (broadcast) message.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line entry point (parses args, assembles the bot)
//! - [`gateway`] - Inbound envelope handling and outbound broadcast delivery
//! - [`dispatch`] - The dispatcher core: tokenizer, parameter extraction,
//!   recursive requirement resolution, and response shaping
//! - [`plugin`] - Capability interface for named operations, plus the
//!   HTTP-backed instance-control plugin
//! - [`notify`] - Abstraction for the outbound chat webhook
//! - [`auth`] - Inbound app-token validation and outbound token supply
//! - [`config`] - Configuration schema and loading
//! - [`ui`] - Output utilities
//!
//! # Correctness Invariants
//!
//! Peon maintains the following invariants:
//!
//! 1. Directly supplied parameter values are never overwritten by resolution
//! 2. Requirement resolution is depth-first, memoized, and cycle-checked
//! 3. Errors surface only in the private half of a reply, never broadcast
//! 4. Dispatcher state is read-only across dispatches; no global registries

pub mod auth;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod gateway;
pub mod notify;
pub mod plugin;
pub mod ui;
