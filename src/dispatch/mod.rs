//! dispatch
//!
//! The dispatcher core: from a raw command line to a shaped reply.
//!
//! # Pipeline
//!
//! ```text
//! raw string -> tokenize -> table lookup -> extract -> resolve -> invoke -> reply
//! ```
//!
//! Each dispatch is a single sequential call chain with no internal
//! parallelism: later resolution steps may depend on values produced
//! earlier. The dispatcher holds no mutable state across dispatches, so
//! concurrent dispatches need no locking.
//!
//! # Modules
//!
//! - [`tokenize`] - shell-style tokenization
//! - [`table`] - command word -> target operation mapping
//! - [`extract`] - schema-driven parameter extraction
//! - [`resolve`] - recursive requirement resolution
//! - [`params`] - the parameter set with value provenance
//! - [`phrases`] - broadcast acknowledgment phrases
//! - [`error`] - the dispatch error taxonomy

pub mod dispatcher;
pub mod error;
pub mod extract;
pub mod params;
pub mod phrases;
pub mod resolve;
pub mod table;
pub mod tokenize;

// Re-exports for convenience
pub use dispatcher::{DispatchContext, DispatchReply, Dispatcher, BUILTIN_PLUGIN};
pub use error::DispatchError;
pub use extract::{extract, Extraction};
pub use params::{ParamValue, ParameterSet, Provenance};
pub use phrases::{AckSource, FixedAck, RandomAck, ACK_PHRASES};
pub use resolve::{requirements_of, resolve_requirements, Requirement};
pub use table::{Command, CommandTable, TableError};
pub use tokenize::tokenize;
