//! plugin
//!
//! Plugins and their declared operation schemas.
//!
//! # Design
//!
//! A plugin is the unit of capability: a named object exposing operations
//! the dispatcher can address by name, each with a declared
//! [`OperationSchema`]. The dispatcher reaches plugins only through the
//! [`Plugin`] trait and the [`PluginRegistry`], so the core stays
//! independent of any particular control plane.
//!
//! - [`traits`] - the `Plugin` capability interface and `PluginError`
//! - [`schema`] - declared operation schemas
//! - [`registry`] - the immutable name -> plugin mapping
//! - [`instances`] - instance control over the compute HTTP API
//! - [`mock`] - deterministic plugin for tests

pub mod instances;
pub mod mock;
pub mod registry;
pub mod schema;
pub mod traits;

pub use instances::InstanceControl;
pub use mock::{MockInvocation, MockPlugin};
pub use registry::{PluginRegistry, RegistryError};
pub use schema::{OperationSchema, SchemaError, SchemaMap};
pub use traits::{Plugin, PluginError};
