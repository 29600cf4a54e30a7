//! # Data Model
//!
//! Entities the engine dispatches against, the parameters callers supply per
//! action, and the typed results handlers produce.
//!
//! - [`entities`] - modules, services, tasks, runtime context
//! - [`provider`] - providers and the injected plugin context
//! - [`params`] - action-specific parameter structs and [`ActionParams`]
//! - [`results`] - typed results matching each action's result schema

pub mod entities;
pub mod params;
pub mod provider;
pub mod results;

pub use entities::{DependencyKind, Module, RuntimeContext, RuntimeDependency, Service, Task};
pub use params::*;
pub use provider::{PluginContext, Provider};
pub use results::*;
