//! # Registry Infrastructure
//!
//! Storage for plugin-supplied action handlers.
//!
//! ## Architecture
//!
//! ```text
//! Registry Infrastructure
//! ├── HandlerRegistry      (per-action handler chains, built once)
//! ├── ValidatedHandler     (presence check + result schema validation)
//! └── SchemaTable          (compiled draft-07 result schemas)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use action_router::registry::HandlerRegistry;
//!
//! let registry = HandlerRegistry::from_plugins(&plugins)?;
//! let handlers = registry.module_handlers(ModuleAction::Build, "container");
//! ```

pub mod handler_registry;
pub mod schema;
pub mod validated_handler;

pub use handler_registry::{HandlerChain, HandlerRegistry, OverrideChain, RegistryStats};
pub use schema::{ResultSchema, SchemaTable};
pub use validated_handler::ValidatedHandler;
