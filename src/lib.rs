#![allow(clippy::doc_markdown)] // Allow technical terms like JSON Schema in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Action Router
//!
//! Resolution and dispatch engine for plugin-supplied actions.
//!
//! ## Overview
//!
//! Plugins implement a fixed catalogue of actions: environment lifecycle,
//! secrets, module build/test/publish, service deploy/status/logs and task
//! runs. Callers never address a plugin directly. They ask the
//! [`ActionDispatcher`] to perform an action for an entity and the engine
//! selects the handler, injects the owning provider's context, validates the
//! result against the action's schema and returns it typed.
//!
//! ## Resolution Rules
//!
//! - Handlers are registered once, in plugin dependency order.
//! - For a given action (and module type) the most recently registered handler wins.
//! - A plugin-name filter restricts the candidates to that plugin.
//! - Built-in defaults are the lowest priority and run under the default provider.
//! - No handler and no default is a [`ParameterError`], or a [`PluginError`]
//!   when a plugin was named.
//!
//! ## Module Organization
//!
//! - [`actions`] - action catalogue, result schemas, built-in defaults
//! - [`models`] - entities, parameters and typed results
//! - [`plugin`] - plugin definitions and the handler trait
//! - [`registry`] - handler registry and the result-validating wrapper
//! - [`orchestration`] - resolver, context injection, dispatcher, workflows
//! - [`config`] - engine configuration
//! - [`logging`] - tracing setup and the hierarchical progress log
//! - [`error`] - structured error handling
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use action_router::config::EngineConfig;
//! use action_router::logging::{init_structured_logging, LogEntry};
//! use action_router::orchestration::{ActionDispatcher, ModuleRequest};
//! use action_router::models::BuildModuleParams;
//!
//! # async fn example(plugins: Vec<action_router::plugin::Plugin>,
//! #                  collaborators: action_router::orchestration::Collaborators,
//! #                  module: action_router::models::Module) -> action_router::ActionResult<()> {
//! let config = EngineConfig::for_environment("local", "my-project");
//! init_structured_logging(&config);
//!
//! let dispatcher = ActionDispatcher::new(&config, plugins, collaborators)?;
//! let log = LogEntry::root();
//! let build = dispatcher
//!     .build(ModuleRequest::new(module, log, BuildModuleParams {}))
//!     .await?;
//! println!("fresh build: {:?}", build.fresh);
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod plugin;
pub mod registry;

pub use actions::{ActionKind, ActionScope, ModuleAction, ProviderAction};
pub use config::EngineConfig;
pub use constants::DEFAULT_PROVIDER_NAME;
pub use error::{
    ActionError, ActionResult, ParameterError, PluginError, PluginErrorKind, ValidationError,
};
pub use logging::{init_structured_logging, LogEntry};
pub use orchestration::{ActionDispatcher, ActionInput, Collaborators};
pub use plugin::{handler_fn, respond, ActionHandler, Plugin};
pub use registry::HandlerRegistry;
