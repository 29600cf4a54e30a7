//! # System Constants
//!
//! Identities and environment variable names shared across the engine.

/// Plugin name attached to built-in default handlers.
///
/// The default provider is always present and is never returned by a
/// [`ProviderResolver`](crate::orchestration::ProviderResolver); the engine
/// builds its context locally.
pub const DEFAULT_PROVIDER_NAME: &str = "_default";

/// Prefix for configuration environment variables (`ACTION_ROUTER_ENVIRONMENT`, ...).
pub const CONFIG_ENV_PREFIX: &str = "ACTION_ROUTER";

/// Environment name used when none is configured.
pub const DEFAULT_ENVIRONMENT: &str = "local";

/// Project name used when none is configured.
pub const DEFAULT_PROJECT_NAME: &str = "default";

/// Environment variables consulted, in order, when detecting the logging environment.
pub const ENVIRONMENT_VARIABLES: [&str; 3] = ["ACTION_ROUTER_ENVIRONMENT", "APP_ENV", "RUST_ENV"];

/// Log levels accepted by [`EngineConfig`](crate::config::EngineConfig).
pub const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
