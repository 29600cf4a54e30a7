//! Error types for action resolution and dispatch.
//!
//! Three families reach callers:
//!
//! - [`ParameterError`]: no plugin in the environment supplies the requested handler.
//! - [`PluginError`]: a named plugin is at fault (missing handler, empty response,
//!   invalid result, handler failure).
//! - [`ValidationError`]: a handler result did not match its declared schema. It is
//!   always carried inside a [`PluginError`].

use crate::actions::ActionKind;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

pub type ActionResult<T> = std::result::Result<T, ActionError>;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Parameter(#[from] ParameterError),
    #[error(transparent)]
    Plugin(#[from] PluginError),
    #[error("{operation} failed: {source}")]
    Collaborator {
        operation: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("Invalid result schema for '{action}': {reason}")]
    Schema { action: ActionKind, reason: String },
}

impl ActionError {
    pub fn collaborator(operation: impl Into<String>, source: anyhow::Error) -> Self {
        ActionError::Collaborator {
            operation: operation.into(),
            source,
        }
    }

    /// True for configuration/parameter errors (no handler anywhere).
    pub fn is_parameter(&self) -> bool {
        matches!(self, ActionError::Parameter(_))
    }

    /// True for any plugin error, including validation failures.
    pub fn is_plugin(&self) -> bool {
        matches!(self, ActionError::Plugin(_))
    }

    /// True when a handler result failed schema validation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ActionError::Plugin(PluginError {
                kind: PluginErrorKind::InvalidResult(_),
                ..
            })
        )
    }

    /// The plugin blamed by this error, if any.
    pub fn plugin_name(&self) -> Option<&str> {
        match self {
            ActionError::Plugin(error) => Some(&error.plugin),
            _ => None,
        }
    }
}

/// No plugin in the current environment supplies a handler for the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterError {
    pub action: ActionKind,
    pub module_type: Option<String>,
    pub environment: String,
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.module_type {
            Some(module_type) => write!(
                f,
                "No '{}' handler configured for module type '{}' in environment '{}'. \
                 Are you missing a provider configuration?",
                self.action, module_type, self.environment
            ),
            None => write!(
                f,
                "No '{}' handler configured in environment '{}'. \
                 Are you missing a provider configuration?",
                self.action, self.environment
            ),
        }
    }
}

impl std::error::Error for ParameterError {}

/// What went wrong with a specific plugin.
#[derive(Debug)]
pub enum PluginErrorKind {
    /// The plugin was requested explicitly but registers no handler for the action.
    MissingHandler,
    /// The handler completed without producing a value.
    EmptyResponse,
    /// The handler produced a value that does not match the action's result schema.
    InvalidResult(ValidationError),
    /// The handler itself returned an error.
    HandlerFailed(anyhow::Error),
    /// The plugin loader could not initialize the plugin.
    LoadFailed(anyhow::Error),
}

/// A named plugin is malformed or misbehaved.
#[derive(Debug)]
pub struct PluginError {
    pub plugin: String,
    pub action: ActionKind,
    pub module_type: Option<String>,
    pub kind: PluginErrorKind,
}

impl PluginError {
    pub fn new(
        plugin: impl Into<String>,
        action: ActionKind,
        module_type: Option<String>,
        kind: PluginErrorKind,
    ) -> Self {
        Self {
            plugin: plugin.into(),
            action,
            module_type,
            kind,
        }
    }

    pub fn validation(&self) -> Option<&ValidationError> {
        match &self.kind {
            PluginErrorKind::InvalidResult(error) => Some(error),
            _ => None,
        }
    }
}

impl fmt::Display for PluginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.module_type) {
            (PluginErrorKind::MissingHandler, Some(module_type)) => write!(
                f,
                "Plugin '{}' does not have a '{}' handler for module type '{}'.",
                self.plugin, self.action, module_type
            ),
            (PluginErrorKind::MissingHandler, None) => write!(
                f,
                "Plugin '{}' does not have a '{}' handler.",
                self.plugin, self.action
            ),
            (PluginErrorKind::EmptyResponse, Some(module_type)) => write!(
                f,
                "Got empty response from {}.{} handler on {}",
                module_type, self.action, self.plugin
            ),
            (PluginErrorKind::EmptyResponse, None) => write!(
                f,
                "Got empty response from {} handler on {}",
                self.action, self.plugin
            ),
            (PluginErrorKind::InvalidResult(error), _) => write!(f, "{error}"),
            (PluginErrorKind::HandlerFailed(source), _) => write!(
                f,
                "'{}' handler on plugin '{}' failed: {}",
                self.action, self.plugin, source
            ),
            (PluginErrorKind::LoadFailed(source), _) => {
                write!(f, "Could not load plugin '{}': {}", self.plugin, source)
            }
        }
    }
}

impl std::error::Error for PluginError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            PluginErrorKind::InvalidResult(error) => Some(error),
            PluginErrorKind::HandlerFailed(source) | PluginErrorKind::LoadFailed(source) => {
                Some(source.as_ref())
            }
            PluginErrorKind::MissingHandler | PluginErrorKind::EmptyResponse => None,
        }
    }
}

/// A single schema violation in a handler result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// JSON pointer to the offending value (empty for the root).
    pub path: String,
    pub message: String,
}

/// A handler result does not conform to the declared output schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Human readable subject, e.g. `build output from plugin container`.
    pub context: String,
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error validating {}", self.context)?;
        for (index, issue) in self.issues.iter().enumerate() {
            let separator = if index == 0 { ": " } else { "; " };
            if issue.path.is_empty() {
                write!(f, "{separator}{}", issue.message)?;
            } else {
                write!(f, "{separator}key {} {}", issue.path, issue.message)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}
