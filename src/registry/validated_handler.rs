//! Result-validating wrapper around raw plugin handlers.

use super::schema::ResultSchema;
use crate::actions::ActionKind;
use crate::constants::DEFAULT_PROVIDER_NAME;
use crate::error::{ActionResult, PluginError, PluginErrorKind, ValidationError, ValidationIssue};
use crate::orchestration::ActionInput;
use crate::plugin::ActionHandler;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// A registered handler together with the plugin and module type it belongs to.
///
/// Every call checks that a value was produced and that it matches the action's
/// result schema before handing it back.
#[derive(Clone)]
pub struct ValidatedHandler {
    action: ActionKind,
    plugin_name: String,
    module_type: Option<String>,
    handler: Arc<dyn ActionHandler>,
    schema: Arc<ResultSchema>,
}

impl ValidatedHandler {
    pub fn new(
        action: ActionKind,
        plugin_name: impl Into<String>,
        module_type: Option<String>,
        handler: Arc<dyn ActionHandler>,
        schema: Arc<ResultSchema>,
    ) -> Self {
        Self {
            action,
            plugin_name: plugin_name.into(),
            module_type,
            handler,
            schema,
        }
    }

    pub fn action(&self) -> ActionKind {
        self.action
    }

    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    pub fn module_type(&self) -> Option<&str> {
        self.module_type.as_deref()
    }

    pub fn is_default(&self) -> bool {
        self.plugin_name == DEFAULT_PROVIDER_NAME
    }

    /// Invoke the handler and return its validated result.
    pub async fn call(&self, input: ActionInput) -> ActionResult<Value> {
        debug_assert_eq!(input.params.action(), self.action);

        let output = self
            .handler
            .handle(input)
            .await
            .map_err(|e| self.error(PluginErrorKind::HandlerFailed(e)))?;

        let value = output.ok_or_else(|| self.error(PluginErrorKind::EmptyResponse))?;

        self.schema
            .validate(&value, &self.validation_context())
            .map_err(|e| self.error(PluginErrorKind::InvalidResult(e)))?;

        trace!(
            action = %self.action,
            plugin = %self.plugin_name,
            "Handler result validated"
        );

        Ok(value)
    }

    /// Invoke the handler and deserialize its validated result.
    pub async fn call_typed<T: DeserializeOwned>(&self, input: ActionInput) -> ActionResult<T> {
        let value = self.call(input).await?;
        serde_json::from_value(value).map_err(|e| {
            self.error(PluginErrorKind::InvalidResult(ValidationError {
                context: self.validation_context(),
                issues: vec![ValidationIssue {
                    path: String::new(),
                    message: e.to_string(),
                }],
            }))
            .into()
        })
    }

    fn validation_context(&self) -> String {
        format!("{} output from plugin {}", self.action, self.plugin_name)
    }

    fn error(&self, kind: PluginErrorKind) -> PluginError {
        PluginError::new(
            self.plugin_name.clone(),
            self.action,
            self.module_type.clone(),
            kind,
        )
    }
}

impl fmt::Debug for ValidatedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedHandler")
            .field("action", &self.action)
            .field("plugin_name", &self.plugin_name)
            .field("module_type", &self.module_type)
            .finish_non_exhaustive()
    }
}
