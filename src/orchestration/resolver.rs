//! # Action Resolution
//!
//! Selects the one handler that runs for a request.
//!
//! 1. When a plugin name is given, the plugin is loaded first.
//! 2. Registered handlers for the key are collected, filtered to the named
//!    plugin if there is one.
//! 3. The last remaining handler in registration order wins.
//! 4. Otherwise the action's built-in default runs under the default provider.
//! 5. Otherwise resolution fails: a [`PluginError`] when a plugin was named,
//!    a [`ParameterError`] when nothing in the environment supplies the handler.

use super::collaborators::PluginLoader;
use crate::actions::{ActionKind, ModuleAction, ProviderAction};
use crate::error::{ActionResult, ParameterError, PluginError, PluginErrorKind};
use crate::registry::{HandlerRegistry, ValidatedHandler};
use std::sync::Arc;
use tracing::{debug, instrument, trace};

#[derive(Debug, Clone)]
pub struct ActionResolver {
    registry: Arc<HandlerRegistry>,
    plugins: Arc<dyn PluginLoader>,
    environment: String,
}

impl ActionResolver {
    pub fn new(
        registry: Arc<HandlerRegistry>,
        plugins: Arc<dyn PluginLoader>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            plugins,
            environment: environment.into(),
        }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    #[instrument(skip(self), fields(action = %action))]
    pub async fn resolve_provider_action(
        &self,
        action: ProviderAction,
        plugin_name: Option<&str>,
    ) -> ActionResult<Arc<ValidatedHandler>> {
        let kind = ActionKind::Provider(action);
        if let Some(name) = plugin_name {
            self.ensure_loaded(name, kind, None).await?;
        }

        self.select(kind, None, self.registry.provider_handlers(action), plugin_name)
    }

    #[instrument(skip(self), fields(action = %action))]
    pub async fn resolve_module_action(
        &self,
        action: ModuleAction,
        module_type: &str,
        plugin_name: Option<&str>,
    ) -> ActionResult<Arc<ValidatedHandler>> {
        let kind = ActionKind::Module(action);
        if let Some(name) = plugin_name {
            self.ensure_loaded(name, kind, Some(module_type)).await?;
        }

        self.select(
            kind,
            Some(module_type),
            self.registry.module_handlers(action, module_type),
            plugin_name,
        )
    }

    async fn ensure_loaded(
        &self,
        plugin_name: &str,
        action: ActionKind,
        module_type: Option<&str>,
    ) -> ActionResult<()> {
        trace!(plugin = plugin_name, "Ensuring plugin is loaded");
        self.plugins.get_plugin(plugin_name).await.map_err(|e| {
            PluginError::new(
                plugin_name,
                action,
                module_type.map(str::to_string),
                PluginErrorKind::LoadFailed(e),
            )
            .into()
        })
    }

    fn select(
        &self,
        action: ActionKind,
        module_type: Option<&str>,
        handlers: &[Arc<ValidatedHandler>],
        plugin_name: Option<&str>,
    ) -> ActionResult<Arc<ValidatedHandler>> {
        let selected = handlers
            .iter()
            .filter(|h| plugin_name.map_or(true, |name| h.plugin_name() == name))
            .last();

        if let Some(handler) = selected {
            debug!(
                action = %action,
                module_type = module_type.unwrap_or(""),
                plugin = handler.plugin_name(),
                candidates = handlers.len(),
                "Resolved handler"
            );
            return Ok(handler.clone());
        }

        if let Some(default) = self.registry.default_handler(action) {
            debug!(
                action = %action,
                module_type = module_type.unwrap_or(""),
                "No plugin handler registered, using built-in default"
            );
            return Ok(default);
        }

        let module_type = module_type.map(str::to_string);
        match plugin_name {
            Some(name) => Err(PluginError::new(name, action, module_type, PluginErrorKind::MissingHandler).into()),
            None => Err(ParameterError {
                action,
                module_type,
                environment: self.environment.clone(),
            }
            .into()),
        }
    }
}
