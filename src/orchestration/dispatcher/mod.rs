//! # Action Dispatcher
//!
//! The public surface of the engine: one method per action plus the composite
//! workflows built from them.
//!
//! ```text
//! ActionDispatcher::build(request)
//!   ├── ActionResolver::resolve_module_action   (registry lookup, default fallback)
//!   ├── ContextInjector::prepare                (ctx + log + target + params)
//!   └── ValidatedHandler::call_typed            (presence + schema + typed result)
//! ```
//!
//! Submodules:
//!
//! - [`module_actions`] - module, service and task actions
//! - [`workflows`] - status aggregation, bulk deploy, environment teardown, debug info

mod module_actions;
mod workflows;

use super::collaborators::Collaborators;
use super::context::{ActionTarget, ContextInjector};
use super::requests::ProviderRequest;
use super::resolver::ActionResolver;
use crate::actions::ProviderAction;
use crate::config::EngineConfig;
use crate::error::ActionResult;
use crate::logging::LogEntry;
use crate::models::{
    ActionParams, CleanupEnvironmentParams, CleanupEnvironmentResult, DeleteSecretParams,
    DeleteSecretResult, EnvironmentStatus, GetEnvironmentStatusParams, GetSecretParams,
    GetSecretResult, PrepareEnvironmentParams, PrepareEnvironmentResult, SetSecretParams,
    SetSecretResult,
};
use crate::plugin::Plugin;
use crate::registry::{HandlerRegistry, ValidatedHandler};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{info, instrument, trace};

/// Routes action requests to plugin handlers.
///
/// The handler registry is built once in [`ActionDispatcher::new`] and never
/// changes afterwards, so the dispatcher can be shared freely across tasks.
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    config: EngineConfig,
    registry: Arc<HandlerRegistry>,
    resolver: ActionResolver,
    injector: ContextInjector,
    collaborators: Collaborators,
}

impl ActionDispatcher {
    /// Build the dispatcher. `plugins` must already be in dependency order.
    pub fn new(
        config: &EngineConfig,
        plugins: Vec<Plugin>,
        collaborators: Collaborators,
    ) -> ActionResult<Self> {
        let registry = Arc::new(HandlerRegistry::from_plugins(&plugins)?);
        let resolver = ActionResolver::new(
            registry.clone(),
            collaborators.plugins.clone(),
            config.environment.clone(),
        );
        let injector = ContextInjector::new(collaborators.providers.clone());

        info!(
            environment = %config.environment,
            project = %config.project_name,
            plugins = plugins.len(),
            "Action dispatcher initialized"
        );

        Ok(Self {
            config: config.clone(),
            registry,
            resolver,
            injector,
            collaborators,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> &ActionResolver {
        &self.resolver
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        handler: Arc<ValidatedHandler>,
        log: &LogEntry,
        target: ActionTarget,
        params: impl Into<ActionParams>,
    ) -> ActionResult<T> {
        trace!(action = %handler.action(), plugin = handler.plugin_name(), "Calling handler");
        let input = self
            .injector
            .prepare(handler.plugin_name(), log, target, params)
            .await?;
        handler.call_typed(input).await
    }

    async fn call_provider<T: DeserializeOwned, P: Into<ActionParams>>(
        &self,
        action: ProviderAction,
        request: ProviderRequest<P>,
    ) -> ActionResult<T> {
        let handler = self
            .resolver
            .resolve_provider_action(action, Some(&request.plugin_name))
            .await?;
        self.dispatch(handler, &request.log, ActionTarget::Environment, request.params)
            .await
    }

    #[instrument(skip(self, request), fields(plugin = %request.plugin_name))]
    pub async fn get_environment_status(
        &self,
        request: ProviderRequest<GetEnvironmentStatusParams>,
    ) -> ActionResult<EnvironmentStatus> {
        self.call_provider(ProviderAction::GetEnvironmentStatus, request)
            .await
    }

    #[instrument(skip(self, request), fields(plugin = %request.plugin_name))]
    pub async fn prepare_environment(
        &self,
        request: ProviderRequest<PrepareEnvironmentParams>,
    ) -> ActionResult<PrepareEnvironmentResult> {
        self.call_provider(ProviderAction::PrepareEnvironment, request)
            .await
    }

    #[instrument(skip(self, request), fields(plugin = %request.plugin_name))]
    pub async fn cleanup_environment(
        &self,
        request: ProviderRequest<CleanupEnvironmentParams>,
    ) -> ActionResult<CleanupEnvironmentResult> {
        self.call_provider(ProviderAction::CleanupEnvironment, request)
            .await
    }

    #[instrument(skip(self, request), fields(plugin = %request.plugin_name, key = %request.params.key))]
    pub async fn get_secret(
        &self,
        request: ProviderRequest<GetSecretParams>,
    ) -> ActionResult<GetSecretResult> {
        self.call_provider(ProviderAction::GetSecret, request).await
    }

    #[instrument(skip(self, request), fields(plugin = %request.plugin_name, key = %request.params.key))]
    pub async fn set_secret(
        &self,
        request: ProviderRequest<SetSecretParams>,
    ) -> ActionResult<SetSecretResult> {
        self.call_provider(ProviderAction::SetSecret, request).await
    }

    #[instrument(skip(self, request), fields(plugin = %request.plugin_name, key = %request.params.key))]
    pub async fn delete_secret(
        &self,
        request: ProviderRequest<DeleteSecretParams>,
    ) -> ActionResult<DeleteSecretResult> {
        self.call_provider(ProviderAction::DeleteSecret, request)
            .await
    }
}
