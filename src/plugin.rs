//! # Plugin Definitions
//!
//! A [`Plugin`] is a named bundle of action handlers. Provider actions are
//! declared once per plugin; module actions are declared per module type.
//!
//! ```rust,ignore
//! use action_router::actions::{ModuleAction, ProviderAction};
//! use action_router::plugin::{handler_fn, respond, Plugin};
//! use action_router::models::{BuildStatus, EnvironmentStatus};
//!
//! let plugin = Plugin::builder("container")
//!     .action(
//!         ProviderAction::GetEnvironmentStatus,
//!         handler_fn(|_input| async { respond(&EnvironmentStatus::ready()) }),
//!     )
//!     .module_action(
//!         "container",
//!         ModuleAction::GetBuildStatus,
//!         handler_fn(|_input| async { respond(&BuildStatus { ready: true }) }),
//!     )
//!     .build();
//! ```

use crate::actions::{ModuleAction, ProviderAction};
use crate::orchestration::ActionInput;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Raw plugin-supplied implementation of one action.
///
/// `Ok(None)` means the handler produced no value, which the engine reports as
/// an empty response. A JSON `null` is returned as `Ok(Some(Value::Null))`.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn handle(&self, input: ActionInput) -> anyhow::Result<Option<Value>>;
}

/// Adapter turning an async closure into an [`ActionHandler`].
pub struct FnHandler<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> ActionHandler for FnHandler<F>
where
    F: Fn(ActionInput) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Option<Value>>> + Send + 'static,
{
    async fn handle(&self, input: ActionInput) -> anyhow::Result<Option<Value>> {
        (self.f)(input).await
    }
}

pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn ActionHandler>
where
    F: Fn(ActionInput) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Option<Value>>> + Send + 'static,
{
    Arc::new(FnHandler { f })
}

/// Serialize a typed result as handler output.
pub fn respond<T: Serialize>(result: &T) -> anyhow::Result<Option<Value>> {
    Ok(Some(serde_json::to_value(result)?))
}

/// A module action implemented for one module type.
#[derive(Clone)]
pub struct ModuleHandlerDeclaration {
    pub module_type: String,
    pub action: ModuleAction,
    pub handler: Arc<dyn ActionHandler>,
}

/// A named set of action handlers.
#[derive(Clone)]
pub struct Plugin {
    name: String,
    actions: Vec<(ProviderAction, Arc<dyn ActionHandler>)>,
    module_actions: Vec<ModuleHandlerDeclaration>,
}

impl Plugin {
    pub fn builder(name: impl Into<String>) -> PluginBuilder {
        PluginBuilder {
            plugin: Plugin {
                name: name.into(),
                actions: Vec::new(),
                module_actions: Vec::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Provider actions in declaration order.
    pub fn actions(&self) -> &[(ProviderAction, Arc<dyn ActionHandler>)] {
        &self.actions
    }

    /// Module actions in declaration order.
    pub fn module_actions(&self) -> &[ModuleHandlerDeclaration] {
        &self.module_actions
    }

    /// Module types this plugin implements at least one action for.
    pub fn module_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = Vec::new();
        for declaration in &self.module_actions {
            if !types.contains(&declaration.module_type.as_str()) {
                types.push(&declaration.module_type);
            }
        }
        types
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let actions: Vec<&str> = self.actions.iter().map(|(action, _)| action.name()).collect();
        let module_actions: Vec<String> = self
            .module_actions
            .iter()
            .map(|declaration| format!("{}.{}", declaration.module_type, declaration.action))
            .collect();

        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("actions", &actions)
            .field("module_actions", &module_actions)
            .finish()
    }
}

pub struct PluginBuilder {
    plugin: Plugin,
}

impl PluginBuilder {
    /// Declare a provider action handler. A later declaration of the same
    /// action replaces the earlier one.
    #[must_use]
    pub fn action(mut self, action: ProviderAction, handler: Arc<dyn ActionHandler>) -> Self {
        self.plugin.actions.retain(|(existing, _)| *existing != action);
        self.plugin.actions.push((action, handler));
        self
    }

    /// Declare a module action handler for one module type.
    #[must_use]
    pub fn module_action(
        mut self,
        module_type: impl Into<String>,
        action: ModuleAction,
        handler: Arc<dyn ActionHandler>,
    ) -> Self {
        let module_type = module_type.into();
        self.plugin
            .module_actions
            .retain(|existing| !(existing.module_type == module_type && existing.action == action));
        self.plugin.module_actions.push(ModuleHandlerDeclaration {
            module_type,
            action,
            handler,
        });
        self
    }

    pub fn build(self) -> Plugin {
        self.plugin
    }
}
