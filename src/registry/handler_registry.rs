//! # Handler Registry
//!
//! Per-action handler tables, built once from the ordered plugin list.
//!
//! ```text
//! provider actions:  ProviderAction ──► HandlerChain (plugin order)
//! module actions:    ModuleAction ──► module type ──► HandlerChain (plugin order)
//! ```
//!
//! A [`HandlerChain`] keeps handlers in registration order and the resolver reads
//! its tail, so a plugin registered later overrides one registered earlier.
//! Registering the same plugin again replaces its handler in place; the replaced
//! handler is kept for [`HandlerRegistry::override_chain`].

use super::schema::SchemaTable;
use super::validated_handler::ValidatedHandler;
use crate::actions::{defaults, ActionKind, ModuleAction, ProviderAction};
use crate::constants::DEFAULT_PROVIDER_NAME;
use crate::error::ActionResult;
use crate::plugin::{ActionHandler, Plugin};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Handlers registered for one key, oldest first.
#[derive(Debug, Clone, Default)]
pub struct HandlerChain {
    active: Vec<Arc<ValidatedHandler>>,
    replaced: Vec<Arc<ValidatedHandler>>,
}

impl HandlerChain {
    fn register(&mut self, handler: Arc<ValidatedHandler>) {
        let existing = self
            .active
            .iter()
            .position(|h| h.plugin_name() == handler.plugin_name());

        match existing {
            Some(index) => {
                let previous = std::mem::replace(&mut self.active[index], handler);
                self.replaced.push(previous);
            }
            None => self.active.push(handler),
        }
    }

    pub fn handlers(&self) -> &[Arc<ValidatedHandler>] {
        &self.active
    }

    /// The handler that wins resolution for this key.
    pub fn effective(&self) -> Option<&Arc<ValidatedHandler>> {
        self.active.last()
    }

    pub fn replaced(&self) -> &[Arc<ValidatedHandler>] {
        &self.replaced
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// Who registered a handler for a key, and who overrode whom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverrideChain {
    pub action: ActionKind,
    pub module_type: Option<String>,
    /// Plugin names in registration order; the last one wins.
    pub plugins: Vec<String>,
    /// Plugins whose earlier registration was replaced by a re-registration.
    pub replaced: Vec<String>,
    /// Whether a built-in default backs the key.
    pub has_default: bool,
}

impl OverrideChain {
    pub fn effective_plugin(&self) -> Option<&str> {
        self.plugins
            .last()
            .map(String::as_str)
            .or(self.has_default.then_some(DEFAULT_PROVIDER_NAME))
    }
}

/// Registry statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub provider_handlers: usize,
    pub module_handlers: usize,
    pub module_types: usize,
    pub replaced_handlers: usize,
    pub default_handlers: usize,
}

/// Every registered handler, wrapped for result validation.
#[derive(Debug, Clone)]
pub struct HandlerRegistry {
    schemas: SchemaTable,
    provider_handlers: HashMap<ProviderAction, HandlerChain>,
    module_handlers: HashMap<ModuleAction, HashMap<String, HandlerChain>>,
    defaults: HashMap<ActionKind, Arc<ValidatedHandler>>,
}

impl HandlerRegistry {
    /// Empty registry with compiled schemas and wrapped defaults.
    pub fn new() -> ActionResult<Self> {
        let schemas = SchemaTable::compile_all()?;

        let mut wrapped_defaults = HashMap::new();
        for action in ActionKind::all() {
            if let Some(handler) = defaults::default_handler(action) {
                let wrapped = ValidatedHandler::new(
                    action,
                    DEFAULT_PROVIDER_NAME,
                    None,
                    handler,
                    schemas.get(action)?,
                );
                wrapped_defaults.insert(action, Arc::new(wrapped));
            }
        }

        Ok(Self {
            schemas,
            provider_handlers: HashMap::new(),
            module_handlers: HashMap::new(),
            defaults: wrapped_defaults,
        })
    }

    /// Registry populated from plugins in the given (dependency) order.
    pub fn from_plugins(plugins: &[Plugin]) -> ActionResult<Self> {
        let mut registry = Self::new()?;
        for plugin in plugins {
            registry.register_plugin(plugin)?;
        }

        let stats = registry.stats();
        debug!(
            plugins = plugins.len(),
            provider_handlers = stats.provider_handlers,
            module_handlers = stats.module_handlers,
            module_types = stats.module_types,
            replaced = stats.replaced_handlers,
            "Handler registry built"
        );

        Ok(registry)
    }

    pub fn register_plugin(&mut self, plugin: &Plugin) -> ActionResult<()> {
        for (action, handler) in plugin.actions() {
            self.register_provider_action(*action, plugin.name(), handler.clone())?;
        }
        for declaration in plugin.module_actions() {
            self.register_module_action(
                declaration.action,
                &declaration.module_type,
                plugin.name(),
                declaration.handler.clone(),
            )?;
        }
        Ok(())
    }

    pub fn register_provider_action(
        &mut self,
        action: ProviderAction,
        plugin_name: &str,
        handler: Arc<dyn ActionHandler>,
    ) -> ActionResult<()> {
        let kind = ActionKind::Provider(action);
        let wrapped = ValidatedHandler::new(kind, plugin_name, None, handler, self.schemas.get(kind)?);

        trace!(action = %action, plugin = plugin_name, "Registering provider handler");

        self.provider_handlers
            .entry(action)
            .or_default()
            .register(Arc::new(wrapped));
        Ok(())
    }

    pub fn register_module_action(
        &mut self,
        action: ModuleAction,
        module_type: &str,
        plugin_name: &str,
        handler: Arc<dyn ActionHandler>,
    ) -> ActionResult<()> {
        let kind = ActionKind::Module(action);
        let wrapped = ValidatedHandler::new(
            kind,
            plugin_name,
            Some(module_type.to_string()),
            handler,
            self.schemas.get(kind)?,
        );

        trace!(
            action = %action,
            module_type,
            plugin = plugin_name,
            "Registering module handler"
        );

        self.module_handlers
            .entry(action)
            .or_default()
            .entry(module_type.to_string())
            .or_default()
            .register(Arc::new(wrapped));
        Ok(())
    }

    /// Provider handlers for `action` in registration order. Empty when none.
    pub fn provider_handlers(&self, action: ProviderAction) -> &[Arc<ValidatedHandler>] {
        self.provider_handlers
            .get(&action)
            .map(HandlerChain::handlers)
            .unwrap_or(&[])
    }

    /// Module handlers for `(action, module_type)` in registration order. Empty when none.
    pub fn module_handlers(
        &self,
        action: ModuleAction,
        module_type: &str,
    ) -> &[Arc<ValidatedHandler>] {
        self.module_chain(action, module_type)
            .map(HandlerChain::handlers)
            .unwrap_or(&[])
    }

    /// The wrapped built-in default for `action`, tagged with the default provider.
    pub fn default_handler(&self, action: ActionKind) -> Option<Arc<ValidatedHandler>> {
        self.defaults.get(&action).cloned()
    }

    /// Module types with at least one handler for `action`.
    pub fn module_types(&self, action: ModuleAction) -> Vec<String> {
        let mut types: Vec<String> = self
            .module_handlers
            .get(&action)
            .map(|by_type| by_type.keys().cloned().collect())
            .unwrap_or_default();
        types.sort();
        types
    }

    /// Registration history for one key.
    pub fn override_chain(&self, action: ActionKind, module_type: Option<&str>) -> OverrideChain {
        let chain = match (action, module_type) {
            (ActionKind::Provider(action), _) => self.provider_handlers.get(&action),
            (ActionKind::Module(action), Some(module_type)) => self.module_chain(action, module_type),
            (ActionKind::Module(_), None) => None,
        };

        let names = |handlers: &[Arc<ValidatedHandler>]| -> Vec<String> {
            handlers.iter().map(|h| h.plugin_name().to_string()).collect()
        };

        OverrideChain {
            action,
            module_type: module_type.map(str::to_string),
            plugins: chain.map(|c| names(c.handlers())).unwrap_or_default(),
            replaced: chain.map(|c| names(c.replaced())).unwrap_or_default(),
            has_default: self.defaults.contains_key(&action),
        }
    }

    pub fn stats(&self) -> RegistryStats {
        let module_chains = || self.module_handlers.values().flat_map(HashMap::values);

        let mut module_types: Vec<&String> = self
            .module_handlers
            .values()
            .flat_map(HashMap::keys)
            .collect();
        module_types.sort();
        module_types.dedup();

        RegistryStats {
            provider_handlers: self.provider_handlers.values().map(HandlerChain::len).sum(),
            module_handlers: module_chains().map(HandlerChain::len).sum(),
            module_types: module_types.len(),
            replaced_handlers: self
                .provider_handlers
                .values()
                .chain(module_chains())
                .map(|chain| chain.replaced().len())
                .sum(),
            default_handlers: self.defaults.len(),
        }
    }

    fn module_chain(&self, action: ModuleAction, module_type: &str) -> Option<&HandlerChain> {
        self.module_handlers
            .get(&action)
            .and_then(|by_type| by_type.get(module_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::handler_fn;
    use proptest::prelude::*;
    use serde_json::Value;

    fn noop() -> Arc<dyn ActionHandler> {
        handler_fn(|_input| async { Ok(Some(Value::Null)) })
    }

    fn plugin_names(handlers: &[Arc<ValidatedHandler>]) -> Vec<&str> {
        handlers.iter().map(|h| h.plugin_name()).collect()
    }

    #[test]
    fn test_unregistered_keys_yield_empty_sets() {
        let registry = HandlerRegistry::new().unwrap();
        assert!(registry.provider_handlers(ProviderAction::GetSecret).is_empty());
        assert!(registry.module_handlers(ModuleAction::Build, "container").is_empty());
        assert!(registry.module_types(ModuleAction::Build).is_empty());
    }

    #[test]
    fn test_plugins_register_in_order() {
        let base = Plugin::builder("base")
            .action(ProviderAction::GetEnvironmentStatus, noop())
            .module_action("container", ModuleAction::Build, noop())
            .build();
        let over = Plugin::builder("override")
            .module_action("container", ModuleAction::Build, noop())
            .build();

        let registry = HandlerRegistry::from_plugins(&[base, over]).unwrap();

        let build = registry.module_handlers(ModuleAction::Build, "container");
        assert_eq!(plugin_names(build), vec!["base", "override"]);
        assert_eq!(build[1].module_type(), Some("container"));
        assert_eq!(
            plugin_names(registry.provider_handlers(ProviderAction::GetEnvironmentStatus)),
            vec!["base"]
        );

        let stats = registry.stats();
        assert_eq!(stats.provider_handlers, 1);
        assert_eq!(stats.module_handlers, 2);
        assert_eq!(stats.module_types, 1);
        assert_eq!(stats.replaced_handlers, 0);
    }

    #[test]
    fn test_reregistration_replaces_in_place() {
        let mut registry = HandlerRegistry::new().unwrap();
        registry
            .register_module_action(ModuleAction::Build, "container", "a", noop())
            .unwrap();
        registry
            .register_module_action(ModuleAction::Build, "container", "b", noop())
            .unwrap();
        registry
            .register_module_action(ModuleAction::Build, "container", "a", noop())
            .unwrap();

        let chain = registry.override_chain(ModuleAction::Build.into(), Some("container"));
        assert_eq!(chain.plugins, vec!["a", "b"]);
        assert_eq!(chain.replaced, vec!["a"]);
        assert_eq!(chain.effective_plugin(), Some("b"));
        assert!(!chain.has_default);
    }

    #[test]
    fn test_defaults_are_wrapped_under_default_provider() {
        let registry = HandlerRegistry::new().unwrap();

        let default = registry
            .default_handler(ModuleAction::GetTestResult.into())
            .unwrap();
        assert!(default.is_default());
        assert_eq!(default.plugin_name(), DEFAULT_PROVIDER_NAME);
        assert!(registry.default_handler(ModuleAction::Build.into()).is_none());

        let chain = registry.override_chain(ModuleAction::Publish.into(), Some("exec"));
        assert_eq!(chain.effective_plugin(), Some(DEFAULT_PROVIDER_NAME));
    }

    proptest! {
        #[test]
        fn prop_chain_tail_is_last_new_plugin(order in proptest::collection::vec(0usize..5, 1..20)) {
            let mut registry = HandlerRegistry::new().unwrap();
            let mut first_seen: Vec<String> = Vec::new();

            for index in &order {
                let name = format!("plugin-{index}");
                registry
                    .register_module_action(ModuleAction::DeployService, "container", &name, noop())
                    .unwrap();
                if !first_seen.contains(&name) {
                    first_seen.push(name);
                }
            }

            let handlers = registry.module_handlers(ModuleAction::DeployService, "container");
            let names: Vec<String> = handlers.iter().map(|h| h.plugin_name().to_string()).collect();
            prop_assert_eq!(&names, &first_seen);
            prop_assert_eq!(
                registry.override_chain(ModuleAction::DeployService.into(), Some("container")).replaced.len(),
                order.len() - first_seen.len()
            );
        }
    }
}
