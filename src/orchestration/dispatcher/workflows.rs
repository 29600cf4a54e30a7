//! Composite workflows.
//!
//! Fan-outs run their branches concurrently and join on all of them. Results
//! are keyed by entity name. The first failing branch fails the whole call and
//! no partial map is returned.

use super::ActionDispatcher;
use crate::actions::ProviderAction;
use crate::error::{ActionError, ActionResult};
use crate::logging::{EntryOptions, EntryStatus, LogEntry};
use crate::models::{
    AllEnvironmentStatus, BuildModuleParams, CleanupEnvironmentParams, DebugInfo, DebugInfoMap,
    DeleteServiceParams, DeployServiceParams, EnvironmentStatusMap, EnvironmentTeardown,
    GetBuildStatusParams, GetDebugInfoParams, GetEnvironmentStatusParams, GetServiceStatusParams,
    Module, RuntimeContext, Service, ServiceStatus, ServiceStatusMap,
};
use crate::orchestration::context::ActionTarget;
use crate::orchestration::requests::{DeployServicesRequest, ModuleRequest, ProviderRequest, ServiceRequest};
use futures::future::try_join_all;
use tracing::{debug, info, instrument};

impl ActionDispatcher {
    async fn services(&self, names: Option<&[String]>) -> ActionResult<Vec<Service>> {
        self.collaborators
            .graph
            .get_services(names)
            .await
            .map_err(|e| ActionError::collaborator("get services", e))
    }

    async fn runtime_context(&self, service: &Service) -> ActionResult<RuntimeContext> {
        self.collaborators
            .runtime
            .runtime_context(service)
            .await
            .map_err(|e| ActionError::collaborator(format!("runtime context for '{}'", service.name), e))
    }

    /// Provider and service statuses for the whole environment.
    #[instrument(skip(self, log))]
    pub async fn get_status(&self, log: &LogEntry) -> ActionResult<AllEnvironmentStatus> {
        let (providers, services) = futures::try_join!(
            self.get_environment_statuses(log),
            self.get_service_statuses(log, None)
        )?;

        Ok(AllEnvironmentStatus { providers, services })
    }

    /// `getEnvironmentStatus` for every configured provider.
    #[instrument(skip(self, log))]
    pub async fn get_environment_statuses(&self, log: &LogEntry) -> ActionResult<EnvironmentStatusMap> {
        let providers = self
            .collaborators
            .providers
            .resolve_providers()
            .await
            .map_err(|e| ActionError::collaborator("resolve providers", e))?;

        let statuses = try_join_all(providers.iter().map(|provider| async move {
            let status = self
                .get_environment_status(ProviderRequest::new(
                    provider.name.clone(),
                    log.clone(),
                    GetEnvironmentStatusParams {},
                ))
                .await?;
            Ok::<_, ActionError>((provider.name.clone(), status))
        }))
        .await?;

        Ok(statuses.into_iter().collect())
    }

    /// Status of every service, or of the named ones.
    ///
    /// Each branch syncs the module's build staging area before querying.
    #[instrument(skip(self, log))]
    pub async fn get_service_statuses(
        &self,
        log: &LogEntry,
        names: Option<&[String]>,
    ) -> ActionResult<ServiceStatusMap> {
        let services = self.services(names).await?;

        let statuses = try_join_all(services.iter().map(|service| async move {
            let runtime_context = self.runtime_context(service).await?;

            let stager = &self.collaborators.build_stager;
            stager
                .sync_from_src(&service.module, log)
                .await
                .map_err(|e| ActionError::collaborator(format!("sync sources of '{}'", service.module.name), e))?;
            stager
                .sync_dependency_products(&service.module, log)
                .await
                .map_err(|e| {
                    ActionError::collaborator(
                        format!("sync dependency products of '{}'", service.module.name),
                        e,
                    )
                })?;

            let status = self
                .get_service_status(
                    ServiceRequest::new(service.clone(), log.clone(), GetServiceStatusParams { hot_reload: false })
                        .with_runtime_context(runtime_context),
                )
                .await?;
            Ok::<_, ActionError>((service.name.clone(), status))
        }))
        .await?;

        Ok(statuses.into_iter().collect())
    }

    /// Build (when needed) and deploy every selected service.
    ///
    /// Each distinct module is checked and built once, even when several of the
    /// selected services belong to it. Deploys start after every build has finished.
    #[instrument(skip(self, request), fields(force = request.force, force_build = request.force_build))]
    pub async fn deploy_services(&self, request: DeployServicesRequest) -> ActionResult<ServiceStatusMap> {
        let services = self.services(request.service_names.as_deref()).await?;
        let request = &request;
        let log = &request.log;

        let mut modules: Vec<&Module> = Vec::new();
        for service in &services {
            if !modules.iter().any(|module| module.name == service.module.name) {
                modules.push(&service.module);
            }
        }
        info!(services = services.len(), modules = modules.len(), "Deploying services");

        try_join_all(
            modules
                .iter()
                .map(|module| self.ensure_built(module, log, request.force_build)),
        )
        .await?;

        let statuses = try_join_all(services.iter().map(|service| async move {
            let entry = log.info(
                EntryOptions::new()
                    .section(service.name.clone())
                    .msg("Deploying...")
                    .status(EntryStatus::Active),
            );
            let status = self.deploy_one(service, &entry, request.force).await?;
            entry.set_success();
            Ok::<_, ActionError>((service.name.clone(), status))
        }))
        .await?;

        Ok(statuses.into_iter().collect())
    }

    async fn ensure_built(&self, module: &Module, log: &LogEntry, force_build: bool) -> ActionResult<()> {
        let build_status = self
            .get_build_status(ModuleRequest::new(module.clone(), log.clone(), GetBuildStatusParams {}))
            .await?;

        if force_build || !build_status.ready {
            debug!(module = %module.name, ready = build_status.ready, "Building module before deploy");
            let entry = log.info(
                EntryOptions::new()
                    .section(module.name.clone())
                    .msg("Building...")
                    .status(EntryStatus::Active),
            );
            self.build(ModuleRequest::new(module.clone(), entry.clone(), BuildModuleParams {}))
                .await?;
            entry.set_success();
        }
        Ok(())
    }

    async fn deploy_one(&self, service: &Service, log: &LogEntry, force: bool) -> ActionResult<ServiceStatus> {
        let runtime_context = self.runtime_context(service).await?;

        self.deploy_service(
            ServiceRequest::new(
                service.clone(),
                log.clone(),
                DeployServiceParams {
                    force,
                    hot_reload: false,
                },
            )
            .with_runtime_context(runtime_context),
        )
        .await
    }

    /// Tear down the environment.
    ///
    /// Every service is deleted first. Provider cleanup starts only after all
    /// deletions have settled; each provider is cleaned up and then re-queried.
    #[instrument(skip(self, log))]
    pub async fn delete_environment(&self, log: &LogEntry) -> ActionResult<EnvironmentTeardown> {
        let services = self.services(None).await?;

        let services_log = log.info(
            EntryOptions::new()
                .section("services")
                .msg("Deleting services...")
                .status(EntryStatus::Active),
        );
        info!(services = services.len(), "Deleting services");

        let deleted = try_join_all(services.iter().map(|service| {
            let services_log = services_log.clone();
            async move {
                let runtime_context = self.runtime_context(service).await?;
                let status = self
                    .delete_service(
                        ServiceRequest::new(service.clone(), services_log, DeleteServiceParams {})
                            .with_runtime_context(runtime_context),
                    )
                    .await?;
                Ok::<_, ActionError>((service.name.clone(), status))
            }
        }))
        .await?;
        let service_statuses: ServiceStatusMap = deleted.into_iter().collect();
        services_log.set_success();

        let providers = self
            .collaborators
            .providers
            .resolve_providers()
            .await
            .map_err(|e| ActionError::collaborator("resolve providers", e))?;

        let providers_log = log.info(
            EntryOptions::new()
                .section("providers")
                .msg("Cleaning up environments...")
                .status(EntryStatus::Active),
        );
        info!(providers = providers.len(), "Cleaning up providers");

        let cleaned = try_join_all(providers.iter().map(|provider| {
            let providers_log = providers_log.clone();
            async move {
                self.cleanup_environment(ProviderRequest::new(
                    provider.name.clone(),
                    providers_log.clone(),
                    CleanupEnvironmentParams {},
                ))
                .await?;
                let status = self
                    .get_environment_status(ProviderRequest::new(
                        provider.name.clone(),
                        providers_log,
                        GetEnvironmentStatusParams {},
                    ))
                    .await?;
                Ok::<_, ActionError>((provider.name.clone(), status))
            }
        }))
        .await?;
        providers_log.set_success();

        Ok(EnvironmentTeardown {
            service_statuses,
            environment_statuses: cleaned.into_iter().collect(),
        })
    }

    /// `getDebugInfo` from every plugin that implements it.
    #[instrument(skip(self, log))]
    pub async fn get_debug_info(&self, log: &LogEntry) -> ActionResult<DebugInfoMap> {
        let handlers = self.registry.provider_handlers(ProviderAction::GetDebugInfo);

        let infos = try_join_all(handlers.iter().map(|handler| async move {
            let info: DebugInfo = self
                .dispatch(handler.clone(), log, ActionTarget::Environment, GetDebugInfoParams {})
                .await?;
            Ok::<_, ActionError>((handler.plugin_name().to_string(), info))
        }))
        .await?;

        Ok(infos.into_iter().collect())
    }
}
