use super::ActionDispatcher;
use crate::actions::{ActionScope, ModuleAction};
use crate::error::ActionResult;
use crate::logging::{EntryOptions, EntryStatus, LogEntry};
use crate::models::{
    ActionParams, BuildModuleParams, BuildResult, BuildStatus, DeleteServiceParams,
    DescribeTypeParams, DeployServiceParams, ExecInServiceParams, ExecInServiceResult,
    GetBuildStatusParams, GetServiceLogsParams, GetServiceLogsResult, GetServiceStatusParams,
    GetTaskResultParams, GetTestResultParams, HotReloadServiceParams, HotReloadServiceResult,
    ModuleTypeDescription, PublishModuleParams, PublishResult, RunModuleParams, RunResult,
    RunServiceParams, RunTaskParams, RunTaskResult, ServiceStatus, TestModuleParams, TestResult,
};
use crate::orchestration::context::ActionTarget;
use crate::orchestration::requests::{ModuleRequest, ServiceRequest, TaskRequest};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

impl ActionDispatcher {
    async fn call_module<T: DeserializeOwned>(
        &self,
        action: ModuleAction,
        module_type: &str,
        plugin_name: Option<&str>,
        log: &LogEntry,
        target: ActionTarget,
        params: impl Into<ActionParams>,
    ) -> ActionResult<T> {
        let handler = self
            .resolver
            .resolve_module_action(action, module_type, plugin_name)
            .await?;
        self.dispatch(handler, log, target, params).await
    }

    async fn call_module_request<T: DeserializeOwned, P: Into<ActionParams>>(
        &self,
        action: ModuleAction,
        request: ModuleRequest<P>,
    ) -> ActionResult<T> {
        debug_assert_eq!(action.scope(), ActionScope::Module, "{action} is not a module action");
        let target = ActionTarget::module(&request.module);
        self.call_module(
            action,
            &request.module.module_type,
            request.plugin_name.as_deref(),
            &request.log,
            target,
            request.params,
        )
        .await
    }

    async fn call_service<T: DeserializeOwned, P: Into<ActionParams>>(
        &self,
        action: ModuleAction,
        request: ServiceRequest<P>,
    ) -> ActionResult<T> {
        debug_assert_eq!(action.scope(), ActionScope::Service, "{action} is not a service action");
        let target = ActionTarget::service(&request.service, request.runtime_context);
        self.call_module(
            action,
            &request.service.module.module_type,
            request.plugin_name.as_deref(),
            &request.log,
            target,
            request.params,
        )
        .await
    }

    async fn call_task<T: DeserializeOwned, P: Into<ActionParams>>(
        &self,
        action: ModuleAction,
        request: TaskRequest<P>,
    ) -> ActionResult<T> {
        debug_assert_eq!(action.scope(), ActionScope::Task, "{action} is not a task action");
        let target = ActionTarget::task(&request.task, request.runtime_context);
        self.call_module(
            action,
            &request.task.module.module_type,
            request.plugin_name.as_deref(),
            &request.log,
            target,
            request.params,
        )
        .await
    }

    /// Documentation and config schema for a module type.
    #[instrument(skip(self, log))]
    pub async fn describe_type(
        &self,
        module_type: &str,
        log: &LogEntry,
    ) -> ActionResult<ModuleTypeDescription> {
        self.call_module(
            ModuleAction::DescribeType,
            module_type,
            None,
            log,
            ActionTarget::ModuleType(module_type.to_string()),
            DescribeTypeParams {},
        )
        .await
    }

    #[instrument(skip(self, request), fields(module = %request.module.name))]
    pub async fn get_build_status(
        &self,
        request: ModuleRequest<GetBuildStatusParams>,
    ) -> ActionResult<BuildStatus> {
        self.call_module_request(ModuleAction::GetBuildStatus, request)
            .await
    }

    #[instrument(skip(self, request), fields(module = %request.module.name))]
    pub async fn build(&self, request: ModuleRequest<BuildModuleParams>) -> ActionResult<BuildResult> {
        self.call_module_request(ModuleAction::Build, request).await
    }

    #[instrument(skip(self, request), fields(module = %request.module.name))]
    pub async fn publish_module(
        &self,
        request: ModuleRequest<PublishModuleParams>,
    ) -> ActionResult<PublishResult> {
        self.call_module_request(ModuleAction::Publish, request).await
    }

    #[instrument(skip(self, request), fields(module = %request.module.name))]
    pub async fn run_module(&self, request: ModuleRequest<RunModuleParams>) -> ActionResult<RunResult> {
        self.call_module_request(ModuleAction::RunModule, request).await
    }

    #[instrument(skip(self, request), fields(module = %request.module.name, test = %request.params.test_config.name))]
    pub async fn test_module(
        &self,
        request: ModuleRequest<TestModuleParams>,
    ) -> ActionResult<TestResult> {
        self.call_module_request(ModuleAction::TestModule, request)
            .await
    }

    /// Result of an earlier test run; `None` when there is none.
    #[instrument(skip(self, request), fields(module = %request.module.name, test = %request.params.test_name))]
    pub async fn get_test_result(
        &self,
        request: ModuleRequest<GetTestResultParams>,
    ) -> ActionResult<Option<TestResult>> {
        self.call_module_request(ModuleAction::GetTestResult, request)
            .await
    }

    #[instrument(skip(self, request), fields(service = %request.service.name))]
    pub async fn get_service_status(
        &self,
        request: ServiceRequest<GetServiceStatusParams>,
    ) -> ActionResult<ServiceStatus> {
        self.call_service(ModuleAction::GetServiceStatus, request)
            .await
    }

    #[instrument(skip(self, request), fields(service = %request.service.name, force = request.params.force))]
    pub async fn deploy_service(
        &self,
        request: ServiceRequest<DeployServiceParams>,
    ) -> ActionResult<ServiceStatus> {
        self.call_service(ModuleAction::DeployService, request).await
    }

    #[instrument(skip(self, request), fields(service = %request.service.name))]
    pub async fn hot_reload_service(
        &self,
        request: ServiceRequest<HotReloadServiceParams>,
    ) -> ActionResult<HotReloadServiceResult> {
        self.call_service(ModuleAction::HotReloadService, request)
            .await
    }

    /// Delete a service.
    ///
    /// The current status is queried first. A service that is already missing
    /// is returned as-is without calling the delete handler.
    #[instrument(skip(self, request), fields(service = %request.service.name))]
    pub async fn delete_service(
        &self,
        request: ServiceRequest<DeleteServiceParams>,
    ) -> ActionResult<ServiceStatus> {
        let log = request.log.info(
            EntryOptions::new()
                .section(request.service.name.clone())
                .msg("Deleting...")
                .status(EntryStatus::Active),
        );

        let status = self
            .get_service_status(request.derive(log.clone(), GetServiceStatusParams { hot_reload: false }))
            .await?;

        if status.is_missing() {
            debug!(service = %request.service.name, "Service not found, nothing to delete");
            log.set_success_with(
                EntryOptions::new()
                    .section(request.service.name.clone())
                    .msg("Not found"),
            );
            return Ok(status);
        }

        let params = request.params.clone();
        let result = self
            .call_service(ModuleAction::DeleteService, request.derive(log.clone(), params))
            .await?;

        if !log.is_error() {
            log.set_success();
        }
        Ok(result)
    }

    #[instrument(skip(self, request), fields(service = %request.service.name))]
    pub async fn exec_in_service(
        &self,
        request: ServiceRequest<ExecInServiceParams>,
    ) -> ActionResult<ExecInServiceResult> {
        self.call_service(ModuleAction::ExecInService, request).await
    }

    /// Stream service logs into the channel carried by the parameters.
    #[instrument(skip(self, request), fields(service = %request.service.name, follow = request.params.follow))]
    pub async fn get_service_logs(
        &self,
        request: ServiceRequest<GetServiceLogsParams>,
    ) -> ActionResult<GetServiceLogsResult> {
        self.call_service(ModuleAction::GetServiceLogs, request).await
    }

    #[instrument(skip(self, request), fields(service = %request.service.name))]
    pub async fn run_service(&self, request: ServiceRequest<RunServiceParams>) -> ActionResult<RunResult> {
        self.call_service(ModuleAction::RunService, request).await
    }

    #[instrument(skip(self, request), fields(task = %request.task.key()))]
    pub async fn run_task(&self, request: TaskRequest<RunTaskParams>) -> ActionResult<RunTaskResult> {
        self.call_task(ModuleAction::RunTask, request).await
    }

    /// Result of an earlier task run; `None` when there is none.
    #[instrument(skip(self, request), fields(task = %request.task.key()))]
    pub async fn get_task_result(
        &self,
        request: TaskRequest<GetTaskResultParams>,
    ) -> ActionResult<Option<RunTaskResult>> {
        self.call_task(ModuleAction::GetTaskResult, request).await
    }
}
