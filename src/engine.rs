//! Engine stack assembly
//!
//! The ordered construction of everything the workflow-execution engine
//! needs to be reachable, durable and secured: identity, discovery
//! namespace, durable volume, engine and adapter services, API front door.
//! Each step consumes handles produced by the one before it, so the order
//! is fixed.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::ProvisionError;
use crate::naming::{api_name, namespace_name};
use crate::options::{EngineOptions, ServiceContainer};
use crate::render::{
    render_service_with_container, render_service_with_task_definition, SecureService,
};
use crate::resources::compute::{
    ContainerDefinition, ContainerImage, LogConfig, MountPoint, PortMapping, TaskDefinition,
    Volume,
};
use crate::resources::discovery::{DiscoveryOptions, PrivateDnsNamespace};
use crate::resources::filesystem::FileSystem;
use crate::resources::gateway::{ApiProxy, ApiProxyProps};
use crate::resources::identity::{Role, ServicePrincipal};
use crate::resources::logs::LogGroup;
use crate::resources::storage::Bucket;
use crate::stack::{Stack, Vpc};

/// Named volume the engine's executions live on
pub const EXECUTIONS_VOLUME: &str = "engine-executions";

/// In-container mount path of the executions volume
pub const EXECUTIONS_MOUNT_PATH: &str = "/engine-executions";

/// Externally consumed result of a successful assembly.
///
/// Constructed exactly once, after every dependent resource exists; never
/// mutated afterwards.
pub struct EngineOutputs {
    pub access_log_group: Arc<LogGroup>,
    pub adapter_log_group: Arc<LogGroup>,
    pub engine_log_group: Arc<LogGroup>,
    pub wes_url: String,
}

/// Fully assembled engine deployment
#[derive(Debug)]
pub struct EngineStack {
    stack: Stack,
    task_role: Arc<Role>,
    namespace: Arc<PrivateDnsNamespace>,
    file_system: Arc<FileSystem>,
    engine: SecureService,
    adapter: SecureService,
    engine_log_group: Arc<LogGroup>,
    adapter_log_group: Arc<LogGroup>,
    api_proxy: ApiProxy,
    output_bucket: Bucket,
}

impl EngineStack {
    /// Assemble the whole deployment.
    ///
    /// Any failure aborts the assembly; the caller retries from a clean
    /// slate, so nothing is rolled back here.
    pub fn new(id: &str, options: &EngineOptions) -> Result<Self, ProvisionError> {
        let stack = Stack::new(id, options.env.clone());
        let params = &options.params;
        let engine_container = params.engine_container(&options.job_queue_ref);

        let task_role = Role::new(
            &stack,
            "TaskRole",
            ServicePrincipal::compute_tasks(),
            &options.policy_options,
        )?;
        info!(stack = id, "created execution identity");

        let namespace = PrivateDnsNamespace::new(
            &stack,
            "EngineNamespace",
            namespace_name(&params.project_name, &params.context_name, &params.user_id),
            &options.vpc,
        )?;
        let discovery = DiscoveryOptions {
            name: engine_container.service_name.clone(),
            namespace: Arc::clone(&namespace),
        };

        let engine_log_group = LogGroup::new(&stack, "EngineLogGroup")?;
        let (engine, file_system) = Self::engine_service_definition(
            &stack,
            &options.vpc,
            &engine_container,
            &discovery,
            &engine_log_group,
            &task_role,
        )?;
        info!(stack = id, service = %engine_container.service_name, "rendered engine service");

        let adapter_log_group = LogGroup::new(&stack, "AdapterLogGroup")?;
        let adapter = render_service_with_container(
            &stack,
            "Adapter",
            &params.adapter_container(),
            &options.vpc,
            Arc::clone(&task_role),
            Arc::clone(&adapter_log_group),
        )?;
        info!(stack = id, "rendered adapter service");

        let mut allowed_account_ids = vec![stack.account().clone()];
        allowed_account_ids.extend(options.extra_allowed_accounts.iter().cloned());
        let api_proxy = ApiProxy::new(
            &stack,
            ApiProxyProps {
                api_name: api_name(
                    &params.project_name,
                    &params.context_name,
                    &engine_container.service_name,
                ),
                load_balancer: Some(Arc::clone(&adapter.load_balancer)),
                allowed_account_ids,
            },
        )?;
        info!(stack = id, url = api_proxy.url(), "created api front door");

        let output_bucket = Bucket::from_name(params.output_bucket_name.clone());
        output_bucket.grant_read_write(&task_role);

        Ok(Self {
            stack,
            task_role,
            namespace,
            file_system,
            engine,
            adapter,
            engine_log_group,
            adapter_log_group,
            api_proxy,
            output_bucket,
        })
    }

    /// The engine's running shape: durable volume, task definition sized to
    /// the container spec, one container with the volume mounted, rendered
    /// into a discoverable service that can reach the filesystem.
    fn engine_service_definition(
        stack: &Stack,
        vpc: &Vpc,
        service_container: &ServiceContainer,
        discovery: &DiscoveryOptions,
        log_group: &Arc<LogGroup>,
        task_role: &Arc<Role>,
    ) -> Result<(SecureService, Arc<FileSystem>), ProvisionError> {
        let id = "Engine";
        service_container.validate()?;

        let file_system = FileSystem::new(stack, "EngineFileSystem", vpc)?;

        let mut definition = TaskDefinition::new(
            stack,
            "EngineTaskDef",
            Arc::clone(task_role),
            service_container.cpu,
            service_container.memory_limit_mib,
        )?;
        definition.add_volume(Volume {
            name: EXECUTIONS_VOLUME.to_string(),
            file_system_id: file_system.file_system_id().to_string(),
        });

        let port_mappings = service_container
            .container_port
            .map(|port| vec![PortMapping { container_port: port }])
            .unwrap_or_default();
        let container = definition.add_container(ContainerDefinition::new(
            service_container.service_name.clone(),
            ContainerImage::from_designation(stack.env(), &service_container.image),
            service_container.cpu,
            service_container.memory_limit_mib,
            service_container.environment.clone(),
            LogConfig::new(Arc::clone(log_group), id),
            port_mappings,
        ));
        container.add_mount_points(MountPoint {
            container_path: EXECUTIONS_MOUNT_PATH.to_string(),
            read_only: false,
            source_volume: EXECUTIONS_VOLUME.to_string(),
        });

        let engine = render_service_with_task_definition(
            stack,
            id,
            service_container,
            definition,
            vpc,
            Some(discovery),
        )?;

        // Without this the engine's containers cannot reach the mount target
        file_system
            .connections()
            .allow_default_port_from(&engine.service);
        debug!(file_system = file_system.file_system_id(), "opened engine-to-filesystem path");

        Ok((engine, file_system))
    }

    /// Gather the externally consumed contract. Pure assembly over handles
    /// that already exist.
    pub fn outputs(&self) -> EngineOutputs {
        EngineOutputs {
            access_log_group: Arc::clone(self.api_proxy.access_log_group()),
            adapter_log_group: Arc::clone(&self.adapter_log_group),
            engine_log_group: Arc::clone(&self.engine_log_group),
            wes_url: self.api_proxy.url().to_string(),
        }
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn task_role(&self) -> &Arc<Role> {
        &self.task_role
    }

    pub fn namespace(&self) -> &Arc<PrivateDnsNamespace> {
        &self.namespace
    }

    pub fn file_system(&self) -> &Arc<FileSystem> {
        &self.file_system
    }

    pub fn engine(&self) -> &SecureService {
        &self.engine
    }

    pub fn adapter(&self) -> &SecureService {
        &self.adapter
    }

    pub fn engine_log_group(&self) -> &Arc<LogGroup> {
        &self.engine_log_group
    }

    pub fn adapter_log_group(&self) -> &Arc<LogGroup> {
        &self.adapter_log_group
    }

    pub fn api_proxy(&self) -> &ApiProxy {
        &self.api_proxy
    }

    pub fn output_bucket(&self) -> &Bucket {
        &self.output_bucket
    }
}
