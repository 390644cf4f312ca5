//! Compute definitions
//!
//! Declarative descriptions of runnable units: task definitions with their
//! volumes and containers. A task definition is inert until the service
//! renderer turns it into a running service.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::env::Environment;
use crate::error::ProvisionError;
use crate::options::ImageConfig;
use crate::resources::identity::Role;
use crate::resources::logs::LogGroup;
use crate::stack::{ResourceKind, Stack};
use crate::types::ServiceName;

/// Resolved container image reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerImage {
    uri: String,
}

impl ContainerImage {
    /// Resolve a logical designation against the deployment's private
    /// registry. The image itself is published by an external pipeline.
    pub fn from_designation(env: &Environment, config: &ImageConfig) -> Self {
        let tag = config.tag.as_deref().unwrap_or("latest");
        Self {
            uri: format!("{}/{}:{}", env.registry_host(), config.designation, tag),
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

/// Log routing for one container: a group plus a stream prefix derived from
/// the logical service name
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub log_group: Arc<LogGroup>,
    pub stream_prefix: String,
}

impl LogConfig {
    pub fn new(log_group: Arc<LogGroup>, stream_prefix: impl Into<String>) -> Self {
        Self {
            log_group,
            stream_prefix: stream_prefix.into(),
        }
    }
}

/// Declared container port opening
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortMapping {
    pub container_port: u16,
}

/// In-container bind of a named task volume
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPoint {
    pub container_path: String,
    pub read_only: bool,
    pub source_volume: String,
}

/// Named task volume backed by a filesystem id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    pub name: String,
    pub file_system_id: String,
}

/// One container inside a task definition
#[derive(Debug)]
pub struct ContainerDefinition {
    name: ServiceName,
    cpu: u32,
    memory_limit_mib: u32,
    environment: HashMap<String, String>,
    image: ContainerImage,
    logging: LogConfig,
    port_mappings: Vec<PortMapping>,
    mount_points: Vec<MountPoint>,
}

impl ContainerDefinition {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: ServiceName,
        image: ContainerImage,
        cpu: u32,
        memory_limit_mib: u32,
        environment: HashMap<String, String>,
        logging: LogConfig,
        port_mappings: Vec<PortMapping>,
    ) -> Self {
        Self {
            name,
            cpu,
            memory_limit_mib,
            environment,
            image,
            logging,
            port_mappings,
            mount_points: Vec::new(),
        }
    }

    /// Bind a named task volume at a path inside the container
    pub fn add_mount_points(&mut self, mount_point: MountPoint) {
        self.mount_points.push(mount_point);
    }

    pub fn name(&self) -> &ServiceName {
        &self.name
    }

    pub fn cpu(&self) -> u32 {
        self.cpu
    }

    pub fn memory_limit_mib(&self) -> u32 {
        self.memory_limit_mib
    }

    pub fn environment(&self) -> &HashMap<String, String> {
        &self.environment
    }

    pub fn image(&self) -> &ContainerImage {
        &self.image
    }

    pub fn logging(&self) -> &LogConfig {
        &self.logging
    }

    pub fn port_mappings(&self) -> &[PortMapping] {
        &self.port_mappings
    }

    pub fn mount_points(&self) -> &[MountPoint] {
        &self.mount_points
    }
}

/// Declarative description of a runnable unit: resource limits, containers,
/// volumes and the identity its containers assume
#[derive(Debug)]
pub struct TaskDefinition {
    logical_id: String,
    cpu: u32,
    memory_limit_mib: u32,
    task_role: Arc<Role>,
    volumes: Vec<Volume>,
    containers: Vec<ContainerDefinition>,
}

impl TaskDefinition {
    pub fn new(
        stack: &Stack,
        logical_id: &str,
        task_role: Arc<Role>,
        cpu: u32,
        memory_limit_mib: u32,
    ) -> Result<Self, ProvisionError> {
        stack.register(ResourceKind::TaskDefinition, logical_id)?;
        debug!(logical_id, cpu, memory_limit_mib, "created task definition");
        Ok(Self {
            logical_id: logical_id.to_string(),
            cpu,
            memory_limit_mib,
            task_role,
            volumes: Vec::new(),
            containers: Vec::new(),
        })
    }

    /// Register a named volume on the definition
    pub fn add_volume(&mut self, volume: Volume) {
        self.volumes.push(volume);
    }

    /// Add a container and hand back its handle for mount-point wiring
    pub fn add_container(&mut self, container: ContainerDefinition) -> &mut ContainerDefinition {
        self.containers.push(container);
        match self.containers.last_mut() {
            Some(container) => container,
            None => unreachable!("container just pushed"),
        }
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn cpu(&self) -> u32 {
        self.cpu
    }

    pub fn memory_limit_mib(&self) -> u32 {
        self.memory_limit_mib
    }

    pub fn task_role(&self) -> &Arc<Role> {
        &self.task_role
    }

    pub fn volumes(&self) -> &[Volume] {
        &self.volumes
    }

    pub fn containers(&self) -> &[ContainerDefinition] {
        &self.containers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;
    use crate::options::PolicyOptions;
    use crate::resources::identity::ServicePrincipal;

    fn test_stack() -> Stack {
        let env = Environment::new("123456789012", "eu-west-1").unwrap();
        Stack::new("demo", env)
    }

    fn test_role(stack: &Stack) -> Arc<Role> {
        Role::new(
            stack,
            "TaskRole",
            ServicePrincipal::compute_tasks(),
            &PolicyOptions::default(),
        )
        .unwrap()
    }

    fn test_container(stack: &Stack, port_mappings: Vec<PortMapping>) -> ContainerDefinition {
        let image = ContainerImage::from_designation(
            stack.env(),
            &ImageConfig {
                designation: "workflow-engine".into(),
                tag: None,
            },
        );
        let log_group = LogGroup::new(stack, "TestLogGroup").unwrap();
        ContainerDefinition::new(
            ServiceName::new("engine").unwrap(),
            image,
            512,
            1024,
            HashMap::new(),
            LogConfig::new(log_group, "Engine"),
            port_mappings,
        )
    }

    #[test]
    fn test_image_resolution_uses_registry_host() {
        let env = Environment::new("123456789012", "eu-west-1").unwrap();
        let image = ContainerImage::from_designation(
            &env,
            &ImageConfig {
                designation: "wes-adapter".into(),
                tag: Some("v2".into()),
            },
        );
        assert_eq!(
            image.uri(),
            "123456789012.registry.eu-west-1.cloud.internal/wes-adapter:v2"
        );
    }

    #[test]
    fn test_untagged_designation_defaults_to_latest() {
        let env = Environment::new("123456789012", "eu-west-1").unwrap();
        let image = ContainerImage::from_designation(
            &env,
            &ImageConfig {
                designation: "workflow-engine".into(),
                tag: None,
            },
        );
        assert!(image.uri().ends_with("workflow-engine:latest"));
    }

    #[test]
    fn test_mount_points_attach_to_added_container() {
        let stack = test_stack();
        let role = test_role(&stack);
        let mut definition = TaskDefinition::new(&stack, "EngineTaskDef", role, 512, 1024).unwrap();
        definition.add_volume(Volume {
            name: "engine-executions".into(),
            file_system_id: "fs-abc".into(),
        });

        let container = definition.add_container(test_container(&stack, Vec::new()));
        container.add_mount_points(MountPoint {
            container_path: "/engine-executions".into(),
            read_only: false,
            source_volume: "engine-executions".into(),
        });

        assert_eq!(definition.volumes().len(), 1);
        assert_eq!(definition.containers().len(), 1);
        let mounts = definition.containers()[0].mount_points();
        assert_eq!(mounts.len(), 1);
        assert!(!mounts[0].read_only);
        assert_eq!(mounts[0].source_volume, "engine-executions");
    }

    #[test]
    fn test_no_port_mapping_without_declared_port() {
        let stack = test_stack();
        let container = test_container(&stack, Vec::new());
        assert!(container.port_mappings().is_empty());
    }
}
