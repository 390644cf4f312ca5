//! Service rendering
//!
//! Turns a compute definition into a continuously running, discoverable,
//! load-balanced service. Two entry points share the contract: one wraps a
//! caller-built task definition (custom volumes and mounts), the other
//! builds the definition from a plain container spec first.

use std::sync::Arc;

use tracing::debug;

use crate::error::ProvisionError;
use crate::options::ServiceContainer;
use crate::resources::compute::{
    ContainerDefinition, ContainerImage, LogConfig, PortMapping, TaskDefinition,
};
use crate::resources::discovery::DiscoveryOptions;
use crate::resources::identity::Role;
use crate::resources::logs::LogGroup;
use crate::stack::{ResourceKind, Stack, Vpc};
use crate::types::ServiceName;

/// Internal load balancer fronting one service
#[derive(Debug)]
pub struct LoadBalancer {
    logical_id: String,
    dns_name: String,
}

impl LoadBalancer {
    pub fn new(stack: &Stack, logical_id: &str, vpc: &Vpc) -> Result<Arc<Self>, ProvisionError> {
        stack.register(ResourceKind::LoadBalancer, logical_id)?;
        let dns_name = format!(
            "{}.lb.{}.cloud.internal",
            crate::naming::host_slug(logical_id),
            stack.env().region
        );
        debug!(logical_id, %dns_name, vpc = vpc.id(), "created load balancer");
        Ok(Arc::new(Self {
            logical_id: logical_id.to_string(),
            dns_name,
        }))
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn dns_name(&self) -> &str {
        &self.dns_name
    }
}

/// Running service instance backed by a task definition
#[derive(Debug)]
pub struct Service {
    logical_id: String,
    name: ServiceName,
    task_definition: TaskDefinition,
    discovery_name: Option<String>,
}

impl Service {
    fn new(
        stack: &Stack,
        logical_id: &str,
        name: ServiceName,
        task_definition: TaskDefinition,
        discovery_name: Option<String>,
    ) -> Result<Arc<Self>, ProvisionError> {
        stack.register(ResourceKind::Service, logical_id)?;
        debug!(logical_id, service = %name, discovery = ?discovery_name, "created service");
        Ok(Arc::new(Self {
            logical_id: logical_id.to_string(),
            name,
            task_definition,
            discovery_name,
        }))
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn name(&self) -> &ServiceName {
        &self.name
    }

    pub fn task_definition(&self) -> &TaskDefinition {
        &self.task_definition
    }

    /// Fully qualified discovery name, if the service was registered
    pub fn discovery_name(&self) -> Option<&str> {
        self.discovery_name.as_deref()
    }
}

/// Rendered service: the running service plus the load balancer in front of
/// it. Produced once, read-only thereafter; the load balancer is always
/// present and ready to receive traffic when rendering returns.
#[derive(Debug)]
pub struct SecureService {
    pub load_balancer: Arc<LoadBalancer>,
    pub service: Arc<Service>,
}

/// Wrap a caller-built task definition into a discoverable, load-balanced
/// running service.
pub fn render_service_with_task_definition(
    stack: &Stack,
    id: &str,
    container_spec: &ServiceContainer,
    definition: TaskDefinition,
    vpc: &Vpc,
    discovery: Option<&DiscoveryOptions>,
) -> Result<SecureService, ProvisionError> {
    container_spec.validate()?;

    let load_balancer = LoadBalancer::new(stack, &format!("{id}LoadBalancer"), vpc)?;
    let service = Service::new(
        stack,
        id,
        container_spec.service_name.clone(),
        definition,
        discovery.map(DiscoveryOptions::qualified_name),
    )?;

    Ok(SecureService {
        load_balancer,
        service,
    })
}

/// Build the compute definition, container and logging configuration from a
/// plain container spec, then wrap it the same way.
pub fn render_service_with_container(
    stack: &Stack,
    id: &str,
    container_spec: &ServiceContainer,
    vpc: &Vpc,
    task_role: Arc<Role>,
    log_group: Arc<LogGroup>,
) -> Result<SecureService, ProvisionError> {
    container_spec.validate()?;

    let mut definition = TaskDefinition::new(
        stack,
        &format!("{id}TaskDef"),
        task_role,
        container_spec.cpu,
        container_spec.memory_limit_mib,
    )?;

    let port_mappings = container_spec
        .container_port
        .map(|port| vec![PortMapping { container_port: port }])
        .unwrap_or_default();
    definition.add_container(ContainerDefinition::new(
        container_spec.service_name.clone(),
        ContainerImage::from_designation(stack.env(), &container_spec.image),
        container_spec.cpu,
        container_spec.memory_limit_mib,
        container_spec.environment.clone(),
        LogConfig::new(log_group, id),
        port_mappings,
    ));

    render_service_with_task_definition(stack, id, container_spec, definition, vpc, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;
    use crate::options::{ImageConfig, PolicyOptions};
    use crate::resources::identity::ServicePrincipal;
    use std::collections::HashMap;

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

    fn adapter_spec(port: Option<u16>) -> ServiceContainer {
        ServiceContainer {
            service_name: ServiceName::new("adapter").unwrap(),
            cpu: 256,
            memory_limit_mib: 512,
            environment: HashMap::from([("ENGINE_NAME".into(), "engine".into())]),
            container_port: port,
            image: ImageConfig {
                designation: "wes-adapter".into(),
                tag: None,
            },
        }
    }

    #[test]
    fn test_render_with_container_builds_definition_and_wrapping() {
        let stack = test_stack();
        let vpc = Vpc::from_id("vpc-1");
        let role = test_role(&stack);
        let log_group = LogGroup::new(&stack, "AdapterLogGroup").unwrap();

        let rendered = render_service_with_container(
            &stack,
            "Adapter",
            &adapter_spec(None),
            &vpc,
            role,
            log_group,
        )
        .unwrap();

        assert_eq!(rendered.service.name().as_str(), "adapter");
        assert_eq!(rendered.load_balancer.logical_id(), "AdapterLoadBalancer");
        assert_eq!(stack.count_of(ResourceKind::TaskDefinition), 1);
        assert_eq!(stack.count_of(ResourceKind::LoadBalancer), 1);
        assert_eq!(stack.count_of(ResourceKind::Service), 1);

        let definition = rendered.service.task_definition();
        assert_eq!(definition.containers().len(), 1);
        let container = &definition.containers()[0];
        assert!(container.port_mappings().is_empty());
        assert_eq!(container.logging().stream_prefix, "Adapter");
        assert_eq!(
            container.environment().get("ENGINE_NAME"),
            Some(&"engine".to_string())
        );
    }

    #[test]
    fn test_declared_port_yields_exactly_one_mapping() {
        let stack = test_stack();
        let vpc = Vpc::from_id("vpc-1");
        let role = test_role(&stack);
        let log_group = LogGroup::new(&stack, "AdapterLogGroup").unwrap();

        let rendered = render_service_with_container(
            &stack,
            "Adapter",
            &adapter_spec(Some(9000)),
            &vpc,
            role,
            log_group,
        )
        .unwrap();

        let container = &rendered.service.task_definition().containers()[0];
        assert_eq!(container.port_mappings().len(), 1);
        assert_eq!(container.port_mappings()[0].container_port, 9000);
    }

    #[test]
    fn test_zero_cpu_spec_is_rejected_before_rendering() {
        let stack = test_stack();
        let vpc = Vpc::from_id("vpc-1");
        let role = test_role(&stack);
        let log_group = LogGroup::new(&stack, "AdapterLogGroup").unwrap();

        let mut spec = adapter_spec(None);
        spec.cpu = 0;
        let err =
            render_service_with_container(&stack, "Adapter", &spec, &vpc, role, log_group)
                .unwrap_err();

        assert!(matches!(err, ProvisionError::ZeroResource { .. }));
        // Only the role and log group exist; rendering created nothing
        assert_eq!(stack.count_of(ResourceKind::TaskDefinition), 0);
        assert_eq!(stack.count_of(ResourceKind::Service), 0);
    }
}
