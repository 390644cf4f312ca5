//! Builder patterns for ergonomic stack configuration
//!
//! Fluent APIs for assembling container specs and engine options in code,
//! with fail-fast validation at `build()`.

use std::collections::HashMap;

use crate::env::Environment;
use crate::options::{
    ContextParams, EngineOptions, ImageConfig, PolicyOptions, ServiceContainer,
};
use crate::stack::Vpc;
use crate::types::{AccountId, ServiceName};

// ============================================================================
// SERVICE CONTAINER BUILDER
// ============================================================================

/// Fluent builder for a logical container spec
pub struct ServiceContainerBuilder {
    service_name: Option<ServiceName>,
    cpu: Option<u32>,
    memory_limit_mib: Option<u32>,
    environment: HashMap<String, String>,
    container_port: Option<u16>,
    designation: Option<String>,
    tag: Option<String>,
}

impl ServiceContainerBuilder {
    pub fn new() -> Self {
        Self {
            service_name: None,
            cpu: None,
            memory_limit_mib: None,
            environment: HashMap::new(),
            container_port: None,
            designation: None,
            tag: None,
        }
    }

    /// Set the logical service name
    pub fn service_name(mut self, name: &str) -> Result<Self, BuilderError> {
        self.service_name = Some(
            ServiceName::new(name).map_err(|e| BuilderError::InvalidName(e.to_string()))?,
        );
        Ok(self)
    }

    /// Set CPU units
    pub fn cpu(mut self, cpu: u32) -> Self {
        self.cpu = Some(cpu);
        self
    }

    /// Set the memory limit in MiB
    pub fn memory_limit_mib(mut self, memory: u32) -> Self {
        self.memory_limit_mib = Some(memory);
        self
    }

    /// Add one environment entry
    pub fn env_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    /// Declare the container port
    pub fn container_port(mut self, port: u16) -> Self {
        self.container_port = Some(port);
        self
    }

    /// Set the image designation
    pub fn image(mut self, designation: impl Into<String>) -> Self {
        self.designation = Some(designation.into());
        self
    }

    /// Pin the image tag
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Build the container spec
    pub fn build(self) -> Result<ServiceContainer, BuilderError> {
        let service_name = self
            .service_name
            .ok_or(BuilderError::MissingField("serviceName".into()))?;
        let cpu = self.cpu.ok_or(BuilderError::MissingField("cpu".into()))?;
        let memory_limit_mib = self
            .memory_limit_mib
            .ok_or(BuilderError::MissingField("memoryLimitMiB".into()))?;
        let designation = self
            .designation
            .ok_or(BuilderError::MissingField("image.designation".into()))?;

        Ok(ServiceContainer {
            service_name,
            cpu,
            memory_limit_mib,
            environment: self.environment,
            container_port: self.container_port,
            image: ImageConfig {
                designation,
                tag: self.tag,
            },
        })
    }
}

impl Default for ServiceContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// ENGINE OPTIONS BUILDER
// ============================================================================

/// Fluent builder for the assembler's input options
pub struct EngineOptionsBuilder {
    env: Option<Environment>,
    vpc: Option<Vpc>,
    job_queue_ref: Option<String>,
    params: Option<ContextParams>,
    policy_options: PolicyOptions,
    extra_allowed_accounts: Vec<AccountId>,
}

impl EngineOptionsBuilder {
    pub fn new() -> Self {
        Self {
            env: None,
            vpc: None,
            job_queue_ref: None,
            params: None,
            policy_options: PolicyOptions::default(),
            extra_allowed_accounts: Vec::new(),
        }
    }

    /// Set the deployment environment
    pub fn env(mut self, env: Environment) -> Self {
        self.env = Some(env);
        self
    }

    /// Reference the virtual network
    pub fn vpc(mut self, vpc: Vpc) -> Self {
        self.vpc = Some(vpc);
        self
    }

    /// Set the job-queue reference threaded into the engine container
    pub fn job_queue_ref(mut self, queue: impl Into<String>) -> Self {
        self.job_queue_ref = Some(queue.into());
        self
    }

    /// Set the per-context parameters
    pub fn params(mut self, params: ContextParams) -> Self {
        self.params = Some(params);
        self
    }

    /// Set the execution identity's initial policy options
    pub fn policy_options(mut self, options: PolicyOptions) -> Self {
        self.policy_options = options;
        self
    }

    /// Allow an extra caller account through the front door
    pub fn allow_account(mut self, account: &str) -> Result<Self, BuilderError> {
        self.extra_allowed_accounts.push(
            AccountId::new(account).map_err(|e| BuilderError::InvalidAccount(e.to_string()))?,
        );
        Ok(self)
    }

    /// Build the options
    pub fn build(self) -> Result<EngineOptions, BuilderError> {
        Ok(EngineOptions {
            env: self.env.ok_or(BuilderError::MissingField("env".into()))?,
            vpc: self.vpc.ok_or(BuilderError::MissingField("vpc".into()))?,
            job_queue_ref: self
                .job_queue_ref
                .ok_or(BuilderError::MissingField("jobQueueRef".into()))?,
            params: self
                .params
                .ok_or(BuilderError::MissingField("params".into()))?,
            policy_options: self.policy_options,
            extra_allowed_accounts: self.extra_allowed_accounts,
        })
    }
}

impl Default for EngineOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// ERROR TYPE
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BuilderError {
    #[error("Invalid service name: {0}")]
    InvalidName(String),
    #[error("Invalid account id: {0}")]
    InvalidAccount(String),
    #[error("Missing required field: {0}")]
    MissingField(String),
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_builder() {
        let container = ServiceContainerBuilder::new()
            .service_name("engine")
            .unwrap()
            .cpu(512)
            .memory_limit_mib(1024)
            .container_port(8000)
            .env_var("WORKFLOW_ROOT", "/engine-executions")
            .image("workflow-engine")
            .tag("v1")
            .build()
            .unwrap();

        assert_eq!(container.service_name.as_str(), "engine");
        assert_eq!(container.container_port, Some(8000));
        assert_eq!(container.image.tag.as_deref(), Some("v1"));
    }

    #[test]
    fn test_missing_required_fields_are_named() {
        let err = ServiceContainerBuilder::new()
            .cpu(512)
            .memory_limit_mib(1024)
            .image("workflow-engine")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("serviceName"));

        let err = ServiceContainerBuilder::new()
            .service_name("engine")
            .unwrap()
            .cpu(512)
            .image("workflow-engine")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("memoryLimitMiB"));
    }

    #[test]
    fn test_invalid_service_name_is_rejected_eagerly() {
        let result = ServiceContainerBuilder::new().service_name("Not Valid");
        assert!(result.is_err());
    }

    #[test]
    fn test_engine_options_builder_requires_core_fields() {
        let err = EngineOptionsBuilder::new().build().unwrap_err();
        assert!(err.to_string().contains("env"));
    }
}
