//! Stack input documents
//!
//! Context parameters and container specs arrive as YAML documents and stay
//! immutable for the lifetime of the stack they configure.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::env::Environment;
use crate::error::ProvisionError;
use crate::stack::Vpc;
use crate::types::{AccountId, BucketName, ServiceName};

/// Environment variable the engine reads its job-queue reference from
pub const JOB_QUEUE_ENV_KEY: &str = "JOB_QUEUE_REF";

/// Image designation resolved against the deployment registry at render time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageConfig {
    pub designation: String,
    #[serde(default)]
    pub tag: Option<String>,
}

/// Logical description of one unit of compute.
///
/// Value object: no identity beyond its fields. `environment` keys are
/// unique and order is irrelevant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceContainer {
    pub service_name: ServiceName,
    pub cpu: u32,
    #[serde(rename = "memoryLimitMiB")]
    pub memory_limit_mib: u32,
    #[serde(default)]
    pub environment: HashMap<String, String>,
    #[serde(default)]
    pub container_port: Option<u16>,
    pub image: ImageConfig,
}

impl ServiceContainer {
    /// Provisioning-layer validation: resource limits must be non-zero.
    ///
    /// Missing fields never reach this point (the document fails to parse
    /// or the builder rejects them), so only value errors remain.
    pub fn validate(&self) -> Result<(), ProvisionError> {
        if self.cpu == 0 {
            return Err(ProvisionError::ZeroResource {
                service: self.service_name.to_string(),
                field: "cpu".into(),
            });
        }
        if self.memory_limit_mib == 0 {
            return Err(ProvisionError::ZeroResource {
                service: self.service_name.to_string(),
                field: "memoryLimitMiB".into(),
            });
        }
        Ok(())
    }
}

/// One capability grant attached to the execution identity at creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyStatement {
    pub actions: Vec<String>,
    pub resources: Vec<String>,
    #[serde(default)]
    pub condition: Option<serde_json::Value>,
}

/// Initial capability grants for the execution identity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyOptions {
    #[serde(default)]
    pub statements: Vec<PolicyStatement>,
}

/// Per-context deployment parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextParams {
    pub project_name: String,
    pub context_name: String,
    pub user_id: String,
    pub output_bucket_name: BucketName,
    pub engine: ServiceContainer,
    pub adapter: ServiceContainer,
}

impl ContextParams {
    /// Parse context parameters from a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self, ProvisionError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load context parameters from a YAML file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read context parameters from {:?}", path))?;
        Self::from_yaml(&yaml)
            .with_context(|| format!("Failed to parse context parameters from {:?}", path))
    }

    /// Engine container spec with the job-queue reference threaded into its
    /// environment. The spec document itself stays untouched.
    pub fn engine_container(&self, job_queue_ref: &str) -> ServiceContainer {
        let mut container = self.engine.clone();
        container
            .environment
            .insert(JOB_QUEUE_ENV_KEY.to_string(), job_queue_ref.to_string());
        container
    }

    /// Adapter container spec as declared
    pub fn adapter_container(&self) -> ServiceContainer {
        self.adapter.clone()
    }
}

/// Everything the engine stack assembler consumes.
///
/// Immutable for the lifetime of the stack.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub env: Environment,
    pub vpc: Vpc,
    pub job_queue_ref: String,
    pub params: ContextParams,
    pub policy_options: PolicyOptions,
    /// Extra caller accounts allowed through the front door, on top of the
    /// stack's own account.
    pub extra_allowed_accounts: Vec<AccountId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS_YAML: &str = r#"
projectName: proj
contextName: ctxA
userId: u1
outputBucketName: proj-outputs
engine:
  serviceName: engine
  cpu: 512
  memoryLimitMiB: 1024
  containerPort: 8000
  environment:
    WORKFLOW_ROOT: /engine-executions
  image:
    designation: workflow-engine
adapter:
  serviceName: adapter
  cpu: 256
  memoryLimitMiB: 512
  image:
    designation: wes-adapter
"#;

    #[test]
    fn test_params_parse_from_yaml() {
        let params = ContextParams::from_yaml(PARAMS_YAML).unwrap();
        assert_eq!(params.project_name, "proj");
        assert_eq!(params.engine.container_port, Some(8000));
        assert_eq!(params.adapter.container_port, None);
        assert_eq!(params.output_bucket_name.as_str(), "proj-outputs");
    }

    #[test]
    fn test_missing_required_field_fails_parse() {
        // cpu missing from the engine spec
        let yaml = r#"
projectName: proj
contextName: ctxA
userId: u1
outputBucketName: proj-outputs
engine:
  serviceName: engine
  memoryLimitMiB: 1024
  image:
    designation: workflow-engine
adapter:
  serviceName: adapter
  cpu: 256
  memoryLimitMiB: 512
  image:
    designation: wes-adapter
"#;
        let err = ContextParams::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("cpu"));
    }

    #[test]
    fn test_engine_container_threads_job_queue_ref() {
        let params = ContextParams::from_yaml(PARAMS_YAML).unwrap();
        let container = params.engine_container("queue/default-ctxA");

        assert_eq!(
            container.environment.get(JOB_QUEUE_ENV_KEY),
            Some(&"queue/default-ctxA".to_string())
        );
        // Declared environment is kept verbatim
        assert_eq!(
            container.environment.get("WORKFLOW_ROOT"),
            Some(&"/engine-executions".to_string())
        );
        // Source spec stays untouched
        assert!(!params.engine.environment.contains_key(JOB_QUEUE_ENV_KEY));
    }

    #[test]
    fn test_zero_cpu_fails_validation() {
        let mut params = ContextParams::from_yaml(PARAMS_YAML).unwrap();
        params.engine.cpu = 0;
        let err = params.engine.validate().unwrap_err();
        assert!(err.to_string().contains("cpu"));
    }

    #[test]
    fn test_params_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PARAMS_YAML.as_bytes()).unwrap();

        let params = ContextParams::from_file(file.path()).unwrap();
        assert_eq!(params.context_name, "ctxA");
    }
}
