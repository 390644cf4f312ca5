//! Stack scope and resource registry
//!
//! A [`Stack`] is the construct scope every resource is created in. It keeps
//! an append-only, creation-ordered record of what was built and rejects
//! duplicate logical ids. The real cloud orchestration that consumes this
//! record is an external collaborator.

use std::collections::HashSet;
use std::sync::Mutex;

use serde::Serialize;
use tracing::debug;

use crate::env::Environment;
use crate::error::ProvisionError;
use crate::types::AccountId;

/// Reference to the virtual network a deployment lives in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vpc {
    vpc_id: String,
}

impl Vpc {
    /// Reference an existing virtual network by id
    pub fn from_id(vpc_id: impl Into<String>) -> Self {
        Self {
            vpc_id: vpc_id.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.vpc_id
    }
}

/// What happens to a resource when its owning stack is destroyed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RemovalPolicy {
    /// Delete the resource and its data with the stack
    Destroy,
    /// Keep the resource after the stack is gone
    Retain,
}

/// Kinds of resources a stack records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResourceKind {
    Role,
    Namespace,
    FileSystem,
    LogGroup,
    TaskDefinition,
    LoadBalancer,
    Service,
    RestApi,
}

/// One created resource: kind plus stack-unique logical id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRecord {
    pub kind: ResourceKind,
    pub logical_id: String,
}

#[derive(Debug, Default)]
struct Registry {
    records: Vec<ResourceRecord>,
    ids: HashSet<String>,
}

/// Construct scope for one deployment
#[derive(Debug)]
pub struct Stack {
    name: String,
    env: Environment,
    registry: Mutex<Registry>,
}

impl Stack {
    /// Create an empty stack scope bound to a deployment environment
    pub fn new(name: impl Into<String>, env: Environment) -> Self {
        Self {
            name: name.into(),
            env,
            registry: Mutex::new(Registry::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Account the stack deploys into
    pub fn account(&self) -> &AccountId {
        &self.env.account
    }

    /// Record a created resource, rejecting duplicate logical ids.
    ///
    /// Called by resource constructors only; a rejected registration means
    /// nothing was created.
    pub(crate) fn register(
        &self,
        kind: ResourceKind,
        logical_id: &str,
    ) -> Result<(), ProvisionError> {
        let mut registry = self.registry.lock().expect("stack registry poisoned");
        if !registry.ids.insert(logical_id.to_string()) {
            return Err(ProvisionError::DuplicateLogicalId {
                id: logical_id.to_string(),
                stack: self.name.clone(),
            });
        }
        debug!(stack = %self.name, ?kind, logical_id, "registered resource");
        registry.records.push(ResourceRecord {
            kind,
            logical_id: logical_id.to_string(),
        });
        Ok(())
    }

    /// Snapshot of all created resources in creation order
    pub fn resources(&self) -> Vec<ResourceRecord> {
        self.registry
            .lock()
            .expect("stack registry poisoned")
            .records
            .clone()
    }

    /// Number of recorded resources of one kind
    pub fn count_of(&self, kind: ResourceKind) -> usize {
        self.resources().iter().filter(|r| r.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_stack() -> Stack {
        let env = Environment::new("123456789012", "eu-west-1").unwrap();
        Stack::new("demo", env)
    }

    #[test]
    fn test_register_keeps_creation_order() {
        let stack = test_stack();
        stack.register(ResourceKind::Role, "TaskRole").unwrap();
        stack.register(ResourceKind::LogGroup, "EngineLogGroup").unwrap();

        let records = stack.resources();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].logical_id, "TaskRole");
        assert_eq!(records[1].kind, ResourceKind::LogGroup);
    }

    #[test]
    fn test_duplicate_logical_id_is_rejected() {
        let stack = test_stack();
        stack.register(ResourceKind::Role, "TaskRole").unwrap();

        let err = stack.register(ResourceKind::Role, "TaskRole").unwrap_err();
        assert!(err.to_string().contains("TaskRole"));
        // Nothing extra was recorded
        assert_eq!(stack.resources().len(), 1);
    }

    #[test]
    fn test_count_of_filters_by_kind() {
        let stack = test_stack();
        stack.register(ResourceKind::LogGroup, "A").unwrap();
        stack.register(ResourceKind::LogGroup, "B").unwrap();
        stack.register(ResourceKind::Role, "R").unwrap();

        assert_eq!(stack.count_of(ResourceKind::LogGroup), 2);
        assert_eq!(stack.count_of(ResourceKind::Service), 0);
    }
}
