//! Execution identity and capability grants
//!
//! The role compute tasks assume. Created once, then appended to as later
//! components grant it access to the resources they own. Every grant call
//! returns a fresh effective-policy snapshot so grants stay auditable.

use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::ProvisionError;
use crate::options::{PolicyOptions, PolicyStatement};
use crate::stack::{ResourceKind, Stack};

/// Service allowed to assume a role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePrincipal(String);

impl ServicePrincipal {
    pub fn new(service: impl Into<String>) -> Self {
        Self(service.into())
    }

    /// The compute-task execution service
    pub fn compute_tasks() -> Self {
        Self::new("compute-tasks.cloud.internal")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Access level granted on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Read,
    Write,
    ReadWrite,
}

impl Capability {
    /// Actions the capability expands to in a policy statement
    pub fn actions(&self) -> &'static [&'static str] {
        match self {
            Capability::Read => &["storage:Get", "storage:List"],
            Capability::Write => &["storage:Put", "storage:Delete"],
            Capability::ReadWrite => {
                &["storage:Get", "storage:List", "storage:Put", "storage:Delete"]
            }
        }
    }
}

/// One capability granted on one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub capability: Capability,
    pub resource: String,
}

/// Effective policy at one point in time: the statements the role was
/// created with plus every grant accumulated since, expanded to statements.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicySnapshot {
    pub statements: Vec<PolicyStatement>,
}

impl PolicySnapshot {
    /// Number of statements in the snapshot
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// Execution identity assumed by compute tasks
#[derive(Debug)]
pub struct Role {
    logical_id: String,
    assumed_by: ServicePrincipal,
    base: Vec<PolicyStatement>,
    grants: Mutex<Vec<Grant>>,
}

impl Role {
    /// Create the role in a stack scope with its initial policy options
    pub fn new(
        stack: &Stack,
        logical_id: &str,
        assumed_by: ServicePrincipal,
        options: &PolicyOptions,
    ) -> Result<Arc<Self>, ProvisionError> {
        stack.register(ResourceKind::Role, logical_id)?;
        Ok(Arc::new(Self {
            logical_id: logical_id.to_string(),
            assumed_by,
            base: options.statements.clone(),
            grants: Mutex::new(Vec::new()),
        }))
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn assumed_by(&self) -> &ServicePrincipal {
        &self.assumed_by
    }

    /// Grant a capability on a resource.
    ///
    /// Grants are independent and commutative; repeating a grant appends a
    /// duplicate statement rather than failing. Returns the effective policy
    /// after the grant.
    pub fn grant(&self, capability: Capability, resource: &str) -> PolicySnapshot {
        debug!(role = %self.logical_id, ?capability, resource, "granted capability");
        self.grants
            .lock()
            .expect("role grants poisoned")
            .push(Grant {
                capability,
                resource: resource.to_string(),
            });
        self.snapshot()
    }

    /// Effective policy right now
    pub fn snapshot(&self) -> PolicySnapshot {
        let grants = self.grants.lock().expect("role grants poisoned");
        let mut statements = self.base.clone();
        statements.extend(grants.iter().map(|g| PolicyStatement {
            actions: g.capability.actions().iter().map(|a| a.to_string()).collect(),
            resources: vec![g.resource.clone()],
            condition: None,
        }));
        PolicySnapshot { statements }
    }

    /// Grants recorded against one resource
    pub fn grants_for(&self, resource: &str) -> Vec<Grant> {
        self.grants
            .lock()
            .expect("role grants poisoned")
            .iter()
            .filter(|g| g.resource == resource)
            .cloned()
            .collect()
    }
}
