//! Durable execution filesystem
//!
//! Network-attached scratch space for workflow executions. Always encrypted
//! at rest, always destroyed with the owning stack: execution scratch data
//! is scoped to the deployment's lifetime, not beyond.

use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::ProvisionError;
use crate::naming::host_slug;
use crate::render::Service;
use crate::stack::{RemovalPolicy, ResourceKind, Stack, Vpc};

/// Port the filesystem accepts mount traffic on
pub const DEFAULT_PORT: u16 = 2049;

/// Network-reachability capability of the filesystem.
///
/// Compute units cannot reach the mount target until the caller authorizes
/// them here.
#[derive(Debug, Default)]
pub struct Connections {
    authorized: Mutex<Vec<String>>,
}

impl Connections {
    /// Authorize inbound traffic on the default port from a rendered service
    pub fn allow_default_port_from(&self, service: &Service) {
        debug!(peer = %service.name(), port = DEFAULT_PORT, "authorized filesystem ingress");
        self.authorized
            .lock()
            .expect("connections poisoned")
            .push(service.name().to_string());
    }

    /// Services currently authorized to reach the default port
    pub fn authorized_peers(&self) -> Vec<String> {
        self.authorized
            .lock()
            .expect("connections poisoned")
            .clone()
    }
}

/// Encrypted, deployment-scoped network filesystem
#[derive(Debug)]
pub struct FileSystem {
    logical_id: String,
    file_system_id: String,
    vpc_id: String,
    encrypted: bool,
    removal_policy: RemovalPolicy,
    connections: Connections,
}

impl FileSystem {
    /// Create the filesystem in a stack scope.
    ///
    /// Encryption and the destructive removal policy are not configurable.
    pub fn new(stack: &Stack, logical_id: &str, vpc: &Vpc) -> Result<Arc<Self>, ProvisionError> {
        stack.register(ResourceKind::FileSystem, logical_id)?;
        let file_system_id = format!("fs-{}", host_slug(&format!("{}-{}", stack.name(), logical_id)));
        debug!(%file_system_id, vpc = vpc.id(), "created filesystem");
        Ok(Arc::new(Self {
            logical_id: logical_id.to_string(),
            file_system_id,
            vpc_id: vpc.id().to_string(),
            encrypted: true,
            removal_policy: RemovalPolicy::Destroy,
            connections: Connections::default(),
        }))
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// Identifier volume-mount configurations bind to
    pub fn file_system_id(&self) -> &str {
        &self.file_system_id
    }

    pub fn vpc_id(&self) -> &str {
        &self.vpc_id
    }

    pub fn encrypted(&self) -> bool {
        self.encrypted
    }

    pub fn removal_policy(&self) -> RemovalPolicy {
        self.removal_policy
    }

    pub fn connections(&self) -> &Connections {
        &self.connections
    }
}
