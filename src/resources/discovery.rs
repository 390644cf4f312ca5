//! Private service-discovery namespace
//!
//! Internal services locate each other by name inside a per-deployment
//! namespace instead of by dynamic address. The namespace name must be
//! unique within the virtual network; deriving it from the project, context
//! and user identifiers is the caller's collision guard.

use std::sync::Arc;

use tracing::debug;

use crate::error::ProvisionError;
use crate::stack::{ResourceKind, Stack, Vpc};
use crate::types::ServiceName;

/// Private name-resolution scope bound to a virtual network
#[derive(Debug)]
pub struct PrivateDnsNamespace {
    logical_id: String,
    name: String,
    vpc_id: String,
}

impl PrivateDnsNamespace {
    pub fn new(
        stack: &Stack,
        logical_id: &str,
        name: impl Into<String>,
        vpc: &Vpc,
    ) -> Result<Arc<Self>, ProvisionError> {
        stack.register(ResourceKind::Namespace, logical_id)?;
        let name = name.into();
        debug!(namespace = %name, vpc = vpc.id(), "created discovery namespace");
        Ok(Arc::new(Self {
            logical_id: logical_id.to_string(),
            name,
            vpc_id: vpc.id().to_string(),
        }))
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vpc_id(&self) -> &str {
        &self.vpc_id
    }
}

/// Registration options handed to the service renderer
#[derive(Clone)]
pub struct DiscoveryOptions {
    /// Name the service registers under
    pub name: ServiceName,
    /// Namespace instances register into
    pub namespace: Arc<PrivateDnsNamespace>,
}

impl DiscoveryOptions {
    /// Fully qualified discovery name for a registered service
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.name, self.namespace.name())
    }
}
