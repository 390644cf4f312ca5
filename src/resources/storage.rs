//! External object storage
//!
//! The output bucket is a shared resource the stack does not own: it is
//! looked up by name and only granted permissions. Nothing is registered in
//! the stack scope for it.

use crate::resources::identity::{Capability, PolicySnapshot, Role};
use crate::types::BucketName;

/// By-name reference to an existing bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    name: BucketName,
}

impl Bucket {
    /// Reference an existing bucket by name
    pub fn from_name(name: BucketName) -> Self {
        Self { name }
    }

    pub fn name(&self) -> &BucketName {
        &self.name
    }

    /// Resource string grants on this bucket are scoped to
    pub fn resource_ref(&self) -> String {
        format!("bucket/{}", self.name)
    }

    /// Grant a role read-write access to the bucket contents
    pub fn grant_read_write(&self, role: &Role) -> PolicySnapshot {
        role.grant(Capability::ReadWrite, &self.resource_ref())
    }
}
