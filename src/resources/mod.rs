//! Managed-resource handles
//!
//! Typed handles for the cloud primitives the assembler wires together.
//! The primitives themselves are external, already-correct managed services;
//! these handles carry the references, grants and network authorizations the
//! assembly produces.

pub mod compute;
pub mod discovery;
pub mod filesystem;
pub mod gateway;
pub mod identity;
pub mod logs;
pub mod storage;

pub use compute::{
    ContainerDefinition, ContainerImage, LogConfig, MountPoint, PortMapping, TaskDefinition,
    Volume,
};
pub use discovery::{DiscoveryOptions, PrivateDnsNamespace};
pub use filesystem::FileSystem;
pub use gateway::{ApiProxy, ApiProxyProps};
pub use identity::{Capability, Grant, PolicySnapshot, Role, ServicePrincipal};
pub use logs::LogGroup;
pub use storage::Bucket;
