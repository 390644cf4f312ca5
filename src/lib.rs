//! Rigging - deployment assembly for workflow-execution engine stacks

pub mod builders;
pub mod engine;
pub mod env;
pub mod error;
pub mod naming;
pub mod options;
pub mod render;
pub mod resources;
pub mod stack;
pub mod types;

pub use builders::{EngineOptionsBuilder, ServiceContainerBuilder};
pub use engine::{EngineOutputs, EngineStack, EXECUTIONS_MOUNT_PATH, EXECUTIONS_VOLUME};
pub use env::Environment;
pub use error::{FixSuggestion, ProvisionError};
pub use options::{
    ContextParams, EngineOptions, ImageConfig, PolicyOptions, PolicyStatement, ServiceContainer,
};
pub use render::{LoadBalancer, SecureService, Service};
pub use resources::{ApiProxy, ApiProxyProps, Bucket, FileSystem, LogGroup, PrivateDnsNamespace, Role};
pub use stack::{RemovalPolicy, ResourceKind, ResourceRecord, Stack, Vpc};
pub use types::{AccountId, BucketName, ServiceName};
