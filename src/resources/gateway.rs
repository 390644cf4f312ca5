//! API front door
//!
//! Wraps an internal load balancer behind a managed API gateway. Callers
//! are restricted to an account allow-list and every invocation is written
//! to the access log before it is forwarded.

use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::error::ProvisionError;
use crate::naming::host_slug;
use crate::render::LoadBalancer;
use crate::resources::logs::LogGroup;
use crate::stack::{ResourceKind, Stack};
use crate::types::AccountId;

/// Front-door construction inputs
pub struct ApiProxyProps {
    /// Uniquely derived API name
    pub api_name: String,
    /// Load balancer the gateway forwards to. Absent means the backing
    /// service was never rendered; construction fails before any gateway
    /// resource exists.
    pub load_balancer: Option<Arc<LoadBalancer>>,
    /// Caller accounts allowed to invoke the API
    pub allowed_account_ids: Vec<AccountId>,
}

/// Public-facing gateway in front of an internal load balancer
#[derive(Debug)]
pub struct ApiProxy {
    api_name: String,
    endpoint: String,
    access_log_group: Arc<LogGroup>,
    load_balancer: Arc<LoadBalancer>,
    allowed_account_ids: Vec<AccountId>,
}

impl ApiProxy {
    pub fn new(stack: &Stack, props: ApiProxyProps) -> Result<Self, ProvisionError> {
        // Both preconditions are checked before anything is registered, so a
        // failed front door leaves no partially-built gateway behind.
        let load_balancer =
            props
                .load_balancer
                .ok_or_else(|| ProvisionError::MissingLoadBalancer {
                    api: props.api_name.clone(),
                })?;
        if props.allowed_account_ids.is_empty() {
            return Err(ProvisionError::EmptyAllowList {
                api: props.api_name.clone(),
            });
        }

        let access_log_group =
            LogGroup::new(stack, &format!("{}AccessLogGroup", props.api_name))?;
        stack.register(ResourceKind::RestApi, &props.api_name)?;

        let endpoint = format!(
            "https://{}.gateway.{}.cloud.internal/prod/",
            host_slug(&props.api_name),
            stack.env().region
        );
        Url::parse(&endpoint).map_err(|_| ProvisionError::InvalidEndpoint {
            url: endpoint.clone(),
        })?;
        debug!(api = %props.api_name, %endpoint, "created api proxy");

        Ok(Self {
            api_name: props.api_name,
            endpoint,
            access_log_group,
            load_balancer,
            allowed_account_ids: props.allowed_account_ids,
        })
    }

    pub fn api_name(&self) -> &str {
        &self.api_name
    }

    /// Public URL of the gateway stage
    pub fn url(&self) -> &str {
        &self.endpoint
    }

    pub fn access_log_group(&self) -> &Arc<LogGroup> {
        &self.access_log_group
    }

    pub fn load_balancer(&self) -> &Arc<LoadBalancer> {
        &self.load_balancer
    }

    pub fn allowed_account_ids(&self) -> &[AccountId] {
        &self.allowed_account_ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;
    use crate::stack::Vpc;

    fn test_stack() -> Stack {
        let env = Environment::new("123456789012", "eu-west-1").unwrap();
        Stack::new("demo", env)
    }

    fn test_account() -> AccountId {
        AccountId::new("123456789012").unwrap()
    }

    #[test]
    fn test_missing_load_balancer_fails_before_any_resource() {
        let stack = test_stack();
        let err = ApiProxy::new(
            &stack,
            ApiProxyProps {
                api_name: "projctxAengineApiProxy".into(),
                load_balancer: None,
                allowed_account_ids: vec![test_account()],
            },
        )
        .unwrap_err();

        assert!(matches!(err, ProvisionError::MissingLoadBalancer { .. }));
        assert!(stack.resources().is_empty());
    }

    #[test]
    fn test_empty_allow_list_fails_before_any_resource() {
        let stack = test_stack();
        let lb = LoadBalancer::new(&stack, "AdapterLoadBalancer", &Vpc::from_id("vpc-1")).unwrap();
        let before = stack.resources().len();

        let err = ApiProxy::new(
            &stack,
            ApiProxyProps {
                api_name: "projctxAengineApiProxy".into(),
                load_balancer: Some(lb),
                allowed_account_ids: Vec::new(),
            },
        )
        .unwrap_err();

        assert!(matches!(err, ProvisionError::EmptyAllowList { .. }));
        assert_eq!(stack.resources().len(), before);
    }

    #[test]
    fn test_proxy_synthesizes_region_scoped_endpoint() {
        let stack = test_stack();
        let lb = LoadBalancer::new(&stack, "AdapterLoadBalancer", &Vpc::from_id("vpc-1")).unwrap();

        let proxy = ApiProxy::new(
            &stack,
            ApiProxyProps {
                api_name: "projctxAengineApiProxy".into(),
                load_balancer: Some(lb),
                allowed_account_ids: vec![test_account()],
            },
        )
        .unwrap();

        assert_eq!(
            proxy.url(),
            "https://projctxaengineapiproxy.gateway.eu-west-1.cloud.internal/prod/"
        );
        assert_eq!(stack.count_of(ResourceKind::RestApi), 1);
        assert_eq!(stack.count_of(ResourceKind::LogGroup), 1);
    }
}
