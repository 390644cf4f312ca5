//! Deployment environment
//!
//! The account/region pair a stack deploys into. The account id doubles as
//! the default caller identity allowed through the API front door.

use serde::{Deserialize, Serialize};

use crate::error::ProvisionError;
use crate::types::AccountId;

/// Account and region a stack is bound to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub account: AccountId,
    pub region: String,
}

impl Environment {
    /// Create an environment from raw strings.
    ///
    /// An empty account id cannot be allowed through: the front door
    /// allow-list is seeded from it.
    pub fn new(account: impl AsRef<str>, region: impl Into<String>) -> Result<Self, ProvisionError> {
        let account =
            AccountId::new(account).map_err(|_| ProvisionError::UnknownAccount)?;
        Ok(Self {
            account,
            region: region.into(),
        })
    }

    /// Private registry host for resolving image designations
    pub fn registry_host(&self) -> String {
        format!("{}.registry.{}.cloud.internal", self.account, self.region)
    }
}
