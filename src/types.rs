//! NewType wrappers for type safety
//!
//! Zero-cost wrappers around the identifier strings that flow through stack
//! assembly, preventing type confusion between service names, account ids
//! and bucket names.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// ============================================================================
// SERVICE NAME
// ============================================================================

static SERVICE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9-]*$").expect("valid service name pattern"));

/// Strongly-typed logical service name
///
/// Guarantees:
/// - Non-empty, starts with a letter
/// - Lowercase alphanumeric and dashes only
/// - Maximum 63 characters (DNS label limit, names feed discovery records)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceName(String);

impl ServiceName {
    /// Maximum allowed length
    pub const MAX_LENGTH: usize = 63;

    /// Create a new ServiceName with validation
    pub fn new(name: impl AsRef<str>) -> Result<Self, ServiceNameError> {
        let name = name.as_ref();

        if name.is_empty() {
            return Err(ServiceNameError::Empty);
        }
        if name.len() > Self::MAX_LENGTH {
            return Err(ServiceNameError::TooLong(name.len()));
        }
        if !SERVICE_NAME_RE.is_match(name) {
            return Err(ServiceNameError::InvalidCharacters(name.to_string()));
        }

        Ok(ServiceName(name.to_string()))
    }

    /// Get as string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for ServiceName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ServiceName {
    type Err = ServiceNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceName::new(s)
    }
}

impl TryFrom<String> for ServiceName {
    type Error = ServiceNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ServiceName::new(&value)
    }
}

impl From<ServiceName> for String {
    fn from(name: ServiceName) -> Self {
        name.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceNameError {
    #[error("Service name cannot be empty")]
    Empty,
    #[error("Service name too long ({0} > {})", ServiceName::MAX_LENGTH)]
    TooLong(usize),
    #[error("Service name must be lowercase alphanumeric with dashes: {0}")]
    InvalidCharacters(String),
}

// ============================================================================
// ACCOUNT ID
// ============================================================================

/// Strongly-typed deployment account identifier
///
/// Accounts restrict who may call the API front door; an empty id would
/// silently widen the allow-list, so emptiness is rejected at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// Create a new AccountId with validation
    pub fn new(id: impl AsRef<str>) -> Result<Self, AccountIdError> {
        let id = id.as_ref();

        if id.is_empty() {
            return Err(AccountIdError::Empty);
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(AccountIdError::InvalidCharacters(id.to_string()));
        }

        Ok(AccountId(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = AccountIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccountId::new(s)
    }
}

impl TryFrom<String> for AccountId {
    type Error = AccountIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        AccountId::new(&value)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AccountIdError {
    #[error("unable to determine account ID")]
    Empty,
    #[error("Account id contains invalid characters: {0}")]
    InvalidCharacters(String),
}

// ============================================================================
// BUCKET NAME
// ============================================================================

static BUCKET_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9.-]*[a-z0-9]$").expect("valid bucket name pattern"));

/// Strongly-typed object-storage bucket name
///
/// The bucket is an external, shared resource referenced by name; validation
/// catches typos before a grant is attached to a nonexistent name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BucketName(String);

impl BucketName {
    /// Minimum allowed length
    pub const MIN_LENGTH: usize = 3;
    /// Maximum allowed length
    pub const MAX_LENGTH: usize = 63;

    /// Create a new BucketName with validation
    pub fn new(name: impl AsRef<str>) -> Result<Self, BucketNameError> {
        let name = name.as_ref();

        if name.len() < Self::MIN_LENGTH {
            return Err(BucketNameError::TooShort(name.len()));
        }
        if name.len() > Self::MAX_LENGTH {
            return Err(BucketNameError::TooLong(name.len()));
        }
        if !BUCKET_NAME_RE.is_match(name) {
            return Err(BucketNameError::InvalidCharacters(name.to_string()));
        }

        Ok(BucketName(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BucketName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BucketName {
    type Err = BucketNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BucketName::new(s)
    }
}

impl TryFrom<String> for BucketName {
    type Error = BucketNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        BucketName::new(&value)
    }
}

impl From<BucketName> for String {
    fn from(name: BucketName) -> Self {
        name.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BucketNameError {
    #[error("Bucket name too short ({0} < {})", BucketName::MIN_LENGTH)]
    TooShort(usize),
    #[error("Bucket name too long ({0} > {})", BucketName::MAX_LENGTH)]
    TooLong(usize),
    #[error("Bucket name must be lowercase alphanumeric with dots and dashes: {0}")]
    InvalidCharacters(String),
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_name_validation() {
        // Valid names
        assert!(ServiceName::new("engine").is_ok());
        assert!(ServiceName::new("wes-adapter-2").is_ok());

        // Invalid names
        assert!(ServiceName::new("").is_err());
        assert!(ServiceName::new("Engine").is_err());
        assert!(ServiceName::new("2fast").is_err());
        assert!(ServiceName::new("name with spaces").is_err());
        assert!(ServiceName::new("x".repeat(64)).is_err());
    }

    #[test]
    fn test_account_id_validation() {
        assert!(AccountId::new("123456789012").is_ok());
        assert!(AccountId::new("dev-account").is_ok());

        let err = AccountId::new("").unwrap_err();
        assert_eq!(err.to_string(), "unable to determine account ID");
        assert!(AccountId::new("acct 1").is_err());
    }

    #[test]
    fn test_bucket_name_validation() {
        assert!(BucketName::new("proj-outputs").is_ok());
        assert!(BucketName::new("logs.archive-01").is_ok());

        assert!(BucketName::new("ab").is_err());
        assert!(BucketName::new("UPPER").is_err());
        assert!(BucketName::new("-leading-dash").is_err());
        assert!(BucketName::new("x".repeat(64)).is_err());
    }

    #[test]
    fn test_service_name_deserializes_with_validation() {
        let ok: Result<ServiceName, _> = serde_yaml::from_str("engine");
        assert!(ok.is_ok());

        let bad: Result<ServiceName, _> = serde_yaml::from_str("Not Valid");
        assert!(bad.is_err());
    }
}
