//! Error types with fix suggestions

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

/// Construction-time errors raised while assembling a stack.
///
/// Dependency-ordering mistakes are programming errors and are prevented by
/// the assembler's fixed build order; everything here is either a
/// configuration error or a propagated document failure.
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Duplicate logical id '{id}' in stack '{stack}'")]
    DuplicateLogicalId { id: String, stack: String },

    #[error("unable to determine account ID")]
    UnknownAccount,

    #[error("Container '{service}': {field} must be non-zero")]
    ZeroResource { service: String, field: String },

    #[error("API '{api}' requires a load balancer before any gateway resource is created")]
    MissingLoadBalancer { api: String },

    #[error("API '{api}' has an empty caller allow-list")]
    EmptyAllowList { api: String },

    #[error("Synthesized endpoint is not a valid URL: {url}")]
    InvalidEndpoint { url: String },
}

impl FixSuggestion for ProvisionError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            ProvisionError::YamlParse(_) => Some("Check YAML syntax: indentation and quoting"),
            ProvisionError::DuplicateLogicalId { .. } => {
                Some("Give each resource in a stack a unique logical id")
            }
            ProvisionError::UnknownAccount => {
                Some("Set the deployment account id in the environment configuration")
            }
            ProvisionError::ZeroResource { .. } => {
                Some("Declare cpu and memoryLimitMiB with non-zero values in the container spec")
            }
            ProvisionError::MissingLoadBalancer { .. } => {
                Some("Render the backing service first; its load balancer feeds the front door")
            }
            ProvisionError::EmptyAllowList { .. } => {
                Some("List at least one caller account id (the stack account is the default)")
            }
            ProvisionError::InvalidEndpoint { .. } => {
                Some("Check the derived API name and region for characters a hostname cannot hold")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_variant_has_a_suggestion() {
        let errors = vec![
            ProvisionError::DuplicateLogicalId {
                id: "Engine".into(),
                stack: "demo".into(),
            },
            ProvisionError::UnknownAccount,
            ProvisionError::MissingLoadBalancer { api: "wes".into() },
            ProvisionError::EmptyAllowList { api: "wes".into() },
        ];
        for e in errors {
            assert!(e.fix_suggestion().is_some(), "no suggestion for {e}");
        }
    }

    #[test]
    fn test_messages_name_the_offending_field() {
        let e = ProvisionError::ZeroResource {
            service: "engine".into(),
            field: "cpu".into(),
        };
        assert!(e.to_string().contains("cpu"));
        assert!(e.to_string().contains("engine"));
    }
}
