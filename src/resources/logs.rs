//! Log groups
//!
//! Opaque log handles. The engine and adapter log groups are created by the
//! assembler and passed into the renderer; the front door owns its own
//! access log group.

use std::sync::Arc;

use crate::error::ProvisionError;
use crate::naming::APP_NAME;
use crate::stack::{ResourceKind, Stack};

/// Destination for one service's log streams
#[derive(Debug)]
pub struct LogGroup {
    logical_id: String,
    name: String,
}

impl LogGroup {
    pub fn new(stack: &Stack, logical_id: &str) -> Result<Arc<Self>, ProvisionError> {
        stack.register(ResourceKind::LogGroup, logical_id)?;
        Ok(Arc::new(Self {
            logical_id: logical_id.to_string(),
            name: format!("/{}/{}/{}", APP_NAME, stack.name(), logical_id),
        }))
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;

    #[test]
    fn test_log_group_name_is_scoped_to_stack() {
        let env = Environment::new("123456789012", "eu-west-1").unwrap();
        let stack = Stack::new("demo", env);
        let group = LogGroup::new(&stack, "EngineLogGroup").unwrap();

        assert_eq!(group.name(), "/rigging/demo/EngineLogGroup");
        assert_eq!(stack.count_of(ResourceKind::LogGroup), 1);
    }
}
