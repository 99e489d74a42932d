//! Startup-time registry of named operations

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::{Operation, OperationResult};
use crate::error::{Error, Result};
use crate::handlers::params::OperationInput;
use crate::handlers::{ActionError, ActionKind};

/// Operations keyed by name
#[derive(Clone, Default)]
pub struct OperationRegistry {
    operations: BTreeMap<String, Arc<dyn Operation>>,
}

impl fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("operations", &self.operations.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl OperationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operation under its own name
    ///
    /// Registering two operations with the same name is an error.
    pub fn register(&mut self, operation: impl Operation + 'static) -> Result<()> {
        let name = operation.name().to_string();
        if self.operations.contains_key(&name) {
            return Err(Error::Registry(format!(
                "Operation {name} is already registered"
            )));
        }
        self.operations.insert(name, Arc::new(operation));
        Ok(())
    }

    /// Register an operation (builder style)
    pub fn try_with(mut self, operation: impl Operation + 'static) -> Result<Self> {
        self.register(operation)?;
        Ok(self)
    }

    /// Operation registered under a name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Operation>> {
        self.operations.get(name).cloned()
    }

    /// Look up an operation, failing with `NotFound` when it is missing
    pub fn require(&self, name: &str) -> std::result::Result<Arc<dyn Operation>, ActionError> {
        self.get(name).ok_or_else(|| {
            ActionError::missing(
                ActionKind::Perform,
                format!("Operation {name} is not registered"),
            )
        })
    }

    /// Conform input to the named operation's shape and run it
    pub async fn call(
        &self,
        name: &str,
        input: OperationInput,
    ) -> std::result::Result<OperationResult, ActionError> {
        let operation = self.require(name)?;
        let input = input.conform(operation.input_shape(), operation.name())?;
        Ok(operation.call(input).await)
    }

    /// Registered operation names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    /// Number of registered operations
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::params::{ActionParams, InputShape};
    use crate::handlers::ActionErrorKind;
    use crate::operations::{FnOperation, Payload};
    use crate::outcome::Outcome;

    fn noop(name: &str, shape: InputShape) -> FnOperation {
        FnOperation::new(name, shape, |_input: OperationInput| async {
            Outcome::Success(Payload::message("done"))
        })
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut registry = OperationRegistry::new();
        registry.register(noop("archive", InputShape::Any)).unwrap();
        let err = registry.register(noop("archive", InputShape::Any)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Registry error: Operation archive is already registered"
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_require_missing() {
        let registry = OperationRegistry::new();
        let err = registry.require("nope").err().unwrap();
        assert_eq!(err.kind, ActionErrorKind::NotFound);
        assert_eq!(err.message, "Operation nope is not registered");
    }

    #[tokio::test]
    async fn test_call_conforms_input() {
        let registry = OperationRegistry::new()
            .try_with(noop("archive", InputShape::Record))
            .unwrap()
            .try_with(noop("report", InputShape::Params))
            .unwrap();

        let params = OperationInput::Params(ActionParams::default());
        let err = registry.call("archive", params.clone()).await.unwrap_err();
        assert_eq!(err.kind, ActionErrorKind::InvalidInput);

        let result = registry.call("report", params).await.unwrap();
        assert_eq!(result, Outcome::Success(Payload::message("done")));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["archive", "report"]);
    }
}
