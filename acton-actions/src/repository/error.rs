//! Repository error types
//!
//! Structured errors raised by a [`RecordStore`](super::RecordStore). They
//! describe the store call that failed, why, and which record was involved.
//! Validation outcomes are *not* errors: a rejected mutation comes back as
//! [`Outcome::Failure`](crate::outcome::Outcome) carrying the record.
//!
//! # Example
//!
//! ```rust
//! use acton_actions::repository::{RepositoryError, RepositoryErrorKind};
//!
//! let error = RepositoryError::not_found("Order", "7");
//! assert!(matches!(error.kind, RepositoryErrorKind::NotFound));
//! assert_eq!(error.message, "Couldn't find Order with 'id'=7");
//! ```

use std::fmt;

/// Store call being performed when the error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryOperation {
    /// Loading a single record by id
    Find,
    /// Querying a collection
    Query,
    /// Persisting a new record
    Create,
    /// Persisting changes to a record
    Update,
    /// Removing a record
    Destroy,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Find => write!(f, "find"),
            Self::Query => write!(f, "query"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Destroy => write!(f, "destroy"),
        }
    }
}

/// Category of repository error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryErrorKind {
    /// Record was not found
    NotFound,
    /// Uniqueness conflict
    AlreadyExists,
    /// Database constraint violation (foreign key, check)
    ConstraintViolation,
    /// Removal was blocked by a dependency or hook
    NotDestroyed,
    /// The store rejected the statement it was asked to run
    StatementInvalid,
    /// Validation failed and the caller asked for it to be raised
    ValidationFailed,
    /// Failed to reach the backing store
    ConnectionFailed,
    /// Operation timed out
    Timeout,
    /// Serialization or deserialization error
    SerializationError,
    /// Other unclassified error
    Other,
}

impl fmt::Display for RepositoryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::AlreadyExists => write!(f, "already_exists"),
            Self::ConstraintViolation => write!(f, "constraint_violation"),
            Self::NotDestroyed => write!(f, "not_destroyed"),
            Self::StatementInvalid => write!(f, "statement_invalid"),
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::SerializationError => write!(f, "serialization_error"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Structured repository error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryError {
    /// The store call being performed when the error occurred
    pub operation: RepositoryOperation,
    /// The category of error
    pub kind: RepositoryErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The resource type involved (e.g., "Order")
    pub entity_type: Option<String>,
    /// The id of the record involved
    pub entity_id: Option<String>,
}

impl RepositoryError {
    /// Create a new repository error
    pub fn new(
        operation: RepositoryOperation,
        kind: RepositoryErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
        }
    }

    /// Create a "not found" error with record context
    ///
    /// ```rust
    /// use acton_actions::repository::RepositoryError;
    ///
    /// let error = RepositoryError::not_found("User", "usr_123");
    /// assert_eq!(error.entity_type, Some("User".to_string()));
    /// ```
    pub fn not_found(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        let entity_type = entity_type.into();
        let entity_id = entity_id.into();
        Self {
            operation: RepositoryOperation::Find,
            kind: RepositoryErrorKind::NotFound,
            message: format!("Couldn't find {entity_type} with 'id'={entity_id}"),
            entity_type: Some(entity_type),
            entity_id: Some(entity_id),
        }
    }

    /// Create a uniqueness conflict error
    pub fn already_exists(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::AlreadyExists, message)
    }

    /// Create a constraint violation error
    pub fn constraint_violation(
        operation: RepositoryOperation,
        message: impl Into<String>,
    ) -> Self {
        Self::new(operation, RepositoryErrorKind::ConstraintViolation, message)
    }

    /// Create a "not destroyed" error
    pub fn not_destroyed(message: impl Into<String>) -> Self {
        Self::new(
            RepositoryOperation::Destroy,
            RepositoryErrorKind::NotDestroyed,
            message,
        )
    }

    /// Create a statement-invalid error
    pub fn statement_invalid(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::StatementInvalid, message)
    }

    /// Create a validation failed error
    pub fn validation_failed(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::ValidationFailed, message)
    }

    /// Create a connection failed error
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::new(
            RepositoryOperation::Find,
            RepositoryErrorKind::ConnectionFailed,
            message,
        )
    }

    /// Create a timeout error
    pub fn timeout(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::Timeout, message)
    }

    /// Create a serialization error
    pub fn serialization_error(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::SerializationError, message)
    }

    /// Add record context to an existing error
    #[must_use]
    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: RepositoryOperation) -> Self {
        self.operation = operation;
        self
    }

    /// Check if this error is retriable (transient errors that may succeed on retry)
    pub fn is_retriable(&self) -> bool {
        matches!(
            self.kind,
            RepositoryErrorKind::ConnectionFailed | RepositoryErrorKind::Timeout
        )
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repository {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let (Some(ref entity_type), Some(ref entity_id)) = (&self.entity_type, &self.entity_id) {
            write!(f, " [{}: {}]", entity_type, entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for RepositoryError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_operation_display() {
        assert_eq!(format!("{}", RepositoryOperation::Find), "find");
        assert_eq!(format!("{}", RepositoryOperation::Query), "query");
        assert_eq!(format!("{}", RepositoryOperation::Create), "create");
        assert_eq!(format!("{}", RepositoryOperation::Update), "update");
        assert_eq!(format!("{}", RepositoryOperation::Destroy), "destroy");
    }

    #[test]
    fn test_repository_error_kind_display() {
        assert_eq!(format!("{}", RepositoryErrorKind::NotFound), "not_found");
        assert_eq!(format!("{}", RepositoryErrorKind::NotDestroyed), "not_destroyed");
        assert_eq!(
            format!("{}", RepositoryErrorKind::StatementInvalid),
            "statement_invalid"
        );
    }

    #[test]
    fn test_not_found_message() {
        let error = RepositoryError::not_found("Order", "42");
        assert_eq!(error.operation, RepositoryOperation::Find);
        assert_eq!(error.message, "Couldn't find Order with 'id'=42");
        assert_eq!(error.entity_id, Some("42".to_string()));
    }

    #[test]
    fn test_display_with_entity() {
        let error = RepositoryError::not_destroyed("Cannot delete record because dependent items exist")
            .with_entity("Order", "3");
        let display = error.to_string();
        assert!(display.contains("not_destroyed"));
        assert!(display.contains("destroy"));
        assert!(display.contains("[Order: 3]"));
    }

    #[test]
    fn test_is_retriable() {
        assert!(RepositoryError::connection_failed("reset").is_retriable());
        assert!(RepositoryError::timeout(RepositoryOperation::Query, "slow").is_retriable());
        assert!(!RepositoryError::not_found("Order", "1").is_retriable());
        assert!(!RepositoryError::already_exists(RepositoryOperation::Create, "dup").is_retriable());
    }
}
