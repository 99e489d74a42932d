//! Action error types
//!
//! Structured errors raised while executing a resource action or an
//! operation, with HTTP status mapping via `IntoResponse`. Every error
//! renders the same body shape, `{"error": "<text>"}`.
//!
//! Repository errors convert with `?` through `From<RepositoryError>`, so
//! templates never match on store failures themselves.
//!
//! # Example
//!
//! ```rust
//! use acton_actions::handlers::{ActionError, ActionErrorKind};
//!
//! let error = ActionError::not_found("Order", "7");
//! assert!(matches!(error.kind, ActionErrorKind::NotFound));
//! assert_eq!(error.message, "Couldn't find Order with 'id'=7");
//! ```

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::repository::{RepositoryError, RepositoryErrorKind, RepositoryOperation};

/// Action being performed when the error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Listing a collection
    Index,
    /// Showing a single record
    Show,
    /// Creating a record
    Create,
    /// Updating a record
    Update,
    /// Destroying a record
    Destroy,
    /// Running an operation inline
    Perform,
    /// Handing an operation to the job queue
    PerformAsync,
    /// Reading parameters from the request
    Extract,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index => write!(f, "index"),
            Self::Show => write!(f, "show"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Destroy => write!(f, "destroy"),
            Self::Perform => write!(f, "perform"),
            Self::PerformAsync => write!(f, "perform_async"),
            Self::Extract => write!(f, "extract"),
        }
    }
}

/// Category of action error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionErrorKind {
    /// Record or operation was not found
    NotFound,
    /// Record validation failed
    ValidationFailed,
    /// The store rejected the statement (uniqueness, constraint, blocked removal)
    StatementInvalid,
    /// Request parameters could not be used
    InvalidInput,
    /// No presenter is registered for the payload
    PresenterNotFound,
    /// A collaborator is temporarily unavailable
    ServiceUnavailable,
    /// Internal server error
    InternalError,
}

impl fmt::Display for ActionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::StatementInvalid => write!(f, "statement_invalid"),
            Self::InvalidInput => write!(f, "invalid_input"),
            Self::PresenterNotFound => write!(f, "presenter_not_found"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
            Self::InternalError => write!(f, "internal_error"),
        }
    }
}

impl ActionErrorKind {
    /// Get the HTTP status code for this error kind
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::ValidationFailed | Self::StatementInvalid | Self::InvalidInput => {
                StatusCode::BAD_REQUEST
            }
            Self::PresenterNotFound | Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Structured action error with request context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionError {
    /// The action being performed when the error occurred
    pub action: ActionKind,
    /// The category of error
    pub kind: ActionErrorKind,
    /// Text rendered to the client
    pub message: String,
    /// The resource type involved (e.g., "Order")
    pub entity_type: Option<String>,
    /// The id of the record involved
    pub entity_id: Option<String>,
}

impl ActionError {
    /// Create a new action error
    pub fn new(action: ActionKind, kind: ActionErrorKind, message: impl Into<String>) -> Self {
        Self {
            action,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
        }
    }

    /// Create a "not found" error for a missing record
    ///
    /// ```rust
    /// use acton_actions::handlers::ActionError;
    ///
    /// let error = ActionError::not_found("User", "usr_123");
    /// assert_eq!(error.entity_type, Some("User".to_string()));
    /// ```
    pub fn not_found(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        let entity_type = entity_type.into();
        let entity_id = entity_id.into();
        Self {
            action: ActionKind::Show,
            kind: ActionErrorKind::NotFound,
            message: format!("Couldn't find {entity_type} with 'id'={entity_id}"),
            entity_type: Some(entity_type),
            entity_id: Some(entity_id),
        }
    }

    /// Create a "not found" error with a free-form message
    pub fn missing(action: ActionKind, message: impl Into<String>) -> Self {
        Self::new(action, ActionErrorKind::NotFound, message)
    }

    /// Create an invalid input error
    ///
    /// ```rust
    /// use acton_actions::handlers::{ActionError, ActionErrorKind};
    ///
    /// let error = ActionError::invalid_input("Request body must be a JSON object");
    /// assert_eq!(error.kind.status_code().as_u16(), 400);
    /// ```
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ActionKind::Extract, ActionErrorKind::InvalidInput, message)
    }

    /// Create a validation failed error
    pub fn validation_failed(action: ActionKind, message: impl Into<String>) -> Self {
        Self::new(action, ActionErrorKind::ValidationFailed, message)
    }

    /// Create a presenter-not-found error
    pub fn presenter_not_found(presenter: impl fmt::Display) -> Self {
        Self::new(
            ActionKind::Show,
            ActionErrorKind::PresenterNotFound,
            format!("Presenter {presenter} is not registered"),
        )
    }

    /// Create a service unavailable error
    pub fn service_unavailable(action: ActionKind, message: impl Into<String>) -> Self {
        Self::new(action, ActionErrorKind::ServiceUnavailable, message)
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ActionKind::Perform, ActionErrorKind::InternalError, message)
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

    /// Set the action that caused the error
    #[must_use]
    pub fn with_action(mut self, action: ActionKind) -> Self {
        self.action = action;
        self
    }

    /// HTTP status this error renders with
    pub fn status_code(&self) -> StatusCode {
        self.kind.status_code()
    }

    /// Check if this error is retriable (transient errors that may succeed on retry)
    pub fn is_retriable(&self) -> bool {
        matches!(self.kind, ActionErrorKind::ServiceUnavailable)
    }
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Action {} error during {}: {}",
            self.kind, self.action, self.message
        )?;
        if let (Some(ref entity_type), Some(ref entity_id)) = (&self.entity_type, &self.entity_id) {
            write!(f, " [{}: {}]", entity_type, entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ActionError {}

/// Response body for action errors
#[derive(Debug, Serialize, Deserialize)]
struct ActionErrorResponse {
    error: String,
}

impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        let status = self.kind.status_code();

        if status.is_server_error() {
            tracing::error!(
                action = %self.action,
                kind = %self.kind,
                entity_type = ?self.entity_type,
                entity_id = ?self.entity_id,
                retriable = self.is_retriable(),
                "Action error: {}", self.message
            );
        } else {
            tracing::debug!(
                action = %self.action,
                kind = %self.kind,
                entity_type = ?self.entity_type,
                entity_id = ?self.entity_id,
                "Action rejected: {}", self.message
            );
        }

        let response = ActionErrorResponse {
            error: self.message,
        };

        (status, Json(response)).into_response()
    }
}

fn repository_operation_to_action(op: RepositoryOperation) -> ActionKind {
    match op {
        RepositoryOperation::Find => ActionKind::Show,
        RepositoryOperation::Query => ActionKind::Index,
        RepositoryOperation::Create => ActionKind::Create,
        RepositoryOperation::Update => ActionKind::Update,
        RepositoryOperation::Destroy => ActionKind::Destroy,
    }
}

impl From<RepositoryError> for ActionError {
    fn from(err: RepositoryError) -> Self {
        let action = repository_operation_to_action(err.operation);

        let kind = match err.kind {
            RepositoryErrorKind::NotFound => ActionErrorKind::NotFound,
            RepositoryErrorKind::ValidationFailed => ActionErrorKind::ValidationFailed,
            RepositoryErrorKind::AlreadyExists
            | RepositoryErrorKind::ConstraintViolation
            | RepositoryErrorKind::NotDestroyed
            | RepositoryErrorKind::StatementInvalid => ActionErrorKind::StatementInvalid,
            RepositoryErrorKind::ConnectionFailed | RepositoryErrorKind::Timeout => {
                ActionErrorKind::ServiceUnavailable
            }
            RepositoryErrorKind::SerializationError | RepositoryErrorKind::Other => {
                ActionErrorKind::InternalError
            }
        };

        // Store internals stay in the logs
        let message = match kind {
            ActionErrorKind::ServiceUnavailable => "Service temporarily unavailable".to_string(),
            ActionErrorKind::InternalError => "An internal error occurred".to_string(),
            _ => err.message.clone(),
        };
        if matches!(
            kind,
            ActionErrorKind::ServiceUnavailable | ActionErrorKind::InternalError
        ) {
            tracing::warn!(error = %err, "repository failure hidden from response");
        }

        Self {
            action,
            kind,
            message,
            entity_type: err.entity_type,
            entity_id: err.entity_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_kind_display() {
        assert_eq!(format!("{}", ActionKind::Index), "index");
        assert_eq!(format!("{}", ActionKind::Show), "show");
        assert_eq!(format!("{}", ActionKind::PerformAsync), "perform_async");
    }

    #[test]
    fn test_action_error_kind_status_codes() {
        assert_eq!(ActionErrorKind::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ActionErrorKind::ValidationFailed.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ActionErrorKind::StatementInvalid.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ActionErrorKind::InvalidInput.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ActionErrorKind::PresenterNotFound.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ActionErrorKind::ServiceUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ActionErrorKind::InternalError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_message() {
        let error = ActionError::not_found("Order", "9");
        assert_eq!(error.message, "Couldn't find Order with 'id'=9");
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        assert!(error.to_string().contains("[Order: 9]"));
    }

    #[test]
    fn test_from_repository_not_found() {
        let err = RepositoryError::not_found("Order", "3");
        let action: ActionError = err.into();
        assert_eq!(action.kind, ActionErrorKind::NotFound);
        assert_eq!(action.action, ActionKind::Show);
        assert_eq!(action.message, "Couldn't find Order with 'id'=3");
    }

    #[test]
    fn test_from_repository_statement_errors_keep_message() {
        let cases = [
            RepositoryError::already_exists(RepositoryOperation::Create, "Duplicate code"),
            RepositoryError::constraint_violation(RepositoryOperation::Update, "FK violated"),
            RepositoryError::not_destroyed("Cannot delete record"),
            RepositoryError::statement_invalid(RepositoryOperation::Query, "no such column"),
        ];
        for err in cases {
            let expected = err.message.clone();
            let action: ActionError = err.into();
            assert_eq!(action.kind, ActionErrorKind::StatementInvalid);
            assert_eq!(action.status_code(), StatusCode::BAD_REQUEST);
            assert_eq!(action.message, expected);
        }
    }

    #[test]
    fn test_from_repository_hides_internal_details() {
        let action: ActionError = RepositoryError::connection_failed("tcp reset by 10.0.0.4").into();
        assert_eq!(action.kind, ActionErrorKind::ServiceUnavailable);
        assert_eq!(action.message, "Service temporarily unavailable");
        assert!(action.is_retriable());

        let action: ActionError =
            RepositoryError::serialization_error(RepositoryOperation::Find, "bad row").into();
        assert_eq!(action.kind, ActionErrorKind::InternalError);
        assert_eq!(action.message, "An internal error occurred");
    }

    #[tokio::test]
    async fn test_into_response_body_shape() {
        let response = ActionError::invalid_input("Request body must be a JSON object").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"error": "Request body must be a JSON object"})
        );
    }
}
