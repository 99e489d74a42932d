//! Response rendering for actions and operations
//!
//! Every action ends in a [`Rendered`] value: a status code and a JSON body.
//! The [`Renderer`] produces the four body shapes the action layer emits:
//!
//! - presenter output for records, collections and values (200 or 201)
//! - `{"message": text}`
//! - `{"error": text}` (400 for rejections, 404 for missing records)
//! - a raw JSON value
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use acton_actions::presenters::PresenterRegistry;
//! use acton_actions::responses::Renderer;
//! use axum::http::StatusCode;
//! use serde_json::json;
//!
//! let renderer = Renderer::new(Arc::new(PresenterRegistry::new()), None);
//!
//! let rendered = renderer.message("destroyed", StatusCode::OK);
//! assert_eq!(rendered.body(), &json!({"message": "destroyed"}));
//!
//! let rendered = renderer.not_found("Couldn't find Order with 'id'=9");
//! assert_eq!(rendered.status(), StatusCode::NOT_FOUND);
//! ```

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::handlers::ActionError;
use crate::presenters::{Presentable, Presenter, PresenterRegistry, ViewType};
use crate::repository::FieldErrors;
use crate::resource::ResourceType;

/// A finished response: status plus JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    status: StatusCode,
    body: Value,
}

impl Rendered {
    /// Create a rendered response
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    /// 200 OK with a body
    pub fn ok(body: Value) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// Response status
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response body
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Consume into status and body
    pub fn into_parts(self) -> (StatusCode, Value) {
        (self.status, self.body)
    }
}

impl IntoResponse for Rendered {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Turns payloads, messages and errors into [`Rendered`] responses
///
/// Holds the presenter registry and the resource resolved from the request
/// route, which takes part in presenter resolution.
#[derive(Debug, Clone)]
pub struct Renderer {
    presenters: Arc<PresenterRegistry>,
    resource: Option<ResourceType>,
}

impl Renderer {
    /// Create a renderer for one request
    pub fn new(presenters: Arc<PresenterRegistry>, resource: Option<ResourceType>) -> Self {
        Self {
            presenters,
            resource,
        }
    }

    /// Routing resource of the request, if any
    pub fn resource(&self) -> Option<&ResourceType> {
        self.resource.as_ref()
    }

    /// Render through a presenter
    ///
    /// Fails only when no presenter can be resolved.
    pub fn record(
        &self,
        item: Presentable<'_>,
        presenter: Option<&Arc<dyn Presenter>>,
        view: Option<&ViewType>,
        status: StatusCode,
    ) -> Result<Rendered, ActionError> {
        let body = self
            .presenters
            .present(item, presenter, self.resource.as_ref(), view)?;
        Ok(Rendered::new(status, body))
    }

    /// `{"message": text}`
    pub fn message(&self, text: impl Into<String>, status: StatusCode) -> Rendered {
        Rendered::new(status, json!({ "message": text.into() }))
    }

    /// `{"error": text}`
    pub fn error(&self, text: impl Into<String>, status: StatusCode) -> Rendered {
        Rendered::new(status, json!({ "error": text.into() }))
    }

    /// Validation messages joined into one sentence, 400
    pub fn validation_errors(&self, errors: &FieldErrors) -> Rendered {
        self.error(errors.to_sentence(), StatusCode::BAD_REQUEST)
    }

    /// `{"error": message}` with 404
    pub fn not_found(&self, message: impl Into<String>) -> Rendered {
        self.error(message, StatusCode::NOT_FOUND)
    }

    /// The value itself as the body
    pub fn json(&self, value: Value, status: StatusCode) -> Rendered {
        Rendered::new(status, value)
    }
}
