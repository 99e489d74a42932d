//! Resource actions over HTTP
//!
//! This module turns requests into calls on a [`RecordStore`] and renders
//! the results through presenters. It is organised in layers:
//!
//! - **Extraction**: [`ActionRequest`] merges path, query and body
//!   parameters; [`RequestContext`] resolves the routing resource, the `id`
//!   and the `type` view once per request
//! - **Parameters**: [`RawParams`], [`ActionParams`] and [`OperationInput`]
//! - **Templates**: [`ResourceController`] implements `create`, `show`,
//!   `index`, `update` and `destroy`, plus `perform` for operations
//! - **Routing**: [`resource_routes`] and [`operation_route`] mount the
//!   templates on an axum router
//! - **Errors**: [`ActionError`] maps store and input failures to
//!   `{"error": ...}` responses
//!
//! [`RecordStore`]: crate::repository::RecordStore

mod context;
mod error;
mod extract;
pub mod params;
mod routes;
mod templates;

pub use context::RequestContext;
pub use error::{ActionError, ActionErrorKind, ActionKind};
pub use extract::ActionRequest;
pub use params::{ActionParams, InputShape, OperationInput, RawParams, ROUTING_KEYS};
pub use routes::{operation_route, resource_routes, Dispatch};
pub use templates::{CreateOptions, ResourceController};
