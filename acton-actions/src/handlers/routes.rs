//! Router builders for resource templates and operation endpoints
//!
//! # Example
//!
//! ```rust,ignore
//! use acton_actions::prelude::*;
//!
//! let app = Router::new()
//!     .merge(resource_routes::<InMemoryStore>("orders"))
//!     .merge(operation_route::<InMemoryStore>("/orders/{id}/cancel", "cancel", Dispatch::Sync))
//!     .merge(operation_route::<InMemoryStore>("/reports", "build_report", Dispatch::Async))
//!     .with_state(state);
//! ```

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};

use super::error::ActionError;
use super::extract::ActionRequest;
use super::templates::CreateOptions;
use crate::operations::PerformOptions;
use crate::repository::RecordStore;
use crate::responses::Rendered;
use crate::state::ActionsState;

/// How an operation endpoint runs its operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dispatch {
    /// Run within the request and render the outcome
    #[default]
    Sync,
    /// Queue a job and acknowledge immediately
    Async,
}

/// Mount the five resource templates for a collection
///
/// `GET/POST /<collection>` and `GET/PATCH/PUT/DELETE /<collection>/{id}`.
pub fn resource_routes<S: RecordStore>(collection: &str) -> Router<ActionsState<S>> {
    Router::new()
        .route(&format!("/{collection}"), get(index::<S>).post(create::<S>))
        .route(
            &format!("/{collection}/{{id}}"),
            get(show::<S>)
                .patch(update::<S>)
                .put(update::<S>)
                .delete(destroy::<S>),
        )
}

/// Mount a POST endpoint running a registered operation
pub fn operation_route<S: RecordStore>(
    path: &str,
    operation: impl Into<String>,
    dispatch: Dispatch,
) -> Router<ActionsState<S>> {
    let operation: String = operation.into();
    Router::new().route(
        path,
        post(
            move |State(state): State<ActionsState<S>>, request: ActionRequest| {
                let operation = operation.clone();
                async move {
                    let controller = state.controller(request);
                    match dispatch {
                        Dispatch::Sync => {
                            controller
                                .perform_named(&operation, PerformOptions::default())
                                .await
                        }
                        Dispatch::Async => controller.perform_async(&operation, None).await,
                    }
                }
            },
        ),
    )
}

async fn index<S: RecordStore>(
    State(state): State<ActionsState<S>>,
    request: ActionRequest,
) -> Result<Rendered, ActionError> {
    state.controller(request).index().await
}

async fn show<S: RecordStore>(
    State(state): State<ActionsState<S>>,
    request: ActionRequest,
) -> Result<Rendered, ActionError> {
    state.controller(request).show().await
}

async fn create<S: RecordStore>(
    State(state): State<ActionsState<S>>,
    request: ActionRequest,
) -> Result<Rendered, ActionError> {
    state
        .controller(request)
        .create(CreateOptions::default())
        .await
}

async fn update<S: RecordStore>(
    State(state): State<ActionsState<S>>,
    request: ActionRequest,
) -> Result<Rendered, ActionError> {
    state.controller(request).update(None).await
}

async fn destroy<S: RecordStore>(
    State(state): State<ActionsState<S>>,
    request: ActionRequest,
) -> Result<Rendered, ActionError> {
    state.controller(request).destroy().await
}
