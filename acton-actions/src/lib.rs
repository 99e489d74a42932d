//! # acton-actions
//!
//! Reusable resource action templates for axum services: create, show,
//! index, update and destroy over a pluggable record store, operations with
//! an explicit success/failure contract, and presenter-based rendering.
//!
//! ## Features
//!
//! - **Action templates**: CRUD flows with consistent status codes and
//!   `{"message"}` / `{"error"}` bodies
//! - **Operations**: named business logic returning an [`Outcome`], run
//!   inline or queued as background jobs
//! - **Presenters**: per-resource JSON shaping with named views, resolved
//!   by resource type
//! - **Configuration**: figment layering of defaults, TOML files and
//!   `ACTON_` environment variables
//! - **Graceful shutdown**: SIGTERM / SIGINT handling with request draining
//!
//! ## Example
//!
//! ```rust,no_run
//! use acton_actions::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let order = ResourceType::new("Order");
//!     let state = ActionsState::builder(InMemoryStore::new())
//!         .config(config.clone())
//!         .resources(ResourceRegistry::new().with(order.clone()))
//!         .presenters(PresenterRegistry::new().with(
//!             &order,
//!             EntityPresenter::new()
//!                 .view("summary", ["name"])
//!                 .view("full", ["name", "status"])
//!                 .default_view("summary"),
//!         ))
//!         .build()?;
//!
//!     let app = Router::new()
//!         .merge(resource_routes::<InMemoryStore>("orders"))
//!         .with_state(state);
//!
//!     Server::new(config).serve(app).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! [`Outcome`]: outcome::Outcome

pub mod config;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod observability;
pub mod operations;
pub mod outcome;
pub mod presenters;
pub mod repository;
pub mod resource;
pub mod responses;
pub mod server;
pub mod state;

#[cfg(test)]
mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ActionsConfig, Config, JobsConfig, ServiceConfig};
    pub use crate::error::{Error, Result};
    pub use crate::handlers::{
        operation_route, resource_routes, ActionError, ActionErrorKind, ActionKind, ActionParams,
        ActionRequest, CreateOptions, Dispatch, InputShape, OperationInput, RawParams,
        RequestContext, ResourceController,
    };
    pub use crate::jobs::{JobError, JobQueue, JobStatus, LocalJobQueue, OperationJob};
    pub use crate::observability::init_tracing;
    pub use crate::operations::{
        Fault, FnOperation, Operation, OperationRegistry, OperationResult, Payload, PerformOptions,
    };
    pub use crate::outcome::Outcome;
    pub use crate::presenters::{
        EntityPresenter, Presentable, Presenter, PresenterRegistry, ViewType,
    };
    pub use crate::repository::{
        FieldError, FieldErrors, InMemoryStore, Record, RecordId, RecordStore, RepositoryError,
        RepositoryErrorKind,
    };
    pub use crate::resource::{ResourceRegistry, ResourceType};
    pub use crate::responses::{Rendered, Renderer};
    pub use crate::server::Server;
    pub use crate::state::{ActionsState, ActionsStateBuilder};

    pub use axum::{
        extract::State,
        routing::{get, post},
        Json, Router,
    };
    pub use serde::{Deserialize, Serialize};
    pub use tokio;
}
