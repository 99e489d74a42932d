//! Running operations from an action and rendering their outcome

use std::fmt;
use std::sync::Arc;

use axum::http::StatusCode;

use super::{Fault, Operation, Payload};
use crate::handlers::params::{ActionParams, OperationInput};
use crate::handlers::{ActionError, ActionKind, ResourceController};
use crate::jobs::OperationJob;
use crate::outcome::Outcome;
use crate::presenters::{Presentable, Presenter, ViewType};
use crate::repository::RecordStore;
use crate::responses::{Renderer, Rendered};

/// Continuation receiving the raw success payload
pub type SuccessHandler =
    Box<dyn FnOnce(Payload, &Renderer) -> Result<Rendered, ActionError> + Send>;

/// Continuation receiving the raw failure fault
pub type FailureHandler = Box<dyn FnOnce(Fault, &Renderer) -> Result<Rendered, ActionError> + Send>;

/// How to run an operation and render its outcome
///
/// Everything is optional: without input the request derives it, without
/// handlers the default rendering applies.
#[derive(Default)]
pub struct PerformOptions {
    /// Explicit input instead of the request-derived one
    pub input: Option<OperationInput>,
    /// Presenter for record and JSON payloads
    pub presenter: Option<Arc<dyn Presenter>>,
    /// View passed to the presenter
    pub view: Option<ViewType>,
    /// Replaces the default success rendering
    pub on_success: Option<SuccessHandler>,
    /// Replaces the default failure rendering
    pub on_failure: Option<FailureHandler>,
}

impl fmt::Debug for PerformOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerformOptions")
            .field("input", &self.input)
            .field("presenter", &self.presenter.is_some())
            .field("view", &self.view)
            .field("on_success", &self.on_success.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .finish()
    }
}

impl PerformOptions {
    /// Options with every default
    pub fn new() -> Self {
        Self::default()
    }

    /// Use explicit input
    #[must_use]
    pub fn input(mut self, input: impl Into<OperationInput>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Render payloads with a specific presenter
    #[must_use]
    pub fn presenter(mut self, presenter: impl Presenter + 'static) -> Self {
        self.presenter = Some(Arc::new(presenter));
        self
    }

    /// Render payloads with a specific view
    #[must_use]
    pub fn view(mut self, view: impl Into<ViewType>) -> Self {
        self.view = Some(view.into());
        self
    }

    /// Replace the success rendering
    #[must_use]
    pub fn on_success<F>(mut self, handler: F) -> Self
    where
        F: FnOnce(Payload, &Renderer) -> Result<Rendered, ActionError> + Send + 'static,
    {
        self.on_success = Some(Box::new(handler));
        self
    }

    /// Replace the failure rendering
    #[must_use]
    pub fn on_failure<F>(mut self, handler: F) -> Self
    where
        F: FnOnce(Fault, &Renderer) -> Result<Rendered, ActionError> + Send + 'static,
    {
        self.on_failure = Some(Box::new(handler));
        self
    }
}

/// Default success rendering
///
/// Messages render as `{"message": ...}`, JSON values as-is unless a
/// presenter is given, records and collections through their presenter.
pub fn render_payload(
    renderer: &Renderer,
    payload: Payload,
    presenter: Option<&Arc<dyn Presenter>>,
    view: Option<&ViewType>,
) -> Result<Rendered, ActionError> {
    match payload {
        Payload::Message(text) => Ok(renderer.message(text, StatusCode::OK)),
        Payload::Json(value) if presenter.is_none() => Ok(renderer.json(value, StatusCode::OK)),
        Payload::Json(value) => {
            renderer.record(Presentable::Value(&value), presenter, view, StatusCode::OK)
        }
        Payload::Record(record) => {
            renderer.record(Presentable::Record(&record), presenter, view, StatusCode::OK)
        }
        Payload::Collection(records) => renderer.record(
            Presentable::Collection(&records),
            presenter,
            view,
            StatusCode::OK,
        ),
    }
}

/// Default failure rendering: always a 400 `{"error": ...}`
pub fn render_fault(renderer: &Renderer, fault: Fault) -> Rendered {
    match fault {
        Fault::Message(text) => renderer.error(text, StatusCode::BAD_REQUEST),
        Fault::Invalid(record) => renderer.validation_errors(record.errors()),
        Fault::Errors(errors) => renderer.validation_errors(&errors),
    }
}

impl<S: RecordStore> ResourceController<S> {
    /// Run an operation and render its outcome
    pub async fn perform(
        &self,
        operation: &dyn Operation,
        options: PerformOptions,
    ) -> Result<Rendered, ActionError> {
        let PerformOptions {
            input,
            presenter,
            view,
            on_success,
            on_failure,
        } = options;

        let input = match input {
            Some(input) => input,
            None => self.operation_input().await?,
        };
        let input = input.conform(operation.input_shape(), operation.name())?;

        let outcome = operation.call(input).await;
        let renderer = self.renderer();
        match outcome {
            Outcome::Success(payload) => {
                tracing::debug!(operation = operation.name(), payload = payload.kind(), "operation succeeded");
                match on_success {
                    Some(handler) => handler(payload, &renderer),
                    None => render_payload(&renderer, payload, presenter.as_ref(), view.as_ref()),
                }
            }
            Outcome::Failure(fault) => {
                tracing::debug!(operation = operation.name(), fault = fault.kind(), "operation failed");
                match on_failure {
                    Some(handler) => handler(fault, &renderer),
                    None => Ok(render_fault(&renderer, fault)),
                }
            }
        }
    }

    /// Run a registered operation by name
    pub async fn perform_named(
        &self,
        name: &str,
        options: PerformOptions,
    ) -> Result<Rendered, ActionError> {
        let operation = self.state.operations().require(name)?;
        self.perform(operation.as_ref(), options).await
    }

    /// Run an operation with both continuations supplied
    pub async fn perform_with<F, G>(
        &self,
        operation: &dyn Operation,
        input: Option<OperationInput>,
        success: F,
        failure: G,
    ) -> Result<Rendered, ActionError>
    where
        F: FnOnce(Payload, &Renderer) -> Result<Rendered, ActionError> + Send + 'static,
        G: FnOnce(Fault, &Renderer) -> Result<Rendered, ActionError> + Send + 'static,
    {
        let options = PerformOptions {
            input,
            ..PerformOptions::default()
        }
        .on_success(success)
        .on_failure(failure);
        self.perform(operation, options).await
    }

    /// Queue an operation and acknowledge immediately
    ///
    /// The job carries `params`, or every action parameter when `None`.
    /// The result is never observed by this request.
    pub async fn perform_async(
        &self,
        operation: &str,
        params: Option<ActionParams>,
    ) -> Result<Rendered, ActionError> {
        let params = params.unwrap_or_else(|| self.action_params().clone());
        let job = OperationJob::new(operation, params);

        match self.state.jobs().enqueue(job).await {
            Ok(job_id) => {
                tracing::info!(operation = operation, job_id = %job_id, "operation queued");
                Ok(self.renderer().message(
                    self.state.config().actions.queued_message.clone(),
                    StatusCode::OK,
                ))
            }
            Err(e) => {
                tracing::error!(operation = operation, error = %e, "failed to queue operation");
                Err(ActionError::service_unavailable(
                    ActionKind::PerformAsync,
                    "Operation could not be queued",
                ))
            }
        }
    }
}
