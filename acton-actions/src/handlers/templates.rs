//! Resource action templates
//!
//! [`ResourceController`] is built once per request (see
//! [`ActionsState::controller`](crate::state::ActionsState::controller)) and
//! offers the five CRUD flows as reusable templates:
//!
//! | template  | success                         | failure                     |
//! |-----------|---------------------------------|-----------------------------|
//! | `create`  | 201 + presenter body            | 400 validation sentence     |
//! | `show`    | 200 + presenter body (`full`)   | 404                         |
//! | `index`   | 200 + presenter collection      |                             |
//! | `update`  | 200 + presenter body            | 404 / 400 validation        |
//! | `destroy` | 200 `{"message": "destroyed"}`  | 404 / 400 validation        |
//!
//! Store errors propagate with `?` and render through
//! [`ActionError`](super::ActionError).

use axum::http::StatusCode;
use serde_json::{Map, Value};

use super::context::RequestContext;
use super::error::{ActionError, ActionKind};
use super::params::{ActionParams, OperationInput};
use crate::outcome::Outcome;
use crate::presenters::{Presentable, ViewType};
use crate::repository::{Record, RecordStore};
use crate::resource::ResourceType;
use crate::responses::{Renderer, Rendered};
use crate::state::ActionsState;

/// Options for the create template
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Attributes for the new record; the action parameters when `None`
    pub attributes: Option<Map<String, Value>>,
    /// View to render the created record with; the request view when `None`
    pub view: Option<ViewType>,
}

/// Per-request controller: resolved context plus shared state
pub struct ResourceController<S> {
    pub(crate) state: ActionsState<S>,
    pub(crate) ctx: RequestContext,
}

impl<S: RecordStore> ResourceController<S> {
    /// Create a controller from shared state and a request context
    pub fn new(state: ActionsState<S>, ctx: RequestContext) -> Self {
        Self { state, ctx }
    }

    /// Shared state
    pub fn state(&self) -> &ActionsState<S> {
        &self.state
    }

    /// Request context
    pub fn context(&self) -> &RequestContext {
        &self.ctx
    }

    /// Parameters without routing keys
    pub fn action_params(&self) -> &ActionParams {
        self.ctx.params()
    }

    /// Renderer bound to this request's resource
    pub fn renderer(&self) -> Renderer {
        Renderer::new(
            std::sync::Arc::clone(self.state.presenters()),
            self.ctx.resource().cloned(),
        )
    }

    /// The routing resource, or `NotFound` when the route names none
    pub fn resource(&self) -> Result<&ResourceType, ActionError> {
        self.ctx.resource().ok_or_else(|| {
            ActionError::missing(
                ActionKind::Show,
                format!(
                    "No resource is routed to {}",
                    self.ctx.matched_path().unwrap_or("this endpoint")
                ),
            )
        })
    }

    /// Load the record named by `id` from the routing resource
    pub async fn find_record(&self) -> Result<Record, ActionError> {
        let resource = self.resource()?.clone();
        self.find_record_in(&resource).await
    }

    async fn find_record_for(&self, action: ActionKind) -> Result<Record, ActionError> {
        self.find_record().await.map_err(|e| e.with_action(action))
    }

    /// Load the record named by `id` from a specific resource type
    pub async fn find_record_in(&self, resource: &ResourceType) -> Result<Record, ActionError> {
        let Some(id) = self.ctx.id() else {
            return Err(ActionError::missing(
                ActionKind::Show,
                format!("Couldn't find {} without an ID", resource.name()),
            ));
        };
        self.state
            .store()
            .find(resource, id)
            .await?
            .ok_or_else(|| ActionError::not_found(resource.name(), id.as_str()))
    }

    /// Derive operation input from the request
    ///
    /// With an `id` parameter the record is loaded and the remaining
    /// parameters ride along; without one the parameters are the input.
    pub async fn operation_input(&self) -> Result<OperationInput, ActionError> {
        let mut params = self.action_params().clone();
        if params.remove("id").is_none() {
            return Ok(OperationInput::Params(params));
        }
        let record = self.find_record_for(ActionKind::Perform).await?;
        Ok(OperationInput::for_record(record, params))
    }

    /// Build a record from attributes, persist it and render it with 201
    ///
    /// Renders with the explicit view, else the requested `type` view, else
    /// the presenter default.
    pub async fn create(&self, options: CreateOptions) -> Result<Rendered, ActionError> {
        let resource = self
            .resource()
            .map_err(|e| e.with_action(ActionKind::Create))?
            .clone();
        let attributes = options
            .attributes
            .unwrap_or_else(|| self.action_params().clone().into_map());

        let outcome = self
            .state
            .store()
            .create(&resource, attributes)
            .await
            .map_err(|e| ActionError::from(e).with_action(ActionKind::Create))?;

        let renderer = self.renderer();
        match outcome {
            Outcome::Success(record) => {
                tracing::debug!(resource = %resource, action = "create", id = ?record.id(), "record created");
                renderer.record(
                    Presentable::Record(&record),
                    None,
                    options.view.as_ref().or(self.ctx.view()),
                    StatusCode::CREATED,
                )
            }
            Outcome::Failure(record) => {
                tracing::debug!(resource = %resource, action = "create", errors = record.errors().len(), "record rejected");
                Ok(renderer.validation_errors(record.errors()))
            }
        }
    }

    /// Render the record named by `id`
    ///
    /// Uses the requested `type` view, or the configured show view.
    pub async fn show(&self) -> Result<Rendered, ActionError> {
        let record = self.find_record().await?;
        let default_view = ViewType::new(self.state.config().actions.show_view.clone());
        let view = self.ctx.view().unwrap_or(&default_view);

        self.renderer()
            .record(Presentable::Record(&record), None, Some(view), StatusCode::OK)
    }

    /// Query the collection with the full action parameters and render it
    pub async fn index(&self) -> Result<Rendered, ActionError> {
        let resource = self
            .resource()
            .map_err(|e| e.with_action(ActionKind::Index))?
            .clone();
        let records = self
            .state
            .store()
            .query(&resource, self.action_params())
            .await
            .map_err(|e| ActionError::from(e).with_action(ActionKind::Index))?;

        tracing::debug!(resource = %resource, action = "index", count = records.len(), "collection loaded");
        self.renderer().record(
            Presentable::Collection(&records),
            None,
            self.ctx.view(),
            StatusCode::OK,
        )
    }

    /// Apply the action parameters to the record named by `id`
    pub async fn update(&self, view: Option<ViewType>) -> Result<Rendered, ActionError> {
        let record = self.find_record_for(ActionKind::Update).await?;
        let outcome = self
            .state
            .store()
            .update(record, self.action_params())
            .await
            .map_err(|e| ActionError::from(e).with_action(ActionKind::Update))?;

        let renderer = self.renderer();
        match outcome {
            Outcome::Success(record) => renderer.record(
                Presentable::Record(&record),
                None,
                view.as_ref(),
                StatusCode::OK,
            ),
            Outcome::Failure(record) => Ok(renderer.validation_errors(record.errors())),
        }
    }

    /// Remove the record named by `id`
    pub async fn destroy(&self) -> Result<Rendered, ActionError> {
        let record = self.find_record_for(ActionKind::Destroy).await?;
        let outcome = self
            .state
            .store()
            .destroy(record)
            .await
            .map_err(|e| ActionError::from(e).with_action(ActionKind::Destroy))?;

        let renderer = self.renderer();
        match outcome {
            Outcome::Success(record) => {
                tracing::debug!(resource = %record.resource(), action = "destroy", id = ?record.id(), "record destroyed");
                Ok(renderer.message(
                    self.state.config().actions.destroyed_message.clone(),
                    StatusCode::OK,
                ))
            }
            Outcome::Failure(record) => Ok(renderer.validation_errors(record.errors())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::params::{InputShape, RawParams};
    use crate::handlers::ActionErrorKind;
    use crate::testing::{fixture, seed_order, Fixture};
    use serde_json::json;

    fn controller(fx: &Fixture, path: &str, raw: Value) -> ResourceController<crate::repository::InMemoryStore> {
        let raw = RawParams::from_map(raw.as_object().cloned().unwrap_or_default());
        let ctx = RequestContext::new(fx.state.resources(), Some(path), raw);
        ResourceController::new(fx.state.clone(), ctx)
    }

    #[tokio::test]
    async fn test_create_renders_created_record() {
        let fx = fixture();
        let rendered = controller(&fx, "/orders", json!({"name": "Widget", "total": 5}))
            .create(CreateOptions::default())
            .await
            .unwrap();

        assert_eq!(rendered.status(), StatusCode::CREATED);
        assert_eq!(rendered.body(), &json!({"id": "1", "name": "Widget"}));
    }

    #[tokio::test]
    async fn test_create_with_explicit_attributes_and_view() {
        let fx = fixture();
        let mut attrs = Map::new();
        attrs.insert("name".into(), json!("Explicit"));
        attrs.insert("total".into(), json!(9));

        let rendered = controller(&fx, "/orders", json!({"name": "ignored"}))
            .create(CreateOptions {
                attributes: Some(attrs),
                view: Some(ViewType::FULL),
            })
            .await
            .unwrap();
        assert_eq!(
            rendered.body(),
            &json!({"id": "1", "name": "Explicit", "status": null, "total": 9})
        );
    }

    #[tokio::test]
    async fn test_created_body_matches_show_body() {
        let fx = fixture();
        let created = controller(&fx, "/orders", json!({"name": "Widget", "total": 7}))
            .create(CreateOptions {
                attributes: None,
                view: Some(ViewType::FULL),
            })
            .await
            .unwrap();
        let id = created.body()["id"].clone();

        let shown = controller(&fx, "/orders/{id}", json!({"id": id, "type": "full"}))
            .show()
            .await
            .unwrap();
        assert_eq!(created.body(), shown.body());
    }

    #[tokio::test]
    async fn test_create_uses_requested_view() {
        let fx = fixture();
        let rendered = controller(&fx, "/orders", json!({"name": "W", "type": "full"}))
            .create(CreateOptions::default())
            .await
            .unwrap();
        assert_eq!(
            rendered.body(),
            &json!({"id": "1", "name": "W", "status": null, "total": null})
        );
    }

    #[tokio::test]
    async fn test_create_validation_failure() {
        let fx = fixture();
        let rendered = controller(&fx, "/orders", json!({"total": 5}))
            .create(CreateOptions::default())
            .await
            .unwrap();

        assert_eq!(rendered.status(), StatusCode::BAD_REQUEST);
        assert_eq!(rendered.body(), &json!({"error": "Name can't be blank"}));
    }

    #[tokio::test]
    async fn test_show_defaults_to_full_and_honours_type() {
        let fx = fixture();
        seed_order(&fx, json!({"name": "A", "status": "open", "total": 3}));

        let full = controller(&fx, "/orders/{id}", json!({"id": "1"}))
            .show()
            .await
            .unwrap();
        assert_eq!(
            full.body(),
            &json!({"id": "1", "name": "A", "status": "open", "total": 3})
        );

        let summary = controller(&fx, "/orders/{id}", json!({"id": "1", "type": "summary"}))
            .show()
            .await
            .unwrap();
        assert_eq!(summary.body(), &json!({"id": "1", "name": "A"}));
    }

    #[tokio::test]
    async fn test_show_missing_record() {
        let fx = fixture();
        let err = controller(&fx, "/orders/{id}", json!({"id": "42"}))
            .show()
            .await
            .unwrap_err();
        assert_eq!(err.kind, ActionErrorKind::NotFound);
        assert_eq!(err.message, "Couldn't find Order with 'id'=42");
    }

    #[tokio::test]
    async fn test_show_without_id() {
        let fx = fixture();
        let err = controller(&fx, "/orders", json!({})).show().await.unwrap_err();
        assert_eq!(err.message, "Couldn't find Order without an ID");
    }

    #[tokio::test]
    async fn test_unrouted_resource() {
        let fx = fixture();
        let err = controller(&fx, "/health", json!({}))
            .index()
            .await
            .unwrap_err();
        assert_eq!(err.kind, ActionErrorKind::NotFound);
        assert_eq!(err.message, "No resource is routed to /health");
    }

    #[tokio::test]
    async fn test_index_filters_and_uses_default_view() {
        let fx = fixture();
        seed_order(&fx, json!({"name": "A", "status": "open"}));
        seed_order(&fx, json!({"name": "B", "status": "closed"}));

        let rendered = controller(&fx, "/orders", json!({"status": "open"}))
            .index()
            .await
            .unwrap();
        assert_eq!(rendered.body(), &json!([{"id": "1", "name": "A"}]));

        let rendered = controller(&fx, "/orders", json!({"type": "full"}))
            .index()
            .await
            .unwrap();
        assert_eq!(rendered.body().as_array().map(Vec::len), Some(2));
        assert_eq!(rendered.body()[1]["status"], json!("closed"));
    }

    #[tokio::test]
    async fn test_update_success_and_failure() {
        let fx = fixture();
        seed_order(&fx, json!({"name": "A"}));

        let ok = controller(&fx, "/orders/{id}", json!({"id": "1", "name": "B"}))
            .update(None)
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(ok.body(), &json!({"id": "1", "name": "B"}));

        let bad = controller(&fx, "/orders/{id}", json!({"id": "1", "name": ""}))
            .update(None)
            .await
            .unwrap();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
        assert_eq!(bad.body(), &json!({"error": "Name can't be blank"}));
    }

    #[tokio::test]
    async fn test_destroy_success_and_guard() {
        let fx = fixture();
        seed_order(&fx, json!({"name": "A"}));
        seed_order(&fx, json!({"name": "B", "locked": true}));

        let ok = controller(&fx, "/orders/{id}", json!({"id": "1"}))
            .destroy()
            .await
            .unwrap();
        assert_eq!(ok.body(), &json!({"message": "destroyed"}));

        let blocked = controller(&fx, "/orders/{id}", json!({"id": "2"}))
            .destroy()
            .await
            .unwrap();
        assert_eq!(blocked.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            blocked.body(),
            &json!({"error": "Cannot delete record because it is locked"})
        );
    }

    #[tokio::test]
    async fn test_lookup_misses_report_the_calling_action() {
        let fx = fixture();
        let path = "/orders/{id}";

        let err = controller(&fx, path, json!({"id": "7"})).show().await.unwrap_err();
        assert_eq!(err.action, ActionKind::Show);
        let err = controller(&fx, path, json!({"id": "7", "name": "B"}))
            .update(None)
            .await
            .unwrap_err();
        assert_eq!(err.action, ActionKind::Update);
        let err = controller(&fx, path, json!({"id": "7"})).destroy().await.unwrap_err();
        assert_eq!(err.action, ActionKind::Destroy);
        assert_eq!(err.message, "Couldn't find Order with 'id'=7");
        let err = controller(&fx, "/orders/{id}/cancel", json!({"id": "7"}))
            .operation_input()
            .await
            .unwrap_err();
        assert_eq!(err.action, ActionKind::Perform);
        let err = controller(&fx, "/health", json!({}))
            .index()
            .await
            .unwrap_err();
        assert_eq!(err.action, ActionKind::Index);
    }

    #[tokio::test]
    async fn test_duplicate_code_is_statement_invalid() {
        let fx = fixture();
        seed_order(&fx, json!({"name": "A", "code": "X"}));

        let err = controller(&fx, "/orders", json!({"name": "B", "code": "X"}))
            .create(CreateOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ActionErrorKind::StatementInvalid);
        assert_eq!(err.action, ActionKind::Create);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_operation_input_shapes() {
        let fx = fixture();
        seed_order(&fx, json!({"name": "A"}));

        let input = controller(&fx, "/orders", json!({"q": "x", "type": "full"}))
            .operation_input()
            .await
            .unwrap();
        assert_eq!(input.shape(), InputShape::Params);
        assert_eq!(Value::Object(input.into_map()), json!({"q": "x"}));

        let input = controller(&fx, "/orders/{id}/cancel", json!({"id": "1"}))
            .operation_input()
            .await
            .unwrap();
        assert_eq!(input.shape(), InputShape::Record);

        let input = controller(&fx, "/orders/{id}/cancel", json!({"id": "1", "reason": "late"}))
            .operation_input()
            .await
            .unwrap();
        assert_eq!(
            Value::Object(input.into_map()),
            json!({"order": {"id": "1", "name": "A"}, "params": {"reason": "late"}})
        );

        let err = controller(&fx, "/orders/{id}/cancel", json!({"id": "9"}))
            .operation_input()
            .await
            .unwrap_err();
        assert_eq!(err.kind, ActionErrorKind::NotFound);
    }
}
