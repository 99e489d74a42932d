//! Shared test fixtures: an `Order` resource with rules, presenter and
//! operations wired into a state backed by a recording job queue.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::handlers::params::{InputShape, OperationInput};
use crate::jobs::{JobError, JobQueue, OperationJob};
use crate::operations::{Fault, FnOperation, OperationRegistry, Payload};
use crate::outcome::Outcome;
use crate::presenters::{EntityPresenter, PresenterRegistry};
use crate::repository::{FieldErrors, InMemoryStore, Record};
use crate::resource::{ResourceRegistry, ResourceType};
use crate::state::ActionsState;

/// Job queue that records jobs instead of running them
#[derive(Default)]
pub(crate) struct RecordingQueue {
    pub(crate) jobs: Mutex<Vec<OperationJob>>,
    pub(crate) closed: bool,
}

#[async_trait]
impl JobQueue for RecordingQueue {
    async fn enqueue(&self, job: OperationJob) -> Result<Uuid, JobError> {
        if self.closed {
            return Err(JobError::Closed);
        }
        let id = job.id;
        self.jobs
            .lock()
            .map_err(|e| JobError::Transport(e.to_string()))?
            .push(job);
        Ok(id)
    }
}

pub(crate) struct Fixture {
    pub(crate) state: ActionsState<InMemoryStore>,
    pub(crate) queue: Arc<RecordingQueue>,
    pub(crate) order: ResourceType,
}

pub(crate) fn order() -> ResourceType {
    ResourceType::new("Order")
}

fn store(order: &ResourceType) -> InMemoryStore {
    InMemoryStore::new()
        .with_validator(order, |record: &Record| {
            let mut errors = FieldErrors::new();
            let blank = record
                .get("name")
                .and_then(Value::as_str)
                .map_or(true, str::is_empty);
            if blank {
                errors.add("name", "can't be blank");
            }
            errors
        })
        .with_unique(order, "code")
        .with_destroy_guard(order, |record: &Record| {
            (record.get("locked") == Some(&json!(true)))
                .then(|| "Cannot delete record because it is locked".to_string())
        })
        .with_filters(order, ["status"])
}

fn operations() -> OperationRegistry {
    let mut registry = OperationRegistry::new();
    let ops = [
        FnOperation::new("echo", InputShape::Params, |input: OperationInput| async move {
            Outcome::Success(Payload::Json(Value::Object(input.into_map())))
        }),
        FnOperation::new("greet", InputShape::Params, |input: OperationInput| async move {
            match input.params().and_then(|p| p.get("name")).and_then(Value::as_str) {
                Some(name) => Outcome::Success(Payload::message(format!("Hello {name}"))),
                None => Outcome::Failure(Fault::message("Name is required")),
            }
        }),
        FnOperation::new("cancel", InputShape::Record, |input: OperationInput| async move {
            let Some(mut record) = input.record().cloned() else {
                return Outcome::Failure(Fault::message("Nothing to cancel"));
            };
            if record.get("status") == Some(&json!("shipped")) {
                record.errors_mut().add("status", "is already shipped");
                return Outcome::Failure(Fault::Invalid(record));
            }
            record
                .attributes_mut()
                .insert("status".to_string(), json!("cancelled"));
            Outcome::Success(Payload::Record(record))
        }),
        FnOperation::new("audit", InputShape::Any, |_input: OperationInput| async move {
            let mut errors = FieldErrors::new();
            errors.add("total", "must be positive");
            errors.add(FieldErrors::BASE, "Audit failed");
            Outcome::Failure(Fault::Errors(errors))
        }),
    ];
    for op in ops {
        if let Err(e) = registry.register(op) {
            panic!("fixture operation: {e}");
        }
    }
    registry
}

fn build(queue: Arc<RecordingQueue>) -> Fixture {
    let order = order();
    let presenter = EntityPresenter::new()
        .view("summary", ["name"])
        .view("full", ["name", "status", "total"])
        .default_view("summary");

    let state = ActionsState::builder(store(&order))
        .resources(ResourceRegistry::new().with(order.clone()))
        .presenters(PresenterRegistry::new().with(&order, presenter))
        .operations(operations())
        .jobs(Arc::clone(&queue) as Arc<dyn JobQueue>)
        .build()
        .unwrap();

    Fixture { state, queue, order }
}

pub(crate) fn fixture() -> Fixture {
    build(Arc::new(RecordingQueue::default()))
}

pub(crate) fn fixture_with_closed_queue() -> Fixture {
    build(Arc::new(RecordingQueue {
        closed: true,
        ..RecordingQueue::default()
    }))
}

pub(crate) fn seed_order(fx: &Fixture, attributes: Value) -> Record {
    let attributes = attributes.as_object().cloned().unwrap_or_default();
    fx.state.store().seed(&fx.order, attributes)
}
