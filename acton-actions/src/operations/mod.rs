//! Operations: named units of business logic with a success/failure contract
//!
//! An [`Operation`] receives an [`OperationInput`] and returns an
//! [`OperationResult`], an [`Outcome`] whose branches are explicit tagged
//! unions:
//!
//! - [`Payload`] on success: a message, a plain JSON value, a record or a
//!   collection of records
//! - [`Fault`] on failure: a message, a record carrying field errors, or a
//!   bare set of field errors
//!
//! The action layer turns those into responses; see
//! [`ResourceController::perform`](crate::handlers::ResourceController::perform).
//!
//! # Example
//!
//! ```rust
//! use acton_actions::handlers::{InputShape, OperationInput};
//! use acton_actions::operations::{Fault, FnOperation, Operation, Payload};
//! use acton_actions::outcome::Outcome;
//!
//! let ping = FnOperation::new("ping", InputShape::Params, |input: OperationInput| async move {
//!     match input.params().and_then(|p| p.get("name")) {
//!         Some(name) => Outcome::Success(Payload::message(format!("pong {name}"))),
//!         None => Outcome::Failure(Fault::message("name is required")),
//!     }
//! });
//! assert_eq!(ping.name(), "ping");
//! ```

mod perform;
mod registry;

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use serde_json::Value;

use crate::handlers::params::{InputShape, OperationInput};
use crate::outcome::Outcome;
use crate::repository::{FieldErrors, Record};

pub use perform::{render_fault, render_payload, FailureHandler, PerformOptions, SuccessHandler};
pub use registry::OperationRegistry;

/// What a successful operation hands back
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A human-readable message, rendered as `{"message": ...}`
    Message(String),
    /// A plain JSON value, rendered as-is unless a presenter is supplied
    Json(Value),
    /// A record, rendered through its presenter
    Record(Record),
    /// A collection of records, rendered through their presenter
    Collection(Vec<Record>),
}

impl Payload {
    /// Message payload
    pub fn message(text: impl Into<String>) -> Self {
        Self::Message(text.into())
    }

    /// Kind tag, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Message(_) => "message",
            Self::Json(_) => "json",
            Self::Record(_) => "record",
            Self::Collection(_) => "collection",
        }
    }
}

/// What a failed operation hands back
#[derive(Debug, Clone, PartialEq)]
pub enum Fault {
    /// A human-readable message, rendered as `{"error": ...}`
    Message(String),
    /// A record whose field errors explain the failure
    Invalid(Record),
    /// Field errors without a record
    Errors(FieldErrors),
}

impl Fault {
    /// Message fault
    pub fn message(text: impl Into<String>) -> Self {
        Self::Message(text.into())
    }

    /// Kind tag, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Message(_) => "message",
            Self::Invalid(_) => "invalid",
            Self::Errors(_) => "errors",
        }
    }
}

/// Result of one operation call
pub type OperationResult = Outcome<Payload, Fault>;

/// A named unit of business logic
#[async_trait]
pub trait Operation: Send + Sync {
    /// Registry name, also used as the job name for queued runs
    fn name(&self) -> &str;

    /// Input shape this operation accepts
    fn input_shape(&self) -> InputShape {
        InputShape::Any
    }

    /// Run the operation
    async fn call(&self, input: OperationInput) -> OperationResult;
}

type BoxedCall =
    Box<dyn Fn(OperationInput) -> Pin<Box<dyn Future<Output = OperationResult> + Send>> + Send + Sync>;

/// Operation backed by an async closure
pub struct FnOperation {
    name: String,
    shape: InputShape,
    call: BoxedCall,
}

impl FnOperation {
    /// Wrap an async closure as an operation
    pub fn new<F, Fut>(name: impl Into<String>, shape: InputShape, call: F) -> Self
    where
        F: Fn(OperationInput) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = OperationResult> + Send + 'static,
    {
        Self {
            name: name.into(),
            shape,
            call: Box::new(move |input| Box::pin(call(input))),
        }
    }
}

impl fmt::Debug for FnOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnOperation")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Operation for FnOperation {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_shape(&self) -> InputShape {
        self.shape
    }

    async fn call(&self, input: OperationInput) -> OperationResult {
        (self.call)(input).await
    }
}
