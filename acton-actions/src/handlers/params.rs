//! Request parameters and operation input
//!
//! Three layers of parameters flow through an action:
//!
//! - [`RawParams`]: everything the request carried, merged from the JSON
//!   body, the query string and the route path (path wins over query, query
//!   wins over body)
//! - [`ActionParams`]: the raw parameters minus routing keys (`controller`,
//!   `action`, `format`, `type`)
//! - [`OperationInput`]: what an operation receives, either plain
//!   parameters or a loaded record with optional remaining parameters
//!
//! # Example
//!
//! ```rust
//! use acton_actions::handlers::{ActionParams, RawParams};
//! use serde_json::json;
//!
//! let raw = RawParams::merge(
//!     vec![("id".to_string(), "7".to_string())],
//!     vec![("type".to_string(), "summary".to_string())],
//!     Some(json!({"note": "rush"})),
//! )
//! .unwrap();
//!
//! let params = ActionParams::extract(&raw);
//! assert_eq!(params.get("id"), Some(&json!("7")));
//! assert!(params.get("type").is_none());
//! ```

use std::fmt;
use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::ActionError;
use crate::repository::Record;

/// Keys that describe routing rather than input
pub const ROUTING_KEYS: [&str; 4] = ["controller", "action", "format", "type"];

/// All parameters of one request, before routing keys are removed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawParams(Map<String, Value>);

impl RawParams {
    /// Merge path, query and body parameters
    ///
    /// Later sources overwrite earlier ones in the order body, query, path.
    /// Repeated query keys keep their last value. A body that is present but
    /// not a JSON object is rejected.
    pub fn merge<P, Q>(path: P, query: Q, body: Option<Value>) -> Result<Self, ActionError>
    where
        P: IntoIterator<Item = (String, String)>,
        Q: IntoIterator<Item = (String, String)>,
    {
        let mut params = match body {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(ActionError::invalid_input(format!(
                    "Request body must be a JSON object, got {}",
                    json_type_name(&other)
                )))
            }
        };
        for (key, value) in query {
            params.insert(key, Value::String(value));
        }
        for (key, value) in path {
            params.insert(key, Value::String(value));
        }
        Ok(Self(params))
    }

    /// Wrap an existing parameter map
    pub fn from_map(params: Map<String, Value>) -> Self {
        Self(params)
    }

    /// Single parameter
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The `type` hint, when it is a non-empty string
    pub fn type_hint(&self) -> Option<&str> {
        self.0
            .get("type")
            .and_then(Value::as_str)
            .filter(|hint| !hint.is_empty())
    }

    /// Borrow the underlying map
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Request parameters with routing keys removed
///
/// Dereferences to the underlying JSON map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionParams(Map<String, Value>);

impl ActionParams {
    /// Strip routing keys from the raw parameters
    pub fn extract(raw: &RawParams) -> Self {
        let mut params = raw.0.clone();
        for key in ROUTING_KEYS {
            params.remove(key);
        }
        Self(params)
    }

    /// Consume into the underlying map
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for ActionParams {
    fn from(params: Map<String, Value>) -> Self {
        Self(params)
    }
}

impl Deref for ActionParams {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for ActionParams {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Input shape an operation accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InputShape {
    /// Plain parameters only
    Params,
    /// A loaded record and nothing else
    Record,
    /// A loaded record plus remaining parameters (possibly empty)
    RecordWithParams,
    /// Whatever the request produced
    #[default]
    Any,
}

impl fmt::Display for InputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Params => write!(f, "params"),
            Self::Record => write!(f, "record"),
            Self::RecordWithParams => write!(f, "record_with_params"),
            Self::Any => write!(f, "any"),
        }
    }
}

/// What an operation receives
#[derive(Debug, Clone, PartialEq)]
pub enum OperationInput {
    /// Parameters without a target record
    Params(ActionParams),
    /// A record loaded from the `id` parameter
    Record {
        /// Element name of the record's resource, e.g. `order`
        key: String,
        /// The loaded record
        record: Record,
    },
    /// A loaded record and the remaining parameters
    RecordWithParams {
        /// Element name of the record's resource, e.g. `order`
        key: String,
        /// The loaded record
        record: Record,
        /// Parameters left after removing `id`
        params: ActionParams,
    },
}

impl OperationInput {
    /// Build input from a loaded record and the parameters left over
    pub fn for_record(record: Record, params: ActionParams) -> Self {
        let key = record.resource().element().to_string();
        if params.is_empty() {
            Self::Record { key, record }
        } else {
            Self::RecordWithParams {
                key,
                record,
                params,
            }
        }
    }

    /// Shape of this input
    pub fn shape(&self) -> InputShape {
        match self {
            Self::Params(_) => InputShape::Params,
            Self::Record { .. } => InputShape::Record,
            Self::RecordWithParams { .. } => InputShape::RecordWithParams,
        }
    }

    /// The target record, if any
    pub fn record(&self) -> Option<&Record> {
        match self {
            Self::Params(_) => None,
            Self::Record { record, .. } | Self::RecordWithParams { record, .. } => Some(record),
        }
    }

    /// The parameters, if any
    pub fn params(&self) -> Option<&ActionParams> {
        match self {
            Self::Params(params) | Self::RecordWithParams { params, .. } => Some(params),
            Self::Record { .. } => None,
        }
    }

    /// Check this input against the shape an operation declares
    ///
    /// A bare record is promoted when the operation wants a record with
    /// parameters. Every other mismatch is an `InvalidInput` error naming
    /// the operation.
    pub fn conform(self, shape: InputShape, operation: &str) -> Result<Self, ActionError> {
        match (shape, self) {
            (InputShape::Any, input) => Ok(input),
            (InputShape::Params, input @ Self::Params(_)) => Ok(input),
            (InputShape::Record, input @ Self::Record { .. }) => Ok(input),
            (InputShape::RecordWithParams, input @ Self::RecordWithParams { .. }) => Ok(input),
            (InputShape::RecordWithParams, Self::Record { key, record }) => {
                Ok(Self::RecordWithParams {
                    key,
                    record,
                    params: ActionParams::default(),
                })
            }
            (expected, input) => Err(ActionError::invalid_input(format!(
                "Operation {operation} expects {expected} input, got {}",
                input.shape()
            ))),
        }
    }

    /// Mapping form: the parameters, or `{<key>: record}` with an optional
    /// `params` entry
    pub fn into_map(self) -> Map<String, Value> {
        match self {
            Self::Params(params) => params.into_map(),
            Self::Record { key, record } => {
                let mut map = Map::new();
                map.insert(key, record.to_json());
                map
            }
            Self::RecordWithParams {
                key,
                record,
                params,
            } => {
                let mut map = Map::new();
                map.insert(key, record.to_json());
                map.insert("params".to_string(), Value::Object(params.into_map()));
                map
            }
        }
    }
}

impl From<ActionParams> for OperationInput {
    fn from(params: ActionParams) -> Self {
        Self::Params(params)
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "Null",
        Value::Bool(_) => "Bool",
        Value::Number(_) => "Number",
        Value::String(_) => "String",
        Value::Array(_) => "Array",
        Value::Object(_) => "Object",
    }
}
