//! Presenters and presenter resolution
//!
//! A presenter turns a record, a collection of records or a plain JSON value
//! into the response body. Presenters are registered per resource type in a
//! [`PresenterRegistry`] and selected for each response by
//! [`PresenterRegistry::resolve`]:
//!
//! 1. an explicitly supplied presenter wins
//! 2. otherwise the routing resource of the request names the presenter
//! 3. otherwise the payload's record type (the first element for a
//!    collection)
//! 4. otherwise the payload's runtime type (`Collection`, `Object`, `Array`,
//!    `String`, `Number`, `Bool`, `Null`)
//!
//! A name with no registered presenter is a configuration error.
//!
//! # Example
//!
//! ```rust
//! use acton_actions::presenters::{EntityPresenter, PresenterRegistry, Presentable, ViewType};
//! use acton_actions::repository::Record;
//! use acton_actions::resource::ResourceType;
//! use serde_json::json;
//!
//! let order = ResourceType::new("Order");
//! let registry = PresenterRegistry::new().with(
//!     &order,
//!     EntityPresenter::new()
//!         .view("summary", ["status"])
//!         .view("full", ["status", "total"])
//!         .default_view("summary"),
//! );
//!
//! let attrs = json!({"status": "open", "total": 12}).as_object().cloned().unwrap();
//! let record = Record::new(order.clone(), attrs).with_id(1_u64);
//! let presenter = registry.resolve(Presentable::Record(&record), None, None).unwrap();
//!
//! let body = presenter.represent(Presentable::Record(&record), Some(&ViewType::FULL));
//! assert_eq!(body, json!({"id": "1", "status": "open", "total": 12}));
//! ```

mod entity;
mod registry;

use std::borrow::Cow;
use std::fmt;

use serde_json::Value;

use crate::handlers::params::json_type_name;
use crate::repository::Record;

pub use entity::EntityPresenter;
pub use registry::PresenterRegistry;

/// Something a presenter can render
#[derive(Debug, Clone, Copy)]
pub enum Presentable<'a> {
    /// One record
    Record(&'a Record),
    /// A list of records
    Collection(&'a [Record]),
    /// A plain JSON value
    Value(&'a Value),
}

impl Presentable<'_> {
    /// Resource type name of the records being presented, if any
    ///
    /// Collections report their first element.
    pub fn record_type(&self) -> Option<&str> {
        match self {
            Self::Record(record) => Some(record.resource().name()),
            Self::Collection(records) => records.first().map(|r| r.resource().name()),
            Self::Value(_) => None,
        }
    }

    /// Runtime type name used when nothing better is known
    pub fn type_name(&self) -> &str {
        match self {
            Self::Record(record) => record.resource().name(),
            Self::Collection(records) => records
                .first()
                .map_or("Collection", |r| r.resource().name()),
            Self::Value(value) => json_type_name(value),
        }
    }
}

/// Named presentation variant (`full`, `summary`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewType(Cow<'static, str>);

impl ViewType {
    /// The detailed view used by `show` when no `type` is requested
    pub const FULL: ViewType = ViewType(Cow::Borrowed("full"));

    /// Create a view type
    pub fn new(view: impl Into<String>) -> Self {
        Self(Cow::Owned(view.into()))
    }

    /// View name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ViewType {
    fn from(view: &str) -> Self {
        Self::new(view)
    }
}

/// Serialization strategy for one resource type
///
/// Presenters are pure: the same input and view produce the same output.
pub trait Presenter: Send + Sync {
    /// Render the item under the given view
    ///
    /// `None` means the presenter's own default view.
    fn represent(&self, item: Presentable<'_>, view: Option<&ViewType>) -> Value;
}

impl<F> Presenter for F
where
    F: Fn(Presentable<'_>, Option<&ViewType>) -> Value + Send + Sync,
{
    fn represent(&self, item: Presentable<'_>, view: Option<&ViewType>) -> Value {
        self(item, view)
    }
}
