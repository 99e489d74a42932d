//! Record persistence boundary
//!
//! The action layer never talks to a database directly. It loads, queries
//! and mutates [`Record`]s through a [`RecordStore`], and receives either a
//! mutation [`Outcome`](crate::outcome::Outcome) or a structured
//! [`RepositoryError`].
//!
//! # Features
//!
//! - **Opaque records**: [`Record`] holds a resource type, an identifier, a
//!   JSON attribute map and accumulated [`FieldErrors`]
//! - **Async store trait**: [`RecordStore`] for find, query, create, update
//!   and destroy
//! - **Structured errors**: [`RepositoryError`] with operation and kind
//! - **Reference store**: [`InMemoryStore`] for tests and prototypes
//!
//! # Example
//!
//! ```rust
//! use acton_actions::repository::{FieldErrors, Record};
//! use acton_actions::resource::ResourceType;
//!
//! let mut record = Record::new(ResourceType::new("Order"), Default::default());
//! record.errors_mut().add("name", "can't be blank");
//! assert_eq!(record.errors().to_sentence(), "Name can't be blank");
//! # let _ = FieldErrors::new();
//! ```

mod error;
mod memory;
mod record;
mod traits;

pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use memory::InMemoryStore;
pub use record::{to_sentence, FieldError, FieldErrors, Record, RecordId};
pub use traits::{Mutation, RecordStore, RepositoryResult};
