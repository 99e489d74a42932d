//! Record store trait definition
//!
//! [`RecordStore`] is the persistence boundary of the action layer. It uses
//! RPITIT (Return Position Impl Trait In Traits) so implementations can be
//! written as plain `async fn`.
//!
//! Two kinds of failure are distinguished:
//!
//! - A mutation the record itself rejects (validation, blocked destroy) is
//!   an [`Outcome::Failure`] carrying the record with its accumulated
//!   [`FieldErrors`](super::FieldErrors).
//! - Anything else (missing table, uniqueness conflict, lost connection) is
//!   a [`RepositoryError`](super::RepositoryError).
//!
//! # Example
//!
//! ```rust,ignore
//! use acton_actions::prelude::*;
//!
//! struct PgStore { pool: PgPool }
//!
//! impl RecordStore for PgStore {
//!     async fn find(&self, resource: &ResourceType, id: &RecordId)
//!         -> RepositoryResult<Option<Record>>
//!     {
//!         // SELECT * FROM <collection> WHERE id = $1
//!         todo!()
//!     }
//!     // ... other methods
//! }
//! ```

use std::future::Future;

use serde_json::{Map, Value};

use super::error::RepositoryError;
use super::record::{Record, RecordId};
use crate::handlers::params::ActionParams;
use crate::outcome::Outcome;
use crate::resource::ResourceType;

/// Result type for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Result of a mutation: the saved record, or the record carrying its errors
pub type Mutation = Outcome<Record, Record>;

/// Asynchronous access to persisted records
pub trait RecordStore: Send + Sync + 'static {
    /// Load one record by identifier
    ///
    /// Returns `Ok(None)` when no such record exists.
    fn find(
        &self,
        resource: &ResourceType,
        id: &RecordId,
    ) -> impl Future<Output = RepositoryResult<Option<Record>>> + Send;

    /// Query a collection
    ///
    /// `criteria` is the full set of request parameters. Implementations
    /// decide which keys are filters and ignore the rest.
    fn query(
        &self,
        resource: &ResourceType,
        criteria: &ActionParams,
    ) -> impl Future<Output = RepositoryResult<Vec<Record>>> + Send;

    /// Build and persist a new record from attributes
    fn create(
        &self,
        resource: &ResourceType,
        attributes: Map<String, Value>,
    ) -> impl Future<Output = RepositoryResult<Mutation>> + Send;

    /// Apply attributes to an existing record and persist it
    fn update(
        &self,
        record: Record,
        attributes: &Map<String, Value>,
    ) -> impl Future<Output = RepositoryResult<Mutation>> + Send;

    /// Remove a record
    ///
    /// A removal blocked by the record (dependent rows, guard hooks) is a
    /// failure outcome with a `base` error on the record.
    fn destroy(&self, record: Record) -> impl Future<Output = RepositoryResult<Mutation>> + Send;
}
