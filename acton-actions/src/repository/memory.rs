//! In-memory record store
//!
//! [`InMemoryStore`] is a process-local [`RecordStore`] suitable for tests,
//! prototypes and services whose records live only as long as the process.
//! Records are kept per resource type, identifiers are sequential integers
//! starting at 1, and rules (validation, uniqueness, destroy guards, query
//! filters) are registered per resource type at construction time.
//!
//! # Example
//!
//! ```rust
//! use acton_actions::prelude::*;
//!
//! let order = ResourceType::new("Order");
//! let store = InMemoryStore::new()
//!     .with_validator(&order, |record| {
//!         let mut errors = FieldErrors::new();
//!         if record.get("name").and_then(|v| v.as_str()).unwrap_or("").is_empty() {
//!             errors.add("name", "can't be blank");
//!         }
//!         errors
//!     })
//!     .with_filters(&order, ["status"]);
//! # let _ = store;
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::{Map, Value};

use super::error::{RepositoryError, RepositoryOperation};
use super::record::{FieldErrors, Record, RecordId};
use super::traits::{Mutation, RecordStore, RepositoryResult};
use crate::handlers::params::ActionParams;
use crate::outcome::Outcome;
use crate::resource::ResourceType;

type Validator = Arc<dyn Fn(&Record) -> FieldErrors + Send + Sync>;
type DestroyGuard = Arc<dyn Fn(&Record) -> Option<String> + Send + Sync>;

#[derive(Default)]
struct Table {
    next_id: u64,
    rows: BTreeMap<u64, Record>,
}

#[derive(Default, Clone)]
struct Rules {
    validators: Vec<Validator>,
    unique: Vec<String>,
    guards: Vec<DestroyGuard>,
    filters: Vec<String>,
}

/// Process-local record store
#[derive(Default)]
pub struct InMemoryStore {
    tables: DashMap<String, Table>,
    rules: HashMap<String, Rules>,
}

impl InMemoryStore {
    /// Create an empty store with no rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a validator for a resource type
    ///
    /// Validators run before every create and update. Any returned message
    /// rejects the mutation.
    #[must_use]
    pub fn with_validator<F>(mut self, resource: &ResourceType, validator: F) -> Self
    where
        F: Fn(&Record) -> FieldErrors + Send + Sync + 'static,
    {
        self.rules_for(resource).validators.push(Arc::new(validator));
        self
    }

    /// Require an attribute to be unique across records of a type
    ///
    /// A conflicting create or update fails with an `already_exists`
    /// repository error, the way a unique index would.
    #[must_use]
    pub fn with_unique(mut self, resource: &ResourceType, attribute: impl Into<String>) -> Self {
        self.rules_for(resource).unique.push(attribute.into());
        self
    }

    /// Register a guard that can block removal of a record
    ///
    /// Returning `Some(message)` leaves the record in place and reports the
    /// message as a `base` error.
    #[must_use]
    pub fn with_destroy_guard<F>(mut self, resource: &ResourceType, guard: F) -> Self
    where
        F: Fn(&Record) -> Option<String> + Send + Sync + 'static,
    {
        self.rules_for(resource).guards.push(Arc::new(guard));
        self
    }

    /// Declare which query parameters filter a collection by equality
    #[must_use]
    pub fn with_filters<I, K>(mut self, resource: &ResourceType, attributes: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.rules_for(resource)
            .filters
            .extend(attributes.into_iter().map(Into::into));
        self
    }

    /// Insert a record directly, bypassing validation
    ///
    /// Returns the record as stored, with its assigned identifier.
    pub fn seed(&self, resource: &ResourceType, attributes: Map<String, Value>) -> Record {
        let mut table = self.tables.entry(resource.name().to_string()).or_default();
        table.next_id += 1;
        let id = table.next_id;
        let record = Record::new(resource.clone(), attributes).with_id(id);
        table.rows.insert(id, record.clone());
        record
    }

    /// Number of stored records of a type
    pub fn count(&self, resource: &ResourceType) -> usize {
        self.tables
            .get(resource.name())
            .map_or(0, |table| table.rows.len())
    }

    fn rules_for(&mut self, resource: &ResourceType) -> &mut Rules {
        self.rules.entry(resource.name().to_string()).or_default()
    }

    fn rules(&self, resource: &ResourceType) -> Rules {
        self.rules.get(resource.name()).cloned().unwrap_or_default()
    }

    fn validate(rules: &Rules, record: &mut Record) -> bool {
        record.errors_mut().clear();
        for validator in &rules.validators {
            for error in validator(record).iter() {
                record
                    .errors_mut()
                    .add(error.attribute.clone(), error.message.clone());
            }
        }
        record.errors().is_empty()
    }

    fn check_unique(
        rules: &Rules,
        table: &Table,
        record: &Record,
        skip: Option<u64>,
        operation: RepositoryOperation,
    ) -> RepositoryResult<()> {
        for attribute in &rules.unique {
            let Some(value) = record.get(attribute) else {
                continue;
            };
            let conflict = table
                .rows
                .iter()
                .filter(|(id, _)| Some(**id) != skip)
                .any(|(_, other)| other.get(attribute) == Some(value));
            if conflict {
                return Err(RepositoryError::already_exists(
                    operation,
                    format!(
                        "Duplicate value for {}.{}",
                        record.resource().collection(),
                        attribute
                    ),
                )
                .with_entity(record.resource().name(), value.to_string()));
            }
        }
        Ok(())
    }
}

fn numeric_id(record: &Record) -> Option<u64> {
    record.id().and_then(|id| id.as_str().parse().ok())
}

fn matches_criterion(value: Option<&Value>, criterion: &Value) -> bool {
    match (value, criterion) {
        (Some(value), criterion) if value == criterion => true,
        // Query strings carry text, attributes may be numbers or booleans.
        (Some(Value::Number(n)), Value::String(s)) => n.to_string() == *s,
        (Some(Value::Bool(b)), Value::String(s)) => b.to_string() == *s,
        _ => false,
    }
}

impl RecordStore for InMemoryStore {
    async fn find(
        &self,
        resource: &ResourceType,
        id: &RecordId,
    ) -> RepositoryResult<Option<Record>> {
        let Ok(key) = id.as_str().parse::<u64>() else {
            return Ok(None);
        };
        Ok(self
            .tables
            .get(resource.name())
            .and_then(|table| table.rows.get(&key).cloned()))
    }

    async fn query(
        &self,
        resource: &ResourceType,
        criteria: &ActionParams,
    ) -> RepositoryResult<Vec<Record>> {
        let rules = self.rules(resource);
        let filters: Vec<(&String, &Value)> = rules
            .filters
            .iter()
            .filter_map(|attribute| criteria.get(attribute).map(|v| (attribute, v)))
            .collect();

        let Some(table) = self.tables.get(resource.name()) else {
            return Ok(Vec::new());
        };
        Ok(table
            .rows
            .values()
            .filter(|record| {
                filters
                    .iter()
                    .all(|(attribute, criterion)| matches_criterion(record.get(attribute), criterion))
            })
            .cloned()
            .collect())
    }

    async fn create(
        &self,
        resource: &ResourceType,
        attributes: Map<String, Value>,
    ) -> RepositoryResult<Mutation> {
        let rules = self.rules(resource);
        let mut record = Record::new(resource.clone(), attributes);
        record.attributes_mut().remove("id");
        if !Self::validate(&rules, &mut record) {
            return Ok(Outcome::Failure(record));
        }

        let mut table = self.tables.entry(resource.name().to_string()).or_default();
        Self::check_unique(&rules, &table, &record, None, RepositoryOperation::Create)?;
        table.next_id += 1;
        let id = table.next_id;
        record.set_id(RecordId::from(id));
        table.rows.insert(id, record.clone());
        tracing::debug!(resource = %resource, id = id, "record created");
        Ok(Outcome::Success(record))
    }

    async fn update(
        &self,
        record: Record,
        attributes: &Map<String, Value>,
    ) -> RepositoryResult<Mutation> {
        let resource = record.resource().clone();
        let not_found = || {
            RepositoryError::not_found(
                resource.name(),
                record.id().map(ToString::to_string).unwrap_or_default(),
            )
            .with_operation(RepositoryOperation::Update)
        };
        let Some(id) = numeric_id(&record) else {
            return Err(not_found());
        };

        let rules = self.rules(&resource);
        let mut table = self.tables.get_mut(resource.name()).ok_or_else(not_found)?;
        if !table.rows.contains_key(&id) {
            return Err(not_found());
        }

        let mut updated = record.clone();
        updated.assign(attributes);
        if !Self::validate(&rules, &mut updated) {
            return Ok(Outcome::Failure(updated));
        }
        Self::check_unique(&rules, &table, &updated, Some(id), RepositoryOperation::Update)?;
        table.rows.insert(id, updated.clone());
        tracing::debug!(resource = %resource, id = id, "record updated");
        Ok(Outcome::Success(updated))
    }

    async fn destroy(&self, mut record: Record) -> RepositoryResult<Mutation> {
        let resource = record.resource().clone();
        let not_found = |record: &Record| {
            RepositoryError::not_found(
                resource.name(),
                record.id().map(ToString::to_string).unwrap_or_default(),
            )
            .with_operation(RepositoryOperation::Destroy)
        };
        let Some(id) = numeric_id(&record) else {
            return Err(not_found(&record));
        };

        let rules = self.rules(&resource);
        if let Some(message) = rules.guards.iter().find_map(|guard| guard(&record)) {
            record.errors_mut().add(FieldErrors::BASE, message);
            return Ok(Outcome::Failure(record));
        }

        let removed = self
            .tables
            .get_mut(resource.name())
            .and_then(|mut table| table.rows.remove(&id));
        match removed {
            Some(removed) => {
                tracing::debug!(resource = %resource, id = id, "record destroyed");
                Ok(Outcome::Success(removed))
            }
            None => Err(not_found(&record)),
        }
    }
}
