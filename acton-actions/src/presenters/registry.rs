//! Presenter registry and resolution

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::{Presentable, Presenter, ViewType};
use crate::error::{Error, Result};
use crate::handlers::ActionError;
use crate::resource::{ResourceRegistry, ResourceType};

/// Presenters keyed by resource type name
///
/// Besides resource names (`Order`), the runtime type names `Collection`,
/// `Object`, `Array`, `String`, `Number`, `Bool` and `Null` may be
/// registered to cover payloads that carry no record type.
#[derive(Clone, Default)]
pub struct PresenterRegistry {
    presenters: HashMap<String, Arc<dyn Presenter>>,
}

impl fmt::Debug for PresenterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.presenters.keys().collect();
        names.sort();
        f.debug_struct("PresenterRegistry")
            .field("presenters", &names)
            .finish()
    }
}

impl PresenterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the presenter for a resource type (builder style)
    #[must_use]
    pub fn with(mut self, resource: &ResourceType, presenter: impl Presenter + 'static) -> Self {
        self.register(resource.name(), presenter);
        self
    }

    /// Register a closure presenter for a resource type (builder style)
    #[must_use]
    pub fn with_fn<F>(mut self, resource: &ResourceType, presenter: F) -> Self
    where
        F: Fn(Presentable<'_>, Option<&ViewType>) -> Value + Send + Sync + 'static,
    {
        self.register(resource.name(), presenter);
        self
    }

    /// Register a presenter under a type name
    pub fn register(&mut self, name: impl Into<String>, presenter: impl Presenter + 'static) {
        self.presenters.insert(name.into(), Arc::new(presenter));
    }

    /// Register an already shared presenter under a type name
    pub fn register_shared(&mut self, name: impl Into<String>, presenter: Arc<dyn Presenter>) {
        self.presenters.insert(name.into(), presenter);
    }

    /// Presenter registered under a type name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Presenter>> {
        self.presenters.get(name).cloned()
    }

    /// Whether a presenter is registered under a type name
    pub fn contains(&self, name: &str) -> bool {
        self.presenters.contains_key(name)
    }

    /// Select the presenter for a payload
    ///
    /// `explicit` wins outright. Otherwise the name is taken from the routing
    /// `resource`, then the payload's record type, then its runtime type.
    /// A missing presenter is a configuration error and is logged loudly.
    pub fn resolve(
        &self,
        item: Presentable<'_>,
        explicit: Option<&Arc<dyn Presenter>>,
        resource: Option<&ResourceType>,
    ) -> std::result::Result<Arc<dyn Presenter>, ActionError> {
        if let Some(presenter) = explicit {
            return Ok(Arc::clone(presenter));
        }

        let name = resource
            .map(ResourceType::name)
            .or_else(|| item.record_type())
            .unwrap_or_else(|| item.type_name());

        self.get(name).ok_or_else(|| {
            tracing::error!(
                presenter = %format!("{name}Entity"),
                payload = item.type_name(),
                "no presenter registered"
            );
            ActionError::presenter_not_found(format!("{name}Entity"))
        })
    }

    /// Resolve and invoke in one step
    pub fn present(
        &self,
        item: Presentable<'_>,
        explicit: Option<&Arc<dyn Presenter>>,
        resource: Option<&ResourceType>,
        view: Option<&ViewType>,
    ) -> std::result::Result<Value, ActionError> {
        let presenter = self.resolve(item, explicit, resource)?;
        Ok(presenter.represent(item, view))
    }

    /// Check that every registered resource type has a presenter
    pub fn validate(&self, resources: &ResourceRegistry) -> Result<()> {
        let missing: Vec<String> = resources
            .iter()
            .filter(|resource| !self.contains(resource.name()))
            .map(ResourceType::presenter_name)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Registry(format!(
                "Missing presenters: {}",
                missing.join(", ")
            )))
        }
    }

    /// Number of registered presenters
    pub fn len(&self) -> usize {
        self.presenters.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.presenters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::ActionErrorKind;
    use crate::presenters::EntityPresenter;
    use crate::repository::Record;
    use serde_json::{json, Map};

    fn tagged(tag: &'static str) -> impl Fn(Presentable<'_>, Option<&ViewType>) -> Value {
        move |_, _| json!({"presenter": tag})
    }

    fn registry() -> PresenterRegistry {
        PresenterRegistry::new()
            .with_fn(&ResourceType::new("Order"), tagged("order"))
            .with_fn(&ResourceType::new("User"), tagged("user"))
    }

    fn record(name: &str) -> Record {
        Record::new(ResourceType::new(name), Map::new()).with_id(1_u64)
    }

    #[test]
    fn test_explicit_presenter_wins() {
        let explicit: Arc<dyn Presenter> = Arc::new(tagged("explicit"));
        let order = record("Order");
        let body = registry()
            .present(
                Presentable::Record(&order),
                Some(&explicit),
                Some(&ResourceType::new("User")),
                None,
            )
            .unwrap();
        assert_eq!(body, json!({"presenter": "explicit"}));
    }

    #[test]
    fn test_routing_resource_beats_record_type() {
        let order = record("Order");
        let body = registry()
            .present(
                Presentable::Record(&order),
                None,
                Some(&ResourceType::new("User")),
                None,
            )
            .unwrap();
        assert_eq!(body, json!({"presenter": "user"}));
    }

    #[test]
    fn test_record_type_and_first_element() {
        let order = record("Order");
        let body = registry()
            .present(Presentable::Record(&order), None, None, None)
            .unwrap();
        assert_eq!(body, json!({"presenter": "order"}));

        let mixed = vec![record("User"), record("Order")];
        let body = registry()
            .present(Presentable::Collection(&mixed), None, None, None)
            .unwrap();
        assert_eq!(body, json!({"presenter": "user"}));
    }

    #[test]
    fn test_runtime_type_fallback() {
        let mut presenters = registry();
        presenters.register("Collection", tagged("collection"));
        presenters.register("Object", EntityPresenter::new());

        let body = presenters
            .present(Presentable::Collection(&[]), None, None, None)
            .unwrap();
        assert_eq!(body, json!({"presenter": "collection"}));

        let value = json!({"total": 3});
        let body = presenters
            .present(Presentable::Value(&value), None, None, None)
            .unwrap();
        assert_eq!(body, json!({"total": 3}));
    }

    #[test]
    fn test_missing_presenter_names_entity() {
        let invoice = record("Invoice");
        let err = registry()
            .resolve(Presentable::Record(&invoice), None, None)
            .err()
            .unwrap();
        assert_eq!(err.kind, ActionErrorKind::PresenterNotFound);
        assert_eq!(err.message, "Presenter InvoiceEntity is not registered");

        let err = registry()
            .resolve(Presentable::Collection(&[]), None, None)
            .err()
            .unwrap();
        assert_eq!(err.message, "Presenter CollectionEntity is not registered");
    }

    #[test]
    fn test_validate_against_resources() {
        let resources = ResourceRegistry::new()
            .with(ResourceType::new("Order"))
            .with(ResourceType::new("Invoice"));
        let err = registry().validate(&resources).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Registry error: Missing presenters: InvoiceEntity"
        );

        let resources = ResourceRegistry::new().with(ResourceType::new("Order"));
        assert!(registry().validate(&resources).is_ok());
    }
}
