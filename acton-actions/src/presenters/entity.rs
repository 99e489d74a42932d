//! Declarative attribute-list presenter

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::{Presentable, Presenter, ViewType};

/// Presenter that exposes a fixed attribute list per view
///
/// `id` is always exposed. Attributes listed by a view but missing from the
/// record render as `null`, so every body of a view has the same keys. An
/// unknown view falls back to the default view; with no views declared at
/// all, every attribute is exposed.
///
/// # Example
///
/// ```rust
/// use acton_actions::presenters::{EntityPresenter, Presentable, Presenter, ViewType};
/// use serde_json::json;
///
/// let presenter = EntityPresenter::new()
///     .view("summary", ["name"])
///     .view("full", ["name", "email"])
///     .default_view("summary");
///
/// let value = json!({"id": "1", "name": "Ada", "email": "ada@example.com"});
/// assert_eq!(
///     presenter.represent(Presentable::Value(&value), None),
///     json!({"id": "1", "name": "Ada"})
/// );
/// assert_eq!(
///     presenter.represent(Presentable::Value(&value), Some(&ViewType::new("nope"))),
///     json!({"id": "1", "name": "Ada"})
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct EntityPresenter {
    views: BTreeMap<String, Vec<String>>,
    default_view: Option<String>,
}

impl EntityPresenter {
    /// Create a presenter with no views (exposes every attribute)
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a view and the attributes it exposes
    #[must_use]
    pub fn view<I, K>(mut self, name: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.views.insert(
            name.into(),
            attributes.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Choose the view used when none (or an unknown one) is requested
    #[must_use]
    pub fn default_view(mut self, name: impl Into<String>) -> Self {
        self.default_view = Some(name.into());
        self
    }

    fn attributes_for(&self, view: Option<&ViewType>) -> Option<&[String]> {
        view.and_then(|v| self.views.get(v.as_str()))
            .or_else(|| {
                self.default_view
                    .as_deref()
                    .and_then(|name| self.views.get(name))
            })
            .map(Vec::as_slice)
    }

    fn expose(&self, object: &Map<String, Value>, attributes: Option<&[String]>) -> Value {
        let Some(attributes) = attributes else {
            return Value::Object(object.clone());
        };
        let mut exposed = Map::new();
        if let Some(id) = object.get("id") {
            exposed.insert("id".to_string(), id.clone());
        }
        for attribute in attributes {
            let value = object.get(attribute).cloned().unwrap_or(Value::Null);
            exposed.insert(attribute.clone(), value);
        }
        Value::Object(exposed)
    }

    fn expose_value(&self, value: &Value, attributes: Option<&[String]>) -> Value {
        match value {
            Value::Object(object) => self.expose(object, attributes),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.expose_value(item, attributes))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

impl Presenter for EntityPresenter {
    fn represent(&self, item: Presentable<'_>, view: Option<&ViewType>) -> Value {
        let attributes = self.attributes_for(view);
        match item {
            Presentable::Record(record) => self.expose_value(&record.to_json(), attributes),
            Presentable::Collection(records) => Value::Array(
                records
                    .iter()
                    .map(|record| self.expose_value(&record.to_json(), attributes))
                    .collect(),
            ),
            Presentable::Value(value) => self.expose_value(value, attributes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::Record;
    use crate::resource::ResourceType;
    use serde_json::json;

    fn record(id: u64, name: &str, email: &str) -> Record {
        let attrs = json!({"name": name, "email": email})
            .as_object()
            .cloned()
            .unwrap();
        Record::new(ResourceType::new("User"), attrs).with_id(id)
    }

    fn presenter() -> EntityPresenter {
        EntityPresenter::new()
            .view("summary", ["name"])
            .view("full", ["name", "email", "phone"])
            .default_view("summary")
    }

    #[test]
    fn test_views_select_attributes() {
        let user = record(1, "Ada", "ada@example.com");
        let p = presenter();

        assert_eq!(
            p.represent(Presentable::Record(&user), Some(&ViewType::FULL)),
            json!({"id": "1", "name": "Ada", "email": "ada@example.com", "phone": null})
        );
        assert_eq!(
            p.represent(Presentable::Record(&user), None),
            json!({"id": "1", "name": "Ada"})
        );
    }

    #[test]
    fn test_unknown_view_falls_back_to_default() {
        let user = record(1, "Ada", "ada@example.com");
        let p = presenter();
        assert_eq!(
            p.represent(Presentable::Record(&user), Some(&ViewType::new("compact"))),
            p.represent(Presentable::Record(&user), None)
        );
    }

    #[test]
    fn test_collection_maps_each_record() {
        let users = vec![record(1, "Ada", "a@x"), record(2, "Grace", "g@x")];
        assert_eq!(
            presenter().represent(Presentable::Collection(&users), None),
            json!([{"id": "1", "name": "Ada"}, {"id": "2", "name": "Grace"}])
        );
        assert_eq!(
            presenter().represent(Presentable::Collection(&[]), None),
            json!([])
        );
    }

    #[test]
    fn test_no_views_exposes_everything() {
        let user = record(5, "Ada", "ada@example.com");
        assert_eq!(
            EntityPresenter::new().represent(Presentable::Record(&user), Some(&ViewType::FULL)),
            json!({"id": "5", "name": "Ada", "email": "ada@example.com"})
        );
    }

    #[test]
    fn test_scalar_values_pass_through() {
        let value = json!("plain");
        assert_eq!(
            presenter().represent(Presentable::Value(&value), None),
            json!("plain")
        );
    }
}
