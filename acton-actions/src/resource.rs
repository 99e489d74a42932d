//! Resource types and the registry that maps routes onto them
//!
//! A [`ResourceType`] names one kind of persisted record ("Order",
//! "LineItem"). Resource types are registered once at startup in a
//! [`ResourceRegistry`]; requests resolve their resource by matching the
//! collection segment of the endpoint path against that registry.
//!
//! # Example
//!
//! ```rust
//! use acton_actions::resource::{ResourceRegistry, ResourceType};
//!
//! let registry = ResourceRegistry::new()
//!     .with(ResourceType::new("LineItem"))
//!     .with(ResourceType::new("Person").with_collection("people"));
//!
//! let line_items = registry.resolve_path("/api/line_items/{id}").unwrap();
//! assert_eq!(line_items.name(), "LineItem");
//! assert_eq!(line_items.element(), "line_item");
//!
//! assert_eq!(registry.resolve_path("/people").unwrap().name(), "Person");
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A kind of persisted record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceType {
    name: String,
    element: String,
    collection: String,
}

impl ResourceType {
    /// Create a resource type from its type name
    ///
    /// The element name is the snake_case form of `name` and the collection
    /// name is its plural. Use [`ResourceType::with_collection`] for irregular
    /// plurals.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let element = underscore(&name);
        let collection = pluralize(&element);
        Self {
            name,
            element,
            collection,
        }
    }

    /// Override the collection (route segment) name
    #[must_use]
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Type name, e.g. `LineItem`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Singular key, e.g. `line_item`
    pub fn element(&self) -> &str {
        &self.element
    }

    /// Collection key used in routes, e.g. `line_items`
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Conventional presenter name, e.g. `LineItemEntity`
    pub fn presenter_name(&self) -> String {
        format!("{}Entity", self.name)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Startup-time registry of resource types, keyed by collection name
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    by_collection: BTreeMap<String, ResourceType>,
}

impl ResourceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource type (builder style)
    #[must_use]
    pub fn with(mut self, resource: ResourceType) -> Self {
        self.register(resource);
        self
    }

    /// Register a resource type
    pub fn register(&mut self, resource: ResourceType) {
        self.by_collection
            .insert(resource.collection().to_string(), resource);
    }

    /// Look up a resource type by collection name
    pub fn by_collection(&self, collection: &str) -> Option<&ResourceType> {
        self.by_collection.get(collection)
    }

    /// Look up a resource type by type name
    pub fn by_name(&self, name: &str) -> Option<&ResourceType> {
        self.by_collection.values().find(|r| r.name() == name)
    }

    /// Resolve the resource addressed by a route path
    ///
    /// Walks the path from the end, skipping parameter segments (`{id}` or
    /// `:id`), and returns the first segment naming a registered collection.
    pub fn resolve_path(&self, path: &str) -> Option<&ResourceType> {
        path.split('/')
            .rev()
            .filter(|segment| !segment.is_empty())
            .filter(|segment| !segment.starts_with('{') && !segment.starts_with(':'))
            .find_map(|segment| self.by_collection(segment))
    }

    /// Iterate over every registered resource type
    pub fn iter(&self) -> impl Iterator<Item = &ResourceType> {
        self.by_collection.values()
    }

    /// Number of registered resource types
    pub fn len(&self) -> usize {
        self.by_collection.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.by_collection.is_empty()
    }
}

fn underscore(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower_or_digit = false;
    for ch in name.chars() {
        if ch.is_uppercase() {
            if prev_lower_or_digit {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
            prev_lower_or_digit = false;
        } else if ch == '-' || ch == ' ' {
            out.push('_');
            prev_lower_or_digit = false;
        } else {
            out.push(ch);
            prev_lower_or_digit = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }
    out
}

fn pluralize(word: &str) -> String {
    const SIBILANTS: [&str; 5] = ["s", "x", "z", "ch", "sh"];

    if let Some(stem) = word.strip_suffix('y') {
        let before = stem.chars().last();
        if before.is_some_and(|c| !"aeiou".contains(c)) {
            return format!("{stem}ies");
        }
    }
    if SIBILANTS.iter().any(|suffix| word.ends_with(suffix)) {
        return format!("{word}es");
    }
    format!("{word}s")
}
