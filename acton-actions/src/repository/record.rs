//! Persisted records and their accumulated field errors

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::resource::ResourceType;

/// Identifier of a persisted record
///
/// Identifiers arrive from routes and query strings as text, so they are
/// kept as strings. JSON numbers are accepted and stringified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Create an identifier from its textual form
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Read an identifier out of a parameter value
    ///
    /// Strings and numbers are accepted; anything else is not an identifier.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    /// The textual form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// One field-level validation message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Attribute the message refers to (`base` for record-wide messages)
    pub attribute: String,
    /// Message without the attribute name, e.g. `can't be blank`
    pub message: String,
}

impl FieldError {
    /// Humanized message including the attribute, e.g. `Name can't be blank`
    pub fn full_message(&self) -> String {
        if self.attribute == FieldErrors::BASE {
            self.message.clone()
        } else {
            format!("{} {}", humanize(&self.attribute), self.message)
        }
    }
}

/// Ordered collection of validation messages accumulated on a record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    /// Attribute name for messages that apply to the whole record
    pub const BASE: &'static str = "base";

    /// Create an empty error set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message for an attribute
    pub fn add(&mut self, attribute: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            attribute: attribute.into(),
            message: message.into(),
        });
    }

    /// Add a message (builder style)
    #[must_use]
    pub fn with(mut self, attribute: impl Into<String>, message: impl Into<String>) -> Self {
        self.add(attribute, message);
        self
    }

    /// Whether no messages were recorded
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterate over the raw messages
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Drop every message
    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Every message with its humanized attribute prefix
    pub fn full_messages(&self) -> Vec<String> {
        self.errors.iter().map(FieldError::full_message).collect()
    }

    /// All full messages joined into one sentence
    ///
    /// `a`, `a and b`, `a, b, and c`.
    pub fn to_sentence(&self) -> String {
        to_sentence(&self.full_messages())
    }
}

/// A persisted entity as seen by the action layer
///
/// Records are owned by the store; the action layer works on clones for the
/// duration of one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    resource: ResourceType,
    id: Option<RecordId>,
    attributes: Map<String, Value>,
    #[serde(default, skip_serializing_if = "FieldErrors::is_empty")]
    errors: FieldErrors,
}

impl Record {
    /// Build an unsaved record of the given type
    pub fn new(resource: ResourceType, attributes: Map<String, Value>) -> Self {
        Self {
            resource,
            id: None,
            attributes,
            errors: FieldErrors::new(),
        }
    }

    /// Attach an identifier (builder style)
    #[must_use]
    pub fn with_id(mut self, id: impl Into<RecordId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Resource type the record belongs to
    pub fn resource(&self) -> &ResourceType {
        &self.resource
    }

    /// Identifier, `None` until persisted
    pub fn id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    /// Assign the identifier
    pub fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    /// Whether the record has been persisted
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Attribute map
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Mutable attribute map
    pub fn attributes_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.attributes
    }

    /// Single attribute value
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.attributes.get(attribute)
    }

    /// Overwrite attributes with the given values
    pub fn assign(&mut self, attributes: &Map<String, Value>) {
        for (key, value) in attributes {
            if key == "id" {
                continue;
            }
            self.attributes.insert(key.clone(), value.clone());
        }
    }

    /// Accumulated validation messages
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Mutable validation messages
    pub fn errors_mut(&mut self) -> &mut FieldErrors {
        &mut self.errors
    }

    /// Replace the validation messages (builder style)
    #[must_use]
    pub fn with_errors(mut self, errors: FieldErrors) -> Self {
        self.errors = errors;
        self
    }

    /// Attributes plus `id`, as a JSON object
    pub fn to_json(&self) -> Value {
        let mut object = self.attributes.clone();
        let id = self
            .id
            .as_ref()
            .map_or(Value::Null, |id| Value::String(id.to_string()));
        object.insert("id".to_string(), id);
        Value::Object(object)
    }
}

fn humanize(attribute: &str) -> String {
    let base = attribute.strip_suffix("_id").unwrap_or(attribute);
    let spaced = base.replace('_', " ");
    let mut chars = spaced.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Join words the way a sentence lists them
pub fn to_sentence(words: &[String]) -> String {
    match words {
        [] => String::new(),
        [one] => one.clone(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    }
}
