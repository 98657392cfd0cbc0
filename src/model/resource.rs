//! Resource objects and their identities.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::error::JsonApiError;
use crate::model::Relationship;

/// The `(type, id)` pair uniquely identifying a resource across a document.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceIdentity {
    /// The resource type.
    pub resource_type: String,
    /// The resource id.
    pub id: String,
}

impl ResourceIdentity {
    /// Creates a new identity.
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource_type, self.id)
    }
}

/// A single resource object.
///
/// Attributes are opaque JSON values; relationships are insertion-ordered
/// and unique by name. A resource reachable through a relationship is an
/// owned value of its own — the same logical resource appearing on two
/// paths is two values sharing one [`ResourceIdentity`].
///
/// # Example
///
/// ```rust
/// use jsonapi_server::model::{Relationship, Resource};
/// use serde_json::json;
///
/// let resource = Resource::new("tests", "test-1")
///     .with_attribute("name", json!("Test"))
///     .with_relationship(Relationship::to_many(
///         "examples",
///         vec![Resource::new("examples", "example-1")],
///     ));
///
/// assert_eq!(resource.identity().to_string(), "tests/test-1");
/// assert!(resource.relationship("examples").is_some());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Resource {
    /// The resource type.
    pub resource_type: String,
    /// The resource id.
    pub id: String,
    /// Attribute values by name.
    pub attributes: Map<String, Value>,
    /// Relationships, insertion-ordered and unique by name.
    pub relationships: Vec<Relationship>,
    /// Resource-level links.
    pub links: BTreeMap<String, String>,
    /// Resource-level meta information.
    pub meta: Map<String, Value>,
}

impl Resource {
    /// Creates an empty resource with the given type and id.
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            attributes: Map::new(),
            relationships: Vec::new(),
            links: BTreeMap::new(),
            meta: Map::new(),
        }
    }

    /// Returns this resource's identity.
    #[must_use]
    pub fn identity(&self) -> ResourceIdentity {
        ResourceIdentity::new(self.resource_type.clone(), self.id.clone())
    }

    /// Adds an attribute, replacing an existing value of the same name.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Adds a relationship, replacing an existing one of the same name.
    #[must_use]
    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.set_relationship(relationship);
        self
    }

    /// Returns the relationship with the given name, if present.
    #[must_use]
    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|rel| rel.name == name)
    }

    /// Inserts a relationship, replacing an existing one of the same name.
    pub fn set_relationship(&mut self, relationship: Relationship) {
        if let Some(existing) = self
            .relationships
            .iter_mut()
            .find(|rel| rel.name == relationship.name)
        {
            *existing = relationship;
        } else {
            self.relationships.push(relationship);
        }
    }

    /// Renders this resource as a full resource object.
    ///
    /// Empty attribute, relationship, link and meta collections are omitted;
    /// related resources inside relationships render as identifier objects.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("type".to_string(), Value::String(self.resource_type.clone()));
        object.insert("id".to_string(), Value::String(self.id.clone()));

        if !self.attributes.is_empty() {
            object.insert("attributes".to_string(), Value::Object(self.attributes.clone()));
        }

        if !self.relationships.is_empty() {
            let mut relationships = Map::new();
            for relationship in &self.relationships {
                relationships.insert(relationship.name.clone(), relationship.to_json());
            }
            object.insert("relationships".to_string(), Value::Object(relationships));
        }

        if !self.links.is_empty() {
            object.insert("links".to_string(), links_json(&self.links));
        }

        if !self.meta.is_empty() {
            object.insert("meta".to_string(), Value::Object(self.meta.clone()));
        }

        Value::Object(object)
    }

    /// Renders this resource as an identifier object (`type` and `id` only).
    #[must_use]
    pub fn identifier_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("type".to_string(), Value::String(self.resource_type.clone()));
        object.insert("id".to_string(), Value::String(self.id.clone()));
        Value::Object(object)
    }

    /// Parses a resource object from a request body document.
    ///
    /// `type` is required; `id`, `attributes`, `relationships` and `meta`
    /// are optional. Relationship values must be linkage objects (`data`
    /// holding `null`, an identifier or an identifier array).
    ///
    /// # Errors
    ///
    /// Returns [`JsonApiError::MalformedRequest`] when the value is not an
    /// object, `type` is missing or not a string, or a nested collection
    /// has an invalid shape.
    pub fn from_json(value: &Value) -> Result<Self, JsonApiError> {
        let object = value
            .as_object()
            .ok_or_else(|| JsonApiError::malformed("Resource must be an object"))?;

        let resource_type = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| JsonApiError::malformed("Resource requires a string 'type'"))?;

        let id = match object.get("id") {
            None => "",
            Some(Value::String(id)) => id,
            Some(_) => return Err(JsonApiError::malformed("Resource 'id' must be a string")),
        };

        let mut resource = Self::new(resource_type, id);

        if let Some(attributes) = object.get("attributes") {
            resource.attributes = attributes
                .as_object()
                .ok_or_else(|| JsonApiError::malformed("Resource 'attributes' must be an object"))?
                .clone();
        }

        if let Some(relationships) = object.get("relationships") {
            let relationships = relationships.as_object().ok_or_else(|| {
                JsonApiError::malformed("Resource 'relationships' must be an object")
            })?;
            for (name, linkage) in relationships {
                resource
                    .relationships
                    .push(Relationship::from_json(name, linkage)?);
            }
        }

        if let Some(meta) = object.get("meta") {
            resource.meta = meta
                .as_object()
                .ok_or_else(|| JsonApiError::malformed("Resource 'meta' must be an object"))?
                .clone();
        }

        Ok(resource)
    }
}

/// Renders a link map as a JSON object of string links.
pub(crate) fn links_json(links: &BTreeMap<String, String>) -> Value {
    let mut object = Map::new();
    for (name, href) in links {
        object.insert(name.clone(), Value::String(href.clone()));
    }
    Value::Object(object)
}

// Verify model types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceIdentity>();
    assert_send_sync::<Resource>();
};
