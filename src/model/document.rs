//! Response documents.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::JsonApiError;
use crate::model::resource::links_json;
use crate::model::{Resource, ResourceIdentity};

/// The primary data of a document.
///
/// A single-resource document whose resource is absent renders
/// `data: null`; an empty collection renders `data: []`. The distinction
/// is fixed at construction and survives assembly.
#[derive(Clone, Debug, PartialEq)]
pub enum PrimaryData {
    /// Zero or one resource (`data: null` when absent).
    Single(Option<Resource>),
    /// A resource collection (`data: []` when empty).
    Collection(Vec<Resource>),
}

/// A response document.
///
/// Documents are created fresh per request, either by a handler wrapping
/// provider results or by the error conversion in
/// [`JsonApiError::into_document`](crate::error::JsonApiError::into_document).
///
/// # Example
///
/// ```rust
/// use jsonapi_server::model::{Document, Resource};
///
/// let document = Document::single(Some(Resource::new("tests", "test-1")));
/// assert_eq!(document.http_status(), 200);
/// assert_eq!(document.primary_resources().len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    /// The primary data.
    pub data: PrimaryData,
    /// Side-loaded resources, insertion-ordered and unique by identity.
    pub included: Vec<Resource>,
    /// Document-level links.
    pub links: BTreeMap<String, String>,
    /// Document-level meta information.
    pub meta: Map<String, Value>,
    /// Error objects; a non-empty list suppresses `data` in the projection.
    pub errors: Vec<ErrorObject>,
    http_status: u16,
}

impl Document {
    /// Creates a single-resource document with HTTP status 200.
    #[must_use]
    pub fn single(resource: Option<Resource>) -> Self {
        Self::with_data(PrimaryData::Single(resource))
    }

    /// Creates a resource-collection document with HTTP status 200.
    #[must_use]
    pub fn collection(resources: Vec<Resource>) -> Self {
        Self::with_data(PrimaryData::Collection(resources))
    }

    fn with_data(data: PrimaryData) -> Self {
        Self {
            data,
            included: Vec::new(),
            links: BTreeMap::new(),
            meta: Map::new(),
            errors: Vec::new(),
            http_status: 200,
        }
    }

    /// Returns the HTTP status this document should be answered with.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.http_status
    }

    /// Sets the HTTP status.
    pub fn set_http_status(&mut self, status: u16) {
        self.http_status = status;
    }

    /// Returns the primary resources as a slice (empty for `data: null`).
    #[must_use]
    pub fn primary_resources(&self) -> &[Resource] {
        match &self.data {
            PrimaryData::Single(Some(resource)) => std::slice::from_ref(resource),
            PrimaryData::Single(None) => &[],
            PrimaryData::Collection(resources) => resources,
        }
    }

    /// Returns the primary resources as a mutable slice.
    pub fn primary_resources_mut(&mut self) -> &mut [Resource] {
        match &mut self.data {
            PrimaryData::Single(Some(resource)) => std::slice::from_mut(resource),
            PrimaryData::Single(None) => &mut [],
            PrimaryData::Collection(resources) => resources,
        }
    }

    /// Returns the included resource with the given identity, if present.
    #[must_use]
    pub fn included_resource(&self, identity: &ResourceIdentity) -> Option<&Resource> {
        self.included
            .iter()
            .find(|resource| resource.identity() == *identity)
    }

    /// Renders the document for the external serializer.
    ///
    /// `data` is suppressed while errors are present; `included`, `links`
    /// and `meta` appear only when non-empty.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();

        if self.errors.is_empty() {
            let data = match &self.data {
                PrimaryData::Single(resource) => {
                    resource.as_ref().map_or(Value::Null, Resource::to_json)
                }
                PrimaryData::Collection(resources) => {
                    Value::Array(resources.iter().map(Resource::to_json).collect())
                }
            };
            object.insert("data".to_string(), data);

            if !self.included.is_empty() {
                object.insert(
                    "included".to_string(),
                    Value::Array(self.included.iter().map(Resource::to_json).collect()),
                );
            }
        } else {
            object.insert(
                "errors".to_string(),
                Value::Array(self.errors.iter().map(ErrorObject::to_json).collect()),
            );
        }

        if !self.links.is_empty() {
            object.insert("links".to_string(), links_json(&self.links));
        }

        if !self.meta.is_empty() {
            object.insert("meta".to_string(), Value::Object(self.meta.clone()));
        }

        Value::Object(object)
    }

    /// Parses a request body document.
    ///
    /// Only the `data` member is read: an object becomes a single-resource
    /// document, an array a collection, `null` an empty single-resource
    /// document.
    ///
    /// # Errors
    ///
    /// Returns [`JsonApiError::MalformedRequest`] when the body is not an
    /// object with a `data` member of one of those shapes.
    pub fn from_json(value: &Value) -> Result<Self, JsonApiError> {
        let data = value
            .as_object()
            .and_then(|object| object.get("data"))
            .ok_or_else(|| JsonApiError::malformed("Request document requires a 'data' member"))?;

        match data {
            Value::Null => Ok(Self::single(None)),
            Value::Object(_) => Ok(Self::single(Some(Resource::from_json(data)?))),
            Value::Array(entries) => {
                let resources = entries
                    .iter()
                    .map(Resource::from_json)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::collection(resources))
            }
            _ => Err(JsonApiError::malformed(
                "Request document 'data' must be an object, an array or null",
            )),
        }
    }
}

/// A single error entry of an error document.
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorObject {
    /// The HTTP status code this error maps to.
    pub status: u16,
    /// A short, occurrence-independent summary.
    pub title: String,
    /// An occurrence-specific description, if one may be exposed.
    pub detail: Option<String>,
    /// Additional error meta information.
    pub meta: Map<String, Value>,
}

impl ErrorObject {
    /// Creates an error object without detail or meta.
    pub fn new(status: u16, title: impl Into<String>) -> Self {
        Self {
            status,
            title: title.into(),
            detail: None,
            meta: Map::new(),
        }
    }

    /// Renders this error as an error object with a string `status`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("status".to_string(), Value::String(self.status.to_string()));
        object.insert("title".to_string(), Value::String(self.title.clone()));

        if let Some(detail) = &self.detail {
            object.insert("detail".to_string(), Value::String(detail.clone()));
        }

        if !self.meta.is_empty() {
            object.insert("meta".to_string(), Value::Object(self.meta.clone()));
        }

        Value::Object(object)
    }
}

// Verify document types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PrimaryData>();
    assert_send_sync::<Document>();
    assert_send_sync::<ErrorObject>();
};
