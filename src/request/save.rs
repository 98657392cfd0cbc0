//! Write requests: resource saves and relationship modifications.

use serde_json::Value;

use crate::error::JsonApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::model::{Document, PrimaryData, Relationship, Resource};
use crate::request::base::{parse_path, validate_content_type};

/// A parsed create-or-patch request.
///
/// Whether the request creates or patches is decided by the resolved id:
/// an id from the path (or a client-generated id in the body) makes it a
/// patch target, an empty id a create.
///
/// # Example
///
/// ```rust
/// use jsonapi_server::http::HttpRequest;
/// use jsonapi_server::request::SaveRequest;
///
/// let body = r#"{"data": {"type": "tests", "attributes": {"name": "New"}}}"#;
/// let request = SaveRequest::from_http_request(
///     &HttpRequest::post("/tests", body),
///     "",
/// )
/// .unwrap();
///
/// assert!(!request.contains_id());
/// assert_eq!(request.resource().attributes["name"], "New");
/// ```
#[derive(Clone, Debug)]
pub struct SaveRequest {
    resource_type: String,
    id: String,
    resource: Resource,
    uri: String,
}

impl SaveRequest {
    /// Parses a save request from path and body.
    ///
    /// # Errors
    ///
    /// Returns [`JsonApiError::UnsupportedMediaType`] for a wrong
    /// `Content-Type` header, and [`JsonApiError::MalformedRequest`] when
    /// the body is missing or invalid JSON, carries no single resource
    /// object, or its type or id contradicts the path.
    pub fn from_http_request(
        request: &HttpRequest,
        api_prefix: &str,
    ) -> Result<Self, JsonApiError> {
        validate_content_type(request)?;
        let target = parse_path(&request.path, api_prefix)?;

        let document = parse_body_document(request)?;
        let PrimaryData::Single(Some(resource)) = document.data else {
            return Err(JsonApiError::malformed(
                "Save requests require a single resource object",
            ));
        };

        if resource.resource_type != target.resource_type {
            return Err(JsonApiError::malformed(
                "Requested resource type does not match given resource type",
            ));
        }

        let id = if target.id.is_empty() {
            resource.id.clone()
        } else {
            if !resource.id.is_empty() && resource.id != target.id {
                return Err(JsonApiError::malformed(
                    "Resource id does not match the requested id",
                ));
            }
            target.id
        };

        Ok(Self {
            resource_type: target.resource_type,
            id,
            resource,
            uri: request.uri(),
        })
    }

    /// Returns the requested resource type.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Returns the resolved resource id (empty for plain creates).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns `true` when the request targets an existing or
    /// client-chosen id.
    #[must_use]
    pub fn contains_id(&self) -> bool {
        !self.id.is_empty()
    }

    /// Returns the resource parsed from the request body.
    #[must_use]
    pub const fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Returns the original request URI verbatim.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

/// How a relationship should be modified, derived from the HTTP verb.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelationshipModification {
    /// POST: add the given members to the relationship.
    Add,
    /// PATCH: replace the relationship with the given members.
    Replace,
    /// DELETE: remove the given members from the relationship.
    Remove,
}

/// A parsed relationship-modification request.
///
/// Only relationship-linkage paths (`.../relationship/{name}`) may be
/// modified; a related-resource path is rejected.
#[derive(Clone, Debug)]
pub struct RelationshipModificationRequest {
    resource_type: String,
    id: String,
    relationship: String,
    modification: RelationshipModification,
    related: Relationship,
    uri: String,
}

impl RelationshipModificationRequest {
    /// Parses a relationship-modification request from path, verb and body.
    ///
    /// # Errors
    ///
    /// Returns [`JsonApiError::UnsupportedMediaType`] for a wrong
    /// `Content-Type` header, and [`JsonApiError::MalformedRequest`] when
    /// the path names no relationship, uses the related-resource form, the
    /// verb is GET, or the body is not a linkage document.
    pub fn from_http_request(
        request: &HttpRequest,
        api_prefix: &str,
    ) -> Result<Self, JsonApiError> {
        validate_content_type(request)?;
        let target = parse_path(&request.path, api_prefix)?;

        if target.relationship.is_empty() {
            return Err(JsonApiError::malformed(
                "Missing relationship which should be modified",
            ));
        }

        if !target.only_identifiers {
            return Err(JsonApiError::malformed(
                "Related resources can not be modified by a relationship update",
            ));
        }

        let modification = match request.method {
            HttpMethod::Post => RelationshipModification::Add,
            HttpMethod::Patch => RelationshipModification::Replace,
            HttpMethod::Delete => RelationshipModification::Remove,
            HttpMethod::Get => {
                return Err(JsonApiError::malformed(
                    "Relationships can not be modified by a GET request",
                ));
            }
        };

        let body = parse_body_json(request)?;
        let related = Relationship::from_json(&target.relationship, &body)?;

        Ok(Self {
            resource_type: target.resource_type,
            id: target.id,
            relationship: target.relationship,
            modification,
            related,
            uri: request.uri(),
        })
    }

    /// Returns the requested resource type.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Returns the id of the resource whose relationship is modified.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the name of the relationship to modify.
    #[must_use]
    pub fn relationship(&self) -> &str {
        &self.relationship
    }

    /// Returns the requested modification kind.
    #[must_use]
    pub const fn modification(&self) -> RelationshipModification {
        self.modification
    }

    /// Returns the relationship linkage parsed from the body.
    #[must_use]
    pub const fn related(&self) -> &Relationship {
        &self.related
    }

    /// Returns the original request URI verbatim.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

fn parse_body_json(request: &HttpRequest) -> Result<Value, JsonApiError> {
    let body = request
        .body
        .as_deref()
        .filter(|body| !body.trim().is_empty())
        .ok_or_else(|| JsonApiError::malformed("Missing request body"))?;

    serde_json::from_str(body).map_err(|_| JsonApiError::malformed("Invalid json given"))
}

fn parse_body_document(request: &HttpRequest) -> Result<Document, JsonApiError> {
    Document::from_json(&parse_body_json(request)?)
}

// Verify request types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SaveRequest>();
    assert_send_sync::<RelationshipModificationRequest>();
};
