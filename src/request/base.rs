//! Path resolution shared by all request types.
//!
//! Resource paths have up to four segments after the API prefix:
//! `{type}/{id}/{relationship-marker}/{relationship-name}`. The literal
//! marker `"relationship"` distinguishes relationship-linkage requests
//! (identifiers only) from related-resource requests (full bodies).

use crate::error::JsonApiError;
use crate::http::HttpRequest;
use crate::MEDIA_TYPE;

/// The literal path segment marking a relationship-linkage request.
pub(crate) const RELATIONSHIP_MARKER: &str = "relationship";

/// The resolved target of a request path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PathTarget {
    pub resource_type: String,
    pub id: String,
    pub relationship: String,
    pub only_identifiers: bool,
}

/// Checks that the request carries the protocol media type.
///
/// The header value must contain `application/vnd.api+json`; parameters
/// appended by clients (e.g. charsets) are tolerated.
pub(crate) fn validate_content_type(request: &HttpRequest) -> Result<(), JsonApiError> {
    match request.content_type() {
        Some(content_type) if content_type.contains(MEDIA_TYPE) => Ok(()),
        other => Err(JsonApiError::unsupported_media_type(other.unwrap_or(""))),
    }
}

/// Strips the API prefix and surrounding slashes from a request path.
pub(crate) fn normalize_path<'a>(path: &'a str, api_prefix: &str) -> Result<&'a str, JsonApiError> {
    let trimmed = path.trim_matches('/');
    let prefix = api_prefix.trim_matches('/');

    if prefix.is_empty() {
        return Ok(trimmed);
    }

    match trimmed.strip_prefix(prefix) {
        Some(rest) if rest.is_empty() => Ok(""),
        Some(rest) if rest.starts_with('/') => Ok(rest.trim_start_matches('/')),
        _ => Err(JsonApiError::malformed(format!(
            "Request path '{path}' is outside the API prefix '{prefix}'"
        ))),
    }
}

/// Resolves a request path into its target.
///
/// # Errors
///
/// Returns [`JsonApiError::MalformedRequest`] when the path lies outside
/// the API prefix, has more than four segments, contains an empty interior
/// segment, or names a fourth segment without the relationship marker.
pub(crate) fn parse_path(path: &str, api_prefix: &str) -> Result<PathTarget, JsonApiError> {
    let normalized = normalize_path(path, api_prefix)?;

    let segments: Vec<&str> = if normalized.is_empty() {
        Vec::new()
    } else {
        normalized.split('/').collect()
    };

    if segments.len() > 4 {
        return Err(JsonApiError::malformed(format!(
            "Request path '{path}' has too many segments"
        )));
    }

    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(JsonApiError::malformed(format!(
            "Request path '{path}' contains an empty segment"
        )));
    }

    let segment = |index: usize| segments.get(index).copied().unwrap_or("");

    let (relationship, only_identifiers) = if segment(3).is_empty() {
        if segment(2).is_empty() {
            (String::new(), false)
        } else {
            // related-resource request: full bodies regardless of `include`
            (segment(2).to_string(), false)
        }
    } else {
        if segment(2) != RELATIONSHIP_MARKER {
            return Err(JsonApiError::malformed("Invalid relationship request"));
        }
        (segment(3).to_string(), true)
    };

    Ok(PathTarget {
        resource_type: segment(0).to_string(),
        id: segment(1).to_string(),
        relationship,
        only_identifiers,
    })
}

/// A path-only request carrying no query directives.
///
/// Used for operations that need just the target — resource deletion in
/// particular.
///
/// # Example
///
/// ```rust
/// use jsonapi_server::http::HttpRequest;
/// use jsonapi_server::request::JsonApiRequest;
///
/// let request = JsonApiRequest::from_http_request(
///     &HttpRequest::delete("/tests/test-1"),
///     "",
/// )
/// .unwrap();
///
/// assert_eq!(request.resource_type(), "tests");
/// assert_eq!(request.id(), "test-1");
/// assert!(request.contains_id());
/// ```
#[derive(Clone, Debug)]
pub struct JsonApiRequest {
    resource_type: String,
    id: String,
    relationship: String,
    only_identifiers: bool,
    uri: String,
}

impl JsonApiRequest {
    /// Parses a path-only request.
    ///
    /// # Errors
    ///
    /// Returns [`JsonApiError::UnsupportedMediaType`] for a wrong
    /// `Content-Type` header and [`JsonApiError::MalformedRequest`] for an
    /// invalid path.
    pub fn from_http_request(
        request: &HttpRequest,
        api_prefix: &str,
    ) -> Result<Self, JsonApiError> {
        validate_content_type(request)?;
        let target = parse_path(&request.path, api_prefix)?;

        Ok(Self {
            resource_type: target.resource_type,
            id: target.id,
            relationship: target.relationship,
            only_identifiers: target.only_identifiers,
            uri: request.uri(),
        })
    }

    /// Returns the requested resource type.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Returns the requested resource id (empty for collection paths).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns `true` when the path names a resource id.
    #[must_use]
    pub fn contains_id(&self) -> bool {
        !self.id.is_empty()
    }

    /// Returns the requested relationship name (empty for none).
    #[must_use]
    pub fn relationship(&self) -> &str {
        &self.relationship
    }

    /// Returns `true` for relationship-linkage paths
    /// (`.../relationship/{name}`).
    #[must_use]
    pub const fn only_identifiers(&self) -> bool {
        self.only_identifiers
    }

    /// Returns the original request URI verbatim.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

// Verify JsonApiRequest is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<JsonApiRequest>();
};
