//! The fetch directive and its per-relationship derivation.
//!
//! A [`FetchRequest`] is the structured form of a fetch request's path and
//! query string: requested includes (dotted paths), sparse fieldsets,
//! filters, pagination and sort. The assembly engine walks resource graphs
//! with it, deriving one child directive per relationship via
//! [`FetchRequest::sub_request`].
//!
//! # Example
//!
//! ```rust
//! use jsonapi_server::http::HttpRequest;
//! use jsonapi_server::request::FetchRequest;
//!
//! let request = FetchRequest::from_http_request(
//!     &HttpRequest::get("/tests/test-1?include=examples,examples.server&fields[tests]=name"),
//!     "",
//! )
//! .unwrap();
//!
//! assert!(request.requested_include("examples"));
//! assert!(request.requested_field("tests", "name"));
//! assert!(!request.requested_field("tests", "secret"));
//!
//! // Deriving for `examples` narrows the dotted include to its suffix.
//! let sub = request.sub_request("examples", false);
//! assert!(sub.requested_include("server"));
//! assert!(!sub.only_identifiers());
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::JsonApiError;
use crate::http::{HttpRequest, QueryParams, QueryValue};
use crate::request::base::{parse_path, validate_content_type};

/// One requested sort criterion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortInstruction {
    /// The field to sort by.
    pub field: String,
    /// `true` for ascending order; a leading `-` in the query flips this.
    pub ascending: bool,
}

/// A parsed fetch directive.
///
/// Directives are immutable after construction, with one exception: the
/// sub-request cache filled by [`sub_request`](Self::sub_request) is
/// append-only and keyed, so repeated derivation for the same relationship
/// observes one shared child. A directive is meant to be driven by a
/// single thread per request.
#[derive(Debug)]
pub struct FetchRequest {
    resource_type: String,
    id: String,
    relationship: String,
    only_identifiers: bool,
    is_main_request: bool,
    includes: Vec<String>,
    included_relationships: Vec<String>,
    fields: HashMap<String, Vec<String>>,
    filter: BTreeMap<String, Value>,
    pagination: BTreeMap<String, String>,
    sorting: Vec<SortInstruction>,
    uri: String,
    query: QueryParams,
    sub_requests: Mutex<HashMap<(String, bool), Arc<FetchRequest>>>,
}

impl FetchRequest {
    /// Parses the main fetch directive of a request.
    ///
    /// # Errors
    ///
    /// Returns [`JsonApiError::UnsupportedMediaType`] for a wrong
    /// `Content-Type` header, and [`JsonApiError::MalformedRequest`] naming
    /// the offending parameter for an invalid path or query shape.
    pub fn from_http_request(
        request: &HttpRequest,
        api_prefix: &str,
    ) -> Result<Self, JsonApiError> {
        validate_content_type(request)?;

        let target = parse_path(&request.path, api_prefix)?;
        let query = QueryParams::parse(&request.query)?;

        let mut fetch = Self {
            resource_type: target.resource_type,
            id: target.id,
            relationship: target.relationship,
            only_identifiers: target.only_identifiers,
            is_main_request: true,
            includes: Vec::new(),
            included_relationships: Vec::new(),
            fields: HashMap::new(),
            filter: BTreeMap::new(),
            pagination: BTreeMap::new(),
            sorting: Vec::new(),
            uri: request.uri(),
            query,
            sub_requests: Mutex::new(HashMap::new()),
        };

        fetch.build_from_query()?;
        Ok(fetch)
    }

    fn build_from_query(&mut self) -> Result<(), JsonApiError> {
        match self.query.value("include").cloned() {
            None => {}
            Some(QueryValue::Scalar(tokens)) => {
                for token in tokens.split(',') {
                    let token = token.trim();
                    if !token.is_empty() {
                        self.include(token);
                    }
                }
            }
            Some(QueryValue::Nested(_)) => {
                return Err(JsonApiError::malformed("Invalid include parameter given"));
            }
        }

        match self.query.value("fields").cloned() {
            None => {}
            Some(QueryValue::Nested(entries)) => {
                for (resource_type, names) in entries {
                    for name in names.split(',') {
                        let name = name.trim();
                        if !name.is_empty() {
                            self.field(&resource_type, name);
                        }
                    }
                }
            }
            Some(QueryValue::Scalar(_)) => {
                return Err(JsonApiError::malformed("Invalid fields parameter given"));
            }
        }

        match self.query.value("filter").cloned() {
            None => {}
            Some(QueryValue::Scalar(json)) => {
                let parsed: Value = serde_json::from_str(&json)
                    .map_err(|_| JsonApiError::malformed("Invalid filter parameter given"))?;
                let Value::Object(entries) = parsed else {
                    return Err(JsonApiError::malformed("Invalid filter parameter given"));
                };
                for (key, value) in entries {
                    self.filter.insert(key, value);
                }
            }
            Some(QueryValue::Nested(entries)) => {
                for (key, value) in entries {
                    self.filter.insert(key, Value::String(value));
                }
            }
        }

        match self.query.value("page").cloned() {
            None => {}
            Some(QueryValue::Nested(entries)) => {
                for (key, value) in entries {
                    self.pagination.insert(key, value);
                }
            }
            Some(QueryValue::Scalar(_)) => {
                return Err(JsonApiError::malformed("Invalid page parameter given"));
            }
        }

        match self.query.value("sort").cloned() {
            None => {}
            Some(QueryValue::Scalar(tokens)) => {
                for token in tokens.split(',') {
                    let token = token.trim();
                    if token.is_empty() {
                        continue;
                    }
                    let (field, ascending) = token
                        .strip_prefix('-')
                        .map_or((token, true), |field| (field, false));
                    self.sorting.push(SortInstruction {
                        field: field.to_string(),
                        ascending,
                    });
                }
            }
            Some(QueryValue::Nested(_)) => {
                return Err(JsonApiError::malformed("Invalid sort parameter given"));
            }
        }

        Ok(())
    }

    /// Records an include token. Re-adding a present token is a no-op.
    fn include(&mut self, token: &str) {
        if !self.includes.iter().any(|existing| existing == token) {
            self.includes.push(token.to_string());
        }
        if !token.contains('.')
            && !self
                .included_relationships
                .iter()
                .any(|existing| existing == token)
        {
            self.included_relationships.push(token.to_string());
        }
    }

    /// Records one allowed field for a type.
    fn field(&mut self, resource_type: &str, name: &str) {
        let names = self.fields.entry(resource_type.to_string()).or_default();
        if !names.iter().any(|existing| existing == name) {
            names.push(name.to_string());
        }
    }

    /// Returns the requested resource type.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Returns the requested resource id (empty for collection requests).
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

    /// Returns `true` when the path targets a relationship.
    #[must_use]
    pub fn is_relationship_request(&self) -> bool {
        !self.relationship.is_empty()
    }

    /// Returns `true` when the response may expose only resource
    /// identifiers (relationship-linkage requests and non-included
    /// sub-traversal).
    #[must_use]
    pub const fn only_identifiers(&self) -> bool {
        self.only_identifiers
    }

    /// Returns `true` when the response should contain attributes and
    /// relationships.
    #[must_use]
    pub const fn requested_resource_body(&self) -> bool {
        !self.only_identifiers
    }

    /// Returns `true` for the directive parsed from the HTTP request, and
    /// `false` for derived sub-directives.
    #[must_use]
    pub const fn is_main_request(&self) -> bool {
        self.is_main_request
    }

    /// Returns all requested include tokens, dotted paths included.
    #[must_use]
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    /// Returns `true` when the relationship was requested via a top-level
    /// include token.
    #[must_use]
    pub fn requested_include(&self, relationship: &str) -> bool {
        self.included_relationships
            .iter()
            .any(|included| included == relationship)
    }

    /// Returns the sparse fieldsets by resource type.
    #[must_use]
    pub const fn fields(&self) -> &HashMap<String, Vec<String>> {
        &self.fields
    }

    /// Returns `true` when an attribute passes the fieldset for its type.
    ///
    /// A type without a fieldset entry allows all attributes.
    #[must_use]
    pub fn requested_field(&self, resource_type: &str, name: &str) -> bool {
        self.fields
            .get(resource_type)
            .map_or(true, |names| names.iter().any(|allowed| allowed == name))
    }

    /// Returns the filter values by key.
    #[must_use]
    pub const fn filter(&self) -> &BTreeMap<String, Value> {
        &self.filter
    }

    /// Returns the pagination parameters verbatim.
    #[must_use]
    pub const fn pagination(&self) -> &BTreeMap<String, String> {
        &self.pagination
    }

    /// Returns the requested sort criteria in order.
    #[must_use]
    pub fn sorting(&self) -> &[SortInstruction] {
        &self.sorting
    }

    /// Returns the original request URI verbatim.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Returns the parsed query parameters of the originating request.
    #[must_use]
    pub const fn query_params(&self) -> &QueryParams {
        &self.query
    }

    /// Derives the sub-directive for traversing one relationship.
    ///
    /// The child drops sort and pagination, drops filters unless
    /// `keep_filters`, narrows dotted includes to the suffixes behind
    /// `relationship.`, copies fieldsets unchanged, and exposes full
    /// resource bodies only when the relationship was requested via a
    /// top-level include. Derivation is memoized per
    /// `(relationship, keep_filters)`, so both the attribute-filtering and
    /// the inclusion step of the assembly observe the same child object.
    #[must_use]
    pub fn sub_request(&self, relationship: &str, keep_filters: bool) -> Arc<Self> {
        let key = (relationship.to_string(), keep_filters);
        let mut cache = self
            .sub_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = cache.get(&key) {
            return Arc::clone(existing);
        }

        let mut child = Self {
            resource_type: self.resource_type.clone(),
            id: self.id.clone(),
            relationship: String::new(),
            only_identifiers: !self.requested_include(relationship),
            is_main_request: false,
            includes: Vec::new(),
            included_relationships: Vec::new(),
            fields: self.fields.clone(),
            filter: if keep_filters {
                self.filter.clone()
            } else {
                BTreeMap::new()
            },
            pagination: BTreeMap::new(),
            sorting: Vec::new(),
            uri: self.uri.clone(),
            query: QueryParams::default(),
            sub_requests: Mutex::new(HashMap::new()),
        };

        let prefix = format!("{relationship}.");
        for token in &self.includes {
            if let Some(suffix) = token.strip_prefix(&prefix) {
                if !suffix.is_empty() {
                    child.include(suffix);
                }
            }
        }

        let mut query = self.query.clone();
        query.remove("include");
        query.remove("sort");
        query.remove("page");
        query.remove("filter");
        if keep_filters {
            for (key, value) in &child.filter {
                let rendered = match value {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                query.set_nested_entry("filter", key, rendered);
            }
        }
        if !child.includes.is_empty() {
            query.set_scalar("include", child.includes.join(","));
        }
        child.query = query;

        let child = Arc::new(child);
        cache.insert(key, Arc::clone(&child));
        child
    }
}

// Verify FetchRequest is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<FetchRequest>();
    assert_send_sync::<SortInstruction>();
};
