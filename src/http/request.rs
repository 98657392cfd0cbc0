//! HTTP request types consumed by the server engine.
//!
//! This module provides the [`HttpRequest`] type and its builder. A request
//! carries the already-parsed method, path, raw query string, headers and
//! body; reading and writing wire bytes is the transport layer's job.

use std::collections::HashMap;
use std::fmt;

use crate::MEDIA_TYPE;

/// HTTP methods supported by the protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// HTTP GET method for fetching resources and relationships.
    Get,
    /// HTTP POST method for creating resources and adding relationship members.
    Post,
    /// HTTP PATCH method for updating resources and replacing relationships.
    Patch,
    /// HTTP DELETE method for removing resources and relationship members.
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Patch => write!(f, "PATCH"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// An inbound HTTP request as seen by the engine.
///
/// Use [`HttpRequest::builder`] for full control, or the
/// [`get`](Self::get) / [`post`](Self::post) / [`patch`](Self::patch) /
/// [`delete`](Self::delete) conveniences which pre-set the protocol media
/// type header.
///
/// # Example
///
/// ```rust
/// use jsonapi_server::http::{HttpMethod, HttpRequest};
///
/// let request = HttpRequest::get("/tests/test-1?include=examples");
/// assert_eq!(request.method, HttpMethod::Get);
/// assert_eq!(request.path, "/tests/test-1");
/// assert_eq!(request.query, "include=examples");
/// assert_eq!(request.uri(), "/tests/test-1?include=examples");
/// ```
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// The HTTP method of the request.
    pub method: HttpMethod,
    /// The request path, without the query string.
    pub path: String,
    /// The raw query string, without the leading `?`.
    pub query: String,
    /// Request headers with lowercased names.
    pub headers: HashMap<String, String>,
    /// The raw request body, if any.
    pub body: Option<String>,
}

impl HttpRequest {
    /// Creates a new builder for constructing an `HttpRequest`.
    ///
    /// The `uri` is split into path and query at the first `?`.
    #[must_use]
    pub fn builder(method: HttpMethod, uri: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder::new(method, uri)
    }

    /// Creates a GET request with the protocol media type pre-set.
    #[must_use]
    pub fn get(uri: impl Into<String>) -> Self {
        Self::builder(HttpMethod::Get, uri)
            .header("Content-Type", MEDIA_TYPE)
            .build()
    }

    /// Creates a POST request with the protocol media type and the given body.
    #[must_use]
    pub fn post(uri: impl Into<String>, body: impl Into<String>) -> Self {
        Self::builder(HttpMethod::Post, uri)
            .header("Content-Type", MEDIA_TYPE)
            .body(body)
            .build()
    }

    /// Creates a PATCH request with the protocol media type and the given body.
    #[must_use]
    pub fn patch(uri: impl Into<String>, body: impl Into<String>) -> Self {
        Self::builder(HttpMethod::Patch, uri)
            .header("Content-Type", MEDIA_TYPE)
            .body(body)
            .build()
    }

    /// Creates a DELETE request with the protocol media type pre-set.
    #[must_use]
    pub fn delete(uri: impl Into<String>) -> Self {
        Self::builder(HttpMethod::Delete, uri)
            .header("Content-Type", MEDIA_TYPE)
            .build()
    }

    /// Returns a header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Returns the `Content-Type` header value, if present.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Returns the original URI (path plus query string) verbatim.
    #[must_use]
    pub fn uri(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }
}

/// Builder for constructing [`HttpRequest`] instances.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    method: HttpMethod,
    path: String,
    query: String,
    headers: HashMap<String, String>,
    body: Option<String>,
}

impl HttpRequestBuilder {
    /// Creates a new builder from a method and a `path?query` URI.
    #[must_use]
    pub fn new(method: HttpMethod, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path.to_string(), query.to_string()),
            None => (uri, String::new()),
        };

        Self {
            method,
            path,
            query,
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Adds a header. Names are stored lowercased.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_lowercase(), value.into());
        self
    }

    /// Sets the raw request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Builds the request.
    #[must_use]
    pub fn build(self) -> HttpRequest {
        HttpRequest {
            method: self.method,
            path: self.path,
            query: self.query,
            headers: self.headers,
            body: self.body,
        }
    }
}

// Verify types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpMethod>();
    assert_send_sync::<HttpRequest>();
};
