//! Error types for the JSON:API server engine.
//!
//! This module contains [`ConfigError`] for configuration validation and
//! [`JsonApiError`], the request error taxonomy shared by the directive
//! parser, the handler dispatch layer and resource providers.
//!
//! # Error Handling
//!
//! Every error in the taxonomy maps to an HTTP status code and can be
//! converted into a single-error response document. Errors are recovered
//! only at the outermost dispatch boundary ([`crate::server::JsonApiServer`]);
//! the assembly engine itself never catches them.
//!
//! # Example
//!
//! ```rust
//! use jsonapi_server::error::JsonApiError;
//!
//! let error = JsonApiError::unsupported_type("articles");
//! assert_eq!(error.http_status(), 404);
//!
//! let document = error.into_document(false);
//! assert_eq!(document.http_status(), 404);
//! ```

use thiserror::Error;

use crate::model::{Document, ErrorObject};

/// Errors that can occur during engine configuration.
///
/// Configuration constructors return `Result<T, ConfigError>` to enable
/// fail-fast validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The default pagination limit must allow at least one resource per page.
    #[error("Invalid default page limit '{limit}'. The limit must be 1 or greater.")]
    InvalidPageLimit {
        /// The invalid limit that was provided.
        limit: usize,
    },
}

/// The request error taxonomy of the engine.
///
/// Each variant corresponds to one failure class of the protocol and maps
/// to a fixed HTTP status via [`http_status`](Self::http_status):
///
/// | Variant                | Status |
/// |------------------------|--------|
/// | `MalformedRequest`     | 400    |
/// | `UnsupportedMediaType` | 415    |
/// | `UnsupportedType`      | 404    |
/// | `ResourceNotFound`     | 404    |
/// | `NotAllowed`           | 403    |
/// | `Provider`             | 500    |
///
/// `UnsupportedType` doubles as the sentinel a [`crate::handler::HandlerChain`]
/// uses to advance to the next handler; it is an ordinary `Err` value, never
/// unwinding control flow.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JsonApiError {
    /// The request path or a query parameter has an invalid shape.
    #[error("Malformed request: {reason}")]
    MalformedRequest {
        /// What was wrong, naming the offending parameter or path part.
        reason: String,
    },

    /// The `Content-Type` header does not carry the protocol media type.
    #[error("Invalid content type header: {content_type}")]
    UnsupportedMediaType {
        /// The content type that was received.
        content_type: String,
    },

    /// No handler or provider is registered for the requested resource type.
    #[error("Resource type '{resource_type}' is not supported")]
    UnsupportedType {
        /// The unsupported resource type.
        resource_type: String,
    },

    /// A provider could not locate the requested resource id.
    #[error("Resource '{resource_type}' with id '{id}' not found")]
    ResourceNotFound {
        /// The resource type that was requested.
        resource_type: String,
        /// The id that could not be found.
        id: String,
    },

    /// The type is supported but the requested operation is not.
    #[error("Operation '{operation}' is not allowed for resource type '{resource_type}'")]
    NotAllowed {
        /// The resource type the operation was attempted on.
        resource_type: String,
        /// The operation that was refused (e.g. "save", "delete").
        operation: &'static str,
    },

    /// Any other failure surfaced by a provider, treated as opaque.
    #[error("Provider error: {message}")]
    Provider {
        /// The underlying failure description.
        message: String,
    },
}

impl JsonApiError {
    /// Creates a `MalformedRequest` error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedRequest {
            reason: reason.into(),
        }
    }

    /// Creates an `UnsupportedMediaType` error from the received header value.
    pub fn unsupported_media_type(content_type: impl Into<String>) -> Self {
        Self::UnsupportedMediaType {
            content_type: content_type.into(),
        }
    }

    /// Creates an `UnsupportedType` error.
    pub fn unsupported_type(resource_type: impl Into<String>) -> Self {
        Self::UnsupportedType {
            resource_type: resource_type.into(),
        }
    }

    /// Creates a `ResourceNotFound` error.
    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Creates a `NotAllowed` error.
    pub fn not_allowed(resource_type: impl Into<String>, operation: &'static str) -> Self {
        Self::NotAllowed {
            resource_type: resource_type.into(),
            operation,
        }
    }

    /// Creates an opaque `Provider` error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// Returns the HTTP status code this error maps to.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::MalformedRequest { .. } => 400,
            Self::NotAllowed { .. } => 403,
            Self::UnsupportedType { .. } | Self::ResourceNotFound { .. } => 404,
            Self::UnsupportedMediaType { .. } => 415,
            Self::Provider { .. } => 500,
        }
    }

    /// Returns the generic, occurrence-independent error title.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::MalformedRequest { .. } => "Bad Request",
            Self::NotAllowed { .. } => "Forbidden",
            Self::UnsupportedType { .. } | Self::ResourceNotFound { .. } => "Not Found",
            Self::UnsupportedMediaType { .. } => "Unsupported Media Type",
            Self::Provider { .. } => "Internal Server Error",
        }
    }

    /// Converts this error into a single-error response document.
    ///
    /// Provider errors are sanitized: the detail message is withheld unless
    /// `debug` is set, in which case the full message is exposed as the
    /// error object's detail and mirrored into its meta.
    #[must_use]
    pub fn into_document(self, debug: bool) -> Document {
        let status = self.http_status();
        let mut error = ErrorObject::new(status, self.title());

        match &self {
            Self::Provider { message } => {
                if debug {
                    error.detail = Some(message.clone());
                    error.meta.insert(
                        "error".to_string(),
                        serde_json::Value::String(message.clone()),
                    );
                }
            }
            other => {
                error.detail = Some(other.to_string());
            }
        }

        let mut document = Document::single(None);
        document.errors.push(error);
        document.set_http_status(status);
        document
    }
}

// Verify error types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ConfigError>();
    assert_send_sync::<JsonApiError>();
};
