//! Request handling and dispatch by resource type.
//!
//! A [`RequestHandler`] serves the six protocol operations for one or more
//! resource types. Handlers compose: a [`HandlerRegistry`] routes by exact
//! type, a [`HandlerChain`] tries independently configured handlers in
//! order, and a [`ProviderRequestHandler`] adapts plain
//! [`ResourceProvider`]s — application code that fetches and mutates
//! domain data — into handlers.
//!
//! # Capabilities
//!
//! Write support is opt-in through default trait methods: a handler or
//! provider that only implements the fetch operations automatically
//! answers save, delete and relationship modification with
//! [`JsonApiError::NotAllowed`] — "type supported, operation not",
//! distinct from [`JsonApiError::UnsupportedType`].

mod chain;
mod provider;
mod registry;

pub use chain::HandlerChain;
pub use provider::{ProviderRequestHandler, ResourceProvider};
pub use registry::HandlerRegistry;

use crate::error::JsonApiError;
use crate::model::Document;
use crate::request::{FetchRequest, JsonApiRequest, RelationshipModificationRequest, SaveRequest};

/// A handler serving the protocol operations for resource types.
///
/// The three fetch operations are required; the write operations default
/// to [`JsonApiError::NotAllowed`].
///
/// # Example
///
/// ```rust
/// use jsonapi_server::error::JsonApiError;
/// use jsonapi_server::handler::RequestHandler;
/// use jsonapi_server::model::{Document, Resource};
/// use jsonapi_server::request::FetchRequest;
///
/// struct ReadOnlyHandler;
///
/// impl RequestHandler for ReadOnlyHandler {
///     fn fetch_resource(&self, request: &FetchRequest) -> Result<Document, JsonApiError> {
///         Ok(Document::single(Some(Resource::new(
///             request.resource_type(),
///             request.id(),
///         ))))
///     }
///
///     fn fetch_resources(&self, request: &FetchRequest) -> Result<Document, JsonApiError> {
///         let _ = request;
///         Ok(Document::collection(vec![]))
///     }
///
///     fn fetch_relationship(&self, request: &FetchRequest) -> Result<Document, JsonApiError> {
///         let _ = request;
///         Ok(Document::single(None))
///     }
/// }
/// ```
pub trait RequestHandler: Send + Sync {
    /// Fetches a single resource.
    ///
    /// # Errors
    ///
    /// Returns [`JsonApiError::UnsupportedType`] for unknown types,
    /// [`JsonApiError::ResourceNotFound`] for unknown ids, or any other
    /// taxonomy error.
    fn fetch_resource(&self, request: &FetchRequest) -> Result<Document, JsonApiError>;

    /// Fetches a resource collection.
    ///
    /// # Errors
    ///
    /// Returns [`JsonApiError::UnsupportedType`] for unknown types, or any
    /// other taxonomy error.
    fn fetch_resources(&self, request: &FetchRequest) -> Result<Document, JsonApiError>;

    /// Fetches a relationship of a single resource, either as linkage
    /// (`.../relationship/{name}`) or as related resources
    /// (`.../{name}`).
    ///
    /// # Errors
    ///
    /// Returns [`JsonApiError::UnsupportedType`] for unknown types,
    /// [`JsonApiError::ResourceNotFound`] for unknown ids, or any other
    /// taxonomy error.
    fn fetch_relationship(&self, request: &FetchRequest) -> Result<Document, JsonApiError>;

    /// Creates or patches a resource, decided by the presence of an id.
    ///
    /// # Errors
    ///
    /// Defaults to [`JsonApiError::NotAllowed`].
    fn save_resource(&self, request: &SaveRequest) -> Result<Document, JsonApiError> {
        Err(JsonApiError::not_allowed(request.resource_type(), "save"))
    }

    /// Deletes a resource.
    ///
    /// # Errors
    ///
    /// Defaults to [`JsonApiError::NotAllowed`].
    fn delete_resource(&self, request: &JsonApiRequest) -> Result<Document, JsonApiError> {
        Err(JsonApiError::not_allowed(request.resource_type(), "delete"))
    }

    /// Adds to, replaces or removes from a relationship, decided by the
    /// HTTP verb carried on the request.
    ///
    /// # Errors
    ///
    /// Defaults to [`JsonApiError::NotAllowed`].
    fn modify_relationship(
        &self,
        request: &RelationshipModificationRequest,
    ) -> Result<Document, JsonApiError> {
        Err(JsonApiError::not_allowed(
            request.resource_type(),
            "modify-relationship",
        ))
    }
}
