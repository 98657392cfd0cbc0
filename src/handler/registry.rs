//! Exact type-to-handler routing.

use std::collections::HashMap;

use crate::error::JsonApiError;
use crate::handler::RequestHandler;
use crate::model::Document;
use crate::request::{FetchRequest, JsonApiRequest, RelationshipModificationRequest, SaveRequest};

/// A registry routing each request to the handler registered for its
/// resource type.
///
/// An unmapped type answers every operation with
/// [`JsonApiError::UnsupportedType`].
///
/// # Example
///
/// ```rust,ignore
/// let mut registry = HandlerRegistry::new();
/// registry
///     .add_handler("tests", tests_handler)
///     .add_handler("examples", examples_handler);
/// ```
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Box<dyn RequestHandler>>,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &format!("<{} handlers>", self.handlers.len()))
            .finish()
    }
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for a resource type, replacing an existing one.
    /// Returns `&mut Self` to allow method chaining.
    pub fn add_handler(
        &mut self,
        resource_type: impl Into<String>,
        handler: impl RequestHandler + 'static,
    ) -> &mut Self {
        self.handlers.insert(resource_type.into(), Box::new(handler));
        self
    }

    fn handler(&self, resource_type: &str) -> Result<&dyn RequestHandler, JsonApiError> {
        self.handlers
            .get(resource_type)
            .map(Box::as_ref)
            .ok_or_else(|| JsonApiError::unsupported_type(resource_type))
    }
}

impl RequestHandler for HandlerRegistry {
    fn fetch_resource(&self, request: &FetchRequest) -> Result<Document, JsonApiError> {
        self.handler(request.resource_type())?.fetch_resource(request)
    }

    fn fetch_resources(&self, request: &FetchRequest) -> Result<Document, JsonApiError> {
        self.handler(request.resource_type())?.fetch_resources(request)
    }

    fn fetch_relationship(&self, request: &FetchRequest) -> Result<Document, JsonApiError> {
        self.handler(request.resource_type())?
            .fetch_relationship(request)
    }

    fn save_resource(&self, request: &SaveRequest) -> Result<Document, JsonApiError> {
        self.handler(request.resource_type())?.save_resource(request)
    }

    fn delete_resource(&self, request: &JsonApiRequest) -> Result<Document, JsonApiError> {
        self.handler(request.resource_type())?.delete_resource(request)
    }

    fn modify_relationship(
        &self,
        request: &RelationshipModificationRequest,
    ) -> Result<Document, JsonApiError> {
        self.handler(request.resource_type())?
            .modify_relationship(request)
    }
}

// Verify HandlerRegistry is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HandlerRegistry>();
};
