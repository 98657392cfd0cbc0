//! Ordered handler fallback.

use crate::error::JsonApiError;
use crate::handler::RequestHandler;
use crate::model::Document;
use crate::request::{FetchRequest, JsonApiRequest, RelationshipModificationRequest, SaveRequest};

/// A chain trying an ordered list of handlers.
///
/// Each operation is offered to the handlers in registration order; a
/// handler declines by returning [`JsonApiError::UnsupportedType`], which
/// advances the chain. Any other outcome — success or failure — is final.
/// When every handler declines, the chain re-raises `UnsupportedType` for
/// the originally requested type.
///
/// This lets independently configured handler sets (e.g. several
/// registries owned by different application modules) compose without a
/// central type table.
#[derive(Default)]
pub struct HandlerChain {
    handlers: Vec<Box<dyn RequestHandler>>,
}

impl std::fmt::Debug for HandlerChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerChain")
            .field("handlers", &format!("<{} handlers>", self.handlers.len()))
            .finish()
    }
}

impl HandlerChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler to the chain. Returns `&mut Self` to allow
    /// method chaining.
    pub fn add_handler(&mut self, handler: impl RequestHandler + 'static) -> &mut Self {
        self.handlers.push(Box::new(handler));
        self
    }

    fn execute(
        &self,
        resource_type: &str,
        operation: impl Fn(&dyn RequestHandler) -> Result<Document, JsonApiError>,
    ) -> Result<Document, JsonApiError> {
        for handler in &self.handlers {
            match operation(handler.as_ref()) {
                Err(JsonApiError::UnsupportedType { .. }) => {}
                outcome => return outcome,
            }
        }

        Err(JsonApiError::unsupported_type(resource_type))
    }
}

impl RequestHandler for HandlerChain {
    fn fetch_resource(&self, request: &FetchRequest) -> Result<Document, JsonApiError> {
        self.execute(request.resource_type(), |handler| {
            handler.fetch_resource(request)
        })
    }

    fn fetch_resources(&self, request: &FetchRequest) -> Result<Document, JsonApiError> {
        self.execute(request.resource_type(), |handler| {
            handler.fetch_resources(request)
        })
    }

    fn fetch_relationship(&self, request: &FetchRequest) -> Result<Document, JsonApiError> {
        self.execute(request.resource_type(), |handler| {
            handler.fetch_relationship(request)
        })
    }

    fn save_resource(&self, request: &SaveRequest) -> Result<Document, JsonApiError> {
        self.execute(request.resource_type(), |handler| {
            handler.save_resource(request)
        })
    }

    fn delete_resource(&self, request: &JsonApiRequest) -> Result<Document, JsonApiError> {
        self.execute(request.resource_type(), |handler| {
            handler.delete_resource(request)
        })
    }

    fn modify_relationship(
        &self,
        request: &RelationshipModificationRequest,
    ) -> Result<Document, JsonApiError> {
        self.execute(request.resource_type(), |handler| {
            handler.modify_relationship(request)
        })
    }
}

// Verify HandlerChain is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HandlerChain>();
};
