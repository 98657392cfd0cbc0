//! The request dispatch boundary.
//!
//! [`JsonApiServer`] turns an inbound [`HttpRequest`] into a response
//! [`Document`]: it resolves the typed request, routes it to the
//! configured [`RequestHandler`], runs the assembly engine over fetched
//! resource graphs, and recovers every taxonomy error into a single-error
//! document. It is the only place errors are recovered.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut handler = ProviderRequestHandler::new();
//! handler.add_provider("tests", MyProvider);
//!
//! let server = JsonApiServer::new(handler, ServerConfig::default());
//! let document = server.handle_http_request(&HttpRequest::get("/tests/test-1"));
//! assert_eq!(document.http_status(), 200);
//! ```

pub mod assembly;

use crate::config::ServerConfig;
use crate::error::JsonApiError;
use crate::handler::RequestHandler;
use crate::http::{HttpMethod, HttpRequest};
use crate::model::Document;
use crate::request::{
    normalize_path, FetchRequest, JsonApiRequest, RelationshipModificationRequest, SaveRequest,
};

/// The server engine: dispatch, assembly and error recovery.
pub struct JsonApiServer {
    handler: Box<dyn RequestHandler>,
    config: ServerConfig,
}

impl std::fmt::Debug for JsonApiServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonApiServer")
            .field("config", &self.config)
            .finish()
    }
}

impl JsonApiServer {
    /// Creates a server around the given handler.
    #[must_use]
    pub fn new(handler: impl RequestHandler + 'static, config: ServerConfig) -> Self {
        Self {
            handler: Box::new(handler),
            config,
        }
    }

    /// Returns the server configuration.
    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Handles one request, never failing: every error is recovered into a
    /// single-error document with the matching HTTP status.
    pub fn handle_http_request(&self, request: &HttpRequest) -> Document {
        tracing::info!(method = %request.method, uri = %request.uri(), "handling request");

        match self.dispatch(request) {
            Ok(document) => document,
            Err(error) => {
                tracing::error!(
                    method = %request.method,
                    uri = %request.uri(),
                    status = error.http_status(),
                    error = %error,
                    "request failed"
                );
                error.into_document(self.config.debug())
            }
        }
    }

    fn dispatch(&self, request: &HttpRequest) -> Result<Document, JsonApiError> {
        match request.method {
            HttpMethod::Get => self.handle_fetch(request),
            HttpMethod::Post | HttpMethod::Patch => self.handle_save(request),
            HttpMethod::Delete => self.handle_delete(request),
        }
    }

    fn handle_fetch(&self, request: &HttpRequest) -> Result<Document, JsonApiError> {
        let fetch = FetchRequest::from_http_request(request, self.config.api_prefix())?;

        let mut document = if fetch.contains_id() {
            if fetch.is_relationship_request() {
                self.handler.fetch_relationship(&fetch)?
            } else {
                self.handler.fetch_resource(&fetch)?
            }
        } else {
            self.handler.fetch_resources(&fetch)?
        };

        assembly::assemble(&mut document, &fetch);
        Ok(document)
    }

    fn handle_save(&self, request: &HttpRequest) -> Result<Document, JsonApiError> {
        if self.path_targets_relationship(request) {
            let modification =
                RelationshipModificationRequest::from_http_request(request, self.config.api_prefix())?;
            return self.handler.modify_relationship(&modification);
        }

        let save = SaveRequest::from_http_request(request, self.config.api_prefix())?;

        if save.contains_id() && request.method == HttpMethod::Post {
            return Err(JsonApiError::malformed(
                "A patch request requires the http method PATCH",
            ));
        }
        if !save.contains_id() && request.method == HttpMethod::Patch {
            return Err(JsonApiError::malformed(
                "A create request requires the http method POST",
            ));
        }

        self.handler.save_resource(&save)
    }

    fn handle_delete(&self, request: &HttpRequest) -> Result<Document, JsonApiError> {
        if self.path_targets_relationship(request) {
            let modification =
                RelationshipModificationRequest::from_http_request(request, self.config.api_prefix())?;
            return self.handler.modify_relationship(&modification);
        }

        let api_request = JsonApiRequest::from_http_request(request, self.config.api_prefix())?;
        if !api_request.contains_id() {
            return Err(JsonApiError::malformed("Missing the required resource id"));
        }

        self.handler.delete_resource(&api_request)
    }

    /// Write and delete requests with more than two path segments target a
    /// relationship rather than a resource.
    fn path_targets_relationship(&self, request: &HttpRequest) -> bool {
        normalize_path(&request.path, self.config.api_prefix())
            .map_or(false, |path| path.split('/').count() > 2)
    }
}

// Verify JsonApiServer is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<JsonApiServer>();
};
