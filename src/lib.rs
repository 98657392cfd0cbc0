//! # JSON:API Server Engine
//!
//! A server-side engine for building JSON:API compliant resource APIs,
//! providing request directive resolution, pluggable resource providers,
//! compound document assembly and pagination link generation.
//!
//! ## Overview
//!
//! This crate provides:
//! - A typed fetch directive ([`request::FetchRequest`]) parsed from path
//!   and query string: includes, sparse fieldsets, filters, sort and
//!   pagination, with per-relationship sub-directive derivation
//! - A handler layer routing requests by resource type, with exact
//!   registries, ordered fallback chains and a provider adapter
//!   ([`handler`])
//! - The recursive compound document assembly engine
//!   ([`server::assembly`]): attribute filtering, relationship visibility
//!   and deduplicated `included` side-loading, safe on cyclic graphs
//! - Offset-based pagination links ([`pagination`])
//! - A single recovery boundary converting every failure into a
//!   single-error document ([`server::JsonApiServer`])
//!
//! The engine performs no I/O: the transport layer parses request bytes
//! into [`http::HttpRequest`] values and serializes the returned
//! [`model::Document`] (via [`model::Document::to_json`]); providers own
//! all domain data access.
//!
//! ## Quick Start
//!
//! ```rust
//! use jsonapi_server::config::ServerConfig;
//! use jsonapi_server::error::JsonApiError;
//! use jsonapi_server::handler::{ProviderRequestHandler, ResourceProvider};
//! use jsonapi_server::http::HttpRequest;
//! use jsonapi_server::model::Resource;
//! use jsonapi_server::request::FetchRequest;
//! use jsonapi_server::server::JsonApiServer;
//! use serde_json::json;
//!
//! struct TestProvider;
//!
//! impl ResourceProvider for TestProvider {
//!     fn find_resource(
//!         &self,
//!         resource_type: &str,
//!         id: &str,
//!         _request: &FetchRequest,
//!     ) -> Result<Resource, JsonApiError> {
//!         Ok(Resource::new(resource_type, id).with_attribute("name", json!("Test")))
//!     }
//!
//!     fn find_resources(
//!         &self,
//!         resource_type: &str,
//!         _request: &FetchRequest,
//!     ) -> Result<Vec<Resource>, JsonApiError> {
//!         Ok(vec![Resource::new(resource_type, "test-1")])
//!     }
//! }
//!
//! let mut handler = ProviderRequestHandler::new();
//! handler.add_provider("tests", TestProvider);
//!
//! let server = JsonApiServer::new(handler, ServerConfig::default());
//! let document = server.handle_http_request(&HttpRequest::get("/tests/test-1"));
//!
//! assert_eq!(document.http_status(), 200);
//! assert_eq!(document.to_json()["data"]["id"], json!("test-1"));
//! ```
//!
//! ## Design Principles
//!
//! - **No I/O**: transport and providers own all reading and writing
//! - **Fail-fast parsing**: malformed requests are rejected before any
//!   provider runs, naming the offending parameter
//! - **Thread-safe**: all public types are `Send + Sync`; a single request
//!   is processed by a single thread
//! - **One recovery boundary**: providers and the assembly engine
//!   propagate errors; only the server converts them into error documents

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod model;
pub mod pagination;
pub mod request;
pub mod server;

/// The protocol media type carried by every request and response.
pub const MEDIA_TYPE: &str = "application/vnd.api+json";

// Re-export the main surface at the crate root for convenience
pub use config::{ServerConfig, ServerConfigBuilder};
pub use error::{ConfigError, JsonApiError};
pub use handler::{
    HandlerChain, HandlerRegistry, ProviderRequestHandler, RequestHandler, ResourceProvider,
};
pub use http::{HttpMethod, HttpRequest};
pub use model::{
    Cardinality, Document, ErrorObject, PrimaryData, Relationship, Resource, ResourceIdentity,
};
pub use pagination::{OffsetPaginationLinkGenerator, PaginationLinkGenerator};
pub use request::{
    FetchRequest, JsonApiRequest, RelationshipModification, RelationshipModificationRequest,
    SaveRequest, SortInstruction,
};
pub use server::JsonApiServer;
