//! The parsed inbound HTTP surface consumed by the engine.
//!
//! The engine never reads request bytes itself; the surrounding transport
//! layer hands it an already-parsed [`HttpRequest`]. This module provides
//! that type, the [`HttpMethod`] enum and the bracketed query-string codec
//! ([`QueryParams`]) shared by the directive parser and the pagination
//! link generator.

mod query;
mod request;

pub use query::{QueryParams, QueryValue};
pub use request::{HttpMethod, HttpRequest, HttpRequestBuilder};
