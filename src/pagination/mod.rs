//! Pagination link computation.
//!
//! Providers serving collection requests call a [`PaginationLinkGenerator`]
//! to attach `self`/`first`/`previous`/`next`/`last` links to their
//! documents. [`OffsetPaginationLinkGenerator`] implements the
//! `page[offset]`/`page[limit]` convention.
//!
//! # Example
//!
//! ```rust
//! use jsonapi_server::http::HttpRequest;
//! use jsonapi_server::model::Document;
//! use jsonapi_server::pagination::{OffsetPaginationLinkGenerator, PaginationLinkGenerator};
//! use jsonapi_server::request::FetchRequest;
//!
//! let request = FetchRequest::from_http_request(
//!     &HttpRequest::get("/tests?page[offset]=10&page[limit]=10"),
//!     "",
//! )
//! .unwrap();
//!
//! let mut document = Document::collection(vec![]);
//! OffsetPaginationLinkGenerator::new(10)
//!     .add_pagination_links(&mut document, &request, 100)
//!     .unwrap();
//!
//! assert_eq!(document.links["self"], "/tests?page[offset]=10&page[limit]=10");
//! assert_eq!(document.links["first"], "/tests?page[offset]=0&page[limit]=10");
//! assert_eq!(document.links["next"], "/tests?page[offset]=20&page[limit]=10");
//! assert_eq!(document.links["last"], "/tests?page[offset]=90&page[limit]=10");
//! ```

use crate::config::ServerConfig;
use crate::error::JsonApiError;
use crate::model::Document;
use crate::request::FetchRequest;

/// The document link name for the request's own URI.
pub const SELF_LINK: &str = "self";
/// The document link name for the first page.
pub const FIRST_LINK: &str = "first";
/// The document link name for the previous page.
pub const PREVIOUS_LINK: &str = "previous";
/// The document link name for the next page.
pub const NEXT_LINK: &str = "next";
/// The document link name for the last page.
pub const LAST_LINK: &str = "last";

/// The `page[offset]` parameter key.
pub const OFFSET: &str = "offset";
/// The `page[limit]` parameter key.
pub const LIMIT: &str = "limit";

/// Adds pagination links for one pagination model to a document.
pub trait PaginationLinkGenerator: Send + Sync {
    /// Adds all applicable pagination links to the document.
    ///
    /// `result_count` is the total number of resources matching the
    /// request, not the page size.
    ///
    /// # Errors
    ///
    /// Returns [`JsonApiError::MalformedRequest`] for invalid pagination
    /// parameters.
    fn add_pagination_links(
        &self,
        document: &mut Document,
        request: &FetchRequest,
        result_count: usize,
    ) -> Result<(), JsonApiError>;
}

/// Offset/limit pagination links.
///
/// Link URIs preserve every other query parameter of the original request
/// and rewrite only `page[offset]` — and `page[limit]`, when the request
/// carried an explicit limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OffsetPaginationLinkGenerator {
    default_limit: usize,
}

impl OffsetPaginationLinkGenerator {
    /// Creates a generator with the limit applied when a request carries
    /// no `page[limit]`.
    #[must_use]
    pub const fn new(default_limit: usize) -> Self {
        Self { default_limit }
    }

    /// Creates a generator using the configured default page limit.
    #[must_use]
    pub const fn from_config(config: &ServerConfig) -> Self {
        Self {
            default_limit: config.default_page_limit(),
        }
    }

    /// Resolves the effective limit of a request.
    fn limit(&self, request: &FetchRequest) -> Result<i64, JsonApiError> {
        let limit = match request.pagination().get(LIMIT) {
            None => i64::try_from(self.default_limit).unwrap_or(i64::MAX),
            Some(raw) => raw
                .parse()
                .map_err(|_| JsonApiError::malformed("Invalid pagination limit requested"))?,
        };

        if limit < 1 {
            return Err(JsonApiError::malformed(
                "Invalid pagination limit requested",
            ));
        }

        Ok(limit)
    }

    /// Resolves the requested offset, defaulting to 0.
    fn offset(request: &FetchRequest) -> Result<i64, JsonApiError> {
        match request.pagination().get(OFFSET) {
            None => Ok(0),
            Some(raw) => raw
                .parse()
                .map_err(|_| JsonApiError::malformed("Invalid pagination offset requested")),
        }
    }

    /// Builds a link URI for the given offset, preserving all other query
    /// parameters.
    fn paginated_uri(&self, request: &FetchRequest, offset: i64) -> Result<String, JsonApiError> {
        let mut query = request.query_params().clone();
        query.set_nested_entry("page", OFFSET, offset.to_string());
        if request.pagination().contains_key(LIMIT) {
            query.set_nested_entry("page", LIMIT, self.limit(request)?.to_string());
        }

        let path = request
            .uri()
            .split_once('?')
            .map_or(request.uri(), |(path, _)| path);

        Ok(format!("{path}?{}", query.encode()))
    }
}

impl PaginationLinkGenerator for OffsetPaginationLinkGenerator {
    fn add_pagination_links(
        &self,
        document: &mut Document,
        request: &FetchRequest,
        result_count: usize,
    ) -> Result<(), JsonApiError> {
        document
            .links
            .insert(SELF_LINK.to_string(), request.uri().to_string());

        let offset = Self::offset(request)?;
        let max_offset = i64::try_from(result_count).unwrap_or(i64::MAX) - 1;
        if offset < 0 || (result_count > 0 && offset > max_offset) {
            return Err(JsonApiError::malformed(
                "Invalid pagination offset requested",
            ));
        }
        let limit = self.limit(request)?;

        if offset != 0 {
            document
                .links
                .insert(FIRST_LINK.to_string(), self.paginated_uri(request, 0)?);
        }

        let previous = offset - limit;
        if previous >= 0 {
            document.links.insert(
                PREVIOUS_LINK.to_string(),
                self.paginated_uri(request, previous)?,
            );
        } else if offset != 0 {
            document
                .links
                .insert(PREVIOUS_LINK.to_string(), self.paginated_uri(request, 0)?);
        }

        let last = i64::try_from(result_count).unwrap_or(i64::MAX) - limit;
        let next = offset + limit;

        if next <= last {
            document
                .links
                .insert(NEXT_LINK.to_string(), self.paginated_uri(request, next)?);
        }

        if last > offset {
            document
                .links
                .insert(LAST_LINK.to_string(), self.paginated_uri(request, last)?);
        }

        Ok(())
    }
}

// Verify the generator is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<OffsetPaginationLinkGenerator>();
};
