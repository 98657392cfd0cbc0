//! Configuration types for the JSON:API server engine.
//!
//! The main types in this module are:
//!
//! - [`ServerConfig`]: the engine configuration (API path prefix, default
//!   pagination limit, debug flag)
//! - [`ServerConfigBuilder`]: a builder for constructing [`ServerConfig`]
//!   instances with fail-fast validation
//!
//! # Example
//!
//! ```rust
//! use jsonapi_server::config::ServerConfig;
//!
//! let config = ServerConfig::builder()
//!     .api_prefix("/api")
//!     .default_page_limit(25)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.api_prefix(), "api");
//! assert_eq!(config.default_page_limit(), 25);
//! assert!(!config.debug());
//! ```

use crate::error::ConfigError;

/// Configuration for the JSON:API server engine.
///
/// Holds the settings the dispatch and pagination components need: the
/// path prefix stripped before resolving resource paths, the pagination
/// limit applied when a request carries none, and whether error documents
/// expose provider failure details.
///
/// # Thread Safety
///
/// `ServerConfig` is `Clone`, `Send`, and `Sync`, making it safe to share
/// across threads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    api_prefix: String,
    default_page_limit: usize,
    debug: bool,
}

impl ServerConfig {
    /// Creates a new builder for constructing a `ServerConfig`.
    #[must_use]
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::new()
    }

    /// Returns the API path prefix, normalized without surrounding slashes.
    #[must_use]
    pub fn api_prefix(&self) -> &str {
        &self.api_prefix
    }

    /// Returns the pagination limit used when a request carries no
    /// `page[limit]` parameter.
    #[must_use]
    pub const fn default_page_limit(&self) -> usize {
        self.default_page_limit
    }

    /// Returns whether provider error details are exposed in error documents.
    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }
}

impl Default for ServerConfig {
    /// Returns a configuration with no API prefix, a default page limit of
    /// 10 and debug disabled.
    fn default() -> Self {
        Self {
            api_prefix: String::new(),
            default_page_limit: 10,
            debug: false,
        }
    }
}

// Verify ServerConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ServerConfig>();
};

/// Builder for constructing [`ServerConfig`] instances.
///
/// # Example
///
/// ```rust
/// use jsonapi_server::config::ServerConfig;
///
/// let config = ServerConfig::builder()
///     .debug(true)
///     .build()
///     .unwrap();
/// assert!(config.debug());
/// ```
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    api_prefix: Option<String>,
    default_page_limit: Option<usize>,
    debug: bool,
}

impl ServerConfigBuilder {
    /// Creates a new builder with all values unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API path prefix. Surrounding slashes are stripped, so
    /// `"/api"`, `"api/"` and `"api"` are equivalent.
    #[must_use]
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = Some(prefix.into());
        self
    }

    /// Sets the pagination limit used when a request carries none.
    #[must_use]
    pub const fn default_page_limit(mut self, limit: usize) -> Self {
        self.default_page_limit = Some(limit);
        self
    }

    /// Sets whether provider error details are exposed in error documents.
    #[must_use]
    pub const fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPageLimit`] if the configured default
    /// page limit is 0.
    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        let default_page_limit = self.default_page_limit.unwrap_or(10);
        if default_page_limit < 1 {
            return Err(ConfigError::InvalidPageLimit {
                limit: default_page_limit,
            });
        }

        Ok(ServerConfig {
            api_prefix: self
                .api_prefix
                .map(|p| p.trim_matches('/').to_string())
                .unwrap_or_default(),
            default_page_limit,
            debug: self.debug,
        })
    }
}
