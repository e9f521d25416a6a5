//! The URL service
//!
//! Ties the generator, the storage and the cache together. Constructed once at startup and
//! shared (cheaply cloned) with every request handler and the sweeper.

use core::fmt;
use std::sync::Arc;

use chrono::Utc;

pub use retry::RetryPolicy;

use crate::cache::MappingCache;
use crate::generator::Generator;
use crate::storage;
use crate::storage::Storage;

mod admin;
mod resolve;
mod retry;
mod shorten;

/// Service errors
#[derive(Debug)]
pub enum Error {
    /// Malformed URL or a scheme other than http(s)
    InvalidUrl(String),

    /// Unparseable expiry date or one that is not in the future
    InvalidExpiry(String),

    /// No free short code found within the allowed attempts
    GenerationExhausted,

    /// Unknown short code
    NotFound,

    /// Known short code, but past its expiry date
    Expired,

    /// Storage failure that persisted after retrying
    StoreUnavailable(storage::Error),
}

impl Error {
    /// Machine readable kind of the error
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidUrl(_) => "invalid_url",
            Error::InvalidExpiry(_) => "invalid_expiry",
            Error::GenerationExhausted => "generation_exhausted",
            Error::NotFound => "not_found",
            Error::Expired => "expired",
            Error::StoreUnavailable(_) => "store_unavailable",
        }
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidUrl(reason) => write!(f, "Invalid URL: {reason}"),
            Error::InvalidExpiry(reason) => write!(f, "Invalid expiry: {reason}"),
            Error::GenerationExhausted => write!(f, "Could not generate a unique short code"),
            Error::NotFound => write!(f, "Short code not found"),
            Error::Expired => write!(f, "Short code has expired"),
            Error::StoreUnavailable(error) => write!(f, "Storage unavailable: {error}"),
        }
    }
}

/// Result type for all service interactions
pub type Result<T> = core::result::Result<T, Error>;

/// The URL service
#[derive(Clone)]
pub struct UrlService<S: Storage> {
    storage: S,
    generator: Arc<dyn Generator>,
    cache: MappingCache,
    retry_policy: RetryPolicy,
}

impl<S: Storage> UrlService<S> {
    pub fn new<G: Generator>(storage: S, generator: G, cache: MappingCache) -> Self {
        Self {
            storage,
            generator: Arc::new(generator),
            cache,
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy for storage operations
    #[must_use]
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Register a successful redirect of a short code
    ///
    /// Best effort, separate from resolving so resolving stays free of side effects
    pub async fn record_hit(&self, short_code: &str) {
        if let Err(err) = self.storage.record_hit(short_code, Utc::now()).await {
            tracing::warn!("Could not record hit for {short_code}: {err}");
        }
    }

    /// Is the storage reachable?
    pub async fn is_healthy(&self) -> bool {
        match self.storage.ping().await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!("Storage health check failed: {err}");
                false
            }
        }
    }
}
