//! All things related to the storage of URL mappings

use core::fmt;
use std::future::Future;

use chrono::DateTime;
use chrono::Utc;
pub use memory::Memory;
pub use postgres::Postgres;

use crate::mappings::UrlMapping;

mod memory;
mod postgres;

/// Storage errors
#[derive(Debug)]
pub enum Error {
    /// The short code is already taken by another mapping
    AlreadyExists,

    /// A connection error with the storage
    Connection(String),
}

impl Error {
    /// Can the operation be tried again?
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Connection(_))
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::AlreadyExists => write!(f, "Short code already exists"),
            Error::Connection(error) => write!(f, "Connection error: {error}"),
        }
    }
}

/// Result type for all storage interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Storage configuration
pub enum Config {
    /// Keep everything in memory
    Memory,

    /// Connect to Postgres using this connection string
    Postgres(String),
}

/// Values to create a mapping
pub struct CreateMappingValues<'a> {
    /// The short code, must not be taken yet
    pub short_code: &'a str,

    /// The URL the short code redirects to, exactly as submitted
    pub long_url: &'a str,

    /// Optional moment the mapping stops resolving
    pub expiry_at: Option<&'a DateTime<Utc>>,
}

/// Storage with all supported operations
///
/// Every operation is a single atomic interaction with the underlying engine
pub trait Storage: Clone + Send + Sync + 'static {
    /// Insert a new mapping
    ///
    /// Returns [`Error::AlreadyExists`] when the short code is taken, never overwrites. Of two
    /// concurrent inserts of the same short code exactly one succeeds.
    fn put(
        &self,
        values: &CreateMappingValues<'_>,
    ) -> impl Future<Output = Result<UrlMapping>> + Send;

    /// Find a single mapping by its short code
    fn get(&self, short_code: &str) -> impl Future<Output = Result<Option<UrlMapping>>> + Send;

    /// Delete a single mapping by its short code
    ///
    /// Returns `false` when there was nothing to delete
    fn delete(&self, short_code: &str) -> impl Future<Output = Result<bool>> + Send;

    /// All mappings, oldest first
    fn list_all(&self) -> impl Future<Output = Result<Vec<UrlMapping>>> + Send;

    /// Delete all mappings with an expiry date at or before `now`
    ///
    /// Returns the number of deleted mappings
    fn delete_expired_before(&self, now: DateTime<Utc>)
    -> impl Future<Output = Result<u64>> + Send;

    /// Register a redirect for a short code
    fn record_hit(
        &self,
        short_code: &str,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Check if the storage is reachable
    fn ping(&self) -> impl Future<Output = Result<()>> + Send;
}
