//! Minting new short codes

use chrono::DateTime;
use chrono::NaiveDateTime;
use chrono::Utc;
use url::Url;

use crate::mappings::UrlMapping;
use crate::storage;
use crate::storage::CreateMappingValues;
use crate::storage::Storage;

use super::Error;
use super::Result;
use super::UrlService;
use super::retry::with_retries;

/// Attempts to find a free short code before giving up
pub const MAX_GENERATION_ATTEMPTS: usize = 5;

/// Longest accepted long URL
pub const MAX_URL_LENGTH: usize = 2048;

/// Words that are routes of their own and can never be a short code
const RESERVED_CODES: &[&str] = &["all", "api", "health", "ping", "shorten"];

/// Accepted formats of an expiry date without a time zone, interpreted as UTC
const NAIVE_EXPIRY_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

impl<S: Storage> UrlService<S> {
    /// Create a new mapping for `long_url`, optionally expiring at `expiry_at`
    ///
    /// Generated codes colliding with an existing mapping are silently replaced by a new
    /// candidate, an existing mapping is never overwritten.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] for anything but an absolute http(s) URL
    /// - [`Error::InvalidExpiry`] for an unparseable expiry or one not in the future
    /// - [`Error::GenerationExhausted`] when every candidate collided
    /// - [`Error::StoreUnavailable`] when the storage keeps failing
    pub async fn shorten(&self, long_url: &str, expiry_at: Option<&str>) -> Result<UrlMapping> {
        let received_at = Utc::now();

        let long_url = parse_long_url(long_url)?;
        let expiry_at = match expiry_at {
            Some(expiry_at) => parse_expiry(expiry_at, received_at)?,
            None => None,
        };

        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let short_code = self.generator.generate();

            if is_reserved(short_code.as_str()) {
                tracing::debug!("Generated reserved code {short_code}, attempt {attempt}");
                continue;
            }

            let values = CreateMappingValues {
                short_code: short_code.as_str(),
                long_url,
                expiry_at: expiry_at.as_ref(),
            };

            let storage = &self.storage;
            let values = &values;

            match with_retries(&self.retry_policy, move || storage.put(values)).await {
                Ok(mapping) => {
                    tracing::info!(r#"Short code "{short_code}" created for: {long_url}"#);

                    return Ok(mapping);
                }
                Err(storage::Error::AlreadyExists) => {
                    tracing::debug!("Short code {short_code} collided, attempt {attempt}");
                }
                Err(err) => return Err(Error::StoreUnavailable(err)),
            }
        }

        tracing::error!("No free short code after {MAX_GENERATION_ATTEMPTS} attempts");

        Err(Error::GenerationExhausted)
    }
}

/// Validate a long URL
///
/// Must be absolute, use http(s) and have a host. The trimmed input is returned as is, the
/// normalized form of the parser is only used for checking.
fn parse_long_url(long_url: &str) -> Result<&str> {
    let long_url = long_url.trim();

    if long_url.is_empty() {
        return Err(Error::InvalidUrl("URL must not be blank".to_string()));
    }

    if long_url.len() > MAX_URL_LENGTH {
        return Err(Error::InvalidUrl(format!(
            "URL is longer than {MAX_URL_LENGTH} characters"
        )));
    }

    let url = Url::parse(long_url).map_err(|err| Error::InvalidUrl(err.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::InvalidUrl(
            "URL must start with http:// or https://".to_string(),
        ));
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(Error::InvalidUrl("URL must have a host".to_string()));
    }

    Ok(long_url)
}

/// Parse and validate an expiry date
///
/// A blank value means no expiry. Dates without a time zone are taken as UTC.
fn parse_expiry(expiry_at: &str, received_at: DateTime<Utc>) -> Result<Option<DateTime<Utc>>> {
    let expiry_at = expiry_at.trim();

    if expiry_at.is_empty() {
        return Ok(None);
    }

    let parsed = DateTime::parse_from_rfc3339(expiry_at)
        .map(|date_time| date_time.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NAIVE_EXPIRY_FORMATS.iter().find_map(|format| {
                NaiveDateTime::parse_from_str(expiry_at, format)
                    .ok()
                    .map(|date_time| date_time.and_utc())
            })
        })
        .ok_or_else(|| Error::InvalidExpiry(format!(r#"Could not parse "{expiry_at}""#)))?;

    if parsed <= received_at {
        return Err(Error::InvalidExpiry(
            "Expiry must be in the future".to_string(),
        ));
    }

    Ok(Some(parsed))
}

fn is_reserved(short_code: &str) -> bool {
    RESERVED_CODES.contains(&short_code)
}
