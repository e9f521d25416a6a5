//! URL API endpoints
//!
//! Shortening, listing and deleting mappings

use axum::Extension;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::mappings::Status;
use crate::mappings::UrlMapping;
use crate::service::UrlService;
use crate::storage::Storage;

use super::Error;
use super::Form;
use super::PathParameters;
use super::ShortUrls;
use super::Success;

/// Response of a freshly shortened URL
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenResponse {
    /// The minted short code
    pub short_code: String,

    /// The full short URL, ready to share
    pub short_url: String,

    /// Where the short URL redirects to
    pub long_url: String,

    /// When the short URL stops redirecting, `null` for never
    pub expiry_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl ShortenResponse {
    fn from_mapping(mapping: UrlMapping, short_urls: &ShortUrls) -> Self {
        Self {
            short_url: short_urls.short_url(&mapping.short_code),
            short_code: mapping.short_code,
            long_url: mapping.long_url,
            expiry_at: mapping.expiry_at,
            created_at: mapping.created_at,
        }
    }
}

/// Mapping record as listed for the dashboard
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingResponse {
    pub short_code: String,
    pub short_url: String,
    pub long_url: String,
    pub created_at: DateTime<Utc>,
    pub expiry_at: Option<DateTime<Utc>>,

    /// Derived from the expiry date at the moment of listing
    pub status: Status,

    pub click_count: i64,
    pub last_clicked_at: Option<DateTime<Utc>>,
}

impl MappingResponse {
    /// Create a response from multiple [`UrlMapping`]s
    fn from_mapping_multiple(mappings: Vec<UrlMapping>, short_urls: &ShortUrls) -> Vec<Self> {
        let now = Utc::now();

        mappings
            .into_iter()
            .map(|mapping| Self {
                short_url: short_urls.short_url(&mapping.short_code),
                status: mapping.status_at(now),
                short_code: mapping.short_code,
                long_url: mapping.long_url,
                created_at: mapping.created_at,
                expiry_at: mapping.expiry_at,
                click_count: mapping.click_count,
                last_clicked_at: mapping.last_clicked_at,
            })
            .collect()
    }
}

/// Shorten form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ShortenForm {
    /// Absolute http(s) URL to shorten
    long_url: String,

    /// Optional expiry date, RFC 3339 or `YYYY-MM-DDTHH:MM[:SS]` in UTC
    expiry_at: Option<String>,
}

/// Shorten a URL based on the [`ShortenForm`] form
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -d '{ "longUrl": "https://www.example.com/", "expiryAt": "2030-01-01T00:00:00Z" }' \
///     http://localhost:6000/shorten
/// ```
///
/// Response:
/// ```json
/// { "shortCode": "aZ3kP9q", "shortUrl": "http://localhost:6000/aZ3kP9q", ... }
/// ```
pub async fn shorten<S: Storage>(
    Extension(service): Extension<UrlService<S>>,
    Extension(short_urls): Extension<ShortUrls>,
    Form(form): Form<ShortenForm>,
) -> Result<Success<ShortenResponse>, Error> {
    let mapping = service
        .shorten(&form.long_url, form.expiry_at.as_deref())
        .await?;

    let response = ShortenResponse::from_mapping(mapping, &short_urls);
    let location = response.short_url.clone();

    Ok(Success::created(response, location))
}

/// List all mappings, oldest first
///
/// Request:
/// ```sh
/// curl -v http://localhost:6000/all
/// ```
pub async fn list<S: Storage>(
    Extension(service): Extension<UrlService<S>>,
    Extension(short_urls): Extension<ShortUrls>,
) -> Result<Success<Vec<MappingResponse>>, Error> {
    let mappings = service.list_all().await?;

    Ok(Success::ok(MappingResponse::from_mapping_multiple(
        mappings,
        &short_urls,
    )))
}

/// Delete a mapping
///
/// Request:
/// ```sh
/// curl -v -XDELETE http://localhost:6000/aZ3kP9q
/// ```
pub async fn delete<S: Storage>(
    Extension(service): Extension<UrlService<S>>,
    PathParameters(short_code): PathParameters<String>,
) -> Result<Success<&'static str>, Error> {
    service.delete(&short_code).await?;

    Ok(Success::<&'static str>::no_content())
}
