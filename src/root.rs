//! The root!
//!
//! The most important part of Shortly, the actual redirect logic

use axum::Extension;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header::LOCATION;
use url::Url;

use crate::api::Error;
use crate::api::PathParameters;
use crate::service::UrlService;
use crate::storage::Storage;

/// The redirect
///
/// Resolves the short code and answers with a `302 Found` to the long URL; `404` for unknown
/// short codes, `410` for expired ones
pub async fn redirect<S: Storage>(
    Extension(service): Extension<UrlService<S>>,
    PathParameters(short_code): PathParameters<String>,
) -> Result<(StatusCode, HeaderMap), Error> {
    tracing::debug!("Looking for short code: /{short_code}");

    let mapping = service.resolve(&short_code).await?;

    let location = location_header(&mapping.long_url)?;

    tracing::debug!(r#"Short code "{short_code}" redirecting to: {}"#, mapping.long_url);

    service.record_hit(&mapping.short_code).await;

    let mut headers = HeaderMap::new();
    headers.insert(LOCATION, location);

    Ok((StatusCode::FOUND, headers))
}

/// The long URL as `Location` header
///
/// URLs are stored as submitted; one that is not a valid header value as is (like non-ASCII
/// characters) falls back to its percent-encoded form
fn location_header(long_url: &str) -> Result<HeaderValue, Error> {
    if let Ok(location) = HeaderValue::from_str(long_url) {
        return Ok(location);
    }

    Url::parse(long_url)
        .map_err(|err| Error::internal_server_error("Invalid stored URL").with_description(err))
        .and_then(|url| {
            HeaderValue::from_str(url.as_str()).map_err(|err| {
                Error::internal_server_error("Invalid stored URL").with_description(err)
            })
        })
}

/// Anything without a route
pub async fn not_found() -> Error {
    Error::not_found("Not found")
}
