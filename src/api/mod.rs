//! All API endpoint setup

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use axum::routing::post;

pub use request::Form;
pub use request::PathParameters;
pub use response::Error;
pub use response::Success;

use crate::root;
use crate::storage::Storage;

mod health;
mod request;
mod response;
mod urls;

/// Builds the public short URL of a short code
#[derive(Clone, Debug)]
pub struct ShortUrls {
    base_url: Arc<str>,
}

impl ShortUrls {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: Arc::from(base_url.trim_end_matches('/')),
        }
    }

    pub fn short_url(&self, short_code: &str) -> String {
        format!("{}/{short_code}", self.base_url)
    }
}

/// Get the Axum router for all API routes
///
/// The catch-all short code route also does the actual redirecting
pub fn router<S: Storage>() -> Router {
    Router::new()
        .route("/shorten", post(urls::shorten::<S>))
        .route("/all", get(urls::list::<S>))
        .route("/health", get(health::health::<S>))
        .route("/ping", get(health::ping))
        .route(
            "/{short_code}",
            get(root::redirect::<S>).delete(urls::delete::<S>),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_url() {
        let short_urls = ShortUrls::new("https://sho.rt/");
        assert_eq!("https://sho.rt/abc1234", short_urls.short_url("abc1234"));

        let short_urls = ShortUrls::new("http://localhost:6000");
        assert_eq!(
            "http://localhost:6000/abc1234",
            short_urls.short_url("abc1234")
        );
    }
}
