//! Resolving short codes to their long URL

use chrono::Utc;

use crate::generator::ShortCode;
use crate::mappings::UrlMapping;
use crate::storage::Storage;

use super::Error;
use super::Result;
use super::UrlService;
use super::retry::with_retries;

impl<S: Storage> UrlService<S> {
    /// Find the active mapping of a short code
    ///
    /// Expired mappings are reported as such and left for the sweeper, nothing is written
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] for unknown (or malformed) short codes
    /// - [`Error::Expired`] for mappings past their expiry date
    /// - [`Error::StoreUnavailable`] when the storage keeps failing
    pub async fn resolve(&self, short_code: &str) -> Result<UrlMapping> {
        let Some(short_code) = ShortCode::parse(short_code) else {
            return Err(Error::NotFound);
        };

        let mapping = if let Some(mapping) = self.cache.get(short_code.as_str()).await {
            mapping
        } else {
            let storage = &self.storage;
            let code = short_code.as_str();

            let mapping = with_retries(&self.retry_policy, move || storage.get(code))
                .await
                .map_err(Error::StoreUnavailable)?
                .ok_or(Error::NotFound)?;

            self.cache.insert(mapping.clone()).await;

            mapping
        };

        if mapping.is_expired_at(Utc::now()) {
            tracing::debug!(r#"Short code "{short_code}" has expired"#);

            return Err(Error::Expired);
        }

        Ok(mapping)
    }
}
