//! Administrative operations: listing, deleting and sweeping mappings

use chrono::Utc;

use crate::generator::ShortCode;
use crate::mappings::UrlMapping;
use crate::storage::Storage;

use super::Error;
use super::Result;
use super::UrlService;
use super::retry::with_retries;

impl<S: Storage> UrlService<S> {
    /// All mappings, oldest first, expired ones included until swept
    ///
    /// # Errors
    ///
    /// Will return [`Error::StoreUnavailable`] when the storage keeps failing
    pub async fn list_all(&self) -> Result<Vec<UrlMapping>> {
        let storage = &self.storage;

        with_retries(&self.retry_policy, move || storage.list_all())
            .await
            .map_err(Error::StoreUnavailable)
    }

    /// Delete a mapping by short code
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] when there is no such mapping (anymore)
    /// - [`Error::StoreUnavailable`] when the storage keeps failing
    pub async fn delete(&self, short_code: &str) -> Result<()> {
        let Some(short_code) = ShortCode::parse(short_code) else {
            return Err(Error::NotFound);
        };

        let storage = &self.storage;
        let code = short_code.as_str();

        let deleted = with_retries(&self.retry_policy, move || storage.delete(code))
            .await
            .map_err(Error::StoreUnavailable)?;

        self.cache.remove(code).await;

        if deleted {
            tracing::info!(r#"Short code "{short_code}" deleted"#);

            Ok(())
        } else {
            Err(Error::NotFound)
        }
    }

    /// Delete every mapping that has expired by now
    ///
    /// Returns the number of deleted mappings
    ///
    /// # Errors
    ///
    /// Will return [`Error::StoreUnavailable`] when the storage keeps failing
    pub async fn sweep_expired(&self) -> Result<u64> {
        let storage = &self.storage;
        let now = Utc::now();

        with_retries(&self.retry_policy, move || storage.delete_expired_before(now))
            .await
            .map_err(Error::StoreUnavailable)
    }
}
