//! Memory storage
//!
//! Will be destroyed on system shutdown

use std::collections::HashMap;
use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::mappings::UrlMapping;

use super::CreateMappingValues;
use super::Error;
use super::Result;
use super::Storage;

/// Everything behind the single lock
#[derive(Debug, Default)]
struct Inner {
    /// Last handed out ID
    last_id: i64,

    /// All mappings by short code
    mappings: HashMap<String, UrlMapping>,
}

/// An in-memory storage
///
/// Will be destroyed on system shutdown
#[derive(Clone, Debug, Default)]
pub struct Memory {
    inner: Arc<Mutex<Inner>>,
}

impl Memory {
    /// Create a new empty Memory storage
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for Memory {
    async fn put(&self, values: &CreateMappingValues<'_>) -> Result<UrlMapping> {
        let mut inner = self.inner.lock().await;

        if inner.mappings.contains_key(values.short_code) {
            return Err(Error::AlreadyExists);
        }

        inner.last_id += 1;

        let mapping = UrlMapping {
            id: inner.last_id,
            short_code: values.short_code.to_string(),
            long_url: values.long_url.to_string(),
            created_at: Utc::now(),
            expiry_at: values.expiry_at.copied(),
            click_count: 0,
            last_clicked_at: None,
        };

        inner
            .mappings
            .insert(mapping.short_code.clone(), mapping.clone());

        Ok(mapping)
    }

    async fn get(&self, short_code: &str) -> Result<Option<UrlMapping>> {
        Ok(self.inner.lock().await.mappings.get(short_code).cloned())
    }

    async fn delete(&self, short_code: &str) -> Result<bool> {
        Ok(self
            .inner
            .lock()
            .await
            .mappings
            .remove(short_code)
            .is_some())
    }

    async fn list_all(&self) -> Result<Vec<UrlMapping>> {
        let mut mappings = self
            .inner
            .lock()
            .await
            .mappings
            .values()
            .cloned()
            .collect::<Vec<_>>();

        mappings.sort_by_key(|mapping| mapping.id);

        Ok(mappings)
    }

    async fn delete_expired_before(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut inner = self.inner.lock().await;

        let before = inner.mappings.len();
        inner
            .mappings
            .retain(|_, mapping| !mapping.is_expired_at(now));

        Ok((before - inner.mappings.len()) as u64)
    }

    async fn record_hit(&self, short_code: &str, at: DateTime<Utc>) -> Result<()> {
        if let Some(mapping) = self.inner.lock().await.mappings.get_mut(short_code) {
            mapping.click_count += 1;
            mapping.last_clicked_at = Some(at);
        }

        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn values<'a>(
        short_code: &'a str,
        long_url: &'a str,
        expiry_at: Option<&'a DateTime<Utc>>,
    ) -> CreateMappingValues<'a> {
        CreateMappingValues {
            short_code,
            long_url,
            expiry_at,
        }
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let storage = Memory::new();
        let url = "https://www.example.com/";

        let mapping = storage.put(&values("abc1234", url, None)).await.unwrap();
        assert_eq!("abc1234", mapping.short_code);
        assert_eq!("https://www.example.com/", mapping.long_url);
        assert_eq!(0, mapping.click_count);

        let found = storage.get("abc1234").await.unwrap();
        assert_eq!(Some(mapping), found);

        assert!(storage.get("unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_existing() {
        let storage = Memory::new();
        let url = "https://www.example.com/";
        let other_url = "https://www.example.org/";

        storage.put(&values("abc1234", url, None)).await.unwrap();

        let result = storage.put(&values("abc1234", other_url, None)).await;
        assert!(matches!(result, Err(Error::AlreadyExists)));

        // never overwritten
        let found = storage.get("abc1234").await.unwrap().unwrap();
        assert_eq!("https://www.example.com/", found.long_url);
    }

    #[tokio::test]
    async fn test_concurrent_put_same_code() {
        let storage = Memory::new();

        let handles = (0..50)
            .map(|i| {
                let storage = storage.clone();
                tokio::spawn(async move {
                    let url = format!("https://www.example.com/{i}");
                    storage.put(&values("same123", &url, None)).await.is_ok()
                })
            })
            .collect::<Vec<_>>();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }

        assert_eq!(1, successes);
    }

    #[tokio::test]
    async fn test_delete() {
        let storage = Memory::new();
        let url = "https://www.example.com/";

        storage.put(&values("abc1234", url, None)).await.unwrap();

        assert!(storage.delete("abc1234").await.unwrap());
        assert!(!storage.delete("abc1234").await.unwrap());
        assert!(storage.get("abc1234").await.unwrap().is_none());

        // code is free again
        assert!(storage.put(&values("abc1234", url, None)).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_all_in_creation_order() {
        let storage = Memory::new();
        let url = "https://www.example.com/";

        for code in ["zzzzzz1", "aaaaaa1", "mmmmmm1"] {
            storage.put(&values(code, url, None)).await.unwrap();
        }

        let codes = storage
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|mapping| mapping.short_code)
            .collect::<Vec<_>>();

        assert_eq!(vec!["zzzzzz1", "aaaaaa1", "mmmmmm1"], codes);
    }

    #[tokio::test]
    async fn test_delete_expired_before() {
        let storage = Memory::new();
        let url = "https://www.example.com/";
        let now = Utc::now();
        let soon = now + Duration::minutes(1);
        let later = now + Duration::hours(1);

        storage.put(&values("never12", url, None)).await.unwrap();
        storage
            .put(&values("soon123", url, Some(&soon)))
            .await
            .unwrap();
        storage
            .put(&values("later12", url, Some(&later)))
            .await
            .unwrap();

        assert_eq!(0, storage.delete_expired_before(now).await.unwrap());
        assert_eq!(
            1,
            storage
                .delete_expired_before(now + Duration::minutes(2))
                .await
                .unwrap()
        );
        assert_eq!(
            0,
            storage
                .delete_expired_before(now + Duration::minutes(2))
                .await
                .unwrap()
        );

        assert!(storage.get("soon123").await.unwrap().is_none());
        assert!(storage.get("never12").await.unwrap().is_some());
        assert!(storage.get("later12").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_record_hit() {
        let storage = Memory::new();
        let url = "https://www.example.com/";
        let now = Utc::now();

        storage.put(&values("abc1234", url, None)).await.unwrap();
        storage.record_hit("abc1234", now).await.unwrap();
        storage.record_hit("abc1234", now).await.unwrap();

        // unknown codes are ignored
        storage.record_hit("unknown", now).await.unwrap();

        let mapping = storage.get("abc1234").await.unwrap().unwrap();
        assert_eq!(2, mapping.click_count);
        assert_eq!(Some(now), mapping.last_clicked_at);
    }
}
