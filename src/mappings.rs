//! The URL mapping, the only entity of Shortly

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

/// A stored association between a short code and its target URL
#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct UrlMapping {
    /// Store assigned ID, increases with every insert
    pub id: i64,
    pub short_code: String,
    pub long_url: String,
    pub created_at: DateTime<Utc>,
    pub expiry_at: Option<DateTime<Utc>>,
    pub click_count: i64,
    pub last_clicked_at: Option<DateTime<Utc>>,
}

/// Status of a mapping at a given moment
///
/// Never stored, always derived from the expiry date
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Expired,
}

impl UrlMapping {
    /// Status of the mapping at `now`
    ///
    /// A mapping expiring exactly at `now` is already expired
    pub fn status_at(&self, now: DateTime<Utc>) -> Status {
        match self.expiry_at {
            Some(expiry_at) if expiry_at <= now => Status::Expired,
            _ => Status::Active,
        }
    }

    /// Is the mapping expired at `now`?
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.status_at(now) == Status::Expired
    }
}
