//! Session middleware configuration.
//!
//! Sessions live in process memory; each one holds the visitor's cart and is
//! lost on restart. The store is a bounded `moka` cache whose entries expire
//! at the session record's own expiry date, so abandoned sessions are freed
//! rather than accumulating.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry as CacheExpiry;
use moka::future::Cache;
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore};
use tower_sessions::{Expiry, SessionManagerLayer};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "cf_session";

/// Idle time after which a session (and its cart) expires: 7 days.
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Upper bound on live sessions; the least useful are evicted first.
const SESSION_MAX_ENTRIES: u64 = 100_000;

/// In-memory session store backed by a bounded `moka` cache.
#[derive(Clone)]
pub struct MokaSessionStore {
    cache: Cache<Id, Record>,
}

impl MokaSessionStore {
    /// Create a store holding at most `max_entries` sessions.
    #[must_use]
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(RecordExpiry)
            .build();
        Self { cache }
    }

    /// Approximate number of sessions held.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Apply pending evictions now instead of on the cache's own schedule.
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }
}

impl std::fmt::Debug for MokaSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaSessionStore")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

#[async_trait]
impl SessionStore for MokaSessionStore {
    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.cache.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        Ok(self
            .cache
            .get(session_id)
            .await
            .filter(|record| time_left(record) > Duration::ZERO))
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.cache.invalidate(session_id).await;
        Ok(())
    }
}

/// Expires each cache entry at its record's expiry date.
struct RecordExpiry;

impl CacheExpiry<Id, Record> for RecordExpiry {
    fn expire_after_create(
        &self,
        _id: &Id,
        record: &Record,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(time_left(record))
    }

    fn expire_after_update(
        &self,
        _id: &Id,
        record: &Record,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(time_left(record))
    }
}

/// Time until `record` expires; zero once it has.
fn time_left(record: &Record) -> Duration {
    Duration::try_from(record.expiry_date - OffsetDateTime::now_utc()).unwrap_or(Duration::ZERO)
}

/// Create the session layer backed by the bounded in-memory store.
///
/// The cookie is marked `Secure` when the public base URL is HTTPS.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MokaSessionStore> {
    let is_secure = config.base_url.scheme() == "https";

    SessionManagerLayer::new(MokaSessionStore::new(SESSION_MAX_ENTRIES))
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_sessions::cookie::time::Duration as TimeDuration;

    use super::*;

    fn record(expires_in: TimeDuration) -> Record {
        Record {
            id: Id::default(),
            data: std::collections::HashMap::default(),
            expiry_date: OffsetDateTime::now_utc() + expires_in,
        }
    }

    #[tokio::test]
    async fn test_saved_session_loads() {
        let store = MokaSessionStore::new(10);
        let record = record(TimeDuration::hours(1));

        store.save(&record).await.unwrap();

        assert_eq!(store.load(&record.id).await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn test_expired_session_is_evicted() {
        let store = MokaSessionStore::new(10);
        let record = record(TimeDuration::milliseconds(50));

        store.save(&record).await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;
        store.run_pending_tasks().await;

        assert_eq!(store.load(&record.id).await.unwrap(), None);
        assert_eq!(store.entry_count(), 0);
    }

    #[tokio::test]
    async fn test_store_is_bounded() {
        let store = MokaSessionStore::new(5);
        for _ in 0..50 {
            store.save(&record(TimeDuration::hours(1))).await.unwrap();
        }
        store.run_pending_tasks().await;

        assert!(store.entry_count() <= 5);
    }

    #[tokio::test]
    async fn test_deleted_session_is_gone() {
        let store = MokaSessionStore::new(10);
        let record = record(TimeDuration::hours(1));

        store.save(&record).await.unwrap();
        store.delete(&record.id).await.unwrap();

        assert_eq!(store.load(&record.id).await.unwrap(), None);
    }
}
