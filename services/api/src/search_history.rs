//! Per-user search history
//!
//! Redis holds a capped, recency-scored sorted set per user and Postgres
//! holds the long-term rows. Redis is best effort: its failures are logged
//! and never surface, and a miss is refilled from Postgres on read.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use common::cache::RedisPool;
use std::collections::HashMap;
use std::sync::{
    Arc,
    atomic::{AtomicI64, Ordering},
};
use thiserror::Error;
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{error, warn};

use crate::models::StoredKeyword;

/// Keywords kept per user in the cache
pub const HISTORY_CAP: usize = 10;
/// Rolling expiry of a user's cached history
pub const HISTORY_TTL_SECONDS: u64 = 30 * 24 * 60 * 60;
pub const MAX_KEYWORD_CHARS: usize = 100;

const DEFAULT_LIST_LIMIT: i64 = 10;
const MAX_LIST_LIMIT: i64 = 50;

/// Cache key of a user's history
pub fn cache_key(phone: &str) -> String {
    format!("user:search:{phone}")
}

/// Recency-scored keyword set, capped at [`HISTORY_CAP`]
#[async_trait]
pub trait SearchHistoryCache: Send + Sync {
    /// Add or rescore members, trim to the cap and refresh the expiry
    async fn push(&self, key: &str, entries: &[(f64, String)]) -> Result<()>;
    /// Highest scores first
    async fn newest(&self, key: &str, limit: usize) -> Result<Vec<String>>;
    async fn remove(&self, key: &str, keyword: &str) -> Result<()>;
    async fn clear(&self, key: &str) -> Result<()>;
}

#[async_trait]
impl SearchHistoryCache for RedisPool {
    async fn push(&self, key: &str, entries: &[(f64, String)]) -> Result<()> {
        self.add_scored_capped(key, entries, HISTORY_CAP, HISTORY_TTL_SECONDS)
            .await
    }

    async fn newest(&self, key: &str, limit: usize) -> Result<Vec<String>> {
        self.newest_members(key, limit).await
    }

    async fn remove(&self, key: &str, keyword: &str) -> Result<()> {
        self.remove_member(key, keyword).await
    }

    async fn clear(&self, key: &str) -> Result<()> {
        self.delete(key).await
    }
}

/// Durable search records
#[async_trait]
pub trait SearchHistoryStore: Send + Sync {
    /// Insert the keyword or bump its count and timestamp
    async fn upsert(&self, phone: &str, keyword: &str) -> Result<()>;
    /// Most recently searched first
    async fn recent(&self, phone: &str, limit: usize) -> Result<Vec<StoredKeyword>>;
    async fn delete_keyword(&self, phone: &str, keyword: &str) -> Result<()>;
    async fn delete_all(&self, phone: &str) -> Result<()>;
}

#[derive(Error, Debug)]
pub enum SearchHistoryError {
    #[error("{0}")]
    Validation(String),

    #[error("Search history is unavailable")]
    Unavailable,
}

/// Microseconds since the epoch, strictly increasing within the process
#[derive(Debug, Default)]
pub struct RecencyClock {
    last: AtomicI64,
}

impl RecencyClock {
    pub fn next(&self) -> i64 {
        self.next_at(Utc::now().timestamp_micros())
    }

    fn next_at(&self, now: i64) -> i64 {
        let step = |prev: i64| now.max(prev + 1);
        match self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |prev| Some(step(prev)))
        {
            Ok(prev) | Err(prev) => step(prev),
        }
    }
}

/// Coordinates the cache and the store
#[derive(Clone)]
pub struct SearchHistoryService {
    cache: Arc<dyn SearchHistoryCache>,
    store: Arc<dyn SearchHistoryStore>,
    clock: Arc<RecencyClock>,
    /// Detached store writes per phone, awaited by `clear`
    pending: Arc<Mutex<HashMap<String, Vec<JoinHandle<()>>>>>,
}

impl SearchHistoryService {
    pub fn new(cache: Arc<dyn SearchHistoryCache>, store: Arc<dyn SearchHistoryStore>) -> Self {
        Self {
            cache,
            store,
            clock: Arc::new(RecencyClock::default()),
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record a search. The durable write runs detached from the caller;
    /// a later [`clear`](Self::clear) for the same phone waits for it.
    pub async fn record(&self, phone: &str, keyword: &str) -> Result<(), SearchHistoryError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(SearchHistoryError::Validation(
                "Keyword is required".to_string(),
            ));
        }
        if keyword.chars().count() > MAX_KEYWORD_CHARS {
            return Err(SearchHistoryError::Validation(format!(
                "Keyword must be at most {MAX_KEYWORD_CHARS} characters long"
            )));
        }

        let score = self.clock.next() as f64;
        if let Err(e) = self
            .cache
            .push(&cache_key(phone), &[(score, keyword.to_string())])
            .await
        {
            warn!("Failed to cache search keyword for {}: {}", phone, e);
        }

        let store = Arc::clone(&self.store);
        let owner = phone.to_string();
        let keyword = keyword.to_string();
        let write = tokio::spawn(async move {
            if let Err(e) = store.upsert(&owner, &keyword).await {
                error!("Failed to persist search keyword for {}: {}", owner, e);
            }
        });

        let mut pending = self.pending.lock().await;
        let writes = pending.entry(phone.to_string()).or_default();
        writes.retain(|w| !w.is_finished());
        writes.push(write);

        Ok(())
    }

    async fn settle_pending_writes(&self, phone: &str) {
        let writes = self.pending.lock().await.remove(phone).unwrap_or_default();
        for write in writes {
            if let Err(e) = write.await {
                error!("Search keyword write for {} did not complete: {}", phone, e);
            }
        }
    }

    /// Most recent keywords first, read through the cache
    pub async fn list(
        &self,
        phone: &str,
        limit: Option<i64>,
    ) -> Result<Vec<String>, SearchHistoryError> {
        let limit = limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT) as usize;
        let key = cache_key(phone);

        match self.cache.newest(&key, limit).await {
            Ok(keywords) if !keywords.is_empty() => return Ok(keywords),
            Ok(_) => {}
            Err(e) => warn!("Failed to read cached search history for {}: {}", phone, e),
        }

        let stored = self.store.recent(phone, limit).await.map_err(|e| {
            error!("Failed to load search history for {}: {}", phone, e);
            SearchHistoryError::Unavailable
        })?;

        if !stored.is_empty() {
            let entries: Vec<(f64, String)> = stored
                .iter()
                .map(|s| (s.updated_at.timestamp_micros() as f64, s.keyword.clone()))
                .collect();
            if let Err(e) = self.cache.push(&key, &entries).await {
                warn!("Failed to backfill search history for {}: {}", phone, e);
            }
        }

        Ok(stored.into_iter().map(|s| s.keyword).collect())
    }

    /// Remove one keyword, or the whole history when `keyword` is blank
    pub async fn clear(
        &self,
        phone: &str,
        keyword: Option<&str>,
    ) -> Result<(), SearchHistoryError> {
        let key = cache_key(phone);
        let keyword = keyword.map(str::trim).filter(|k| !k.is_empty());

        // an upsert landing after the delete would resurrect the row
        self.settle_pending_writes(phone).await;

        let (cached, stored) = match keyword {
            Some(keyword) => (
                self.cache.remove(&key, keyword).await,
                self.store.delete_keyword(phone, keyword).await,
            ),
            None => (
                self.cache.clear(&key).await,
                self.store.delete_all(phone).await,
            ),
        };

        if let Err(e) = &cached {
            warn!("Failed to clear cached search history for {}: {}", phone, e);
        }
        if let Err(e) = &stored {
            error!("Failed to clear stored search history for {}: {}", phone, e);
        }

        if cached.is_err() && stored.is_err() {
            return Err(SearchHistoryError::Unavailable);
        }
        Ok(())
    }
}
