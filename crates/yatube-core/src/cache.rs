//! Time-bounded cache for assembled feed pages.
//!
//! [`PageCache`] wraps a [`CacheBackend`] with an injected TTL and explicit
//! invalidation. Backend failures never reach the caller: a failed read is a
//! miss and a failed write is dropped, so an unavailable cache only costs
//! recomputation.

use std::{
  future::Future,
  sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
  },
  time::Duration,
};

use moka::future::Cache;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
  feed::FeedKind,
  model::Post,
  pagination::{Page, PageNumber},
};

/// TTL used when none is configured.
pub const DEFAULT_TTL: Duration = Duration::from_secs(20);

/// Entries kept by [`PageCache::in_memory`].
pub const DEFAULT_CAPACITY: u64 = 1_024;

/// A cached page. Entries are immutable; replacing one swaps the `Arc`.
pub type CachedPage = Arc<Page<Post>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
  pub kind: FeedKind,
  pub page: PageNumber,
}

impl CacheKey {
  pub fn new(kind: FeedKind, page: PageNumber) -> Self { Self { kind, page } }
}

#[derive(Debug, Error)]
pub enum CacheError {
  #[error("cache unavailable: {0}")]
  Unavailable(String),
}

// ─── Backend trait ───────────────────────────────────────────────────────────

/// Storage behind a [`PageCache`]. Implementations expire entries themselves
/// once the TTL they were configured with has elapsed.
pub trait CacheBackend: Send + Sync {
  fn get(
    &self,
    key: CacheKey,
  ) -> impl Future<Output = Result<Option<CachedPage>, CacheError>> + Send + '_;

  fn put(
    &self,
    key: CacheKey,
    page: CachedPage,
  ) -> impl Future<Output = Result<(), CacheError>> + Send + '_;

  fn evict(
    &self,
    key: CacheKey,
  ) -> impl Future<Output = Result<(), CacheError>> + Send + '_;

  /// Remove every entry whose key has the given feed kind.
  fn evict_kind(
    &self,
    kind: FeedKind,
  ) -> impl Future<Output = Result<(), CacheError>> + Send + '_;
}

// ─── In-memory backend ───────────────────────────────────────────────────────

/// Process-local backend on a bounded `moka` cache with a fixed TTL.
#[derive(Clone)]
pub struct MemoryCache {
  entries: Cache<CacheKey, CachedPage>,
}

impl MemoryCache {
  pub fn new(ttl: Duration, max_capacity: u64) -> Self {
    let entries = Cache::builder()
      .max_capacity(max_capacity)
      .time_to_live(ttl)
      .build();
    Self { entries }
  }

  /// Number of live entries, after pending evictions have run.
  pub async fn len(&self) -> u64 {
    self.entries.run_pending_tasks().await;
    self.entries.entry_count()
  }

  pub async fn is_empty(&self) -> bool { self.len().await == 0 }
}

impl CacheBackend for MemoryCache {
  async fn get(&self, key: CacheKey) -> Result<Option<CachedPage>, CacheError> {
    Ok(self.entries.get(&key).await)
  }

  async fn put(&self, key: CacheKey, page: CachedPage) -> Result<(), CacheError> {
    self.entries.insert(key, page).await;
    Ok(())
  }

  async fn evict(&self, key: CacheKey) -> Result<(), CacheError> {
    self.entries.invalidate(&key).await;
    Ok(())
  }

  async fn evict_kind(&self, kind: FeedKind) -> Result<(), CacheError> {
    let stale: Vec<CacheKey> = self
      .entries
      .iter()
      .filter(|(key, _)| key.kind == kind)
      .map(|(key, _)| *key)
      .collect();
    for key in stale {
      self.entries.invalidate(&key).await;
    }
    Ok(())
  }
}

// ─── PageCache ───────────────────────────────────────────────────────────────

/// Snapshot of the invalidation generation taken before computing a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillTicket(u64);

/// Fail-open page cache with a fixed TTL.
///
/// A zero TTL disables caching: nothing is stored.
pub struct PageCache<B = MemoryCache> {
  backend:    B,
  ttl:        Duration,
  generation: AtomicU64,
}

impl PageCache<MemoryCache> {
  pub fn in_memory(ttl: Duration) -> Self {
    Self::new(MemoryCache::new(ttl, DEFAULT_CAPACITY), ttl)
  }
}

impl<B: CacheBackend> PageCache<B> {
  pub fn new(backend: B, ttl: Duration) -> Self {
    Self { backend, ttl, generation: AtomicU64::new(0) }
  }

  pub fn backend(&self) -> &B { &self.backend }

  /// Look up a page. Backend errors count as a miss.
  pub async fn get(&self, key: CacheKey) -> Option<CachedPage> {
    match self.backend.get(key).await {
      Ok(Some(page)) => {
        debug!(kind = ?key.kind, page = key.page.get(), "page cache hit");
        Some(page)
      }
      Ok(None) => {
        debug!(kind = ?key.kind, page = key.page.get(), "page cache miss");
        None
      }
      Err(e) => {
        warn!(error = %e, "page cache read failed; recomputing");
        None
      }
    }
  }

  /// Take a ticket before computing a page to be passed to [`Self::fill`].
  pub fn ticket(&self) -> FillTicket {
    FillTicket(self.generation.load(Ordering::Acquire))
  }

  /// Store a page computed under `ticket`.
  ///
  /// If an invalidation happened after the ticket was taken the page may be
  /// stale and is not kept.
  pub async fn fill(&self, ticket: FillTicket, key: CacheKey, page: CachedPage) {
    if self.ttl.is_zero() || self.ticket() != ticket {
      return;
    }
    if let Err(e) = self.backend.put(key, page).await {
      warn!(error = %e, "page cache write failed");
      return;
    }
    // An invalidation may have raced the put.
    if self.ticket() != ticket
      && let Err(e) = self.backend.evict(key).await
    {
      warn!(error = %e, "page cache evict failed");
    }
  }

  /// Evict every cached page of `kind`.
  pub async fn invalidate(&self, kind: FeedKind) {
    self.generation.fetch_add(1, Ordering::AcqRel);
    match self.backend.evict_kind(kind).await {
      Ok(()) => debug!(?kind, "page cache invalidated"),
      Err(e) => warn!(error = %e, ?kind, "page cache invalidation failed"),
    }
  }
}
