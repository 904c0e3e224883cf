//! Rendered page cache with time-based revalidation.
//!
//! Rendering a content page costs one store read, and with retries that read
//! can take seconds. The server therefore keeps the last rendered HTML for
//! each path and serves it until it is older than the page's revalidation
//! interval (`[revalidate]` in `site.toml`). The first request after expiry
//! renders again and replaces the entry.
//!
//! # Design
//!
//! - Keys are request paths (`/`, `/ministries/mens-ministry`).
//! - Entries never expire on their own; a stale entry is only replaced when
//!   the path is requested again.
//! - Every entry carries an ETag: the first 16 hex chars of the SHA-256 of
//!   the body, quoted. The server answers a matching `If-None-Match` with
//!   `304 Not Modified`.
//! - Not-found pages are never stored.
//!
//! Two requests racing on a stale entry may both render; the later write
//! wins. Both results are valid pages.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// A rendered page and when it was rendered.
#[derive(Debug, Clone)]
pub struct CachedPage {
    pub html: String,
    /// Quoted, ready for the `ETag` header.
    pub etag: String,
    pub rendered_at: Instant,
}

impl CachedPage {
    pub fn new(html: String) -> Self {
        let etag = etag_for(&html);
        Self {
            html,
            etag,
            rendered_at: Instant::now(),
        }
    }

    pub fn is_fresh(&self, max_age: Duration) -> bool {
        self.rendered_at.elapsed() < max_age
    }

    /// Whether an `If-None-Match` header value names this page.
    pub fn matches(&self, if_none_match: &str) -> bool {
        if_none_match.trim() == "*"
            || if_none_match
                .split(',')
                .map(|tag| tag.trim().trim_start_matches("W/"))
                .any(|tag| tag == self.etag)
    }
}

/// Quoted ETag for a body.
pub fn etag_for(body: &str) -> String {
    let digest = Sha256::digest(body.as_bytes());
    let hex = format!("{:x}", digest);
    format!("\"{}\"", &hex[..16])
}

#[derive(Default)]
pub struct PageCache {
    pages: RwLock<HashMap<String, CachedPage>>,
    hits: AtomicU32,
    misses: AtomicU32,
    refreshes: AtomicU32,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached page for `path` if it is younger than `max_age`.
    pub async fn get_fresh(&self, path: &str, max_age: Duration) -> Option<CachedPage> {
        let pages = self.pages.read().await;
        let page = pages.get(path).filter(|p| p.is_fresh(max_age))?.clone();
        self.hits.fetch_add(1, Ordering::Relaxed);
        Some(page)
    }

    /// Store a freshly rendered page, replacing any previous entry.
    pub async fn store(&self, path: &str, html: String) -> CachedPage {
        let page = CachedPage::new(html);
        let previous = self
            .pages
            .write()
            .await
            .insert(path.to_string(), page.clone());
        if previous.is_some() {
            tracing::info!(path, "page revalidated");
            self.refreshes.fetch_add(1, Ordering::Relaxed);
        } else {
            tracing::info!(path, "page rendered");
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        page
    }

    pub async fn len(&self) -> usize {
        self.pages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pages.read().await.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
        }
    }
}

/// Counters since the cache was created.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    /// First render of a path.
    pub misses: u32,
    /// Re-render of a stale path.
    pub refreshes: u32,
}

impl CacheStats {
    pub fn total(&self) -> u32 {
        self.hits + self.misses + self.refreshes
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.refreshes > 0 {
            write!(
                f,
                "{} cached, {} rendered, {} revalidated ({} total)",
                self.hits,
                self.misses,
                self.refreshes,
                self.total()
            )
        } else {
            write!(
                f,
                "{} cached, {} rendered ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn etag_is_quoted_16_hex() {
        let tag = etag_for("<p>hi</p>");
        assert_eq!(tag.len(), 18);
        assert!(tag.starts_with('"') && tag.ends_with('"'));
        assert!(tag[1..17].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn etag_tracks_content() {
        assert_eq!(etag_for("a"), etag_for("a"));
        assert_ne!(etag_for("a"), etag_for("b"));
    }

    #[tokio::test]
    async fn if_none_match_forms() {
        let page = CachedPage::new("body".into());
        assert!(page.matches(&page.etag));
        assert!(page.matches(&format!("W/{}", page.etag)));
        assert!(page.matches(&format!("\"other\", {}", page.etag)));
        assert!(page.matches("*"));
        assert!(!page.matches("\"0000000000000000\""));
    }

    #[tokio::test]
    async fn miss_then_hit() {
        let cache = PageCache::new();
        assert!(cache.get_fresh("/", HOUR).await.is_none());
        cache.store("/", "home".into()).await;
        let page = cache.get_fresh("/", HOUR).await.unwrap();
        assert_eq!(page.html, "home");
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                refreshes: 0
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn entries_go_stale_after_interval() {
        let cache = PageCache::new();
        cache.store("/about", "v1".into()).await;

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(cache.get_fresh("/about", Duration::from_secs(60)).await.is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get_fresh("/about", Duration::from_secs(60)).await.is_none());

        cache.store("/about", "v2".into()).await;
        let page = cache.get_fresh("/about", Duration::from_secs(60)).await.unwrap();
        assert_eq!(page.html, "v2");
        assert_eq!(cache.stats().refreshes, 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn zero_interval_is_never_fresh() {
        let cache = PageCache::new();
        cache.store("/", "x".into()).await;
        assert!(cache.get_fresh("/", Duration::ZERO).await.is_none());
    }

    #[test]
    fn stats_display() {
        let stats = CacheStats {
            hits: 5,
            misses: 2,
            refreshes: 0,
        };
        assert_eq!(stats.to_string(), "5 cached, 2 rendered (7 total)");
        let stats = CacheStats {
            hits: 5,
            misses: 2,
            refreshes: 1,
        };
        assert_eq!(
            stats.to_string(),
            "5 cached, 2 rendered, 1 revalidated (8 total)"
        );
    }
}
