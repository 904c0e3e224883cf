//! Live-or-fallback content resolution.
//!
//! Every content page goes through [`ContentResolver::resolve`]. Live rows win
//! only when the whole read succeeds inside the page budget, every row
//! decodes, and at least one row survives the kind's inclusion filter. In
//! every other case the compiled fallback set is returned untouched, and the
//! reason is reported alongside so `check` and the logs can say why.

use super::{ContentKind, DecodeError};
use crate::store::{RecordStore, StoreError};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// No store credentials.
    Unconfigured,
    /// The table had no (included) rows.
    Empty,
    /// The store could not be read.
    Unavailable,
    /// At least one row did not decode.
    Undecodable,
    /// The read did not finish inside the page budget.
    TimedOut,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FallbackReason::Unconfigured => "store not configured",
            FallbackReason::Empty => "table empty",
            FallbackReason::Unavailable => "store unavailable",
            FallbackReason::Undecodable => "records did not decode",
            FallbackReason::TimedOut => "read timed out",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Live,
    Fallback(FallbackReason),
}

impl Source {
    pub fn is_live(self) -> bool {
        matches!(self, Source::Live)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Live => f.write_str("live"),
            Source::Fallback(reason) => write!(f, "fallback ({reason})"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Resolved<K> {
    pub items: Vec<K>,
    pub source: Source,
}

impl<K: ContentKind> Resolved<K> {
    fn fallback(reason: FallbackReason) -> Self {
        Self {
            items: K::fallback(),
            source: Source::Fallback(reason),
        }
    }
}

enum LiveFailure {
    Store(StoreError),
    Decode(DecodeError),
    Empty,
}

#[derive(Clone)]
pub struct ContentResolver {
    store: Option<Arc<dyn RecordStore>>,
    budget: Duration,
}

impl ContentResolver {
    pub fn new(store: Option<Arc<dyn RecordStore>>, budget: Duration) -> Self {
        Self { store, budget }
    }

    /// Resolver that never touches a store.
    pub fn offline() -> Self {
        Self::new(None, Duration::ZERO)
    }

    pub fn store(&self) -> Option<&Arc<dyn RecordStore>> {
        self.store.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    /// Content of kind `K`, live when possible and fallback otherwise.
    pub async fn resolve<K: ContentKind>(&self) -> Resolved<K> {
        let Some(store) = &self.store else {
            return Resolved::fallback(FallbackReason::Unconfigured);
        };

        let read = tokio::time::timeout(self.budget, live::<K>(store.as_ref())).await;
        let failure = match read {
            Ok(Ok(items)) => {
                return Resolved {
                    items,
                    source: Source::Live,
                };
            }
            Ok(Err(failure)) => failure,
            Err(_) => {
                tracing::warn!(
                    table = %K::TABLE,
                    budget_ms = self.budget.as_millis() as u64,
                    "store read exceeded page budget, using fallback content"
                );
                return Resolved::fallback(FallbackReason::TimedOut);
            }
        };

        let reason = match failure {
            LiveFailure::Store(err) => {
                tracing::warn!(table = %K::TABLE, "using fallback content: {err}");
                FallbackReason::Unavailable
            }
            LiveFailure::Decode(err) => {
                tracing::warn!(table = %K::TABLE, "using fallback content: {err}");
                FallbackReason::Undecodable
            }
            LiveFailure::Empty => {
                tracing::info!(table = %K::TABLE, "table empty, using fallback content");
                FallbackReason::Empty
            }
        };
        Resolved::fallback(reason)
    }
}

async fn live<K: ContentKind>(store: &dyn RecordStore) -> Result<Vec<K>, LiveFailure> {
    let records = store
        .fetch_all(K::TABLE)
        .await
        .map_err(LiveFailure::Store)?;
    let decoded = records
        .iter()
        .map(K::from_record)
        .collect::<Result<Vec<K>, _>>()
        .map_err(LiveFailure::Decode)?;
    let mut items: Vec<K> = decoded.into_iter().filter(K::include).collect();
    if items.is_empty() {
        return Err(LiveFailure::Empty);
    }
    K::sort(&mut items);
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{
        LeadershipRecord, MinistryRecord, MissionRecord, SermonRecord, fallback,
    };
    use crate::store::Table;
    use crate::test_helpers::{FailingStore, MemoryStore, SlowStore, fields};
    use serde_json::json;

    fn resolver(store: impl RecordStore + 'static) -> ContentResolver {
        ContentResolver::new(Some(Arc::new(store)), Duration::from_secs(10))
    }

    #[tokio::test]
    async fn unconfigured_returns_fallback() {
        let resolved = ContentResolver::offline().resolve::<LeadershipRecord>().await;
        assert_eq!(resolved.items, fallback::leadership());
        assert_eq!(resolved.source, Source::Fallback(FallbackReason::Unconfigured));
    }

    #[tokio::test]
    async fn unavailable_store_returns_exact_fallback() {
        let resolved = resolver(FailingStore).resolve::<MinistryRecord>().await;
        assert_eq!(resolved.items, fallback::ministries());
        assert_eq!(resolved.source, Source::Fallback(FallbackReason::Unavailable));
    }

    #[tokio::test]
    async fn empty_table_returns_fallback_not_empty() {
        let resolved = resolver(MemoryStore::new()).resolve::<LeadershipRecord>().await;
        assert_eq!(resolved.items.len(), 10);
        assert_eq!(resolved.source, Source::Fallback(FallbackReason::Empty));
    }

    #[tokio::test]
    async fn live_leadership_is_sorted() {
        let store = MemoryStore::new();
        for (name, position) in [
            ("Tom", "Trustee"),
            ("Paul", "Pastor"),
            ("Dee", "Deacon"),
            ("Ann", "Trustee"),
        ] {
            store.insert(
                Table::Leadership,
                fields(json!({"Name": name, "Position": position})),
            );
        }
        let resolved = resolver(store).resolve::<LeadershipRecord>().await;
        assert_eq!(resolved.source, Source::Live);
        let names: Vec<&str> = resolved.items.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Paul", "Dee", "Ann", "Tom"]);
    }

    #[tokio::test]
    async fn one_bad_row_discards_the_whole_live_set() {
        let store = MemoryStore::new();
        store.insert(
            Table::Leadership,
            fields(json!({"Name": "Good", "Position": "Deacon"})),
        );
        store.insert(Table::Leadership, fields(json!({"Name": "No Position"})));
        let resolved = resolver(store).resolve::<LeadershipRecord>().await;
        assert_eq!(resolved.items, fallback::leadership());
        assert_eq!(resolved.source, Source::Fallback(FallbackReason::Undecodable));
    }

    #[tokio::test]
    async fn unpublished_missions_are_hidden() {
        let store = MemoryStore::new();
        store.insert(
            Table::Missions,
            fields(json!({
                "Missionary Name": "Visible", "Location": "A", "Ministry": "B",
                "Published": true
            })),
        );
        store.insert(
            Table::Missions,
            fields(json!({"Missionary Name": "Draft", "Location": "A", "Ministry": "B"})),
        );
        let resolved = resolver(store).resolve::<MissionRecord>().await;
        assert_eq!(resolved.source, Source::Live);
        assert_eq!(resolved.items.len(), 1);
        assert_eq!(resolved.items[0].missionary_name, "Visible");
    }

    #[tokio::test]
    async fn only_unpublished_rows_count_as_empty() {
        let store = MemoryStore::new();
        store.insert(
            Table::Sermons,
            fields(json!({"Title": "Draft", "Date": "2024-01-07"})),
        );
        let resolved = resolver(store).resolve::<SermonRecord>().await;
        assert_eq!(resolved.source, Source::Fallback(FallbackReason::Empty));
        assert!(resolved.items.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_store_times_out_to_fallback() {
        let resolver = ContentResolver::new(
            Some(Arc::new(SlowStore(Duration::from_secs(30)))),
            Duration::from_secs(10),
        );
        let resolved = resolver.resolve::<MinistryRecord>().await;
        assert_eq!(resolved.source, Source::Fallback(FallbackReason::TimedOut));
        assert_eq!(resolved.items, fallback::ministries());
    }

    #[test]
    fn source_display() {
        assert_eq!(Source::Live.to_string(), "live");
        assert_eq!(
            Source::Fallback(FallbackReason::Empty).to_string(),
            "fallback (table empty)"
        );
    }
}
