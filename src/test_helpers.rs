//! Shared test utilities.
//!
//! In-memory [`RecordStore`] implementations and small record builders so
//! unit tests can exercise resolution, contact submission, rendering, and
//! seeding without a network.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let store = MemoryStore::new();
//! store.insert(Table::Leadership, fields(json!({"Name": "A", "Position": "Deacon"})));
//! let resolver = ContentResolver::new(Some(Arc::new(store)), Duration::from_secs(10));
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use crate::content::LeadershipRecord;
use crate::store::{Fields, Record, RecordStore, StoreError, Table, TransportError};

// =========================================================================
// Builders
// =========================================================================

/// Turn a `json!({...})` object into store fields. Panics on non-objects.
pub fn fields(value: serde_json::Value) -> Fields {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

pub fn leader(name: &str, position: &str) -> LeadershipRecord {
    LeadershipRecord {
        id: format!("rec-{name}"),
        name: name.to_string(),
        position: position.to_string(),
        bio: None,
        email: None,
        phone: None,
    }
}

// =========================================================================
// Stores
// =========================================================================

/// A store that keeps rows in memory and never fails.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<Table, Vec<Record>>>,
    reads: Mutex<HashMap<Table, u32>>,
    next_id: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row and return its id.
    pub fn insert(&self, table: Table, fields: Fields) -> String {
        let id = format!("rec{:04}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.tables
            .lock()
            .unwrap()
            .entry(table)
            .or_default()
            .push(Record::new(id.clone(), fields));
        id
    }

    /// Snapshot of a table's rows in insertion order.
    pub fn records(&self, table: Table) -> Vec<Record> {
        self.tables
            .lock()
            .unwrap()
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    /// How many times `fetch_all` has read `table`.
    pub fn reads(&self, table: Table) -> u32 {
        self.reads.lock().unwrap().get(&table).copied().unwrap_or(0)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn fetch_all(&self, table: Table) -> Result<Vec<Record>, StoreError> {
        *self.reads.lock().unwrap().entry(table).or_default() += 1;
        Ok(self.records(table))
    }

    async fn create(&self, table: Table, fields: Fields) -> Result<Record, StoreError> {
        let id = self.insert(table, fields.clone());
        Ok(Record::new(id, fields))
    }

    async fn fetch_one(&self, table: Table, id: &str) -> Result<Record, StoreError> {
        self.records(table)
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::RecordNotFound {
                table: table.name().to_string(),
                id: id.to_string(),
            })
    }

    async fn update(&self, table: Table, id: &str, fields: Fields) -> Result<Record, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let record = tables
            .get_mut(&table)
            .and_then(|rows| rows.iter_mut().find(|r| r.id == id))
            .ok_or_else(|| StoreError::RecordNotFound {
                table: table.name().to_string(),
                id: id.to_string(),
            })?;
        record.fields.extend(fields);
        Ok(record.clone())
    }
}

fn outage() -> TransportError {
    TransportError::Status {
        status: 503,
        body: "service unavailable".into(),
    }
}

/// A store where every call fails.
pub struct FailingStore;

#[async_trait]
impl RecordStore for FailingStore {
    async fn fetch_all(&self, table: Table) -> Result<Vec<Record>, StoreError> {
        Err(StoreError::Unavailable {
            table: table.name().to_string(),
            attempts: 3,
            cause: outage(),
        })
    }

    async fn create(&self, table: Table, _fields: Fields) -> Result<Record, StoreError> {
        Err(StoreError::Write {
            table: table.name().to_string(),
            cause: outage(),
        })
    }

    async fn fetch_one(&self, table: Table, _id: &str) -> Result<Record, StoreError> {
        Err(StoreError::Unavailable {
            table: table.name().to_string(),
            attempts: 1,
            cause: outage(),
        })
    }

    async fn update(&self, table: Table, _id: &str, fields: Fields) -> Result<Record, StoreError> {
        self.create(table, fields).await
    }
}

/// A store whose reads take the given time and then return nothing.
pub struct SlowStore(pub Duration);

#[async_trait]
impl RecordStore for SlowStore {
    async fn fetch_all(&self, _table: Table) -> Result<Vec<Record>, StoreError> {
        tokio::time::sleep(self.0).await;
        Ok(Vec::new())
    }

    async fn create(&self, table: Table, fields: Fields) -> Result<Record, StoreError> {
        tokio::time::sleep(self.0).await;
        Ok(Record::new(format!("slow-{table}"), fields))
    }

    async fn fetch_one(&self, table: Table, id: &str) -> Result<Record, StoreError> {
        Err(StoreError::RecordNotFound {
            table: table.name().to_string(),
            id: id.to_string(),
        })
    }

    async fn update(&self, table: Table, _id: &str, fields: Fields) -> Result<Record, StoreError> {
        self.create(table, fields).await
    }
}
