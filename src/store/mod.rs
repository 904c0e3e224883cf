//! Airtable record store.
//!
//! Every page reads its content from one Airtable base, and the contact form
//! and seed commands write to it. This module owns the wire-level view of that
//! base: untyped [`Record`]s, the fixed [`Table`] names, the [`RecordStore`]
//! trait the rest of the crate depends on, and the HTTP implementation in
//! [`client`].
//!
//! The store handle is constructed once in `main` and passed down as an
//! `Arc<dyn RecordStore>`. When credentials are missing there is no handle at
//! all (`Option::None`), which pages treat as "use fallback content" and the
//! contact handler treats as "writes disabled".

pub mod client;
pub mod retry;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use client::AirtableClient;
pub use retry::RetryPolicy;

/// Field values of one row, keyed by column name.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// One row of an Airtable table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(rename = "createdTime", default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(default)]
    pub fields: Fields,
}

impl Record {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            created_time: None,
            fields,
        }
    }
}

/// The tables of the church base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Events,
    Leadership,
    Ministries,
    BlogPosts,
    ContactSubmissions,
    Sermons,
    Missions,
}

impl Table {
    pub const ALL: [Table; 7] = [
        Table::Events,
        Table::Leadership,
        Table::Ministries,
        Table::BlogPosts,
        Table::ContactSubmissions,
        Table::Sermons,
        Table::Missions,
    ];

    /// Table name as it appears in the Airtable base and URL path.
    pub fn name(self) -> &'static str {
        match self {
            Table::Events => "Events",
            Table::Leadership => "Leadership",
            Table::Ministries => "Ministries",
            Table::BlogPosts => "Blog Posts",
            Table::ContactSubmissions => "Contact Form Submissions",
            Table::Sermons => "Sermons",
            Table::Missions => "Missions",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Low-level failure of a single request.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Airtable returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store configuration missing: {0}")]
    Configuration(String),
    #[error("store unavailable for table {table} after {attempts} attempt(s): {cause}")]
    Unavailable {
        table: String,
        attempts: u32,
        #[source]
        cause: TransportError,
    },
    #[error("failed to write record to {table}: {cause}")]
    Write {
        table: String,
        #[source]
        cause: TransportError,
    },
    #[error("record {id} not found in {table}")]
    RecordNotFound { table: String, id: String },
}

/// Access to the hosted table store.
///
/// Reads are safe to retry and implementations retry them; writes are not
/// and are attempted exactly once.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every row of `table`, following pagination to the end.
    async fn fetch_all(&self, table: Table) -> Result<Vec<Record>, StoreError>;

    /// Append one row.
    async fn create(&self, table: Table, fields: Fields) -> Result<Record, StoreError>;

    /// A single row by id.
    async fn fetch_one(&self, table: Table, id: &str) -> Result<Record, StoreError>;

    /// Overwrite the given fields of an existing row. Used by maintenance
    /// commands only.
    async fn update(&self, table: Table, id: &str, fields: Fields) -> Result<Record, StoreError>;
}

/// Airtable token and base id.
#[derive(Clone)]
pub struct StoreCredentials {
    pub api_token: String,
    pub base_id: String,
}

impl fmt::Debug for StoreCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreCredentials")
            .field("api_token", &"<redacted>")
            .field("base_id", &self.base_id)
            .finish()
    }
}

pub const TOKEN_VAR: &str = "AIRTABLE_API_TOKEN";
pub const BASE_VAR: &str = "AIRTABLE_BASE_ID";
const LEGACY_TOKEN_VAR: &str = "NEXT_PUBLIC_AIRTABLE_API_TOKEN";
const LEGACY_BASE_VAR: &str = "NEXT_PUBLIC_AIRTABLE_BASE_ID";

impl StoreCredentials {
    /// Read credentials from the process environment.
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through an arbitrary variable lookup.
    ///
    /// The legacy `NEXT_PUBLIC_*` names are accepted when the primary names
    /// are unset, so an existing `.env` keeps working.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, StoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |primary: &str, legacy: &str| {
            lookup(primary)
                .or_else(|| lookup(legacy))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let api_token = read(TOKEN_VAR, LEGACY_TOKEN_VAR)
            .ok_or_else(|| StoreError::Configuration(format!("{TOKEN_VAR} is not set")))?;
        let base_id = read(BASE_VAR, LEGACY_BASE_VAR)
            .ok_or_else(|| StoreError::Configuration(format!("{BASE_VAR} is not set")))?;
        Ok(Self { api_token, base_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn table_names_match_base() {
        assert_eq!(Table::ContactSubmissions.name(), "Contact Form Submissions");
        assert_eq!(Table::BlogPosts.to_string(), "Blog Posts");
        assert_eq!(Table::ALL.len(), 7);
    }

    #[test]
    fn credentials_from_primary_names() {
        let creds = StoreCredentials::from_lookup(lookup(&[
            ("AIRTABLE_API_TOKEN", "pat123"),
            ("AIRTABLE_BASE_ID", "app456"),
        ]))
        .unwrap();
        assert_eq!(creds.api_token, "pat123");
        assert_eq!(creds.base_id, "app456");
    }

    #[test]
    fn credentials_from_legacy_names() {
        let creds = StoreCredentials::from_lookup(lookup(&[
            ("NEXT_PUBLIC_AIRTABLE_API_TOKEN", "pat"),
            ("NEXT_PUBLIC_AIRTABLE_BASE_ID", "app"),
        ]))
        .unwrap();
        assert_eq!(creds.base_id, "app");
    }

    #[test]
    fn missing_token_is_configuration_error() {
        let err = StoreCredentials::from_lookup(lookup(&[("AIRTABLE_BASE_ID", "app")]))
            .unwrap_err();
        assert!(matches!(err, StoreError::Configuration(msg) if msg.contains("AIRTABLE_API_TOKEN")));
    }

    #[test]
    fn blank_base_is_configuration_error() {
        let err = StoreCredentials::from_lookup(lookup(&[
            ("AIRTABLE_API_TOKEN", "pat"),
            ("AIRTABLE_BASE_ID", "   "),
        ]))
        .unwrap_err();
        assert!(matches!(err, StoreError::Configuration(_)));
    }

    #[test]
    fn debug_redacts_token() {
        let creds = StoreCredentials {
            api_token: "pat-secret".into(),
            base_id: "app1".into(),
        };
        let shown = format!("{creds:?}");
        assert!(!shown.contains("pat-secret"));
        assert!(shown.contains("app1"));
    }

    #[test]
    fn record_deserializes_airtable_shape() {
        let record: Record = serde_json::from_str(
            r#"{"id":"rec1","createdTime":"2024-01-01T00:00:00.000Z","fields":{"Name":"A"}}"#,
        )
        .unwrap();
        assert_eq!(record.id, "rec1");
        assert_eq!(record.fields["Name"], "A");
        assert!(record.created_time.is_some());
    }

    #[test]
    fn unavailable_error_carries_cause() {
        let err = StoreError::Unavailable {
            table: "Leadership".into(),
            attempts: 3,
            cause: TransportError::Status {
                status: 503,
                body: "busy".into(),
            },
        };
        let shown = err.to_string();
        assert!(shown.contains("after 3 attempt(s)"));
        assert!(shown.contains("503"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
