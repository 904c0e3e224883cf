//! Airtable REST client.
//!
//! Speaks the v0 records API (`{api_url}/{base}/{table}`) for reads and writes
//! and the metadata API (`{api_url}/meta/...`) for the maintenance commands.
//! All requests carry `Authorization: Bearer {token}`.
//!
//! List responses are paginated: each page may carry an `offset` cursor that
//! is sent back to get the next page. [`AirtableClient::fetch_all`] follows the
//! cursor to the end, and the whole listing is retried per [`RetryPolicy`] if
//! any page fails.

use super::retry::RetryPolicy;
use super::{Fields, Record, RecordStore, StoreCredentials, StoreError, Table, TransportError};
use crate::config::StoreConfig;
use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Upper bound on pages followed in one listing, so a misbehaving cursor
/// cannot loop forever.
const MAX_PAGES: usize = 1000;

#[derive(Debug, Deserialize)]
struct ListPage {
    records: Vec<Record>,
    #[serde(default)]
    offset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecordBatch {
    records: Vec<Record>,
}

/// A field definition for [`AirtableClient::create_table`].
#[derive(Debug, Clone, Serialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
}

/// A table definition for [`AirtableClient::create_table`].
#[derive(Debug, Clone, Serialize)]
pub struct TableSchema {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<FieldSchema>,
}

/// A base visible to the token, from [`AirtableClient::list_bases`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BaseInfo {
    pub id: String,
    pub name: String,
    #[serde(rename = "permissionLevel", default)]
    pub permission_level: String,
}

#[derive(Debug, Deserialize)]
struct BaseList {
    #[serde(default)]
    bases: Vec<BaseInfo>,
}

/// Table id returned by the metadata API after creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedTable {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

pub struct AirtableClient {
    http: reqwest::Client,
    api_url: Url,
    credentials: StoreCredentials,
    retry: RetryPolicy,
}

impl AirtableClient {
    /// Build a client from credentials and connection settings.
    ///
    /// The underlying `reqwest::Client` (and its connection pool) is created
    /// here once and reused for every call made through this handle.
    pub fn new(credentials: StoreCredentials, config: &StoreConfig) -> Result<Self, StoreError> {
        let api_url = Url::parse(config.api_url.trim_end_matches('/')).map_err(|e| {
            StoreError::Configuration(format!("invalid store.api_url {:?}: {e}", config.api_url))
        })?;
        if api_url.cannot_be_a_base() {
            return Err(StoreError::Configuration(format!(
                "store.api_url {:?} cannot be used as a base URL",
                config.api_url
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("cfbc-site/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StoreError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            api_url,
            credentials,
            retry: RetryPolicy::new(config.read_attempts, config.backoff_base()),
        })
    }

    /// Replace the read retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn base_id(&self) -> &str {
        &self.credentials.base_id
    }

    /// `{api_url}/{segments...}` with each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn table_url(&self, table: Table) -> Url {
        self.url(&[&self.credentials.base_id, table.name()])
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.credentials.api_token)
    }

    /// Send a request and decode a JSON body, mapping non-2xx responses to
    /// [`TransportError::Status`].
    async fn send_json<T>(&self, builder: reqwest::RequestBuilder) -> Result<T, TransportError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| TransportError::Decode(e.to_string()))
    }

    /// One pass over every page of `table`.
    async fn list_once(&self, table: Table) -> Result<Vec<Record>, TransportError> {
        let mut records = Vec::new();
        let mut offset: Option<String> = None;
        for _ in 0..MAX_PAGES {
            let mut builder = self.request(Method::GET, self.table_url(table));
            if let Some(cursor) = &offset {
                builder = builder.query(&[("offset", cursor.as_str())]);
            }
            let page: ListPage = self.send_json(builder).await?;
            records.extend(page.records);
            match page.offset {
                Some(next) if !next.is_empty() => offset = Some(next),
                _ => return Ok(records),
            }
        }
        Err(TransportError::Decode(format!(
            "pagination of {table} did not terminate after {MAX_PAGES} pages"
        )))
    }

    async fn write_batch(
        &self,
        method: Method,
        url: Url,
        body: serde_json::Value,
    ) -> Result<Record, TransportError> {
        let batch: RecordBatch = self.send_json(self.request(method, url).json(&body)).await?;
        batch
            .records
            .into_iter()
            .next()
            .ok_or_else(|| TransportError::Decode("response contained no records".into()))
    }

    /// Create a table in the base through the metadata API.
    pub async fn create_table(&self, schema: &TableSchema) -> Result<CreatedTable, StoreError> {
        let url = self.url(&["meta", "bases", &self.credentials.base_id, "tables"]);
        self.send_json(self.request(Method::POST, url).json(schema))
            .await
            .map_err(|cause| StoreError::Write {
                table: schema.name.clone(),
                cause,
            })
    }

    /// Every base the token can see.
    pub async fn list_bases(&self) -> Result<Vec<BaseInfo>, StoreError> {
        let url = self.url(&["meta", "bases"]);
        let list: BaseList = self
            .send_json(self.request(Method::GET, url))
            .await
            .map_err(|cause| StoreError::Unavailable {
                table: "meta/bases".into(),
                attempts: 1,
                cause,
            })?;
        Ok(list.bases)
    }
}

#[async_trait]
impl RecordStore for AirtableClient {
    async fn fetch_all(&self, table: Table) -> Result<Vec<Record>, StoreError> {
        let label = format!("list {table}");
        self.retry
            .run(&label, |_| self.list_once(table))
            .await
            .map_err(|exhausted| StoreError::Unavailable {
                table: table.name().to_string(),
                attempts: exhausted.attempts,
                cause: exhausted.last,
            })
    }

    async fn create(&self, table: Table, fields: Fields) -> Result<Record, StoreError> {
        let body = json!({ "records": [{ "fields": fields }] });
        self.write_batch(Method::POST, self.table_url(table), body)
            .await
            .map_err(|cause| StoreError::Write {
                table: table.name().to_string(),
                cause,
            })
    }

    async fn fetch_one(&self, table: Table, id: &str) -> Result<Record, StoreError> {
        let url = self.url(&[&self.credentials.base_id, table.name(), id]);
        match self.send_json::<Record>(self.request(Method::GET, url)).await {
            Ok(record) => Ok(record),
            Err(TransportError::Status { status, .. })
                if status == StatusCode::NOT_FOUND.as_u16() =>
            {
                Err(StoreError::RecordNotFound {
                    table: table.name().to_string(),
                    id: id.to_string(),
                })
            }
            Err(cause) => Err(StoreError::Unavailable {
                table: table.name().to_string(),
                attempts: 1,
                cause,
            }),
        }
    }

    async fn update(&self, table: Table, id: &str, fields: Fields) -> Result<Record, StoreError> {
        let body = json!({ "records": [{ "id": id, "fields": fields }] });
        self.write_batch(Method::PATCH, self.table_url(table), body)
            .await
            .map_err(|cause| StoreError::Write {
                table: table.name().to_string(),
                cause,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_url: &str) -> AirtableClient {
        let config = StoreConfig {
            api_url: api_url.to_string(),
            ..StoreConfig::default()
        };
        AirtableClient::new(
            StoreCredentials {
                api_token: "pat".into(),
                base_id: "appBase".into(),
            },
            &config,
        )
        .unwrap()
    }

    #[test]
    fn table_url_encodes_spaces() {
        let c = client("https://api.airtable.com/v0");
        assert_eq!(
            c.table_url(Table::ContactSubmissions).as_str(),
            "https://api.airtable.com/v0/appBase/Contact%20Form%20Submissions"
        );
    }

    #[test]
    fn trailing_slash_in_api_url_is_ignored() {
        let c = client("https://api.airtable.com/v0/");
        assert_eq!(
            c.url(&["meta", "bases"]).as_str(),
            "https://api.airtable.com/v0/meta/bases"
        );
    }

    #[test]
    fn record_id_is_a_single_segment() {
        let c = client("https://api.airtable.com/v0");
        let url = c.url(&["appBase", "Events", "rec/../x"]);
        assert!(url.as_str().ends_with("/Events/rec%2F..%2Fx"));
    }

    #[test]
    fn retry_policy_comes_from_config() {
        let c = client("https://api.airtable.com/v0");
        assert_eq!(c.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn invalid_api_url_is_configuration_error() {
        let config = StoreConfig {
            api_url: "not a url".into(),
            ..StoreConfig::default()
        };
        let result = AirtableClient::new(
            StoreCredentials {
                api_token: "pat".into(),
                base_id: "app".into(),
            },
            &config,
        );
        assert!(matches!(result, Err(StoreError::Configuration(_))));
    }

    #[test]
    fn table_schema_serializes_type_key() {
        let schema = TableSchema {
            name: "Events".into(),
            description: None,
            fields: vec![FieldSchema {
                name: "Event Name".into(),
                kind: "singleLineText".into(),
                options: None,
            }],
        };
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(value["fields"][0]["type"], "singleLineText");
        assert!(value.get("description").is_none());
    }
}
