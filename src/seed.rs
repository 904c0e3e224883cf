//! Maintenance commands for the Airtable base.
//!
//! These back `cfbc-site seed …` and are run by hand against a real base:
//!
//! - `create-tables`: create the seven content tables with their field types
//! - `list-bases`: list the bases the token can see
//! - `leadership`, `ministries`, `missions`: write the compiled content sets
//! - `events`: write the weekly schedule, dated at each slot's next occurrence
//! - `sermon`: add one published sermon
//! - `add-slugs`: fill the `Slug` column of ministries that lack one
//! - `export`: dump every content table as pretty JSON
//!
//! Writes go one row at a time and a failed row does not stop the run; the
//! outcome lists what was written and what failed so the run can be repeated
//! for the rest.

use crate::content::{ContentKind, SermonRecord, fallback};
use crate::naming::slugify;
use crate::store::client::{AirtableClient, FieldSchema, TableSchema};
use crate::store::{Fields, RecordStore, StoreError, Table};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use serde_json::{Map, Value, json};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to encode export: {0}")]
    Json(#[from] serde_json::Error),
}

/// What one seed command did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedOutcome {
    pub table: Option<Table>,
    /// Labels of rows (or tables) written.
    pub written: Vec<String>,
    /// Label and error message of rows that failed.
    pub failed: Vec<(String, String)>,
    /// Labels left alone, with the reason.
    pub skipped: Vec<(String, String)>,
}

impl SeedOutcome {
    fn for_table(table: Table) -> Self {
        Self {
            table: Some(table),
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

// ============================================================================
// Schema
// ============================================================================

fn field(name: &str, kind: &str) -> FieldSchema {
    FieldSchema {
        name: name.to_string(),
        kind: kind.to_string(),
        options: None,
    }
}

fn field_with(name: &str, kind: &str, options: Value) -> FieldSchema {
    FieldSchema {
        options: Some(options),
        ..field(name, kind)
    }
}

fn date_time(name: &str) -> FieldSchema {
    field_with(
        name,
        "dateTime",
        json!({
            "dateFormat": {"name": "local"},
            "timeFormat": {"name": "12hour"},
            "timeZone": "America/New_York"
        }),
    )
}

fn date(name: &str) -> FieldSchema {
    field_with(name, "date", json!({"dateFormat": {"name": "local"}}))
}

fn checkbox(name: &str, color: &str) -> FieldSchema {
    field_with(name, "checkbox", json!({"icon": "check", "color": color}))
}

fn single_select(name: &str, choices: &[&str]) -> FieldSchema {
    let choices: Vec<Value> = choices.iter().map(|c| json!({"name": c})).collect();
    field_with(name, "singleSelect", json!({"choices": choices}))
}

fn table(name: Table, description: &str, fields: Vec<FieldSchema>) -> TableSchema {
    TableSchema {
        name: name.name().to_string(),
        description: Some(description.to_string()),
        fields,
    }
}

/// Definitions of every table the site reads or writes. The first field of
/// each is the table's primary field.
pub fn table_schemas() -> Vec<TableSchema> {
    vec![
        table(
            Table::ContactSubmissions,
            "Stores all contact form submissions from the website",
            vec![
                field("Name", "singleLineText"),
                field("Email", "email"),
                field("Phone", "phoneNumber"),
                field("Message", "multilineText"),
                date_time("Date Submitted"),
                checkbox("Followed Up", "greenBright"),
            ],
        ),
        table(
            Table::Events,
            "Church events and calendar items",
            vec![
                field("Event Name", "singleLineText"),
                date_time("Date/Time"),
                single_select("Ministry", &["Children", "Adult", "Men", "Women", "All"]),
                field("Description", "multilineText"),
                field("Location", "singleLineText"),
                field("Contact Person", "singleLineText"),
                checkbox("Recurring", "blueBright"),
                field("Recurrence Pattern", "singleLineText"),
            ],
        ),
        table(
            Table::Leadership,
            "Church leadership team members",
            vec![
                field("Name", "singleLineText"),
                single_select("Position", &["Pastor", "Deacon", "Trustee"]),
                field("Bio", "multilineText"),
                field("Photo", "multipleAttachments"),
                field("Email", "email"),
                field("Phone", "phoneNumber"),
            ],
        ),
        table(
            Table::Ministries,
            "Church ministry programs and details",
            vec![
                field("Ministry Name", "singleLineText"),
                field("Description", "multilineText"),
                field("Age/Group Target", "singleLineText"),
                field("Meeting Times", "singleLineText"),
                field("Leader Contact", "singleLineText"),
                field("Photos", "multipleAttachments"),
                field("Slug", "singleLineText"),
            ],
        ),
        table(
            Table::BlogPosts,
            "Church blog posts and announcements",
            vec![
                field("Title", "singleLineText"),
                field("Content", "multilineText"),
                date("Date Published"),
                field("Author", "singleLineText"),
                field("Category", "singleLineText"),
                field("Featured Image", "multipleAttachments"),
                checkbox("Published", "greenBright"),
                field("Slug", "singleLineText"),
            ],
        ),
        table(
            Table::Sermons,
            "Sermon recordings and notes",
            vec![
                field("Title", "singleLineText"),
                date("Date"),
                field("Pastor/Speaker Name", "singleLineText"),
                field("Summary/Description", "multilineText"),
                field("Video Link", "url"),
                field("Download Link", "url"),
                field("Series", "singleLineText"),
                checkbox("Published", "greenBright"),
            ],
        ),
        table(
            Table::Missions,
            "Missionaries and mission work supported by CFBC",
            vec![
                field("Missionary Name", "singleLineText"),
                field("Location", "singleLineText"),
                field("Country", "singleLineText"),
                field("Ministry", "singleLineText"),
                field("Description", "multilineText"),
                field("Email", "email"),
                field("Phone", "phoneNumber"),
                field("Address", "multilineText"),
                field("Website", "url"),
                field("Image Path", "singleLineText"),
                checkbox("Published", "greenBright"),
            ],
        ),
    ]
}

/// Create every table in the client's base, pausing between requests to
/// stay under the API rate limit. Tables that already exist fail
/// individually.
pub async fn create_tables(client: &AirtableClient, pause: Duration) -> SeedOutcome {
    let mut outcome = SeedOutcome::default();
    let schemas = table_schemas();
    let last = schemas.len().saturating_sub(1);
    for (i, schema) in schemas.iter().enumerate() {
        match client.create_table(schema).await {
            Ok(created) => {
                tracing::info!(table = %created.name, id = %created.id, "table created");
                outcome.written.push(format!("{} ({})", created.name, created.id));
            }
            Err(e) => {
                tracing::error!(table = %schema.name, "failed to create table: {e}");
                outcome.failed.push((schema.name.clone(), e.to_string()));
            }
        }
        if i < last && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
    }
    outcome
}

// ============================================================================
// Content rows
// ============================================================================

async fn write_rows(
    store: &dyn RecordStore,
    table: Table,
    rows: Vec<(String, Fields)>,
) -> SeedOutcome {
    let mut outcome = SeedOutcome::for_table(table);
    for (label, fields) in rows {
        match store.create(table, fields).await {
            Ok(record) => {
                tracing::info!(%table, id = %record.id, "added {label}");
                outcome.written.push(label);
            }
            Err(e) => {
                tracing::error!(%table, "failed to add {label}: {e}");
                outcome.failed.push((label, e.to_string()));
            }
        }
    }
    outcome
}

pub async fn seed_leadership(store: &dyn RecordStore) -> SeedOutcome {
    let rows = fallback::leadership()
        .iter()
        .map(|l| (l.name.clone(), l.to_fields()))
        .collect();
    write_rows(store, Table::Leadership, rows).await
}

pub async fn seed_ministries(store: &dyn RecordStore) -> SeedOutcome {
    let rows = fallback::ministries()
        .iter()
        .map(|m| (m.name.clone(), m.to_fields()))
        .collect();
    write_rows(store, Table::Ministries, rows).await
}

pub async fn seed_missions(store: &dyn RecordStore) -> SeedOutcome {
    let rows = fallback::missions()
        .iter()
        .map(|m| (m.missionary_name.clone(), m.to_fields()))
        .collect();
    write_rows(store, Table::Missions, rows).await
}

/// Speaker recorded when a sermon is added without one.
pub const DEFAULT_SPEAKER: &str = "Pastor Doug Reeder";

/// A sermon as entered on the command line.
#[derive(Debug, Clone)]
pub struct NewSermon {
    pub title: String,
    pub date: NaiveDate,
    pub speaker: Option<String>,
    pub video_link: Option<String>,
    pub download_link: Option<String>,
    pub series: Option<String>,
    pub description: Option<String>,
}

impl NewSermon {
    /// The published record to write. Blank optionals are dropped.
    pub fn into_record(self) -> SermonRecord {
        let clean = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        SermonRecord {
            id: String::new(),
            title: self.title.trim().to_string(),
            date: self.date,
            speaker: clean(self.speaker).or_else(|| Some(DEFAULT_SPEAKER.to_string())),
            summary: clean(self.description),
            video_link: clean(self.video_link),
            download_link: clean(self.download_link),
            series: clean(self.series),
            published: true,
        }
    }
}

/// Add one sermon to the Sermons table.
pub async fn add_sermon(store: &dyn RecordStore, sermon: NewSermon) -> SeedOutcome {
    let record = sermon.into_record();
    let label = format!("{} ({})", record.title, record.date.format("%Y-%m-%d"));
    write_rows(store, Table::Sermons, vec![(label, record.to_fields())]).await
}

/// The first `weekday` at `hour:minute` strictly after today's date in
/// `now`'s time zone, as UTC. A slot later today still counts as next week.
pub fn next_occurrence<Tz: TimeZone>(
    now: &DateTime<Tz>,
    weekday: chrono::Weekday,
    hour: u32,
    minute: u32,
) -> DateTime<Utc> {
    let today = now.date_naive();
    let ahead = (weekday.num_days_from_sunday() + 7 - today.weekday().num_days_from_sunday()) % 7;
    let ahead = if ahead == 0 { 7 } else { ahead };
    let day = today + TimeDelta::days(i64::from(ahead));
    let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
    let local = day.and_time(time);
    match now.timezone().from_local_datetime(&local).earliest() {
        Some(dt) => dt.with_timezone(&Utc),
        // Inside a DST gap; an hour later exists.
        None => now
            .timezone()
            .from_local_datetime(&(local + TimeDelta::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&local)),
    }
}

/// Write the weekly schedule as recurring events dated at their next
/// occurrence after `now`.
pub async fn seed_events<Tz: TimeZone>(store: &dyn RecordStore, now: &DateTime<Tz>) -> SeedOutcome {
    let rows = fallback::WEEKLY_SCHEDULE
        .iter()
        .map(|slot| {
            let mut event = slot.to_event(String::new());
            event.date_time = Some(next_occurrence(now, slot.weekday, slot.hour, slot.minute));
            event.recurrence_pattern = Some(slot.pattern.to_string());
            (format!("{} ({})", slot.name, slot.pattern), event.to_fields())
        })
        .collect();
    write_rows(store, Table::Events, rows).await
}

/// Fill in `Slug` for ministries that have none. Known names get their fixed
/// slug, others a generated one. Existing slugs are never changed.
pub async fn add_slugs(store: &dyn RecordStore) -> Result<SeedOutcome, SeedError> {
    let mut outcome = SeedOutcome::for_table(Table::Ministries);
    for record in store.fetch_all(Table::Ministries).await? {
        let name = record
            .fields
            .get("Ministry Name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let existing = record
            .fields
            .get("Slug")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default();
        if !existing.is_empty() {
            outcome
                .skipped
                .push((name, format!("already has slug {existing}")));
            continue;
        }
        let slug = fallback::ministry_slug_override(&name)
            .map(str::to_string)
            .unwrap_or_else(|| slugify(&name));
        if slug.is_empty() {
            outcome.skipped.push((record.id, "no usable name".to_string()));
            continue;
        }

        let mut fields = Fields::new();
        fields.insert("Slug".into(), Value::String(slug.clone()));
        match store.update(Table::Ministries, &record.id, fields).await {
            Ok(_) => {
                tracing::info!(ministry = %name, %slug, "slug added");
                outcome.written.push(format!("{name} → {slug}"));
            }
            Err(e) => {
                tracing::error!(ministry = %name, "failed to add slug: {e}");
                outcome.failed.push((name, e.to_string()));
            }
        }
    }
    Ok(outcome)
}

/// Tables included in an export, in output order.
pub const EXPORT_TABLES: [Table; 5] = [
    Table::Leadership,
    Table::Ministries,
    Table::Missions,
    Table::Sermons,
    Table::Events,
];

/// Every content table as `{table name: [{id, ...fields}]}`.
pub async fn export(store: &dyn RecordStore) -> Result<Value, SeedError> {
    let mut tables = Map::new();
    for table in EXPORT_TABLES {
        let rows: Vec<Value> = store
            .fetch_all(table)
            .await?
            .into_iter()
            .map(|record| {
                let mut row = Map::new();
                row.insert("id".into(), Value::String(record.id));
                row.extend(record.fields);
                Value::Object(row)
            })
            .collect();
        tracing::info!(%table, records = rows.len(), "exported");
        tables.insert(table.name().to_string(), Value::Array(rows));
    }
    Ok(Value::Object(tables))
}

pub fn export_json(export: &Value) -> Result<String, SeedError> {
    Ok(serde_json::to_string_pretty(export)?)
}
