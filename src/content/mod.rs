//! Typed site content.
//!
//! Each table the site reads from has a typed record here, decoded from the
//! untyped [`Record`] at the store boundary. A [`ContentKind`] ties a record
//! type to its table, its compiled-in fallback set, its page ordering, and an
//! optional inclusion filter (missions and sermons show published rows only).
//!
//! Decoding is strict: a required field that is missing, blank, or of the
//! wrong JSON type is a [`DecodeError`]. The resolver treats any decode error
//! in a live result as a reason to serve the fallback set instead, so a
//! half-broken table never renders as a half-empty page.
//!
//! ## Field Names
//!
//! Field names are the Airtable column names, spaces and slashes included
//! (`"Ministry Name"`, `"Date/Time"`). Optional text fields that are present
//! but empty are read as absent.

pub mod fallback;
pub mod resolve;

use crate::naming::is_slug;
use crate::store::{Fields, Record, Table};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use thiserror::Error;

pub use resolve::{ContentResolver, FallbackReason, Resolved, Source};

#[derive(Error, Debug, Clone, PartialEq)]
#[error("record {record_id} in {table}: field {field:?} {problem}")]
pub struct DecodeError {
    pub table: Table,
    pub record_id: String,
    pub field: &'static str,
    pub problem: DecodeProblem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeProblem {
    Missing,
    WrongType,
    BadDate,
    BadSlug,
}

impl std::fmt::Display for DecodeProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DecodeProblem::Missing => "is missing",
            DecodeProblem::WrongType => "has the wrong type",
            DecodeProblem::BadDate => "is not a valid date",
            DecodeProblem::BadSlug => "is not a URL slug",
        })
    }
}

/// A kind of page content backed by one table.
pub trait ContentKind: Sized + Clone + Send + Sync + 'static {
    const TABLE: Table;

    /// Decode one store row.
    fn from_record(record: &Record) -> Result<Self, DecodeError>;

    /// The compiled-in set shown when live data is not usable.
    fn fallback() -> Vec<Self>;

    /// Display order for live data.
    fn sort(items: &mut [Self]);

    /// Whether a decoded live row is shown at all.
    fn include(&self) -> bool {
        true
    }

    /// Encode as store fields, for the seed commands.
    fn to_fields(&self) -> Fields;
}

// ============================================================================
// Field readers
// ============================================================================

/// Typed access to one record's fields with errors that name the field.
struct FieldReader<'a> {
    table: Table,
    record: &'a Record,
}

impl<'a> FieldReader<'a> {
    fn new(table: Table, record: &'a Record) -> Self {
        Self { table, record }
    }

    fn error(&self, field: &'static str, problem: DecodeProblem) -> DecodeError {
        DecodeError {
            table: self.table,
            record_id: self.record.id.clone(),
            field,
            problem,
        }
    }

    fn text(&self, field: &'static str) -> Result<String, DecodeError> {
        match self.optional_text(field)? {
            Some(value) => Ok(value),
            None => Err(self.error(field, DecodeProblem::Missing)),
        }
    }

    fn optional_text(&self, field: &'static str) -> Result<Option<String>, DecodeError> {
        match self.record.fields.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.error(field, DecodeProblem::WrongType)),
        }
    }

    /// Airtable omits unchecked checkboxes entirely, so absent means false.
    fn flag(&self, field: &'static str) -> Result<bool, DecodeError> {
        match self.record.fields.get(field) {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(self.error(field, DecodeProblem::WrongType)),
        }
    }

    fn optional_timestamp(
        &self,
        field: &'static str,
    ) -> Result<Option<DateTime<Utc>>, DecodeError> {
        self.optional_text(field)?
            .map(|raw| {
                DateTime::parse_from_rfc3339(raw.trim())
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|_| self.error(field, DecodeProblem::BadDate))
            })
            .transpose()
    }

    /// Slugs become URL paths and export file paths, so anything
    /// [`is_slug`] rejects is an error rather than a page.
    fn optional_slug(&self, field: &'static str) -> Result<Option<String>, DecodeError> {
        match self.optional_text(field)? {
            Some(slug) if !is_slug(&slug) => Err(self.error(field, DecodeProblem::BadSlug)),
            other => Ok(other),
        }
    }

    fn date(&self, field: &'static str) -> Result<NaiveDate, DecodeError> {
        let raw = self.text(field)?;
        parse_day(&raw).ok_or_else(|| self.error(field, DecodeProblem::BadDate))
    }
}

/// Accepts a plain `YYYY-MM-DD` date or a full RFC 3339 timestamp.
fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

/// Builder for seed payloads; `None` values are left out.
#[derive(Default)]
struct FieldWriter(Fields);

impl FieldWriter {
    fn text(mut self, field: &str, value: &str) -> Self {
        self.0.insert(field.to_string(), Value::String(value.to_string()));
        self
    }

    fn optional_text(self, field: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.text(field, v),
            None => self,
        }
    }

    fn flag(mut self, field: &str, value: bool) -> Self {
        self.0.insert(field.to_string(), Value::Bool(value));
        self
    }

    fn finish(self) -> Fields {
        self.0
    }
}

/// Case-insensitive name ordering used by every alphabetical list.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

// ============================================================================
// Leadership
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadershipRecord {
    pub id: String,
    pub name: String,
    pub position: String,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Rank of a leadership position: Pastor, then Deacon, then Trustee, then
/// anything else.
pub fn role_rank(position: &str) -> u32 {
    match position.trim().to_lowercase().as_str() {
        "pastor" => 0,
        "deacon" => 1,
        "trustee" => 2,
        _ => 999,
    }
}

impl LeadershipRecord {
    pub fn rank(&self) -> u32 {
        role_rank(&self.position)
    }

    pub fn has_position(&self, position: &str) -> bool {
        self.position.trim().eq_ignore_ascii_case(position)
    }
}

impl ContentKind for LeadershipRecord {
    const TABLE: Table = Table::Leadership;

    fn from_record(record: &Record) -> Result<Self, DecodeError> {
        let r = FieldReader::new(Self::TABLE, record);
        Ok(Self {
            id: record.id.clone(),
            name: r.text("Name")?,
            position: r.text("Position")?,
            bio: r.optional_text("Bio")?,
            email: r.optional_text("Email")?,
            phone: r.optional_text("Phone")?,
        })
    }

    fn fallback() -> Vec<Self> {
        fallback::leadership()
    }

    fn sort(items: &mut [Self]) {
        items.sort_by(|a, b| {
            a.rank()
                .cmp(&b.rank())
                .then_with(|| compare_names(&a.name, &b.name))
        });
    }

    fn to_fields(&self) -> Fields {
        FieldWriter::default()
            .text("Name", &self.name)
            .text("Position", &self.position)
            .optional_text("Bio", self.bio.as_deref())
            .optional_text("Email", self.email.as_deref())
            .optional_text("Phone", self.phone.as_deref())
            .finish()
    }
}

// ============================================================================
// Ministries
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinistryRecord {
    pub id: String,
    pub name: String,
    pub slug: Option<String>,
    pub description: String,
    pub audience: Option<String>,
    pub meeting_times: Option<String>,
    pub leader_contact: Option<String>,
}

impl ContentKind for MinistryRecord {
    const TABLE: Table = Table::Ministries;

    fn from_record(record: &Record) -> Result<Self, DecodeError> {
        let r = FieldReader::new(Self::TABLE, record);
        Ok(Self {
            id: record.id.clone(),
            name: r.text("Ministry Name")?,
            slug: r.optional_slug("Slug")?,
            description: r.text("Description")?,
            audience: r.optional_text("Age/Group Target")?,
            meeting_times: r.optional_text("Meeting Times")?,
            leader_contact: r.optional_text("Leader Contact")?,
        })
    }

    fn fallback() -> Vec<Self> {
        fallback::ministries()
    }

    fn sort(items: &mut [Self]) {
        items.sort_by(|a, b| compare_names(&a.name, &b.name));
    }

    fn to_fields(&self) -> Fields {
        FieldWriter::default()
            .text("Ministry Name", &self.name)
            .optional_text("Slug", self.slug.as_deref())
            .text("Description", &self.description)
            .optional_text("Age/Group Target", self.audience.as_deref())
            .optional_text("Meeting Times", self.meeting_times.as_deref())
            .optional_text("Leader Contact", self.leader_contact.as_deref())
            .finish()
    }
}

/// The ministry whose slug is exactly `slug`. Ministries without a slug
/// have no detail page.
pub fn find_ministry<'a>(ministries: &'a [MinistryRecord], slug: &str) -> Option<&'a MinistryRecord> {
    ministries
        .iter()
        .find(|m| m.slug.as_deref() == Some(slug))
}

// ============================================================================
// Missions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionRecord {
    pub id: String,
    pub missionary_name: String,
    pub location: String,
    pub country: Option<String>,
    pub ministry: String,
    pub description: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub image_path: Option<String>,
    pub published: bool,
}

impl MissionRecord {
    /// Website as a clickable URL; bare hosts such as `www.example.org` get
    /// an `https://` scheme.
    pub fn website_url(&self) -> Option<String> {
        self.website.as_deref().map(|w| {
            if w.starts_with("http://") || w.starts_with("https://") {
                w.to_string()
            } else {
                format!("https://{w}")
            }
        })
    }
}

impl ContentKind for MissionRecord {
    const TABLE: Table = Table::Missions;

    fn from_record(record: &Record) -> Result<Self, DecodeError> {
        let r = FieldReader::new(Self::TABLE, record);
        Ok(Self {
            id: record.id.clone(),
            missionary_name: r.text("Missionary Name")?,
            location: r.text("Location")?,
            country: r.optional_text("Country")?,
            ministry: r.text("Ministry")?,
            description: r.optional_text("Description")?,
            email: r.optional_text("Email")?,
            phone: r.optional_text("Phone")?,
            address: r.optional_text("Address")?,
            website: r.optional_text("Website")?,
            image_path: r.optional_text("Image Path")?,
            published: r.flag("Published")?,
        })
    }

    fn fallback() -> Vec<Self> {
        fallback::missions()
    }

    fn sort(items: &mut [Self]) {
        items.sort_by(|a, b| compare_names(&a.missionary_name, &b.missionary_name));
    }

    fn include(&self) -> bool {
        self.published
    }

    fn to_fields(&self) -> Fields {
        FieldWriter::default()
            .text("Missionary Name", &self.missionary_name)
            .text("Location", &self.location)
            .optional_text("Country", self.country.as_deref())
            .text("Ministry", &self.ministry)
            .optional_text("Description", self.description.as_deref())
            .optional_text("Email", self.email.as_deref())
            .optional_text("Phone", self.phone.as_deref())
            .optional_text("Address", self.address.as_deref())
            .optional_text("Website", self.website.as_deref())
            .optional_text("Image Path", self.image_path.as_deref())
            .flag("Published", self.published)
            .finish()
    }
}

// ============================================================================
// Sermons
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SermonRecord {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub speaker: Option<String>,
    pub summary: Option<String>,
    pub video_link: Option<String>,
    pub download_link: Option<String>,
    pub series: Option<String>,
    pub published: bool,
}

impl ContentKind for SermonRecord {
    const TABLE: Table = Table::Sermons;

    fn from_record(record: &Record) -> Result<Self, DecodeError> {
        let r = FieldReader::new(Self::TABLE, record);
        Ok(Self {
            id: record.id.clone(),
            title: r.text("Title")?,
            date: r.date("Date")?,
            speaker: r.optional_text("Pastor/Speaker Name")?,
            summary: r.optional_text("Summary/Description")?,
            video_link: r.optional_text("Video Link")?,
            download_link: r.optional_text("Download Link")?,
            series: r.optional_text("Series")?,
            published: r.flag("Published")?,
        })
    }

    fn fallback() -> Vec<Self> {
        fallback::sermons()
    }

    /// Newest first.
    fn sort(items: &mut [Self]) {
        items.sort_by(|a, b| b.date.cmp(&a.date));
    }

    fn include(&self) -> bool {
        self.published
    }

    fn to_fields(&self) -> Fields {
        FieldWriter::default()
            .text("Title", &self.title)
            .text("Date", &self.date.format("%Y-%m-%d").to_string())
            .optional_text("Pastor/Speaker Name", self.speaker.as_deref())
            .optional_text("Summary/Description", self.summary.as_deref())
            .optional_text("Video Link", self.video_link.as_deref())
            .optional_text("Download Link", self.download_link.as_deref())
            .optional_text("Series", self.series.as_deref())
            .flag("Published", self.published)
            .finish()
    }
}

// ============================================================================
// Events
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub id: String,
    pub name: String,
    pub date_time: Option<DateTime<Utc>>,
    pub ministry: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub contact_person: Option<String>,
    pub recurring: bool,
    pub recurrence_pattern: Option<String>,
}

impl EventRecord {
    /// Upcoming at `now`, or recurring regardless of its stored date.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.recurring || self.date_time.is_some_and(|dt| dt >= now)
    }
}

/// Dated events first, ascending; undated events last.
fn compare_events(a: &EventRecord, b: &EventRecord) -> Ordering {
    match (a.date_time, b.date_time) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl ContentKind for EventRecord {
    const TABLE: Table = Table::Events;

    fn from_record(record: &Record) -> Result<Self, DecodeError> {
        let r = FieldReader::new(Self::TABLE, record);
        Ok(Self {
            id: record.id.clone(),
            name: r.text("Event Name")?,
            date_time: r.optional_timestamp("Date/Time")?,
            ministry: r.optional_text("Ministry")?,
            description: r.optional_text("Description")?,
            location: r.optional_text("Location")?,
            contact_person: r.optional_text("Contact Person")?,
            recurring: r.flag("Recurring")?,
            recurrence_pattern: r.optional_text("Recurrence Pattern")?,
        })
    }

    fn fallback() -> Vec<Self> {
        fallback::events()
    }

    fn sort(items: &mut [Self]) {
        items.sort_by(compare_events);
    }

    fn to_fields(&self) -> Fields {
        let date_time = self
            .date_time
            .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true));
        FieldWriter::default()
            .text("Event Name", &self.name)
            .optional_text("Date/Time", date_time.as_deref())
            .optional_text("Ministry", self.ministry.as_deref())
            .optional_text("Description", self.description.as_deref())
            .optional_text("Location", self.location.as_deref())
            .optional_text("Contact Person", self.contact_person.as_deref())
            .flag("Recurring", self.recurring)
            .optional_text("Recurrence Pattern", self.recurrence_pattern.as_deref())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{fields, leader};
    use serde_json::json;

    #[test]
    fn leadership_decodes_required_and_optional() {
        let record = Record::new(
            "rec1",
            fields(json!({"Name": "Joe Burke", "Position": "Deacon", "Bio": ""})),
        );
        let leader = LeadershipRecord::from_record(&record).unwrap();
        assert_eq!(leader.name, "Joe Burke");
        assert_eq!(leader.bio, None);
    }

    #[test]
    fn missing_required_field_names_the_field() {
        let record = Record::new("rec9", fields(json!({"Name": "No Position"})));
        let err = LeadershipRecord::from_record(&record).unwrap_err();
        assert_eq!(err.field, "Position");
        assert_eq!(err.problem, DecodeProblem::Missing);
        assert!(err.to_string().contains("rec9"));
    }

    #[test]
    fn wrong_type_is_an_error() {
        let record = Record::new(
            "rec1",
            fields(json!({"Ministry Name": 7, "Description": "x"})),
        );
        let err = MinistryRecord::from_record(&record).unwrap_err();
        assert_eq!(err.problem, DecodeProblem::WrongType);
    }

    #[test]
    fn ministry_slug_must_be_url_safe() {
        for bad in ["../../escaped", "Mens-Ministry", "youth group"] {
            let record = Record::new(
                "rec1",
                fields(json!({"Ministry Name": "Youth", "Description": "x", "Slug": bad})),
            );
            let err = MinistryRecord::from_record(&record).unwrap_err();
            assert_eq!(err.field, "Slug", "{bad}");
            assert_eq!(err.problem, DecodeProblem::BadSlug, "{bad}");
        }
        let record = Record::new(
            "rec1",
            fields(json!({"Ministry Name": "Youth", "Description": "x", "Slug": "youth-group"})),
        );
        let ministry = MinistryRecord::from_record(&record).unwrap();
        assert_eq!(ministry.slug.as_deref(), Some("youth-group"));
    }

    #[test]
    fn leadership_sort_by_role_then_name() {
        let mut people = vec![
            leader("Zed", "Trustee"),
            leader("Pat", "Pastor"),
            leader("Dan", "Deacon"),
            leader("Amy", "Trustee"),
            leader("Al", "deacon"),
        ];
        LeadershipRecord::sort(&mut people);
        let names: Vec<&str> = people.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Pat", "Al", "Dan", "Amy", "Zed"]);
    }

    #[test]
    fn unknown_role_sorts_last() {
        assert_eq!(role_rank("Elder"), 999);
        assert_eq!(role_rank(" PASTOR "), 0);
        let mut people = vec![leader("A", "Secretary"), leader("B", "Trustee")];
        LeadershipRecord::sort(&mut people);
        assert_eq!(people[0].name, "B");
    }

    #[test]
    fn mission_published_defaults_false() {
        let record = Record::new(
            "rec1",
            fields(json!({"Missionary Name": "A", "Location": "B", "Ministry": "C"})),
        );
        let mission = MissionRecord::from_record(&record).unwrap();
        assert!(!mission.published);
        assert!(!mission.include());
    }

    #[test]
    fn mission_website_gets_scheme() {
        let mut mission = fallback::missions().remove(0);
        mission.website = Some("www.freehope.org".into());
        assert_eq!(mission.website_url().as_deref(), Some("https://www.freehope.org"));
    }

    #[test]
    fn sermon_date_accepts_plain_and_timestamp() {
        assert_eq!(parse_day("2024-03-10"), NaiveDate::from_ymd_opt(2024, 3, 10));
        assert_eq!(
            parse_day("2024-03-10T15:00:00.000Z"),
            NaiveDate::from_ymd_opt(2024, 3, 10)
        );
        assert_eq!(parse_day("March 10"), None);
    }

    #[test]
    fn sermons_sort_newest_first() {
        let record = |id: &str, date: &str| {
            SermonRecord::from_record(&Record::new(
                id,
                fields(json!({"Title": id, "Date": date, "Published": true})),
            ))
            .unwrap()
        };
        let mut sermons = vec![record("a", "2023-01-01"), record("b", "2024-06-01")];
        SermonRecord::sort(&mut sermons);
        assert_eq!(sermons[0].id, "b");
    }

    #[test]
    fn event_with_bad_date_fails_decoding() {
        let record = Record::new(
            "rec1",
            fields(json!({"Event Name": "Picnic", "Date/Time": "next tuesday"})),
        );
        let err = EventRecord::from_record(&record).unwrap_err();
        assert_eq!(err.problem, DecodeProblem::BadDate);
    }

    #[test]
    fn events_sort_undated_last() {
        let event = |id: &str, date: Option<&str>| {
            let mut f = json!({"Event Name": id});
            if let Some(d) = date {
                f["Date/Time"] = json!(d);
            }
            EventRecord::from_record(&Record::new(id, fields(f))).unwrap()
        };
        let mut events = vec![
            event("undated", None),
            event("later", Some("2025-05-01T10:00:00.000Z")),
            event("sooner", Some("2025-04-01T10:00:00.000Z")),
        ];
        EventRecord::sort(&mut events);
        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["sooner", "later", "undated"]);
    }

    #[test]
    fn to_fields_skips_absent_optionals() {
        let fields = leader("Joe", "Deacon").to_fields();
        assert_eq!(fields["Name"], "Joe");
        assert!(!fields.contains_key("Bio"));
    }

    #[test]
    fn find_ministry_matches_slug_only() {
        let ministries = fallback::ministries();
        assert_eq!(
            find_ministry(&ministries, "mens-ministry").map(|m| m.name.as_str()),
            Some("Men's Ministry (CFBC Fraternity)")
        );
        assert!(find_ministry(&ministries, "Music Ministry").is_none());
    }
}
