/// Tracking-database ids are plain integers.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (task start/due dates) carry no time zone.
pub type Date = chrono::NaiveDate;

/// An untyped record as returned by a tracking-system query.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;
