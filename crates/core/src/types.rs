/// Farms and analysis jobs are identified by server-issued UUIDs.
pub type FarmId = uuid::Uuid;

/// Analysis jobs are identified by server-issued UUIDs.
pub type JobId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (sowing, harvest, analysis windows) carry no time zone.
pub type Date = chrono::NaiveDate;
