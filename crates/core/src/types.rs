/// Primary key type for every table (UUID v4).
pub type DbId = uuid::Uuid;

/// UTC timestamp used for all persisted and token time fields.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
