/// Record identifiers are opaque store-assigned strings (UUID v4 in the
/// built-in stores). Unique within a collection, stable for the record's
/// lifetime.
pub type RecordId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
