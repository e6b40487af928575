use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::files;

/// Metadata for one stored file, as surfaced on the HTTP and event wires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Backend-assigned identifier, the external reference
    pub id: String,
    /// Original name as uploaded, not unique
    pub filename: String,
    /// MIME type declared by the uploader
    pub content_type: String,
    /// Byte size counted from the bytes actually written
    pub length: i64,
    /// Set by the backend when the write stream closed
    pub upload_date: DateTime<Utc>,
    /// Hex SHA-256 over the stored content
    pub checksum: String,
}

impl From<files::Model> for FileRecord {
    fn from(model: files::Model) -> Self {
        Self {
            id: model.id,
            filename: model.filename,
            content_type: model.content_type,
            length: model.length,
            upload_date: model.upload_date,
            checksum: model.checksum,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_camel_case() {
        let record = FileRecord {
            id: "abc".to_string(),
            filename: "a.txt".to_string(),
            content_type: "text/plain".to_string(),
            length: 5,
            upload_date: Utc::now(),
            checksum: "deadbeef".to_string(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["contentType"], "text/plain");
        assert!(json["uploadDate"].as_str().is_some());
        assert_eq!(json["length"], 5);
        assert!(json.get("content_type").is_none());
    }
}
