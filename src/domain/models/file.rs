use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::value_objects::{BucketName, FileId, ObjectPath};

/// Content type recorded when an upload does not name one
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Metadata about a stored object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: FileId,
    pub bucket: BucketName,
    pub path: ObjectPath,
    /// Last path segment
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub etag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FileRecord {
    /// Rewrite location fields after a move, keeping identity and `created_at`
    pub fn relocate(&mut self, path: ObjectPath, updated_at: DateTime<Utc>) {
        self.name = path.file_name().to_string();
        self.path = path;
        self.updated_at = updated_at;
    }

    /// Record of a copy at `path`: same content, new identity and timestamps
    pub fn duplicate(&self, id: FileId, path: ObjectPath, now: DateTime<Utc>) -> FileRecord {
        FileRecord {
            id,
            bucket: self.bucket.clone(),
            name: path.file_name().to_string(),
            path,
            size: self.size,
            mime_type: self.mime_type.clone(),
            etag: self.etag.clone(),
            cache_control: self.cache_control.clone(),
            metadata: self.metadata.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// MD5 hex digest used as the entity tag of stored content
pub fn compute_etag(data: &[u8]) -> String {
    format!("{:x}", md5::compute(data))
}

/// Options accepted by `upload`
#[derive(Debug, Clone, Default, PartialEq, bon::Builder)]
pub struct UploadOptions {
    #[builder(into)]
    pub content_type: Option<String>,
    #[builder(into)]
    pub cache_control: Option<String>,
    /// Overwrite an existing object instead of failing with `FILE_EXISTS`
    #[builder(default)]
    pub upsert: bool,
    pub metadata: Option<HashMap<String, String>>,
}

/// Upload body in whichever representation the caller has at hand
#[derive(Debug, Clone, PartialEq)]
pub enum UploadPayload {
    Bytes(Bytes),
    Text(String),
}

impl UploadPayload {
    /// Length in bytes of the encoded payload
    pub fn len(&self) -> u64 {
        match self {
            UploadPayload::Bytes(bytes) => bytes.len() as u64,
            UploadPayload::Text(text) => text.len() as u64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_bytes(self) -> Bytes {
        match self {
            UploadPayload::Bytes(bytes) => bytes,
            UploadPayload::Text(text) => Bytes::from(text),
        }
    }
}

impl From<Bytes> for UploadPayload {
    fn from(bytes: Bytes) -> Self {
        UploadPayload::Bytes(bytes)
    }
}

impl From<Vec<u8>> for UploadPayload {
    fn from(bytes: Vec<u8>) -> Self {
        UploadPayload::Bytes(Bytes::from(bytes))
    }
}

impl From<&'static [u8]> for UploadPayload {
    fn from(bytes: &'static [u8]) -> Self {
        UploadPayload::Bytes(Bytes::from_static(bytes))
    }
}

impl From<String> for UploadPayload {
    fn from(text: String) -> Self {
        UploadPayload::Text(text)
    }
}

impl From<&str> for UploadPayload {
    fn from(text: &str) -> Self {
        UploadPayload::Text(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> FileRecord {
        let now = Utc::now();
        FileRecord {
            id: FileId::new("f1").unwrap(),
            bucket: BucketName::new("docs").unwrap(),
            path: ObjectPath::new("reports/q1.pdf").unwrap(),
            name: "q1.pdf".to_string(),
            size: 3,
            mime_type: "application/pdf".to_string(),
            etag: compute_etag(b"abc"),
            cache_control: None,
            metadata: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_payload_length_matches_encoding() {
        assert_eq!(UploadPayload::from("héllo").len(), 6);
        assert_eq!(UploadPayload::from(vec![0u8; 4]).len(), 4);
        assert!(UploadPayload::from("").is_empty());
        assert_eq!(UploadPayload::from("abc").into_bytes(), Bytes::from_static(b"abc"));
    }

    #[test]
    fn test_relocate_keeps_identity() {
        let mut file = record();
        let created = file.created_at;
        let later = created + chrono::Duration::seconds(5);

        file.relocate(ObjectPath::new("archive/old.pdf").unwrap(), later);

        assert_eq!(file.id.as_str(), "f1");
        assert_eq!(file.name, "old.pdf");
        assert_eq!(file.created_at, created);
        assert_eq!(file.updated_at, later);
    }

    #[test]
    fn test_duplicate_is_a_new_object() {
        let file = record();
        let later = file.created_at + chrono::Duration::seconds(5);

        let copy = file.duplicate(FileId::new("f2").unwrap(), ObjectPath::new("b.pdf").unwrap(), later);

        assert_ne!(copy.id, file.id);
        assert_eq!(copy.etag, file.etag);
        assert_eq!(copy.created_at, later);
        assert_eq!(copy.name, "b.pdf");
    }

    #[test]
    fn test_etag_is_md5_hex() {
        assert_eq!(compute_etag(b""), "d41d8cd98f00b204e9800998ecf8427e");
    }
}
