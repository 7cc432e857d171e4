use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    errors::{StorageError, StorageResult},
    models::capabilities::MimeTypePolicy,
    value_objects::BucketName,
};

/// A named, isolated namespace for objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub name: BucketName,
    pub public: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_mime_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size_limit: Option<u64>,
}

impl Bucket {
    pub fn new(name: BucketName, options: &CreateBucketOptions, created_at: DateTime<Utc>) -> Self {
        Self {
            name,
            public: options.public,
            created_at,
            allowed_mime_types: options.allowed_mime_types.clone(),
            file_size_limit: options.file_size_limit,
        }
    }

    /// Enforce the bucket-level overrides for an upload of `size` bytes
    pub fn check_upload(&self, size: u64, content_type: Option<&str>) -> StorageResult<()> {
        if let Some(max) = self.file_size_limit {
            if size > max {
                return Err(StorageError::FileTooLarge { size, max });
            }
        }

        if let (Some(allowed), Some(content_type)) = (&self.allowed_mime_types, content_type) {
            if !MimeTypePolicy::only(allowed).allows(content_type) {
                return Err(StorageError::MimeTypeNotAllowed {
                    mime_type: content_type.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Options accepted by `create_bucket`; buckets are private by default
#[derive(Debug, Clone, Default, PartialEq, Deserialize, bon::Builder)]
#[serde(rename_all = "camelCase")]
pub struct CreateBucketOptions {
    #[serde(default)]
    #[builder(default)]
    pub public: bool,
    #[serde(default)]
    pub allowed_mime_types: Option<Vec<String>>,
    #[serde(default)]
    pub file_size_limit: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(options: CreateBucketOptions) -> Bucket {
        Bucket::new(BucketName::new("media").unwrap(), &options, Utc::now())
    }

    #[test]
    fn test_defaults_to_private() {
        assert!(!bucket(CreateBucketOptions::default()).public);
        assert!(bucket(CreateBucketOptions::builder().public(true).build()).public);
    }

    #[test]
    fn test_bucket_level_limits() {
        let bucket = bucket(
            CreateBucketOptions::builder()
                .file_size_limit(10)
                .allowed_mime_types(vec!["image/*".to_string()])
                .build(),
        );

        assert!(bucket.check_upload(10, Some("image/png")).is_ok());
        assert!(bucket.check_upload(10, None).is_ok());
        assert_eq!(
            bucket.check_upload(11, Some("image/png")).unwrap_err().code(),
            "FILE_TOO_LARGE"
        );
        assert_eq!(
            bucket.check_upload(1, Some("text/plain")).unwrap_err().code(),
            "MIME_TYPE_NOT_ALLOWED"
        );
    }
}
