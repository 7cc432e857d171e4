use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::domain::errors::ValidationError;

/// Declarative description of what a storage backend supports.
///
/// Capabilities are fixed for the lifetime of an adapter. The service treats
/// them as ground truth for what it may forward.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageCapabilities {
    pub provider: String,
    pub version: String,
    pub buckets: BucketCapabilities,
    pub files: FileCapabilities,
    pub features: FeatureFlags,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketCapabilities {
    pub public: bool,
    pub private: bool,
    /// Advisory ceiling on the number of buckets, `None` when unbounded
    pub max_buckets: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileCapabilities {
    pub max_size_bytes: u64,
    pub allowed_mime_types: MimeTypePolicy,
    pub signed_urls: bool,
    /// Longest signed URL lifetime in seconds
    pub signed_url_max_age: Option<u64>,
    pub public_urls: bool,
    pub transformations: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlags {
    pub folders: bool,
    pub metadata: bool,
    pub versioning: bool,
    pub resumable_upload: bool,
    pub multipart_upload: bool,
}

/// Named optional feature a backend may advertise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    Folders,
    Metadata,
    Versioning,
    ResumableUpload,
    MultipartUpload,
}

impl FromStr for Feature {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "folders" => Ok(Feature::Folders),
            "metadata" => Ok(Feature::Metadata),
            "versioning" => Ok(Feature::Versioning),
            "resumableUpload" | "resumable_upload" => Ok(Feature::ResumableUpload),
            "multipartUpload" | "multipart_upload" => Ok(Feature::MultipartUpload),
            other => Err(ValidationError::InvalidField {
                field: "feature".to_string(),
                value: other.to_string(),
                expected: "folders, metadata, versioning, resumableUpload or multipartUpload"
                    .to_string(),
            }),
        }
    }
}

impl FeatureFlags {
    pub fn has(&self, feature: Feature) -> bool {
        match feature {
            Feature::Folders => self.folders,
            Feature::Metadata => self.metadata,
            Feature::Versioning => self.versioning,
            Feature::ResumableUpload => self.resumable_upload,
            Feature::MultipartUpload => self.multipart_upload,
        }
    }
}

/// Which content types a backend (or bucket) accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MimeTypePolicy {
    Unrestricted,
    /// Lowercased media types; `type/*` admits every subtype
    Only(BTreeSet<String>),
}

impl MimeTypePolicy {
    pub fn only<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        MimeTypePolicy::Only(
            types
                .into_iter()
                .map(|t| t.as_ref().trim().to_ascii_lowercase())
                .collect(),
        )
    }

    /// Check a content type against the policy.
    ///
    /// Parameters such as `; charset=utf-8` are ignored.
    pub fn allows(&self, content_type: &str) -> bool {
        let allowed = match self {
            MimeTypePolicy::Unrestricted => return true,
            MimeTypePolicy::Only(allowed) => allowed,
        };

        let essence = mime_essence(content_type);
        if allowed.contains("*/*") || allowed.contains(&essence) {
            return true;
        }

        match essence.split_once('/') {
            Some((top, _)) => allowed.contains(&format!("{}/*", top)),
            None => false,
        }
    }
}

impl Serialize for MimeTypePolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MimeTypePolicy::Unrestricted => serializer.serialize_str("*"),
            MimeTypePolicy::Only(types) => types.serialize(serializer),
        }
    }
}

/// Lowercased `type/subtype` without parameters
pub fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

impl StorageCapabilities {
    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.has(feature)
    }

    /// Check that the capability set is internally consistent
    pub fn validate(&self) -> Result<(), ValidationError> {
        match (self.files.signed_urls, self.files.signed_url_max_age) {
            (true, None) | (true, Some(0)) => Err(ValidationError::InvalidField {
                field: "files.signedUrlMaxAge".to_string(),
                value: format!("{:?}", self.files.signed_url_max_age),
                expected: "a positive number of seconds when signed URLs are supported"
                    .to_string(),
            }),
            (false, Some(age)) => Err(ValidationError::InvalidField {
                field: "files.signedUrlMaxAge".to_string(),
                value: age.to_string(),
                expected: "no maximum age when signed URLs are unsupported".to_string(),
            }),
            _ if !self.buckets.public && !self.buckets.private => {
                Err(ValidationError::InvalidField {
                    field: "buckets".to_string(),
                    value: "public=false, private=false".to_string(),
                    expected: "at least one supported bucket visibility".to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capabilities() -> StorageCapabilities {
        StorageCapabilities {
            provider: "test".to_string(),
            version: "1".to_string(),
            buckets: BucketCapabilities {
                public: true,
                private: true,
                max_buckets: None,
            },
            files: FileCapabilities {
                max_size_bytes: 1024,
                allowed_mime_types: MimeTypePolicy::Unrestricted,
                signed_urls: true,
                signed_url_max_age: Some(3600),
                public_urls: true,
                transformations: false,
            },
            features: FeatureFlags {
                folders: true,
                ..FeatureFlags::default()
            },
        }
    }

    #[test]
    fn test_mime_policy_matching() {
        let policy = MimeTypePolicy::only(["image/*", "Text/Plain"]);
        assert!(policy.allows("image/png"));
        assert!(policy.allows("text/plain; charset=utf-8"));
        assert!(policy.allows("TEXT/PLAIN"));
        assert!(!policy.allows("text/html"));
        assert!(!policy.allows("application/json"));
        assert!(MimeTypePolicy::Unrestricted.allows("anything/at-all"));
        assert!(MimeTypePolicy::only(["*/*"]).allows("video/mp4"));
    }

    #[test]
    fn test_feature_lookup() {
        let caps = capabilities();
        assert!(caps.has_feature(Feature::Folders));
        assert!(!caps.has_feature(Feature::Versioning));
        assert_eq!("resumableUpload".parse::<Feature>(), Ok(Feature::ResumableUpload));
        assert!("teleport".parse::<Feature>().is_err());
    }

    #[test]
    fn test_consistency_validation() {
        assert!(capabilities().validate().is_ok());

        let mut caps = capabilities();
        caps.files.signed_url_max_age = None;
        assert!(caps.validate().is_err());

        let mut caps = capabilities();
        caps.files.signed_urls = false;
        assert!(caps.validate().is_err());
        caps.files.signed_url_max_age = None;
        assert!(caps.validate().is_ok());

        let mut caps = capabilities();
        caps.buckets.public = false;
        caps.buckets.private = false;
        assert!(caps.validate().is_err());
    }

    #[test]
    fn test_policy_serialization() {
        assert_eq!(
            serde_json::to_value(MimeTypePolicy::Unrestricted).unwrap(),
            serde_json::json!("*")
        );
        assert_eq!(
            serde_json::to_value(MimeTypePolicy::only(["image/png", "image/jpeg"])).unwrap(),
            serde_json::json!(["image/jpeg", "image/png"])
        );
    }
}
