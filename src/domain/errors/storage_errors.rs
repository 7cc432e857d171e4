use http::StatusCode;
use thiserror::Error;

use crate::domain::errors::ValidationError;

/// Backend operation wrapped by a `*_FAILED` error kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedOperation {
    Upload,
    Download,
    List,
    Delete,
    Move,
    Copy,
    SignedUrl,
    Bucket,
}

impl FailedOperation {
    pub fn code(&self) -> &'static str {
        match self {
            FailedOperation::Upload => "UPLOAD_FAILED",
            FailedOperation::Download => "DOWNLOAD_FAILED",
            FailedOperation::List => "LIST_FAILED",
            FailedOperation::Delete => "DELETE_FAILED",
            FailedOperation::Move => "MOVE_FAILED",
            FailedOperation::Copy => "COPY_FAILED",
            FailedOperation::SignedUrl => "SIGNED_URL_FAILED",
            FailedOperation::Bucket => "BUCKET_OPERATION_FAILED",
        }
    }
}

impl std::fmt::Display for FailedOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FailedOperation::Upload => "upload",
            FailedOperation::Download => "download",
            FailedOperation::List => "list",
            FailedOperation::Delete => "delete",
            FailedOperation::Move => "move",
            FailedOperation::Copy => "copy",
            FailedOperation::SignedUrl => "signed url",
            FailedOperation::Bucket => "bucket",
        };
        write!(f, "{}", name)
    }
}

/// Errors that can occur during storage operations.
///
/// Callers branch on [`StorageError::code`]; the message is for humans and
/// may differ between adapters for the same kind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    #[error("Bucket already exists: {bucket}")]
    BucketExists { bucket: String },

    #[error("Bucket not found: {bucket}")]
    BucketNotFound { bucket: String },

    #[error("Bucket '{bucket}' still contains {objects} object(s)")]
    BucketNotEmpty { bucket: String, objects: usize },

    #[error("File already exists: {bucket}/{path}")]
    FileExists { bucket: String, path: String },

    #[error("File not found: {bucket}/{path}")]
    FileNotFound { bucket: String, path: String },

    #[error("File too large: {size} bytes (max: {max})")]
    FileTooLarge { size: u64, max: u64 },

    #[error("MIME type not allowed: {mime_type}")]
    MimeTypeNotAllowed { mime_type: String },

    #[error("Public buckets are not supported by provider '{provider}'")]
    PublicBucketsNotSupported { provider: String },

    #[error("Private buckets are not supported by provider '{provider}'")]
    PrivateBucketsNotSupported { provider: String },

    #[error("Public URLs are not supported by provider '{provider}'")]
    PublicUrlsNotSupported { provider: String },

    #[error("Signed URLs are not supported by provider '{provider}'")]
    SignedUrlsNotSupported { provider: String },

    #[error("Image transformations are not supported by provider '{provider}'")]
    TransformationsNotSupported { provider: String },

    #[error("Signed upload URLs are not supported by provider '{provider}'")]
    SignedUploadUrlNotSupported { provider: String },

    #[error("Requested expiry of {requested}s exceeds the maximum of {max}s")]
    ExpiryTooLong { requested: u64, max: u64 },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Backend {operation} failed: {message}")]
    BackendFailed {
        operation: FailedOperation,
        message: String,
    },
}

impl StorageError {
    /// Stable machine-readable error kind
    pub fn code(&self) -> &'static str {
        match self {
            StorageError::BucketExists { .. } => "BUCKET_EXISTS",
            StorageError::BucketNotFound { .. } => "BUCKET_NOT_FOUND",
            StorageError::BucketNotEmpty { .. } => "BUCKET_NOT_EMPTY",
            StorageError::FileExists { .. } => "FILE_EXISTS",
            StorageError::FileNotFound { .. } => "FILE_NOT_FOUND",
            StorageError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            StorageError::MimeTypeNotAllowed { .. } => "MIME_TYPE_NOT_ALLOWED",
            StorageError::PublicBucketsNotSupported { .. } => "PUBLIC_BUCKETS_NOT_SUPPORTED",
            StorageError::PrivateBucketsNotSupported { .. } => "PRIVATE_BUCKETS_NOT_SUPPORTED",
            StorageError::PublicUrlsNotSupported { .. } => "PUBLIC_URLS_NOT_SUPPORTED",
            StorageError::SignedUrlsNotSupported { .. } => "SIGNED_URLS_NOT_SUPPORTED",
            StorageError::TransformationsNotSupported { .. } => "TRANSFORMATIONS_NOT_SUPPORTED",
            StorageError::SignedUploadUrlNotSupported { .. } => "SIGNED_UPLOAD_URL_NOT_SUPPORTED",
            StorageError::ExpiryTooLong { .. } => "EXPIRY_TOO_LONG",
            StorageError::InvalidRequest { .. } => "INVALID_REQUEST",
            StorageError::BackendFailed { operation, .. } => operation.code(),
        }
    }

    /// HTTP-style status class, also used as a severity hint outside HTTP
    pub fn status(&self) -> StatusCode {
        match self {
            StorageError::BucketNotFound { .. } | StorageError::FileNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            StorageError::BucketExists { .. }
            | StorageError::BucketNotEmpty { .. }
            | StorageError::FileExists { .. } => StatusCode::CONFLICT,
            StorageError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            StorageError::MimeTypeNotAllowed { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            StorageError::PublicBucketsNotSupported { .. }
            | StorageError::PrivateBucketsNotSupported { .. }
            | StorageError::PublicUrlsNotSupported { .. }
            | StorageError::SignedUrlsNotSupported { .. }
            | StorageError::TransformationsNotSupported { .. }
            | StorageError::SignedUploadUrlNotSupported { .. }
            | StorageError::ExpiryTooLong { .. }
            | StorageError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            StorageError::BackendFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn backend(operation: FailedOperation, message: impl Into<String>) -> Self {
        StorageError::BackendFailed {
            operation,
            message: message.into(),
        }
    }

    pub(crate) fn file_not_found(bucket: &str, path: &str) -> Self {
        StorageError::FileNotFound {
            bucket: bucket.to_string(),
            path: path.to_string(),
        }
    }

    pub(crate) fn file_exists(bucket: &str, path: &str) -> Self {
        StorageError::FileExists {
            bucket: bucket.to_string(),
            path: path.to_string(),
        }
    }

    pub(crate) fn bucket_not_found(bucket: &str) -> Self {
        StorageError::BucketNotFound {
            bucket: bucket.to_string(),
        }
    }
}

impl From<ValidationError> for StorageError {
    fn from(err: ValidationError) -> Self {
        StorageError::InvalidRequest {
            message: err.to_string(),
        }
    }
}

impl From<StorageError> for StatusCode {
    fn from(err: StorageError) -> Self {
        err.status()
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_statuses() {
        let err = StorageError::file_not_found("docs", "a.txt");
        assert_eq!(err.code(), "FILE_NOT_FOUND");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = StorageError::BucketNotEmpty {
            bucket: "docs".to_string(),
            objects: 2,
        };
        assert_eq!(err.code(), "BUCKET_NOT_EMPTY");
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err = StorageError::FileTooLarge { size: 101, max: 100 };
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let err = StorageError::MimeTypeNotAllowed {
            mime_type: "text/html".to_string(),
        };
        assert_eq!(err.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn test_backend_failures_carry_operation_code() {
        let err = StorageError::backend(FailedOperation::Copy, "disk on fire");
        assert_eq!(err.code(), "COPY_FAILED");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Backend copy failed: disk on fire");
    }

    #[test]
    fn test_validation_errors_become_invalid_request() {
        let err: StorageError = ValidationError::EmptyObjectPath.into();
        assert_eq!(err.code(), "INVALID_REQUEST");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
