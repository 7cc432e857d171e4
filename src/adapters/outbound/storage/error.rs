use thiserror::Error as ThisError;

use crate::domain::errors::{FailedOperation, StorageError};

/// Failures of the infrastructure underneath the object-store adapter
#[derive(ThisError, Debug)]
pub enum StoreError {
    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Wrap as the `*_FAILED` kind of the operation that hit it
    pub fn during(self, operation: FailedOperation) -> StorageError {
        StorageError::backend(operation, self.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::ObjectStore(object_store::Error::NotFound { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_with_operation_kind() {
        let err = StoreError::ObjectStore(object_store::Error::NotFound {
            path: "blobs/x".to_string(),
            source: "gone".into(),
        });
        assert!(err.is_not_found());

        let storage_err = err.during(FailedOperation::Download);
        assert_eq!(storage_err.code(), "DOWNLOAD_FAILED");
    }

    #[test]
    fn test_serialization_errors_are_not_not_found() {
        let err: StoreError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(!err.is_not_found());
        assert_eq!(err.during(FailedOperation::List).code(), "LIST_FAILED");
    }
}
