use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    domain::{
        errors::{FailedOperation, StorageError, StorageResult},
        models::{
            Bucket, CreateBucketOptions, Feature, FileRecord, ListOptions, ListResult,
            PublicUrlOptions, SignedUploadUrl, SignedUploadUrlOptions, SignedUrlOptions,
            StorageCapabilities, UploadOptions, UploadPayload,
        },
        value_objects::{BucketName, ObjectPath},
    },
    ports::{
        services::{DeleteTarget, StorageService},
        storage::StorageAdapter,
    },
};

/// Storage service gating every request on the active backend's capabilities
#[derive(Clone)]
pub struct StorageServiceImpl {
    adapter: Arc<dyn StorageAdapter>,
}

impl StorageServiceImpl {
    pub fn new(adapter: Arc<dyn StorageAdapter>) -> Self {
        Self { adapter }
    }

    /// The backend this service delegates to
    pub fn adapter(&self) -> &Arc<dyn StorageAdapter> {
        &self.adapter
    }

    fn provider(&self) -> String {
        self.adapter.capabilities().provider.clone()
    }

    fn reject(&self, operation: &'static str, error: StorageError) -> StorageError {
        warn!(
            operation,
            provider = %self.adapter.capabilities().provider,
            code = error.code(),
            "rejected by capability check"
        );
        error
    }

    /// Rejects a zero lifetime and one above `max` when a maximum is known
    fn check_expiry(
        &self,
        operation: &'static str,
        expires_in: u64,
        max: Option<u64>,
    ) -> StorageResult<()> {
        if expires_in == 0 {
            return Err(self.reject(
                operation,
                StorageError::InvalidRequest {
                    message: "expiresIn must be at least one second".to_string(),
                },
            ));
        }

        match max {
            Some(max) if expires_in > max => Err(self.reject(
                operation,
                StorageError::ExpiryTooLong {
                    requested: expires_in,
                    max,
                },
            )),
            _ => Ok(()),
        }
    }

    fn check_transform(&self, operation: &'static str, requested: bool) -> StorageResult<()> {
        if requested && !self.adapter.capabilities().files.transformations {
            return Err(self.reject(
                operation,
                StorageError::TransformationsNotSupported {
                    provider: self.provider(),
                },
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageService for StorageServiceImpl {
    fn capabilities(&self) -> &StorageCapabilities {
        self.adapter.capabilities()
    }

    fn has_feature(&self, feature: Feature) -> bool {
        self.adapter.capabilities().has_feature(feature)
    }

    fn is_mime_type_allowed(&self, mime_type: &str) -> bool {
        self.adapter
            .capabilities()
            .files
            .allowed_mime_types
            .allows(mime_type)
    }

    async fn create_bucket(
        &self,
        name: &BucketName,
        options: CreateBucketOptions,
    ) -> StorageResult<Bucket> {
        let buckets = &self.adapter.capabilities().buckets;

        if options.public && !buckets.public {
            return Err(self.reject(
                "create_bucket",
                StorageError::PublicBucketsNotSupported {
                    provider: self.provider(),
                },
            ));
        }
        if !options.public && !buckets.private {
            return Err(self.reject(
                "create_bucket",
                StorageError::PrivateBucketsNotSupported {
                    provider: self.provider(),
                },
            ));
        }

        debug!(bucket = %name, public = options.public, "creating bucket");
        self.adapter.create_bucket(name, &options).await
    }

    async fn get_bucket(&self, name: &BucketName) -> StorageResult<Option<Bucket>> {
        self.adapter.get_bucket(name).await
    }

    async fn list_buckets(&self) -> StorageResult<Vec<Bucket>> {
        self.adapter.list_buckets().await
    }

    async fn delete_bucket(&self, name: &BucketName) -> StorageResult<()> {
        debug!(bucket = %name, "deleting bucket");
        self.adapter.delete_bucket(name).await
    }

    async fn upload(
        &self,
        bucket: &BucketName,
        path: &ObjectPath,
        payload: UploadPayload,
        options: UploadOptions,
    ) -> StorageResult<FileRecord> {
        let files = &self.adapter.capabilities().files;

        let size = payload.len();
        if size > files.max_size_bytes {
            return Err(self.reject(
                "upload",
                StorageError::FileTooLarge {
                    size,
                    max: files.max_size_bytes,
                },
            ));
        }

        if let Some(content_type) = options.content_type.as_deref() {
            if !files.allowed_mime_types.allows(content_type) {
                return Err(self.reject(
                    "upload",
                    StorageError::MimeTypeNotAllowed {
                        mime_type: content_type.to_string(),
                    },
                ));
            }
        }

        debug!(bucket = %bucket, path = %path, size, "uploading object");
        self.adapter
            .upload(bucket, path, payload.into_bytes(), &options)
            .await
    }

    async fn download(&self, bucket: &BucketName, path: &ObjectPath) -> StorageResult<Bytes> {
        self.adapter.download(bucket, path).await
    }

    async fn get_file_info(
        &self,
        bucket: &BucketName,
        path: &ObjectPath,
    ) -> StorageResult<Option<FileRecord>> {
        self.adapter.get_file_info(bucket, path).await
    }

    async fn list(&self, bucket: &BucketName, options: ListOptions) -> StorageResult<ListResult> {
        self.adapter.list(bucket, &options).await
    }

    async fn delete(&self, bucket: &BucketName, target: DeleteTarget) -> StorageResult<()> {
        let paths = target.into_paths();
        debug!(bucket = %bucket, count = paths.len(), "deleting objects");
        self.adapter.delete(bucket, &paths).await
    }

    async fn move_file(
        &self,
        bucket: &BucketName,
        from: &ObjectPath,
        to: &ObjectPath,
    ) -> StorageResult<FileRecord> {
        debug!(bucket = %bucket, from = %from, to = %to, "moving object");
        self.adapter.move_file(bucket, from, to).await
    }

    async fn copy_file(
        &self,
        bucket: &BucketName,
        from: &ObjectPath,
        to: &ObjectPath,
    ) -> StorageResult<FileRecord> {
        debug!(bucket = %bucket, from = %from, to = %to, "copying object");
        self.adapter.copy_file(bucket, from, to).await
    }

    fn public_url(
        &self,
        bucket: &BucketName,
        path: &ObjectPath,
        options: PublicUrlOptions,
    ) -> StorageResult<String> {
        if !self.adapter.capabilities().files.public_urls {
            return Err(self.reject(
                "public_url",
                StorageError::PublicUrlsNotSupported {
                    provider: self.provider(),
                },
            ));
        }
        self.check_transform("public_url", options.requested_transform().is_some())?;

        Ok(self.adapter.public_url(bucket, path, &options))
    }

    async fn signed_url(
        &self,
        bucket: &BucketName,
        path: &ObjectPath,
        options: SignedUrlOptions,
    ) -> StorageResult<String> {
        let files = &self.adapter.capabilities().files;

        if !files.signed_urls {
            return Err(self.reject(
                "signed_url",
                StorageError::SignedUrlsNotSupported {
                    provider: self.provider(),
                },
            ));
        }

        self.check_expiry("signed_url", options.expires_in, files.signed_url_max_age)?;
        if files.signed_url_max_age.is_none() {
            return Err(StorageError::backend(
                FailedOperation::SignedUrl,
                "signed URLs advertised without a maximum age",
            ));
        }

        self.check_transform("signed_url", options.requested_transform().is_some())?;

        debug!(bucket = %bucket, path = %path, expires_in = options.expires_in, "signing URL");
        self.adapter.signed_url(bucket, path, &options).await
    }

    async fn create_signed_upload_url(
        &self,
        bucket: &BucketName,
        path: &ObjectPath,
        options: SignedUploadUrlOptions,
    ) -> StorageResult<SignedUploadUrl> {
        let uploads = self.adapter.signed_upload_urls().ok_or_else(|| {
            self.reject(
                "create_signed_upload_url",
                StorageError::SignedUploadUrlNotSupported {
                    provider: self.provider(),
                },
            )
        })?;

        self.check_expiry(
            "create_signed_upload_url",
            options.expires_in,
            self.adapter.capabilities().files.signed_url_max_age,
        )?;

        debug!(bucket = %bucket, path = %path, expires_in = options.expires_in, "creating signed upload URL");
        uploads
            .create_signed_upload_url(bucket, path, &options)
            .await
    }
}
