use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::{
    errors::StorageResult,
    models::{
        Bucket, CreateBucketOptions, FileRecord, ListOptions, ListResult, PublicUrlOptions,
        SignedUploadUrl, SignedUploadUrlOptions, SignedUrlOptions, StorageCapabilities,
        UploadOptions,
    },
    value_objects::{BucketName, ObjectPath},
};

/// Port every storage backend implements.
///
/// Variants must report identical error kinds for identical precondition
/// violations; only messages may differ.
#[async_trait]
pub trait StorageAdapter: Send + Sync + 'static {
    /// Capabilities of this backend, fixed for the adapter's lifetime
    fn capabilities(&self) -> &StorageCapabilities;

    /// Create a bucket, failing with `BUCKET_EXISTS` if the name is taken
    async fn create_bucket(
        &self,
        name: &BucketName,
        options: &CreateBucketOptions,
    ) -> StorageResult<Bucket>;

    async fn get_bucket(&self, name: &BucketName) -> StorageResult<Option<Bucket>>;

    /// All buckets, ordered by name
    async fn list_buckets(&self) -> StorageResult<Vec<Bucket>>;

    /// Delete an empty bucket (`BUCKET_NOT_FOUND`, `BUCKET_NOT_EMPTY`)
    async fn delete_bucket(&self, name: &BucketName) -> StorageResult<()>;

    /// Store an object; `FILE_EXISTS` unless `options.upsert` is set
    async fn upload(
        &self,
        bucket: &BucketName,
        path: &ObjectPath,
        data: Bytes,
        options: &UploadOptions,
    ) -> StorageResult<FileRecord>;

    async fn download(&self, bucket: &BucketName, path: &ObjectPath) -> StorageResult<Bytes>;

    async fn get_file_info(
        &self,
        bucket: &BucketName,
        path: &ObjectPath,
    ) -> StorageResult<Option<FileRecord>>;

    async fn list(&self, bucket: &BucketName, options: &ListOptions) -> StorageResult<ListResult>;

    /// Delete every path or none of them (`FILE_NOT_FOUND` names the first missing path)
    async fn delete(&self, bucket: &BucketName, paths: &[ObjectPath]) -> StorageResult<()>;

    /// Move within a bucket, keeping the object's identity
    async fn move_file(
        &self,
        bucket: &BucketName,
        from: &ObjectPath,
        to: &ObjectPath,
    ) -> StorageResult<FileRecord>;

    /// Copy within a bucket, creating a new object
    async fn copy_file(
        &self,
        bucket: &BucketName,
        from: &ObjectPath,
        to: &ObjectPath,
    ) -> StorageResult<FileRecord>;

    /// Build a public URL; performs no I/O and cannot fail
    fn public_url(&self, bucket: &BucketName, path: &ObjectPath, options: &PublicUrlOptions)
        -> String;

    async fn signed_url(
        &self,
        bucket: &BucketName,
        path: &ObjectPath,
        options: &SignedUrlOptions,
    ) -> StorageResult<String>;

    /// Optional signed upload support; `None` when the backend lacks it
    fn signed_upload_urls(&self) -> Option<&dyn SignedUploadUrls> {
        None
    }
}

/// Optional port for pre-authorized uploads
#[async_trait]
pub trait SignedUploadUrls: Send + Sync {
    async fn create_signed_upload_url(
        &self,
        bucket: &BucketName,
        path: &ObjectPath,
        options: &SignedUploadUrlOptions,
    ) -> StorageResult<SignedUploadUrl>;
}
