use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::{
    errors::StorageResult,
    models::{
        Bucket, CreateBucketOptions, Feature, FileRecord, ListOptions, ListResult,
        PublicUrlOptions, SignedUploadUrl, SignedUploadUrlOptions, SignedUrlOptions,
        StorageCapabilities, UploadOptions, UploadPayload,
    },
    value_objects::{BucketName, ObjectPath},
};

/// Paths passed to `delete`: one path or many
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Single(ObjectPath),
    Many(Vec<ObjectPath>),
}

impl DeleteTarget {
    pub fn into_paths(self) -> Vec<ObjectPath> {
        match self {
            DeleteTarget::Single(path) => vec![path],
            DeleteTarget::Many(paths) => paths,
        }
    }
}

impl From<ObjectPath> for DeleteTarget {
    fn from(path: ObjectPath) -> Self {
        DeleteTarget::Single(path)
    }
}

impl From<Vec<ObjectPath>> for DeleteTarget {
    fn from(paths: Vec<ObjectPath>) -> Self {
        DeleteTarget::Many(paths)
    }
}

/// Port for the storage service: the single entry point callers use.
///
/// Implementations reject requests the active backend cannot satisfy before
/// touching it and otherwise forward unchanged.
#[async_trait]
pub trait StorageService: Send + Sync + 'static {
    fn capabilities(&self) -> &StorageCapabilities;

    fn has_feature(&self, feature: Feature) -> bool;

    fn is_mime_type_allowed(&self, mime_type: &str) -> bool;

    async fn create_bucket(
        &self,
        name: &BucketName,
        options: CreateBucketOptions,
    ) -> StorageResult<Bucket>;

    async fn get_bucket(&self, name: &BucketName) -> StorageResult<Option<Bucket>>;

    async fn list_buckets(&self) -> StorageResult<Vec<Bucket>>;

    async fn delete_bucket(&self, name: &BucketName) -> StorageResult<()>;

    async fn upload(
        &self,
        bucket: &BucketName,
        path: &ObjectPath,
        payload: UploadPayload,
        options: UploadOptions,
    ) -> StorageResult<FileRecord>;

    async fn download(&self, bucket: &BucketName, path: &ObjectPath) -> StorageResult<Bytes>;

    async fn get_file_info(
        &self,
        bucket: &BucketName,
        path: &ObjectPath,
    ) -> StorageResult<Option<FileRecord>>;

    async fn list(&self, bucket: &BucketName, options: ListOptions) -> StorageResult<ListResult>;

    async fn delete(&self, bucket: &BucketName, target: DeleteTarget) -> StorageResult<()>;

    async fn move_file(
        &self,
        bucket: &BucketName,
        from: &ObjectPath,
        to: &ObjectPath,
    ) -> StorageResult<FileRecord>;

    async fn copy_file(
        &self,
        bucket: &BucketName,
        from: &ObjectPath,
        to: &ObjectPath,
    ) -> StorageResult<FileRecord>;

    fn public_url(
        &self,
        bucket: &BucketName,
        path: &ObjectPath,
        options: PublicUrlOptions,
    ) -> StorageResult<String>;

    async fn signed_url(
        &self,
        bucket: &BucketName,
        path: &ObjectPath,
        options: SignedUrlOptions,
    ) -> StorageResult<String>;

    async fn create_signed_upload_url(
        &self,
        bucket: &BucketName,
        path: &ObjectPath,
        options: SignedUploadUrlOptions,
    ) -> StorageResult<SignedUploadUrl>;
}
