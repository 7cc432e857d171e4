use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::{
    adapters::outbound::{
        runtime::{SystemClock, UuidIdGenerator},
        storage::urls::{expiry_after, UrlBuilder},
    },
    domain::{
        errors::{StorageError, StorageResult, ValidationError},
        models::{
            file::compute_etag, listing::paginate, Bucket, BucketCapabilities,
            CreateBucketOptions, FeatureFlags, FileCapabilities, FileRecord, ListOptions,
            ListResult, MimeTypePolicy, PublicUrlOptions, SignedUploadUrl,
            SignedUploadUrlOptions, SignedUrlOptions, StorageCapabilities, UploadOptions,
            DEFAULT_MIME_TYPE,
        },
        value_objects::{BucketName, ObjectPath},
    },
    ports::{
        runtime::{Clock, IdGenerator},
        storage::{SignedUploadUrls, StorageAdapter},
    },
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Capabilities advertised by the in-memory adapter unless overridden
pub fn in_memory_capabilities() -> StorageCapabilities {
    StorageCapabilities {
        provider: "memory".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        buckets: BucketCapabilities {
            public: true,
            private: true,
            max_buckets: None,
        },
        files: FileCapabilities {
            max_size_bytes: 50 * 1024 * 1024,
            allowed_mime_types: MimeTypePolicy::Unrestricted,
            signed_urls: true,
            signed_url_max_age: Some(7 * 24 * 60 * 60),
            public_urls: true,
            transformations: true,
        },
        features: FeatureFlags {
            folders: true,
            metadata: true,
            versioning: false,
            resumable_upload: false,
            multipart_upload: false,
        },
    }
}

/// Reference storage adapter keeping buckets and objects in process memory.
///
/// Every mutation holds the write lock across its existence checks and the
/// write itself, so conflict rules hold under concurrent callers.
#[derive(Clone)]
pub struct InMemoryStorageAdapter {
    state: Arc<RwLock<AdapterState>>,
    capabilities: StorageCapabilities,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    urls: UrlBuilder,
}

#[derive(Default)]
struct AdapterState {
    buckets: BTreeMap<BucketName, Bucket>,
    // "{bucket}/{path}" -> stored object; ordered so prefix scans are ranges
    files: BTreeMap<String, StoredFile>,
}

struct StoredFile {
    data: Bytes,
    record: FileRecord,
}

fn object_key(bucket: &BucketName, path: &str) -> String {
    format!("{}/{}", bucket.as_str(), path)
}

impl AdapterState {
    fn files_with_prefix<'a>(
        &'a self,
        key_prefix: &'a str,
    ) -> impl Iterator<Item = &'a StoredFile> + 'a {
        self.files
            .range(key_prefix.to_string()..)
            .take_while(move |(key, _)| key.starts_with(key_prefix))
            .map(|(_, file)| file)
    }
}

impl InMemoryStorageAdapter {
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            state: Arc::new(RwLock::new(AdapterState::default())),
            capabilities: in_memory_capabilities(),
            clock,
            ids,
            urls: UrlBuilder::new(DEFAULT_BASE_URL),
        }
    }

    /// Replace the advertised capabilities; inconsistent sets are rejected
    pub fn with_capabilities(
        mut self,
        capabilities: StorageCapabilities,
    ) -> Result<Self, ValidationError> {
        capabilities.validate()?;
        self.capabilities = capabilities;
        Ok(self)
    }

    /// Base URL used for public and signed URLs
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.urls = UrlBuilder::new(base_url);
        self
    }
}

impl Default for InMemoryStorageAdapter {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(UuidIdGenerator))
    }
}

#[async_trait]
impl StorageAdapter for InMemoryStorageAdapter {
    fn capabilities(&self) -> &StorageCapabilities {
        &self.capabilities
    }

    async fn create_bucket(
        &self,
        name: &BucketName,
        options: &CreateBucketOptions,
    ) -> StorageResult<Bucket> {
        let mut state = self.state.write().await;

        if state.buckets.contains_key(name) {
            return Err(StorageError::BucketExists {
                bucket: name.to_string(),
            });
        }

        let bucket = Bucket::new(name.clone(), options, self.clock.now());
        state.buckets.insert(name.clone(), bucket.clone());

        info!(bucket = %name, public = bucket.public, "created bucket");
        Ok(bucket)
    }

    async fn get_bucket(&self, name: &BucketName) -> StorageResult<Option<Bucket>> {
        let state = self.state.read().await;
        Ok(state.buckets.get(name).cloned())
    }

    async fn list_buckets(&self) -> StorageResult<Vec<Bucket>> {
        let state = self.state.read().await;
        Ok(state.buckets.values().cloned().collect())
    }

    async fn delete_bucket(&self, name: &BucketName) -> StorageResult<()> {
        let mut state = self.state.write().await;

        if !state.buckets.contains_key(name) {
            return Err(StorageError::bucket_not_found(name.as_str()));
        }

        let key_prefix = object_key(name, "");
        let objects = state.files_with_prefix(&key_prefix).count();
        if objects > 0 {
            return Err(StorageError::BucketNotEmpty {
                bucket: name.to_string(),
                objects,
            });
        }

        state.buckets.remove(name);

        info!(bucket = %name, "deleted bucket");
        Ok(())
    }

    async fn upload(
        &self,
        bucket: &BucketName,
        path: &ObjectPath,
        data: Bytes,
        options: &UploadOptions,
    ) -> StorageResult<FileRecord> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let bucket_info = state
            .buckets
            .get(bucket)
            .ok_or_else(|| StorageError::bucket_not_found(bucket.as_str()))?;
        bucket_info.check_upload(data.len() as u64, options.content_type.as_deref())?;

        let key = object_key(bucket, path.as_str());
        let now = self.clock.now();

        let (id, created_at) = match state.files.get(&key) {
            Some(_) if !options.upsert => {
                return Err(StorageError::file_exists(bucket.as_str(), path.as_str()));
            }
            Some(existing) => (existing.record.id.clone(), existing.record.created_at),
            None => (self.ids.file_id(), now),
        };

        let record = FileRecord {
            id,
            bucket: bucket.clone(),
            path: path.clone(),
            name: path.file_name().to_string(),
            size: data.len() as u64,
            mime_type: options
                .content_type
                .clone()
                .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
            etag: compute_etag(&data),
            cache_control: options.cache_control.clone(),
            metadata: options.metadata.clone(),
            created_at,
            updated_at: now,
        };

        state.files.insert(
            key,
            StoredFile {
                data,
                record: record.clone(),
            },
        );

        info!(bucket = %bucket, path = %path, size = record.size, "stored object");
        Ok(record)
    }

    async fn download(&self, bucket: &BucketName, path: &ObjectPath) -> StorageResult<Bytes> {
        let state = self.state.read().await;

        state
            .files
            .get(&object_key(bucket, path.as_str()))
            .map(|file| file.data.clone())
            .ok_or_else(|| StorageError::file_not_found(bucket.as_str(), path.as_str()))
    }

    async fn get_file_info(
        &self,
        bucket: &BucketName,
        path: &ObjectPath,
    ) -> StorageResult<Option<FileRecord>> {
        let state = self.state.read().await;

        Ok(state
            .files
            .get(&object_key(bucket, path.as_str()))
            .map(|file| file.record.clone()))
    }

    async fn list(&self, bucket: &BucketName, options: &ListOptions) -> StorageResult<ListResult> {
        let state = self.state.read().await;

        if !state.buckets.contains_key(bucket) {
            return Err(StorageError::bucket_not_found(bucket.as_str()));
        }

        let key_prefix = object_key(bucket, options.prefix());
        let matched = state
            .files_with_prefix(&key_prefix)
            .map(|file| file.record.clone())
            .collect();

        let result = paginate(matched, options);
        debug!(bucket = %bucket, prefix = options.prefix(), returned = result.files.len(), has_more = result.has_more, "listed objects");
        Ok(result)
    }

    async fn delete(&self, bucket: &BucketName, paths: &[ObjectPath]) -> StorageResult<()> {
        let mut state = self.state.write().await;

        let keys: Vec<String> = paths
            .iter()
            .map(|path| object_key(bucket, path.as_str()))
            .collect();

        // Nothing is removed unless every path exists
        if let Some(missing) = paths
            .iter()
            .zip(&keys)
            .find(|(_, key)| !state.files.contains_key(*key))
            .map(|(path, _)| path)
        {
            return Err(StorageError::file_not_found(bucket.as_str(), missing.as_str()));
        }

        for key in &keys {
            state.files.remove(key);
        }

        info!(bucket = %bucket, count = paths.len(), "deleted objects");
        Ok(())
    }

    async fn move_file(
        &self,
        bucket: &BucketName,
        from: &ObjectPath,
        to: &ObjectPath,
    ) -> StorageResult<FileRecord> {
        let mut state = self.state.write().await;

        let from_key = object_key(bucket, from.as_str());
        let to_key = object_key(bucket, to.as_str());

        if !state.files.contains_key(&from_key) {
            return Err(StorageError::file_not_found(bucket.as_str(), from.as_str()));
        }
        if state.files.contains_key(&to_key) {
            return Err(StorageError::file_exists(bucket.as_str(), to.as_str()));
        }

        let mut file = state
            .files
            .remove(&from_key)
            .ok_or_else(|| StorageError::file_not_found(bucket.as_str(), from.as_str()))?;
        file.record.relocate(to.clone(), self.clock.now());

        let record = file.record.clone();
        state.files.insert(to_key, file);

        info!(bucket = %bucket, from = %from, to = %to, "moved object");
        Ok(record)
    }

    async fn copy_file(
        &self,
        bucket: &BucketName,
        from: &ObjectPath,
        to: &ObjectPath,
    ) -> StorageResult<FileRecord> {
        let mut state = self.state.write().await;

        let to_key = object_key(bucket, to.as_str());
        let source = state
            .files
            .get(&object_key(bucket, from.as_str()))
            .ok_or_else(|| StorageError::file_not_found(bucket.as_str(), from.as_str()))?;
        if state.files.contains_key(&to_key) {
            return Err(StorageError::file_exists(bucket.as_str(), to.as_str()));
        }

        let record = source
            .record
            .duplicate(self.ids.file_id(), to.clone(), self.clock.now());
        let data = source.data.clone();

        state.files.insert(
            to_key,
            StoredFile {
                data,
                record: record.clone(),
            },
        );

        info!(bucket = %bucket, from = %from, to = %to, "copied object");
        Ok(record)
    }

    fn public_url(
        &self,
        bucket: &BucketName,
        path: &ObjectPath,
        options: &PublicUrlOptions,
    ) -> String {
        self.urls
            .public_url(bucket, path, options.requested_transform())
    }

    async fn signed_url(
        &self,
        bucket: &BucketName,
        path: &ObjectPath,
        options: &SignedUrlOptions,
    ) -> StorageResult<String> {
        let state = self.state.read().await;

        if !state.files.contains_key(&object_key(bucket, path.as_str())) {
            return Err(StorageError::file_not_found(bucket.as_str(), path.as_str()));
        }

        // Expiry is encoded in the URL only; nothing here enforces it
        let expires_at = expiry_after(self.clock.now(), options.expires_in)?;

        Ok(self.urls.signed_url(
            bucket,
            path,
            &self.ids.token(),
            expires_at,
            options.download.as_ref(),
            options.requested_transform(),
        ))
    }

    fn signed_upload_urls(&self) -> Option<&dyn SignedUploadUrls> {
        Some(self)
    }
}

#[async_trait]
impl SignedUploadUrls for InMemoryStorageAdapter {
    async fn create_signed_upload_url(
        &self,
        bucket: &BucketName,
        path: &ObjectPath,
        options: &SignedUploadUrlOptions,
    ) -> StorageResult<SignedUploadUrl> {
        let state = self.state.read().await;

        if !state.buckets.contains_key(bucket) {
            return Err(StorageError::bucket_not_found(bucket.as_str()));
        }

        let expires_at = expiry_after(self.clock.now(), options.expires_in)?;
        let token = self.ids.token();
        Ok(SignedUploadUrl {
            url: self.urls.signed_upload_url(bucket, path, &token, expires_at),
            token,
            path: path.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::runtime::{SequentialIdGenerator, SteppingClock};
    use crate::domain::models::{SortBy, SortColumn, SortOrder};

    fn adapter() -> InMemoryStorageAdapter {
        InMemoryStorageAdapter::new(
            Arc::new(SteppingClock::starting_at_epoch_2024()),
            Arc::new(SequentialIdGenerator::new()),
        )
    }

    fn bucket(name: &str) -> BucketName {
        BucketName::new(name).unwrap()
    }

    fn path(value: &str) -> ObjectPath {
        ObjectPath::new(value).unwrap()
    }

    async fn put(adapter: &InMemoryStorageAdapter, bucket_name: &str, file: &str) -> FileRecord {
        adapter
            .upload(
                &bucket(bucket_name),
                &path(file),
                Bytes::from(format!("content of {}", file)),
                &UploadOptions::default(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_prefix_does_not_leak_across_buckets() {
        let adapter = adapter();
        let options = CreateBucketOptions::default();
        adapter.create_bucket(&bucket("photos"), &options).await.unwrap();
        adapter.create_bucket(&bucket("photos-archive"), &options).await.unwrap();

        put(&adapter, "photos", "a.png").await;
        put(&adapter, "photos-archive", "b.png").await;

        let listed = adapter
            .list(&bucket("photos"), &ListOptions::default())
            .await
            .unwrap();
        assert_eq!(listed.files.len(), 1);
        assert_eq!(listed.files[0].name, "a.png");

        // "photos-archive" starts with "photos" but holds no "photos/" keys
        adapter.delete(&bucket("photos"), &[path("a.png")]).await.unwrap();
        adapter.delete_bucket(&bucket("photos")).await.unwrap();
    }

    #[tokio::test]
    async fn test_prefix_is_plain_string_matching() {
        let adapter = adapter();
        adapter
            .create_bucket(&bucket("docs"), &CreateBucketOptions::default())
            .await
            .unwrap();

        put(&adapter, "docs", "reports/2023.pdf").await;
        put(&adapter, "docs", "reports/2024.pdf").await;
        put(&adapter, "docs", "reports-old/2019.pdf").await;
        put(&adapter, "docs", "readme.md").await;

        let options = ListOptions::builder().prefix("reports/").build();
        let listed = adapter.list(&bucket("docs"), &options).await.unwrap();
        assert_eq!(listed.files.len(), 2);

        let options = ListOptions::builder().prefix("rep").build();
        let listed = adapter.list(&bucket("docs"), &options).await.unwrap();
        assert_eq!(listed.files.len(), 3);
    }

    #[tokio::test]
    async fn test_injected_clock_and_ids_drive_records() {
        let adapter = adapter();
        adapter
            .create_bucket(&bucket("docs"), &CreateBucketOptions::default())
            .await
            .unwrap();

        let first = put(&adapter, "docs", "one.txt").await;
        let second = put(&adapter, "docs", "two.txt").await;

        assert_eq!(first.id.as_str(), "file-000001");
        assert_eq!(second.id.as_str(), "file-000002");
        assert!(second.created_at > first.created_at);

        let options = ListOptions::builder()
            .sort_by(SortBy {
                column: SortColumn::CreatedAt,
                order: SortOrder::Desc,
            })
            .build();
        let listed = adapter.list(&bucket("docs"), &options).await.unwrap();
        let names: Vec<_> = listed.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["two.txt", "one.txt"]);
    }

    #[tokio::test]
    async fn test_upsert_keeps_identity_and_created_at() {
        let adapter = adapter();
        adapter
            .create_bucket(&bucket("docs"), &CreateBucketOptions::default())
            .await
            .unwrap();

        let original = put(&adapter, "docs", "notes.txt").await;
        let replaced = adapter
            .upload(
                &bucket("docs"),
                &path("notes.txt"),
                Bytes::from_static(b"v2"),
                &UploadOptions::builder()
                    .upsert(true)
                    .content_type("text/plain")
                    .build(),
            )
            .await
            .unwrap();

        assert_eq!(replaced.id, original.id);
        assert_eq!(replaced.created_at, original.created_at);
        assert!(replaced.updated_at > original.updated_at);
        assert_eq!(replaced.size, 2);
        assert_eq!(replaced.mime_type, "text/plain");
        assert_eq!(
            adapter
                .download(&bucket("docs"), &path("notes.txt"))
                .await
                .unwrap(),
            Bytes::from_static(b"v2")
        );
    }

    #[tokio::test]
    async fn test_signed_url_uses_injected_token_and_clock() {
        let adapter = adapter().with_base_url("https://cdn.example.com");
        adapter
            .create_bucket(&bucket("docs"), &CreateBucketOptions::default())
            .await
            .unwrap();
        put(&adapter, "docs", "a.txt").await;

        let url = adapter
            .signed_url(
                &bucket("docs"),
                &path("a.txt"),
                &SignedUrlOptions::builder().expires_in(60).build(),
            )
            .await
            .unwrap();

        assert!(url.starts_with("https://cdn.example.com/signed/docs/a.txt?token=token-000001&expires="));
    }

    #[tokio::test]
    async fn test_signed_url_expiry_out_of_range() {
        let adapter = adapter();
        adapter
            .create_bucket(&bucket("docs"), &CreateBucketOptions::default())
            .await
            .unwrap();
        put(&adapter, "docs", "a.txt").await;

        for expires_in in [10_000_000_000_000_000, u64::MAX] {
            let err = adapter
                .signed_url(
                    &bucket("docs"),
                    &path("a.txt"),
                    &SignedUrlOptions::builder().expires_in(expires_in).build(),
                )
                .await
                .unwrap_err();
            assert_eq!(err.code(), "INVALID_REQUEST");
        }
    }

    #[tokio::test]
    async fn test_signed_upload_url_encodes_expiry() {
        let adapter = adapter();
        adapter
            .create_bucket(&bucket("docs"), &CreateBucketOptions::default())
            .await
            .unwrap();
        let uploads = adapter.signed_upload_urls().unwrap();

        let short = uploads
            .create_signed_upload_url(
                &bucket("docs"),
                &path("a.txt"),
                &SignedUploadUrlOptions { expires_in: 60 },
            )
            .await
            .unwrap();
        let long = uploads
            .create_signed_upload_url(
                &bucket("docs"),
                &path("a.txt"),
                &SignedUploadUrlOptions { expires_in: 7200 },
            )
            .await
            .unwrap();

        let expires = |url: &str| -> i64 {
            url.rsplit("expires=").next().unwrap().parse().unwrap()
        };
        assert!(short.url.contains(&format!("?token={}&expires=", short.token)));
        assert!(expires(&long.url) - expires(&short.url) >= 7200 - 60);
    }

    #[tokio::test]
    async fn test_signed_upload_url_requires_bucket() {
        let adapter = adapter();
        let uploads = adapter.signed_upload_urls().unwrap();

        let err = uploads
            .create_signed_upload_url(
                &bucket("missing"),
                &path("a.txt"),
                &SignedUploadUrlOptions { expires_in: 60 },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "BUCKET_NOT_FOUND");
    }

    #[test]
    fn test_inconsistent_capabilities_are_rejected() {
        let mut capabilities = in_memory_capabilities();
        capabilities.files.signed_url_max_age = None;
        assert!(adapter().with_capabilities(capabilities).is_err());
    }
}
