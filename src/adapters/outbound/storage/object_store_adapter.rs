use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::{path::Path as StorePath, ObjectStore, PutPayload};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    adapters::outbound::{
        runtime::{SystemClock, UuidIdGenerator},
        storage::{error::StoreError, in_memory_adapter::DEFAULT_BASE_URL, urls::UrlBuilder},
    },
    domain::{
        errors::{FailedOperation, StorageError, StorageResult, ValidationError},
        models::{
            file::compute_etag, listing::paginate, Bucket, BucketCapabilities,
            CreateBucketOptions, FeatureFlags, FileCapabilities, FileRecord, ListOptions,
            ListResult, MimeTypePolicy, PublicUrlOptions, SignedUrlOptions, StorageCapabilities,
            UploadOptions, DEFAULT_MIME_TYPE,
        },
        value_objects::{BucketName, FileId, ObjectPath},
    },
    ports::{
        runtime::{Clock, IdGenerator},
        storage::StorageAdapter,
    },
};

/// Capabilities of an object-store backed adapter for `provider`
pub fn object_store_capabilities(provider: impl Into<String>) -> StorageCapabilities {
    StorageCapabilities {
        provider: provider.into(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        buckets: BucketCapabilities {
            public: true,
            private: true,
            max_buckets: None,
        },
        files: FileCapabilities {
            max_size_bytes: 50 * 1024 * 1024,
            allowed_mime_types: MimeTypePolicy::Unrestricted,
            signed_urls: false,
            signed_url_max_age: None,
            public_urls: true,
            transformations: false,
        },
        features: FeatureFlags {
            folders: true,
            metadata: true,
            ..FeatureFlags::default()
        },
    }
}

/// Storage adapter over any `object_store` backend (memory, local disk, S3).
///
/// Layout inside the store:
/// - `buckets/{bucket}.json` bucket descriptor
/// - `files/{bucket}/{path}.json` file record
/// - `blobs/{bucket}/{file id}` content, addressed by identity so moves
///   only rewrite records
pub struct ObjectStoreAdapter {
    inner: Arc<dyn ObjectStore>,
    capabilities: StorageCapabilities,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    urls: UrlBuilder,
    // Serializes check-then-write sequences within this process
    write_lock: Mutex<()>,
}

fn bucket_location(bucket: &BucketName) -> StorePath {
    StorePath::from(format!("buckets/{}.json", bucket.as_str()))
}

fn records_location(bucket: &BucketName) -> StorePath {
    StorePath::from(format!("files/{}", bucket.as_str()))
}

fn record_location(bucket: &BucketName, path: &ObjectPath) -> StorePath {
    StorePath::from(format!("files/{}/{}.json", bucket.as_str(), path.as_str()))
}

fn blob_location(bucket: &BucketName, id: &FileId) -> StorePath {
    StorePath::from(format!("blobs/{}/{}", bucket.as_str(), id.as_str()))
}

impl ObjectStoreAdapter {
    pub fn new(store: Arc<dyn ObjectStore>, provider: impl Into<String>) -> Self {
        Self {
            inner: store,
            capabilities: object_store_capabilities(provider),
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidIdGenerator),
            urls: UrlBuilder::new(DEFAULT_BASE_URL),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_runtime(mut self, clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        self.clock = clock;
        self.ids = ids;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.urls = UrlBuilder::new(base_url);
        self
    }

    pub fn with_capabilities(
        mut self,
        capabilities: StorageCapabilities,
    ) -> Result<Self, ValidationError> {
        capabilities.validate()?;
        self.capabilities = capabilities;
        Ok(self)
    }

    async fn read_bytes(&self, location: &StorePath) -> Result<Option<Bytes>, StoreError> {
        let result = match self.inner.get(location).await.map_err(StoreError::from) {
            Ok(result) => result,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };
        Ok(Some(result.bytes().await?))
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        location: &StorePath,
    ) -> Result<Option<T>, StoreError> {
        match self.read_bytes(location).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn write_json<T: Serialize>(
        &self,
        location: &StorePath,
        value: &T,
    ) -> Result<(), StoreError> {
        let body = serde_json::to_vec(value)?;
        self.inner.put(location, PutPayload::from(body)).await?;
        Ok(())
    }

    /// Delete `location`, treating an already missing object as removed
    async fn remove(&self, location: &StorePath) -> Result<(), StoreError> {
        match self.inner.delete(location).await.map_err(StoreError::from) {
            Err(e) if !e.is_not_found() => Err(e),
            _ => Ok(()),
        }
    }

    async fn bucket(&self, name: &BucketName) -> StorageResult<Option<Bucket>> {
        self.read_json(&bucket_location(name))
            .await
            .map_err(|e| e.during(FailedOperation::Bucket))
    }

    async fn record(
        &self,
        bucket: &BucketName,
        path: &ObjectPath,
        operation: FailedOperation,
    ) -> StorageResult<Option<FileRecord>> {
        self.read_json(&record_location(bucket, path))
            .await
            .map_err(|e| e.during(operation))
    }

    /// Every record in a bucket, in path order
    async fn records(&self, bucket: &BucketName) -> StorageResult<Vec<FileRecord>> {
        let metas: Vec<_> = self
            .inner
            .list(Some(&records_location(bucket)))
            .try_collect()
            .await
            .map_err(|e| StoreError::from(e).during(FailedOperation::List))?;

        let mut records = Vec::with_capacity(metas.len());
        for meta in metas {
            if let Some(record) = self
                .read_json::<FileRecord>(&meta.location)
                .await
                .map_err(|e| e.during(FailedOperation::List))?
            {
                records.push(record);
            }
        }

        records.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(records)
    }
}

#[async_trait]
impl StorageAdapter for ObjectStoreAdapter {
    fn capabilities(&self) -> &StorageCapabilities {
        &self.capabilities
    }

    async fn create_bucket(
        &self,
        name: &BucketName,
        options: &CreateBucketOptions,
    ) -> StorageResult<Bucket> {
        let _guard = self.write_lock.lock().await;

        if self.bucket(name).await?.is_some() {
            return Err(StorageError::BucketExists {
                bucket: name.to_string(),
            });
        }

        let bucket = Bucket::new(name.clone(), options, self.clock.now());
        self.write_json(&bucket_location(name), &bucket)
            .await
            .map_err(|e| e.during(FailedOperation::Bucket))?;

        info!(bucket = %name, provider = %self.capabilities.provider, "created bucket");
        Ok(bucket)
    }

    async fn get_bucket(&self, name: &BucketName) -> StorageResult<Option<Bucket>> {
        self.bucket(name).await
    }

    async fn list_buckets(&self) -> StorageResult<Vec<Bucket>> {
        let metas: Vec<_> = self
            .inner
            .list(Some(&StorePath::from("buckets")))
            .try_collect()
            .await
            .map_err(|e| StoreError::from(e).during(FailedOperation::Bucket))?;

        let mut buckets = Vec::with_capacity(metas.len());
        for meta in metas {
            if let Some(bucket) = self
                .read_json::<Bucket>(&meta.location)
                .await
                .map_err(|e| e.during(FailedOperation::Bucket))?
            {
                buckets.push(bucket);
            }
        }

        buckets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(buckets)
    }

    async fn delete_bucket(&self, name: &BucketName) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;

        if self.bucket(name).await?.is_none() {
            return Err(StorageError::bucket_not_found(name.as_str()));
        }

        let objects = self.records(name).await?.len();
        if objects > 0 {
            return Err(StorageError::BucketNotEmpty {
                bucket: name.to_string(),
                objects,
            });
        }

        self.inner
            .delete(&bucket_location(name))
            .await
            .map_err(|e| StoreError::from(e).during(FailedOperation::Bucket))?;

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
        let _guard = self.write_lock.lock().await;

        let bucket_info = self
            .bucket(bucket)
            .await?
            .ok_or_else(|| StorageError::bucket_not_found(bucket.as_str()))?;
        bucket_info.check_upload(data.len() as u64, options.content_type.as_deref())?;

        let now = self.clock.now();
        let existing = self.record(bucket, path, FailedOperation::Upload).await?;
        let (id, created_at, is_new) = match existing {
            Some(_) if !options.upsert => {
                return Err(StorageError::file_exists(bucket.as_str(), path.as_str()));
            }
            Some(existing) => (existing.id, existing.created_at, false),
            None => (self.ids.file_id(), now, true),
        };

        let record = FileRecord {
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
            id,
        };

        let blob = blob_location(bucket, &record.id);
        // Content the existing record describes, put back if the new record cannot be written
        let previous = if is_new {
            None
        } else {
            self.read_bytes(&blob)
                .await
                .map_err(|e| e.during(FailedOperation::Upload))?
        };

        self.inner
            .put(&blob, PutPayload::from(data))
            .await
            .map_err(|e| StoreError::from(e).during(FailedOperation::Upload))?;

        if let Err(e) = self.write_json(&record_location(bucket, path), &record).await {
            let rollback = match previous {
                Some(previous) => self.inner.put(&blob, PutPayload::from(previous)).await.map(|_| ()),
                None if is_new => self.inner.delete(&blob).await,
                None => Ok(()),
            };
            if let Err(rollback) = rollback {
                warn!(error = %rollback, blob = %blob, "failed to roll back blob after record write failure");
            }
            return Err(e.during(FailedOperation::Upload));
        }

        info!(bucket = %bucket, path = %path, size = record.size, "stored object");
        Ok(record)
    }

    async fn download(&self, bucket: &BucketName, path: &ObjectPath) -> StorageResult<Bytes> {
        let record = self
            .record(bucket, path, FailedOperation::Download)
            .await?
            .ok_or_else(|| StorageError::file_not_found(bucket.as_str(), path.as_str()))?;

        self.read_bytes(&blob_location(bucket, &record.id))
            .await
            .map_err(|e| e.during(FailedOperation::Download))?
            .ok_or_else(|| StorageError::file_not_found(bucket.as_str(), path.as_str()))
    }

    async fn get_file_info(
        &self,
        bucket: &BucketName,
        path: &ObjectPath,
    ) -> StorageResult<Option<FileRecord>> {
        self.record(bucket, path, FailedOperation::Download).await
    }

    async fn list(&self, bucket: &BucketName, options: &ListOptions) -> StorageResult<ListResult> {
        if self.bucket(bucket).await?.is_none() {
            return Err(StorageError::bucket_not_found(bucket.as_str()));
        }

        let prefix = options.prefix();
        let matched = self
            .records(bucket)
            .await?
            .into_iter()
            .filter(|record| record.path.has_prefix(prefix))
            .collect();

        let result = paginate(matched, options);
        debug!(bucket = %bucket, prefix, returned = result.files.len(), has_more = result.has_more, "listed objects");
        Ok(result)
    }

    async fn delete(&self, bucket: &BucketName, paths: &[ObjectPath]) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            let record = self
                .record(bucket, path, FailedOperation::Delete)
                .await?
                .ok_or_else(|| StorageError::file_not_found(bucket.as_str(), path.as_str()))?;
            records.push(record);
        }

        // A path listed twice is already gone on its second pass
        for record in records {
            self.remove(&record_location(bucket, &record.path))
                .await
                .map_err(|e| e.during(FailedOperation::Delete))?;
            self.remove(&blob_location(bucket, &record.id))
                .await
                .map_err(|e| e.during(FailedOperation::Delete))?;
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
        let _guard = self.write_lock.lock().await;

        let mut record = self
            .record(bucket, from, FailedOperation::Move)
            .await?
            .ok_or_else(|| StorageError::file_not_found(bucket.as_str(), from.as_str()))?;
        if self.record(bucket, to, FailedOperation::Move).await?.is_some() {
            return Err(StorageError::file_exists(bucket.as_str(), to.as_str()));
        }

        record.relocate(to.clone(), self.clock.now());

        self.write_json(&record_location(bucket, to), &record)
            .await
            .map_err(|e| e.during(FailedOperation::Move))?;
        self.inner
            .delete(&record_location(bucket, from))
            .await
            .map_err(|e| StoreError::from(e).during(FailedOperation::Move))?;

        info!(bucket = %bucket, from = %from, to = %to, "moved object");
        Ok(record)
    }

    async fn copy_file(
        &self,
        bucket: &BucketName,
        from: &ObjectPath,
        to: &ObjectPath,
    ) -> StorageResult<FileRecord> {
        let _guard = self.write_lock.lock().await;

        let source = self
            .record(bucket, from, FailedOperation::Copy)
            .await?
            .ok_or_else(|| StorageError::file_not_found(bucket.as_str(), from.as_str()))?;
        if self.record(bucket, to, FailedOperation::Copy).await?.is_some() {
            return Err(StorageError::file_exists(bucket.as_str(), to.as_str()));
        }

        let record = source.duplicate(self.ids.file_id(), to.clone(), self.clock.now());

        self.inner
            .copy(
                &blob_location(bucket, &source.id),
                &blob_location(bucket, &record.id),
            )
            .await
            .map_err(|e| StoreError::from(e).during(FailedOperation::Copy))?;
        self.write_json(&record_location(bucket, to), &record)
            .await
            .map_err(|e| e.during(FailedOperation::Copy))?;

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
        _bucket: &BucketName,
        _path: &ObjectPath,
        _options: &SignedUrlOptions,
    ) -> StorageResult<String> {
        Err(StorageError::SignedUrlsNotSupported {
            provider: self.capabilities.provider.clone(),
        })
    }
}
