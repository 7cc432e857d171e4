use axum::Router;
use object_store::{aws::AmazonS3Builder, local::LocalFileSystem, memory::InMemory, ObjectStore};
use std::{path::PathBuf, sync::Arc};
use tracing::info;

use crate::{
    adapters::{
        inbound::http::{create_router, AppState},
        outbound::storage::{InMemoryStorageAdapter, ObjectStoreAdapter},
    },
    ports::storage::StorageAdapter,
    services::StorageServiceImpl,
};

/// Configuration for the application
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub storage_backend: StorageBackend,
    /// Base URL public and signed URLs are built on; adapter default when unset
    pub public_base_url: Option<String>,
}

/// Storage backend configuration
#[derive(Debug, Clone, Default)]
pub enum StorageBackend {
    /// Reference in-process adapter; supports every optional operation
    #[default]
    InMemory,
    /// `object_store` over a directory on local disk
    Local { root: PathBuf },
    /// `object_store` over an S3 bucket (or S3-compatible endpoint)
    S3 {
        bucket: String,
        region: String,
        endpoint: Option<String>,
        access_key: Option<String>,
        secret_key: Option<String>,
        allow_http: bool,
    },
}

impl StorageBackend {
    pub fn name(&self) -> &'static str {
        match self {
            StorageBackend::InMemory => "memory",
            StorageBackend::Local { .. } => "local",
            StorageBackend::S3 { .. } => "s3",
        }
    }
}

/// Application services container
pub struct AppServices {
    pub storage_service: StorageServiceImpl,
}

impl AppServices {
    /// HTTP router serving these services
    pub fn router(self) -> Router {
        create_router(AppState::from(self.storage_service))
    }
}

/// Application builder for dependency injection
pub struct AppBuilder {
    config: AppConfig,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_storage_backend(mut self, backend: StorageBackend) -> Self {
        self.config.storage_backend = backend;
        self
    }

    pub fn with_public_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.public_base_url = Some(base_url.into());
        self
    }

    /// Build the storage adapter selected by the configuration
    pub async fn build_adapter(&self) -> Result<Arc<dyn StorageAdapter>, AppError> {
        let base_url = self.config.public_base_url.clone();

        let adapter: Arc<dyn StorageAdapter> = match &self.config.storage_backend {
            StorageBackend::InMemory => {
                let adapter = InMemoryStorageAdapter::default();
                Arc::new(match base_url {
                    Some(url) => adapter.with_base_url(url),
                    None => adapter,
                })
            }
            StorageBackend::Local { root } => {
                tokio::fs::create_dir_all(root).await.map_err(|e| AppError::StorageInit {
                    message: format!("cannot create {}: {}", root.display(), e),
                })?;
                let store =
                    LocalFileSystem::new_with_prefix(root).map_err(|e| AppError::StorageInit {
                        message: e.to_string(),
                    })?;
                Arc::new(object_store_adapter(Arc::new(store), "object-store:local", base_url))
            }
            StorageBackend::S3 {
                bucket,
                region,
                endpoint,
                access_key,
                secret_key,
                allow_http,
            } => {
                if bucket.is_empty() {
                    return Err(AppError::Configuration {
                        message: "an S3 bucket name is required".to_string(),
                    });
                }

                let mut builder = AmazonS3Builder::new()
                    .with_bucket_name(bucket)
                    .with_region(region)
                    .with_allow_http(*allow_http);
                if let Some(endpoint) = endpoint {
                    builder = builder.with_endpoint(endpoint);
                }
                if let Some(access_key) = access_key {
                    builder = builder.with_access_key_id(access_key);
                }
                if let Some(secret_key) = secret_key {
                    builder = builder.with_secret_access_key(secret_key);
                }

                let store = builder.build().map_err(|e| AppError::StorageInit {
                    message: e.to_string(),
                })?;
                Arc::new(object_store_adapter(Arc::new(store), "object-store:s3", base_url))
            }
        };

        info!(
            backend = self.config.storage_backend.name(),
            provider = %adapter.capabilities().provider,
            "storage adapter ready"
        );
        Ok(adapter)
    }

    /// Build the complete application with services
    pub async fn build(self) -> Result<AppServices, AppError> {
        let adapter = self.build_adapter().await?;

        Ok(AppServices {
            storage_service: StorageServiceImpl::new(adapter),
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn object_store_adapter(
    store: Arc<dyn ObjectStore>,
    provider: &str,
    base_url: Option<String>,
) -> ObjectStoreAdapter {
    let adapter = ObjectStoreAdapter::new(store, provider);
    match base_url {
        Some(url) => adapter.with_base_url(url),
        None => adapter,
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage initialization error: {message}")]
    StorageInit { message: String },
}

/// Create an in-memory application for testing and development
pub async fn create_in_memory_app() -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_storage_backend(StorageBackend::InMemory)
        .build()
        .await
}

/// Create an application over `object_store`'s in-memory backend.
///
/// Exercises the object-store adapter without touching disk or network.
pub async fn create_object_store_memory_app() -> Result<AppServices, AppError> {
    Ok(AppServices {
        storage_service: StorageServiceImpl::new(Arc::new(ObjectStoreAdapter::new(
            Arc::new(InMemory::new()),
            "object-store:memory",
        ))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::services::StorageService;

    #[tokio::test]
    async fn test_create_in_memory_app() {
        let app = create_in_memory_app().await.unwrap();
        assert_eq!(app.storage_service.capabilities().provider, "memory");
    }

    #[tokio::test]
    async fn test_public_base_url_reaches_adapter() {
        let app = AppBuilder::new()
            .with_public_base_url("https://cdn.example.com/")
            .build()
            .await
            .unwrap();

        let url = app
            .storage_service
            .public_url(
                &"media".try_into().unwrap(),
                &"a.png".try_into().unwrap(),
                Default::default(),
            )
            .unwrap();
        assert_eq!(url, "https://cdn.example.com/public/media/a.png");
    }

    #[tokio::test]
    async fn test_local_backend() {
        let base = std::env::temp_dir().join(format!("bucket-storage-{}", uuid::Uuid::new_v4()));
        let root = base.join("nested").join("root");
        let app = AppBuilder::new()
            .with_storage_backend(StorageBackend::Local { root: root.clone() })
            .build()
            .await
            .unwrap();

        let capabilities = app.storage_service.capabilities();
        assert_eq!(capabilities.provider, "object-store:local");
        assert!(!capabilities.files.signed_urls);
        assert!(root.is_dir());

        tokio::fs::remove_dir_all(base).await.ok();
    }

    #[tokio::test]
    async fn test_object_store_memory_app() {
        let app = create_object_store_memory_app().await.unwrap();
        assert_eq!(
            app.storage_service.capabilities().provider,
            "object-store:memory"
        );
    }
}
