pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types - core business entities and value objects
pub use domain::{
    // Models
    Bucket,
    BucketName,
    CreateBucketOptions,
    Feature,
    FileId,
    FileRecord,
    ListOptions,
    ListResult,
    ObjectPath,
    PublicUrlOptions,
    SignedUploadUrl,
    SignedUploadUrlOptions,
    SignedUrlOptions,
    SortBy,
    SortColumn,
    SortOrder,
    StorageCapabilities,
    // Errors
    StorageError,
    StorageResult,
    TransformOptions,
    UploadOptions,
    UploadPayload,
    ValidationError,
};

// Port types - interfaces for external systems
pub use ports::{Clock, DeleteTarget, IdGenerator, SignedUploadUrls, StorageAdapter, StorageService};

// Service implementations - business logic
pub use services::StorageServiceImpl;

// Application factory and configuration
pub use app::{
    create_in_memory_app, create_object_store_memory_app, AppBuilder, AppConfig, AppError,
    AppServices, StorageBackend,
};

// Adapter types - infrastructure implementations
pub use adapters::outbound::{
    runtime::{SequentialIdGenerator, SteppingClock, SystemClock, UuidIdGenerator},
    storage::{InMemoryStorageAdapter, ObjectStoreAdapter},
};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        create_in_memory_app, AppBuilder, AppServices, BucketName, DeleteTarget,
        InMemoryStorageAdapter, ObjectPath, ObjectStoreAdapter, StorageAdapter, StorageError,
        StorageService, StorageServiceImpl, UploadOptions,
    };
}
