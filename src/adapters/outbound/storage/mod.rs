// Infrastructure error types
pub mod error;

// Storage implementations
pub mod in_memory_adapter;
pub mod object_store_adapter;
pub mod urls;

// Re-export key types
pub use error::StoreError;
pub use in_memory_adapter::{in_memory_capabilities, InMemoryStorageAdapter, DEFAULT_BASE_URL};
pub use object_store_adapter::{object_store_capabilities, ObjectStoreAdapter};
pub use urls::UrlBuilder;
