pub mod runtime;
pub mod services;
pub mod storage;

// Re-export all port traits for convenience
pub use runtime::{Clock, IdGenerator};
pub use services::{DeleteTarget, StorageService};
pub use storage::{SignedUploadUrls, StorageAdapter};
