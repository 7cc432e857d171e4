mod storage_adapter;

pub use storage_adapter::{SignedUploadUrls, StorageAdapter};
