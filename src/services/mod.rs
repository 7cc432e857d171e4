mod storage_service_impl;

pub use storage_service_impl::StorageServiceImpl;
