pub mod bucket;
pub mod capabilities;
pub mod file;
pub mod listing;
pub mod url;

pub use bucket::{Bucket, CreateBucketOptions};
pub use capabilities::{
    BucketCapabilities, Feature, FeatureFlags, FileCapabilities, MimeTypePolicy,
    StorageCapabilities,
};
pub use file::{FileRecord, UploadOptions, UploadPayload, DEFAULT_MIME_TYPE};
pub use listing::{ListOptions, ListResult, SortBy, SortColumn, SortOrder, DEFAULT_LIST_LIMIT};
pub use url::{
    DownloadOption, ImageFormat, PublicUrlOptions, ResizeMode, SignedUploadUrl,
    SignedUploadUrlOptions, SignedUrlOptions, TransformOptions,
};
