mod bucket_name;
mod file_id;
mod object_path;

pub use bucket_name::BucketName;
pub use file_id::FileId;
pub use object_path::ObjectPath;
