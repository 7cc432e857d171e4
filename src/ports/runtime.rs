use chrono::{DateTime, Utc};

use crate::domain::value_objects::FileId;

/// Source of the current time for timestamps and URL expiry
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of file identities and URL tokens
pub trait IdGenerator: Send + Sync + 'static {
    fn file_id(&self) -> FileId;

    fn token(&self) -> String;
}
