use serde::{Deserialize, Serialize};

use crate::domain::errors::ValidationError;

const MAX_OBJECT_PATH_LEN: usize = 1024;

/// A validated object path within a bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectPath(String);

impl ObjectPath {
    /// Create a new ObjectPath with validation
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();

        if value.is_empty() {
            return Err(ValidationError::EmptyObjectPath);
        }

        if value.len() > MAX_OBJECT_PATH_LEN {
            return Err(ValidationError::ObjectPathTooLong {
                actual: value.len(),
                max: MAX_OBJECT_PATH_LEN,
            });
        }

        if let Some(c) = value.chars().find(|c| c.is_control()) {
            return Err(ValidationError::InvalidObjectPathCharacter(c));
        }

        if value.starts_with('/') {
            return Err(ValidationError::ObjectPathStartsWithSlash);
        }

        if value.ends_with('/') {
            return Err(ValidationError::ObjectPathEndsWithSlash);
        }

        if value.contains("//") {
            return Err(ValidationError::ObjectPathContainsDoubleSlash);
        }

        Ok(Self(value))
    }

    /// Get the path as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the folder part of the path (everything before the last '/')
    pub fn parent(&self) -> Option<&str> {
        self.0.rfind('/').map(|idx| &self.0[..idx])
    }

    /// Get the file name part of the path (everything after the last '/')
    pub fn file_name(&self) -> &str {
        self.0.rfind('/').map_or(&self.0, |idx| &self.0[idx + 1..])
    }

    /// Check if this path has the given prefix
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl std::fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ObjectPath {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ObjectPath::new(value)
    }
}

impl TryFrom<&str> for ObjectPath {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        ObjectPath::new(value)
    }
}

impl From<ObjectPath> for String {
    fn from(path: ObjectPath) -> Self {
        path.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_object_path() {
        assert!(ObjectPath::new("file.txt").is_ok());
        assert!(ObjectPath::new("folder/file.txt").is_ok());
        assert!(ObjectPath::new("deep/folder/structure/file.txt").is_ok());
    }

    #[test]
    fn test_invalid_object_path() {
        assert_eq!(ObjectPath::new(""), Err(ValidationError::EmptyObjectPath));
        assert!(ObjectPath::new("/leading-slash").is_err());
        assert!(ObjectPath::new("trailing/").is_err());
        assert!(ObjectPath::new("double//slash").is_err());
        assert!(ObjectPath::new("null\0byte").is_err());
        assert!(ObjectPath::new("x".repeat(1025)).is_err());
    }

    #[test]
    fn test_object_path_parts() {
        let path = ObjectPath::new("folder/subfolder/file.txt").unwrap();
        assert_eq!(path.parent(), Some("folder/subfolder"));
        assert_eq!(path.file_name(), "file.txt");
        assert!(path.has_prefix("folder/sub"));

        let root = ObjectPath::new("file.txt").unwrap();
        assert_eq!(root.parent(), None);
        assert_eq!(root.file_name(), "file.txt");
    }
}
