/// Validation errors for domain value objects
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    // ObjectPath validation errors
    EmptyObjectPath,
    ObjectPathTooLong {
        actual: usize,
        max: usize,
    },
    InvalidObjectPathCharacter(char),
    ObjectPathStartsWithSlash,
    ObjectPathEndsWithSlash,
    ObjectPathContainsDoubleSlash,

    // BucketName validation errors
    EmptyBucketName,
    BucketNameTooLong {
        actual: usize,
        max: usize,
    },
    BucketNameInvalidStart,
    BucketNameInvalidEnd,
    BucketNameInvalidCharacter(char),

    // FileId validation errors
    EmptyFileId,
    InvalidFileIdCharacter(char),

    InvalidField {
        field: String,
        value: String,
        expected: String,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ObjectPath errors
            ValidationError::EmptyObjectPath => write!(f, "Object path cannot be empty"),
            ValidationError::ObjectPathTooLong { actual, max } => {
                write!(f, "Object path too long: {} bytes (max: {})", actual, max)
            }
            ValidationError::InvalidObjectPathCharacter(c) => {
                write!(f, "Invalid character in object path: {:?}", c)
            }
            ValidationError::ObjectPathStartsWithSlash => {
                write!(f, "Object path cannot start with '/'")
            }
            ValidationError::ObjectPathEndsWithSlash => {
                write!(f, "Object path cannot end with '/'")
            }
            ValidationError::ObjectPathContainsDoubleSlash => {
                write!(f, "Object path cannot contain '//'")
            }

            // BucketName errors
            ValidationError::EmptyBucketName => write!(f, "Bucket name cannot be empty"),
            ValidationError::BucketNameTooLong { actual, max } => {
                write!(
                    f,
                    "Bucket name too long: {} characters (max: {})",
                    actual, max
                )
            }
            ValidationError::BucketNameInvalidStart => {
                write!(f, "Bucket name must start with a lowercase letter or number")
            }
            ValidationError::BucketNameInvalidEnd => {
                write!(f, "Bucket name must end with a lowercase letter or number")
            }
            ValidationError::BucketNameInvalidCharacter(c) => {
                write!(
                    f,
                    "Invalid character in bucket name: '{}'. Only lowercase letters, numbers, '-', '_' and '.' allowed",
                    c
                )
            }

            // FileId errors
            ValidationError::EmptyFileId => write!(f, "File id cannot be empty"),
            ValidationError::InvalidFileIdCharacter(c) => {
                write!(f, "Invalid character in file id: '{}'", c)
            }

            ValidationError::InvalidField {
                field,
                value,
                expected,
            } => {
                write!(
                    f,
                    "Invalid value for field '{}': '{}' (expected: {})",
                    field, value, expected
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}
