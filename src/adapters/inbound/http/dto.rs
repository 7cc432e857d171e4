use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::domain::{
    errors::{StorageError, ValidationError},
    models::{
        CreateBucketOptions, DownloadOption, ImageFormat, ResizeMode, TransformOptions,
    },
    value_objects::{BucketName, ObjectPath},
};

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponseDto>);

pub type ApiResult<T> = Result<T, ApiError>;

/// Error payload: `{code, message, status}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponseDto {
    pub code: String,
    pub message: String,
    pub status: u16,
}

impl ErrorResponseDto {
    pub fn from_storage_error(error: &StorageError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.to_string(),
            status: error.status().as_u16(),
        }
    }
}

/// Convert a storage error into the handler error tuple
pub fn api_error(error: StorageError) -> ApiError {
    let status = StatusCode::from(error.clone());
    (status, Json(ErrorResponseDto::from_storage_error(&error)))
}

impl From<ValidationError> for ErrorResponseDto {
    fn from(error: ValidationError) -> Self {
        ErrorResponseDto::from_storage_error(&StorageError::from(error))
    }
}

pub fn parse_bucket(value: impl Into<String>) -> ApiResult<BucketName> {
    BucketName::new(value).map_err(|e| api_error(e.into()))
}

pub fn parse_path(value: impl Into<String>) -> ApiResult<ObjectPath> {
    ObjectPath::new(value).map_err(|e| api_error(e.into()))
}

/// Body of `POST /bucket`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBucketDto {
    pub name: String,
    #[serde(flatten)]
    pub options: CreateBucketOptions,
}

/// Body of `POST /remove/{bucket}`
#[derive(Debug, Clone, Deserialize)]
pub struct RemoveObjectsDto {
    pub prefixes: Vec<String>,
}

/// Body of `POST /move` and `POST /copy`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferObjectDto {
    pub bucket_id: String,
    pub source_key: String,
    pub destination_key: String,
}

/// Transform parameters carried in a query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransformQuery {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub resize: Option<ResizeMode>,
    pub quality: Option<u8>,
    pub format: Option<ImageFormat>,
}

impl TransformQuery {
    pub fn into_transform(self) -> Option<TransformOptions> {
        let transform = TransformOptions {
            width: self.width,
            height: self.height,
            resize: self.resize,
            quality: self.quality,
            format: self.format,
        };
        (!transform.is_empty()).then_some(transform)
    }
}

/// Body of `POST /signed-url/{bucket}/{*path}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlDto {
    pub expires_in: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download: Option<DownloadOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<TransformOptions>,
}

/// Body of `POST /signed-upload-url/{bucket}/{*path}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUploadUrlDto {
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlResponseDto {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponseDto {
    pub message: String,
}

impl MessageResponseDto {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
