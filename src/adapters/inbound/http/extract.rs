//! Extractors that answer malformed input with the `{code, message, status}` payload
//! instead of axum's plain-text rejections.

use axum::{
    extract::{
        rejection::{BytesRejection, JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, Path, Query, Request,
    },
    http::{request::Parts, StatusCode},
    Json,
};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{ApiError, ErrorResponseDto};

/// Map an extractor rejection onto the API error shape.
///
/// Bodies over the configured limit become `FILE_TOO_LARGE`; everything else
/// is `INVALID_REQUEST`.
pub fn rejection_error(status: StatusCode, body_text: String) -> ApiError {
    debug!(%status, reason = %body_text, "request rejected by extractor");

    let (status, code) = if status == StatusCode::PAYLOAD_TOO_LARGE {
        (StatusCode::PAYLOAD_TOO_LARGE, "FILE_TOO_LARGE")
    } else {
        (StatusCode::BAD_REQUEST, "INVALID_REQUEST")
    };

    (
        status,
        Json(ErrorResponseDto {
            code: code.to_string(),
            message: body_text,
            status: status.as_u16(),
        }),
    )
}

/// JSON body
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| rejection_error(rejection.status(), rejection.body_text()))?;
        Ok(ApiJson(value))
    }
}

/// Raw request body, bounded by the router's body limit
#[derive(Debug, Clone, Default)]
pub struct ApiBytes(pub Bytes);

impl<S> FromRequest<S> for ApiBytes
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|rejection: BytesRejection| {
                rejection_error(rejection.status(), rejection.body_text())
            })?;
        Ok(ApiBytes(body))
    }
}

/// Query string
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: QueryRejection| {
                rejection_error(rejection.status(), rejection.body_text())
            })?;
        Ok(ApiQuery(value))
    }
}

/// Path parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: PathRejection| {
                rejection_error(rejection.status(), rejection.body_text())
            })?;
        Ok(ApiPath(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oversized_body_maps_to_file_too_large() {
        let (status, Json(body)) =
            rejection_error(StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded".to_string());
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body.code, "FILE_TOO_LARGE");
        assert_eq!(body.status, 413);
    }

    #[test]
    fn test_other_rejections_are_invalid_requests() {
        for status in [StatusCode::UNPROCESSABLE_ENTITY, StatusCode::UNSUPPORTED_MEDIA_TYPE] {
            let (status, Json(body)) = rejection_error(status, "bad".to_string());
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body.code, "INVALID_REQUEST");
            assert_eq!(body.message, "bad");
        }
    }
}
