use axum::{
    extract::State,
    Json,
};

use crate::{
    adapters::inbound::http::{
        dto::{
            api_error, parse_bucket, parse_path, ApiResult, SignedUploadUrlDto, SignedUrlDto,
            TransformQuery, UrlResponseDto,
        },
        extract::{ApiJson, ApiPath, ApiQuery},
        router::AppState,
    },
    domain::models::{
        PublicUrlOptions, SignedUploadUrl, SignedUploadUrlOptions, SignedUrlOptions,
    },
};

/// Lifetime of a signed upload URL when the caller does not pick one
pub const DEFAULT_SIGNED_UPLOAD_EXPIRY_SECS: u64 = 2 * 60 * 60;

pub async fn get_public_url(
    State(app_state): State<AppState>,
    ApiPath((bucket, path)): ApiPath<(String, String)>,
    ApiQuery(query): ApiQuery<TransformQuery>,
) -> ApiResult<Json<UrlResponseDto>> {
    let bucket = parse_bucket(bucket)?;
    let path = parse_path(path)?;

    let url = app_state
        .storage_service
        .public_url(
            &bucket,
            &path,
            PublicUrlOptions {
                transform: query.into_transform(),
            },
        )
        .map_err(api_error)?;

    Ok(Json(UrlResponseDto { url }))
}

pub async fn create_signed_url(
    State(app_state): State<AppState>,
    ApiPath((bucket, path)): ApiPath<(String, String)>,
    ApiJson(body): ApiJson<SignedUrlDto>,
) -> ApiResult<Json<UrlResponseDto>> {
    let bucket = parse_bucket(bucket)?;
    let path = parse_path(path)?;

    let options = SignedUrlOptions {
        expires_in: body.expires_in,
        download: body.download,
        transform: body.transform,
    };

    let url = app_state
        .storage_service
        .signed_url(&bucket, &path, options)
        .await
        .map_err(api_error)?;

    Ok(Json(UrlResponseDto { url }))
}

pub async fn create_signed_upload_url(
    State(app_state): State<AppState>,
    ApiPath((bucket, path)): ApiPath<(String, String)>,
    ApiJson(body): ApiJson<SignedUploadUrlDto>,
) -> ApiResult<Json<SignedUploadUrl>> {
    let bucket = parse_bucket(bucket)?;
    let path = parse_path(path)?;

    let options = SignedUploadUrlOptions {
        expires_in: body
            .expires_in
            .unwrap_or(DEFAULT_SIGNED_UPLOAD_EXPIRY_SECS),
    };

    let upload = app_state
        .storage_service
        .create_signed_upload_url(&bucket, &path, options)
        .await
        .map_err(api_error)?;

    Ok(Json(upload))
}
