use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    adapters::inbound::http::{
        dto::{api_error, parse_bucket, ApiResult, CreateBucketDto, MessageResponseDto},
        extract::{ApiJson, ApiPath},
        router::AppState,
    },
    domain::{
        errors::StorageError,
        models::{Bucket, StorageCapabilities},
    },
};

/// Liveness check
pub async fn health() -> Json<MessageResponseDto> {
    Json(MessageResponseDto::new("ok"))
}

/// Capabilities of the active backend
pub async fn get_capabilities(State(app_state): State<AppState>) -> Json<StorageCapabilities> {
    Json(app_state.storage_service.capabilities().clone())
}

pub async fn create_bucket(
    State(app_state): State<AppState>,
    ApiJson(body): ApiJson<CreateBucketDto>,
) -> ApiResult<(StatusCode, Json<Bucket>)> {
    let name = parse_bucket(body.name)?;

    let bucket = app_state
        .storage_service
        .create_bucket(&name, body.options)
        .await
        .map_err(api_error)?;

    Ok((StatusCode::CREATED, Json(bucket)))
}

pub async fn list_buckets(State(app_state): State<AppState>) -> ApiResult<Json<Vec<Bucket>>> {
    let buckets = app_state
        .storage_service
        .list_buckets()
        .await
        .map_err(api_error)?;

    Ok(Json(buckets))
}

pub async fn get_bucket(
    State(app_state): State<AppState>,
    ApiPath(name): ApiPath<String>,
) -> ApiResult<Json<Bucket>> {
    let name = parse_bucket(name)?;

    app_state
        .storage_service
        .get_bucket(&name)
        .await
        .map_err(api_error)?
        .map(Json)
        .ok_or_else(|| {
            api_error(StorageError::BucketNotFound {
                bucket: name.to_string(),
            })
        })
}

pub async fn delete_bucket(
    State(app_state): State<AppState>,
    ApiPath(name): ApiPath<String>,
) -> ApiResult<Json<MessageResponseDto>> {
    let name = parse_bucket(name)?;

    app_state
        .storage_service
        .delete_bucket(&name)
        .await
        .map_err(api_error)?;

    Ok(Json(MessageResponseDto::new(format!(
        "Bucket '{}' deleted",
        name
    ))))
}
