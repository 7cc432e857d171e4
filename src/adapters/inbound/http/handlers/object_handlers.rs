use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use std::collections::HashMap;

use crate::{
    adapters::inbound::http::{
        dto::{
            api_error, parse_bucket, parse_path, ApiResult, MessageResponseDto, RemoveObjectsDto,
            TransferObjectDto,
        },
        extract::{ApiBytes, ApiJson, ApiPath},
        router::AppState,
    },
    domain::{
        errors::StorageError,
        models::{FileRecord, ListOptions, ListResult, UploadOptions, UploadPayload},
        value_objects::{BucketName, ObjectPath},
    },
    ports::services::DeleteTarget,
};

fn header_value(headers: &HeaderMap, name: impl header::AsHeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

/// Upload options carried in request headers
fn upload_options(headers: &HeaderMap, upsert: bool) -> ApiResult<UploadOptions> {
    let upsert = upsert
        || header_value(headers, "x-upsert")
            .map(|value| value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

    let metadata = header_value(headers, "x-metadata")
        .map(|raw| serde_json::from_str::<HashMap<String, String>>(&raw))
        .transpose()
        .map_err(|e| {
            api_error(StorageError::InvalidRequest {
                message: format!("x-metadata must be a JSON object of strings: {}", e),
            })
        })?;

    Ok(UploadOptions {
        content_type: header_value(headers, header::CONTENT_TYPE),
        cache_control: header_value(headers, header::CACHE_CONTROL),
        upsert,
        metadata,
    })
}

fn object_location(bucket: String, path: String) -> ApiResult<(BucketName, ObjectPath)> {
    Ok((parse_bucket(bucket)?, parse_path(path)?))
}

async fn store_object(
    app_state: &AppState,
    bucket: String,
    path: String,
    headers: &HeaderMap,
    body: Bytes,
    upsert: bool,
) -> ApiResult<FileRecord> {
    let (bucket, path) = object_location(bucket, path)?;
    let options = upload_options(headers, upsert)?;

    app_state
        .storage_service
        .upload(&bucket, &path, UploadPayload::from(body), options)
        .await
        .map_err(api_error)
}

/// `POST /object/{bucket}/{*path}`: create, honouring `x-upsert`
pub async fn upload_object(
    State(app_state): State<AppState>,
    ApiPath((bucket, path)): ApiPath<(String, String)>,
    headers: HeaderMap,
    ApiBytes(body): ApiBytes,
) -> ApiResult<(StatusCode, Json<FileRecord>)> {
    let record = store_object(&app_state, bucket, path, &headers, body, false).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `PUT /object/{bucket}/{*path}`: create or replace
pub async fn update_object(
    State(app_state): State<AppState>,
    ApiPath((bucket, path)): ApiPath<(String, String)>,
    headers: HeaderMap,
    ApiBytes(body): ApiBytes,
) -> ApiResult<Json<FileRecord>> {
    let record = store_object(&app_state, bucket, path, &headers, body, true).await?;
    Ok(Json(record))
}

/// Content plus the headers describing it
pub(crate) async fn object_response(
    app_state: &AppState,
    bucket: &BucketName,
    path: &ObjectPath,
) -> ApiResult<Response> {
    let service = &app_state.storage_service;

    let record = service
        .get_file_info(bucket, path)
        .await
        .map_err(api_error)?
        .ok_or_else(|| api_error(StorageError::file_not_found(bucket.as_str(), path.as_str())))?;
    let data = service.download(bucket, path).await.map_err(api_error)?;

    let mut response = (
        [
            (header::CONTENT_TYPE, record.mime_type.clone()),
            (header::ETAG, format!("\"{}\"", record.etag)),
        ],
        Body::from(data),
    )
        .into_response();

    if let Some(cache_control) = record
        .cache_control
        .as_deref()
        .and_then(|value| value.parse::<HeaderValue>().ok())
    {
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, cache_control);
    }

    Ok(response)
}

pub async fn download_object(
    State(app_state): State<AppState>,
    ApiPath((bucket, path)): ApiPath<(String, String)>,
) -> ApiResult<Response> {
    let (bucket, path) = object_location(bucket, path)?;
    object_response(&app_state, &bucket, &path).await
}

pub async fn delete_object(
    State(app_state): State<AppState>,
    ApiPath((bucket, path)): ApiPath<(String, String)>,
) -> ApiResult<Json<MessageResponseDto>> {
    let (bucket, path) = object_location(bucket, path)?;

    app_state
        .storage_service
        .delete(&bucket, DeleteTarget::Single(path))
        .await
        .map_err(api_error)?;

    Ok(Json(MessageResponseDto::new("Successfully deleted")))
}

pub async fn get_object_info(
    State(app_state): State<AppState>,
    ApiPath((bucket, path)): ApiPath<(String, String)>,
) -> ApiResult<Json<FileRecord>> {
    let (bucket, path) = object_location(bucket, path)?;

    app_state
        .storage_service
        .get_file_info(&bucket, &path)
        .await
        .map_err(api_error)?
        .map(Json)
        .ok_or_else(|| api_error(StorageError::file_not_found(bucket.as_str(), path.as_str())))
}

pub async fn list_objects(
    State(app_state): State<AppState>,
    ApiPath(bucket): ApiPath<String>,
    ApiJson(options): ApiJson<ListOptions>,
) -> ApiResult<Json<ListResult>> {
    let bucket = parse_bucket(bucket)?;

    let result = app_state
        .storage_service
        .list(&bucket, options)
        .await
        .map_err(api_error)?;

    Ok(Json(result))
}

/// `POST /remove/{bucket}`: all listed paths or none
pub async fn remove_objects(
    State(app_state): State<AppState>,
    ApiPath(bucket): ApiPath<String>,
    ApiJson(body): ApiJson<RemoveObjectsDto>,
) -> ApiResult<Json<MessageResponseDto>> {
    let bucket = parse_bucket(bucket)?;
    let paths = body
        .prefixes
        .into_iter()
        .map(parse_path)
        .collect::<ApiResult<Vec<_>>>()?;
    let count = paths.len();

    app_state
        .storage_service
        .delete(&bucket, DeleteTarget::Many(paths))
        .await
        .map_err(api_error)?;

    Ok(Json(MessageResponseDto::new(format!(
        "Deleted {} object(s)",
        count
    ))))
}

pub async fn move_object(
    State(app_state): State<AppState>,
    ApiJson(body): ApiJson<TransferObjectDto>,
) -> ApiResult<Json<FileRecord>> {
    let bucket = parse_bucket(body.bucket_id)?;
    let from = parse_path(body.source_key)?;
    let to = parse_path(body.destination_key)?;

    let record = app_state
        .storage_service
        .move_file(&bucket, &from, &to)
        .await
        .map_err(api_error)?;

    Ok(Json(record))
}

pub async fn copy_object(
    State(app_state): State<AppState>,
    ApiJson(body): ApiJson<TransferObjectDto>,
) -> ApiResult<Json<FileRecord>> {
    let bucket = parse_bucket(body.bucket_id)?;
    let from = parse_path(body.source_key)?;
    let to = parse_path(body.destination_key)?;

    let record = app_state
        .storage_service
        .copy_file(&bucket, &from, &to)
        .await
        .map_err(api_error)?;

    Ok(Json(record))
}

/// `GET /public/{bucket}/{*path}`: objects of public buckets only
pub async fn serve_public_object(
    State(app_state): State<AppState>,
    ApiPath((bucket, path)): ApiPath<(String, String)>,
) -> ApiResult<Response> {
    let (bucket, path) = object_location(bucket, path)?;

    let is_public = app_state
        .storage_service
        .get_bucket(&bucket)
        .await
        .map_err(api_error)?
        .map(|bucket| bucket.public)
        .unwrap_or(false);

    // Private objects are indistinguishable from missing ones here
    if !is_public {
        return Err(api_error(StorageError::file_not_found(
            bucket.as_str(),
            path.as_str(),
        )));
    }

    object_response(&app_state, &bucket, &path).await
}
