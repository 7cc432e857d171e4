use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers::{
    copy_object, create_bucket, create_signed_upload_url, create_signed_url, delete_bucket,
    delete_object, download_object, get_bucket, get_capabilities, get_object_info, get_public_url, health,
    list_buckets, list_objects, move_object, remove_objects, serve_public_object, update_object,
    upload_object,
};
use crate::{ports::services::StorageService, services::StorageServiceImpl};

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub storage_service: Arc<dyn StorageService>,
}

impl AppState {
    pub fn new(storage_service: Arc<dyn StorageService>) -> Self {
        Self { storage_service }
    }
}

impl From<StorageServiceImpl> for AppState {
    fn from(service: StorageServiceImpl) -> Self {
        Self::new(Arc::new(service))
    }
}

/// Create the main application router with all endpoints
pub fn create_router(state: AppState) -> Router {
    // Bodies above the advertised maximum are cut off before buffering
    let max_body = usize::try_from(state.storage_service.capabilities().files.max_size_bytes)
        .unwrap_or(usize::MAX);

    Router::new()
        .route("/health", get(health))
        .route("/capabilities", get(get_capabilities))
        // Buckets
        .route("/bucket", post(create_bucket).get(list_buckets))
        .route("/bucket/{name}", get(get_bucket).delete(delete_bucket))
        // Objects
        .route(
            "/object/{bucket}/{*path}",
            post(upload_object)
                .put(update_object)
                .get(download_object)
                .delete(delete_object),
        )
        .route("/info/{bucket}/{*path}", get(get_object_info))
        .route("/list/{bucket}", post(list_objects))
        .route("/remove/{bucket}", post(remove_objects))
        .route("/move", post(move_object))
        .route("/copy", post(copy_object))
        // URLs
        .route("/public-url/{bucket}/{*path}", get(get_public_url))
        .route("/signed-url/{bucket}/{*path}", post(create_signed_url))
        .route(
            "/signed-upload-url/{bucket}/{*path}",
            post(create_signed_upload_url),
        )
        .route("/public/{bucket}/{*path}", get(serve_public_object))
        .layer(DefaultBodyLimit::max(max_body))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        // Add state for dependency injection
        .with_state(state)
}
