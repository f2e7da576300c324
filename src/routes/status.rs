use super::not_found;
use crate::api::models::{BrewStatus, NewBrewStatus};
use crate::store::memory::MemoryStore;
use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use log::debug;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    #[serde(rename = "cafeteraId")]
    pub machine_id: Option<String>,
}

pub async fn get_statuses(
    Query(filter): Query<StatusFilter>,
    Extension(store): Extension<Arc<MemoryStore>>,
) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!(store.statuses(filter.machine_id.as_deref()))),
    )
}

pub async fn get_status(
    Path(id): Path<String>,
    Extension(store): Extension<Arc<MemoryStore>>,
) -> impl IntoResponse {
    match store.status(&id) {
        Some(status) => (StatusCode::OK, Json(json!(status))),
        None => not_found("Status", &id),
    }
}

pub async fn post_status(
    Json(body): Json<NewBrewStatus>,
    Extension(store): Extension<Arc<MemoryStore>>,
) -> impl IntoResponse {
    let status = store.insert_status(body);
    (StatusCode::CREATED, Json(json!(status)))
}

/// Whole-record replace.
pub async fn put_status(
    Path(id): Path<String>,
    Json(body): Json<BrewStatus>,
    Extension(store): Extension<Arc<MemoryStore>>,
) -> impl IntoResponse {
    match store.put_status(&id, body) {
        Some(status) => {
            debug!(
                "Status {} of machine {} is now {} at {}%",
                status.id, status.machine_id, status.stage, status.progress
            );
            (StatusCode::OK, Json(json!(status)))
        }
        None => not_found("Status", &id),
    }
}

pub async fn delete_status(
    Path(id): Path<String>,
    Extension(store): Extension<Arc<MemoryStore>>,
) -> impl IntoResponse {
    match store.remove_status(&id) {
        Some(status) => (StatusCode::OK, Json(json!(status))),
        None => not_found("Status", &id),
    }
}
