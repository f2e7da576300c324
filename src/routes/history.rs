use crate::api::models::NewHistoryRecord;
use crate::store::memory::MemoryStore;
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use log::info;
use serde_json::json;
use std::sync::Arc;

pub async fn get_history(Extension(store): Extension<Arc<MemoryStore>>) -> impl IntoResponse {
    (StatusCode::OK, Json(json!(store.history())))
}

pub async fn post_history(
    Json(body): Json<NewHistoryRecord>,
    Extension(store): Extension<Arc<MemoryStore>>,
) -> impl IntoResponse {
    let record = store.insert_history(body);
    info!(
        "Recorded {} {} {} from machine {}",
        record.cup_size, record.beverage, record.temperature, record.machine_id
    );
    (StatusCode::CREATED, Json(json!(record)))
}
