use super::not_found;
use crate::api::models::NewBeverage;
use crate::inventory;
use crate::store::memory::MemoryStore;
use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use log::{info, warn};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct BeverageFilter {
    #[serde(rename = "nombre")]
    pub name: Option<String>,
}

pub async fn get_beverages(
    Query(filter): Query<BeverageFilter>,
    Extension(store): Extension<Arc<MemoryStore>>,
) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!(store.beverages(filter.name.as_deref()))),
    )
}

pub async fn get_beverage(
    Path(id): Path<String>,
    Extension(store): Extension<Arc<MemoryStore>>,
) -> impl IntoResponse {
    match store.beverage_by_id(&id) {
        Some(beverage) => (StatusCode::OK, Json(json!(beverage))),
        None => not_found("Beverage", &id),
    }
}

pub async fn post_beverage(
    Json(body): Json<NewBeverage>,
    Extension(store): Extension<Arc<MemoryStore>>,
) -> impl IntoResponse {
    let beverage = match inventory::new_beverage(&body.name, body.coffee_percent, body.milk_percent)
    {
        Ok(beverage) => beverage,
        Err(e) => {
            warn!("Rejecting beverage '{}': {}", body.name, e);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "message": e.to_string(),
                    "errorCode": 400
                })),
            );
        }
    };

    let beverage = store.insert_beverage(beverage);
    info!(
        "Beverage '{}' added with {}% coffee and {}% milk",
        beverage.name, beverage.coffee_percent, beverage.milk_percent
    );
    (StatusCode::CREATED, Json(json!(beverage)))
}

pub async fn delete_beverage(
    Path(id): Path<String>,
    Extension(store): Extension<Arc<MemoryStore>>,
) -> impl IntoResponse {
    match store.remove_beverage(&id) {
        Some(beverage) => (StatusCode::OK, Json(json!(beverage))),
        None => not_found("Beverage", &id),
    }
}
