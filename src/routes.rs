use crate::store::memory::MemoryStore;
use axum::extract::Extension;
use axum::http::{Method, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod beverages;
pub mod history;
pub mod machines;
pub mod status;

/// Development record store speaking the same JSON as the hosted one.
pub fn router(store: Arc<MemoryStore>) -> Router {
    Router::new()
        .route(
            "/cafeteras",
            get(machines::get_machines).post(machines::post_machine),
        )
        .route(
            "/cafeteras/:id",
            get(machines::get_machine)
                .put(machines::put_machine)
                .delete(machines::delete_machine),
        )
        .route(
            "/cafetera_status",
            get(status::get_statuses).post(status::post_status),
        )
        .route(
            "/cafetera_status/:id",
            get(status::get_status)
                .put(status::put_status)
                .delete(status::delete_status),
        )
        .route(
            "/bebidas",
            get(beverages::get_beverages).post(beverages::post_beverage),
        )
        .route(
            "/bebidas/:id",
            get(beverages::get_beverage).delete(beverages::delete_beverage),
        )
        .route(
            "/historial",
            get(history::get_history).post(history::post_history),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(cors::Any)
                        .allow_methods(vec![Method::GET, Method::POST, Method::PUT, Method::DELETE])
                        .allow_headers(cors::Any),
                )
                .layer(Extension(store)),
        )
}

pub(crate) fn not_found(kind: &str, id: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "message": format!("{} {} was not found", kind, id),
            "errorCode": 404
        })),
    )
}
