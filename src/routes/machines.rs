use super::not_found;
use crate::api::models::NewMachine;
use crate::store::memory::MemoryStore;
use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use log::info;
use serde_json::json;
use std::sync::Arc;

pub async fn get_machines(Extension(store): Extension<Arc<MemoryStore>>) -> impl IntoResponse {
    (StatusCode::OK, Json(json!(store.machines())))
}

pub async fn get_machine(
    Path(id): Path<String>,
    Extension(store): Extension<Arc<MemoryStore>>,
) -> impl IntoResponse {
    match store.machine(&id) {
        Some(machine) => (StatusCode::OK, Json(json!(machine))),
        None => not_found("Machine", &id),
    }
}

pub async fn post_machine(
    Json(body): Json<NewMachine>,
    Extension(store): Extension<Arc<MemoryStore>>,
) -> impl IntoResponse {
    let machine = store.insert_machine(body);
    info!("Machine '{}' added with ID {}", machine.name, machine.id);
    (StatusCode::CREATED, Json(json!(machine)))
}

pub async fn put_machine(
    Path(id): Path<String>,
    Json(body): Json<NewMachine>,
    Extension(store): Extension<Arc<MemoryStore>>,
) -> impl IntoResponse {
    match store.update_machine(&id, body) {
        Some(machine) => (StatusCode::OK, Json(json!(machine))),
        None => not_found("Machine", &id),
    }
}

pub async fn delete_machine(
    Path(id): Path<String>,
    Extension(store): Extension<Arc<MemoryStore>>,
) -> impl IntoResponse {
    match store.remove_machine(&id) {
        Some(machine) => {
            info!("Machine '{}' with ID {} deleted", machine.name, machine.id);
            (StatusCode::OK, Json(json!(machine)))
        }
        None => not_found("Machine", &id),
    }
}
