pub mod admin;
pub mod auth;
pub mod movies;
pub mod orders;
pub mod profile;

use axum::Json;
use axum::Router;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(auth::routes())
        .merge(movies::routes())
        .merge(admin::routes())
        .merge(orders::routes())
        .merge(profile::routes())
}

// Success envelope shared by every handler.
pub(crate) fn success<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}
