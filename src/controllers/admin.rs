use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use super::success;
use crate::error::{is_foreign_key_violation, ApiResult, AppError};
use crate::middleware::{parse_id, AdminUser, ValidatedJson};
use crate::models::{Movie, MovieUpdate};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/movies", get(all_movies))
        .route("/admin/movies/{id}", put(update_movie).delete(delete_movie))
}

// GET /api/admin/movies
async fn all_movies(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> ApiResult<impl IntoResponse> {
    let movies = Movie::all(&state.db).await?;
    Ok(success(movies))
}

// PUT /api/admin/movies/{id}
async fn update_movie(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    ValidatedJson(update): ValidatedJson<MovieUpdate>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "movie")?;
    if !Movie::update(&state.db, id, &update).await? {
        return Err(AppError::NotFound("movie not found".to_string()));
    }
    tracing::info!(movie_id = id, admin_id = admin.user_id, "movie updated");
    Ok(Json(json!({ "success": true, "message": "movie updated" })))
}

// DELETE /api/admin/movies/{id}
async fn delete_movie(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "movie")?;
    match Movie::delete(&state.db, id).await {
        Ok(true) => {
            tracing::info!(movie_id = id, admin_id = admin.user_id, "movie deleted");
            Ok(Json(json!({ "success": true, "message": "movie deleted" })))
        }
        Ok(false) => Err(AppError::NotFound("movie not found".to_string())),
        Err(e) if is_foreign_key_violation(&e) => Err(AppError::Conflict(
            "movie has orders on its schedules and cannot be deleted".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}
