use axum::{
    extract::State,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use super::success;
use crate::error::{ApiResult, AppError};
use crate::middleware::{AuthUser, ValidatedJson};
use crate::models::Profile;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/profile", get(get_profile).put(update_profile))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 100))]
    pub firstname: Option<String>,
    #[validate(length(max = 100))]
    pub lastname: Option<String>,
    #[validate(length(max = 30))]
    pub phone_number: Option<String>,
}

// GET /api/profile
async fn get_profile(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let profile = Profile::find(user.user_id, &state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("profile not found".to_string()))?;
    Ok(success(profile))
}

// PUT /api/profile
async fn update_profile(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(body): ValidatedJson<UpdateProfileRequest>,
) -> ApiResult<impl IntoResponse> {
    let profile = Profile {
        user_id: user.user_id,
        firstname: body.firstname,
        lastname: body.lastname,
        phone_number: body.phone_number,
    };

    if !profile.replace(&state.db).await? {
        return Err(AppError::NotFound("profile not found".to_string()));
    }

    Ok(Json(json!({ "success": true, "message": "profile updated", "data": profile })))
}
