use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::error::{is_unique_violation, ApiResult, AppError};
use crate::middleware::ValidatedJson;
use crate::models::{Profile, User};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "email is not valid"))]
    pub email: String,
    #[validate(length(min = 8, max = 72, message = "password must be 8 to 72 characters"))]
    pub password: String,
    #[validate(length(max = 100))]
    pub firstname: Option<String>,
    #[validate(length(max = 100))]
    pub lastname: Option<String>,
    #[validate(length(max = 30))]
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "email is not valid"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

// POST /api/auth/register
async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let email = body.email.trim().to_lowercase();
    let hash = state.passwords.hash(&body.password).await?;

    let profile = Profile {
        user_id: 0,
        firstname: body.firstname,
        lastname: body.lastname,
        phone_number: body.phone_number,
    };

    let (user, profile) = match User::register(&state.db, &email, &hash, &profile).await {
        Ok(created) => created,
        Err(e) if is_unique_violation(&e) => {
            return Err(AppError::Conflict("email already exists".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "register success",
            "data": {
                "id": user.id,
                "email": user.email,
                "role": user.role,
                "firstname": profile.firstname,
                "lastname": profile.lastname,
                "phone": profile.phone_number,
            }
        })),
    ))
}

// POST /api/auth/login
async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let invalid = || AppError::Unauthorized("invalid email or password".to_string());

    let email = body.email.trim().to_lowercase();
    let user = User::find_by_email(&email, &state.db).await?.ok_or_else(|| {
        tracing::debug!("login for unknown email");
        invalid()
    })?;

    if !state.passwords.verify(&body.password, &user.password).await? {
        tracing::debug!(user_id = user.id, "login with wrong password");
        return Err(invalid());
    }

    let token = state.tokens.issue(user.id, user.role)?;

    Ok(Json(json!({
        "success": true,
        "message": "login success",
        "data": {
            "token": token,
            "user": {
                "id": user.id,
                "email": user.email,
                "role": user.role,
            }
        }
    })))
}
