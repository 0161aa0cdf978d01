use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::{header, request::Parts},
    Json,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use validator::Validate;

use crate::error::AppError;
use crate::models::Role;
use crate::AppState;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Owner of a resource, or an admin.
    pub fn can_access(&self, owner_id: i32) -> bool {
        self.is_admin() || self.user_id == owner_id
    }
}

// Bearer token extractor
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("please log in first".to_string()))?;

        let token = header_value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized("please log in first".to_string()))?;

        let claims = state.tokens.verify(token).map_err(|e| {
            tracing::debug!("bearer token rejected: {}", e);
            AppError::Unauthorized("please log in again".to_string())
        })?;

        Ok(AuthUser {
            user_id: claims.id,
            role: claims.role,
        })
    }
}

/// Authenticated caller holding the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            tracing::warn!(user_id = user.user_id, "admin route refused");
            return Err(AppError::Forbidden("admin access required".to_string()));
        }
        Ok(AdminUser(user))
    }
}

/// `Json<T>` whose rejection speaks the API's error format.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| {
                tracing::debug!("request body rejected: {}", rejection.body_text());
                AppError::BadRequest("invalid request body".to_string())
            })?;
        Ok(ApiJson(value))
    }
}

/// JSON body that has also passed its `validator` rules.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let ApiJson(value) = ApiJson::<T>::from_request(req, state).await?;
        value
            .validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        Ok(ValidatedJson(value))
    }
}

/// Parses a numeric path segment, answering 400 with `invalid <what> id`.
pub fn parse_id(raw: &str, what: &str) -> Result<i32, AppError> {
    raw.parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::BadRequest(format!("invalid {} id", what)))
}
