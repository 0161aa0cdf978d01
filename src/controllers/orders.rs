use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::success;
use crate::error::{ApiResult, AppError};
use crate::middleware::{parse_id, ApiJson, AuthUser};
use crate::services::orders::{place_order, CreateOrderRequest};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/{id}", get(get_order))
        .route("/orders/user/{user_id}", get(get_user_orders))
}

// POST /api/orders
async fn create_order(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(req): ApiJson<CreateOrderRequest>,
) -> ApiResult<impl IntoResponse> {
    let owner_id = req.user_id.unwrap_or(user.user_id);
    if !user.can_access(owner_id) {
        return Err(AppError::Forbidden("cannot place an order for another user".to_string()));
    }

    let order = place_order(state.orders.as_ref(), state.cache.as_ref(), owner_id, req).await?;

    Ok((StatusCode::CREATED, success(order)))
}

// GET /api/orders/{id}
async fn get_order(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "order")?;
    let order = state.orders.order_by_id(id).await?;

    // Someone else's order is reported as missing rather than forbidden.
    if !user.can_access(order.user_id) {
        return Err(AppError::NotFound("order not found".to_string()));
    }

    Ok(success(order))
}

// GET /api/orders/user/{user_id}
async fn get_user_orders(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(user_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let user_id = parse_id(&user_id, "user")?;
    if !user.can_access(user_id) {
        return Err(AppError::Forbidden("cannot read another user's orders".to_string()));
    }

    let orders = state.orders.orders_by_user(user_id).await?;
    Ok(success(orders))
}
