use serde::Deserialize;
use std::collections::HashSet;
use tracing::debug;
use validator::{Validate, ValidationError};

use crate::cache::CacheService;
use crate::models::{NewOrder, Order};
use crate::services::ticket::generate_ticket_code;
use crate::store::{OrderStore, ReservationError, ReservationResult};

/// Body of `POST /api/orders`. `user_id` may be omitted; the owner is always
/// the authenticated caller.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub user_id: Option<i32>,
    #[validate(range(min = 1, message = "schedule_id must be positive"))]
    pub schedule_id: i32,
    #[validate(range(min = 1, message = "payment_id must be positive"))]
    pub payment_id: i32,
    #[validate(length(min = 1, max = 255, message = "fullname is required"))]
    pub fullname: String,
    #[validate(email(message = "email is not valid"))]
    pub email: String,
    #[validate(length(min = 6, max = 30, message = "phone must be 6 to 30 characters"))]
    pub phone: String,
    #[validate(
        length(min = 1, message = "at least one seat must be selected"),
        custom(function = "distinct_positive_ids")
    )]
    pub seat_ids: Vec<i32>,
}

#[allow(clippy::ptr_arg)]
fn distinct_positive_ids(ids: &Vec<i32>) -> Result<(), ValidationError> {
    if ids.iter().any(|id| *id <= 0) {
        return Err(ValidationError::new("seat_ids").with_message("seat ids must be positive".into()));
    }
    let mut seen = HashSet::with_capacity(ids.len());
    if !ids.iter().all(|id| seen.insert(*id)) {
        return Err(ValidationError::new("seat_ids").with_message("seat ids must be distinct".into()));
    }
    Ok(())
}

impl CreateOrderRequest {
    // Contact fields are stored trimmed, so they are validated trimmed.
    fn trimmed(mut self) -> Self {
        for field in [&mut self.fullname, &mut self.email, &mut self.phone] {
            *field = field.trim().to_string();
        }
        self
    }
}

/// Validates the request, creates the order with its seat links, and reads it
/// back with seats attached. Nothing reaches the store when validation fails.
pub async fn place_order(
    orders: &dyn OrderStore,
    cache: Option<&CacheService>,
    owner_id: i32,
    request: CreateOrderRequest,
) -> ReservationResult<Order> {
    let request = request.trimmed();
    request
        .validate()
        .map_err(|e| ReservationError::Validation(e.to_string()))?;

    let new_order = NewOrder {
        ticket_code: generate_ticket_code(owner_id, request.schedule_id),
        user_id: owner_id,
        schedule_id: request.schedule_id,
        payment_id: request.payment_id,
        fullname: request.fullname,
        email: request.email,
        phone: request.phone,
    };

    let created = orders.create_order(new_order, &request.seat_ids).await?;

    if let Some(cache) = cache {
        cache.invalidate_available_seats(created.schedule_id).await;
    }

    debug!(order_id = created.id, "reading back created order");
    orders.order_by_id(created.id).await
}
