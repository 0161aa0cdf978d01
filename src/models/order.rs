use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Seat;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i32,
    pub ticket_code: String,
    pub user_id: i32,
    pub schedule_id: i32,
    pub payment_id: i32,
    pub fullname: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    #[sqlx(skip)]
    pub seats: Vec<Seat>,
}

impl Order {
    pub fn seat_ids(&self) -> Vec<i32> {
        self.seats.iter().map(|s| s.id).collect()
    }
}

/// Header fields of an order that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub ticket_code: String,
    pub user_id: i32,
    pub schedule_id: i32,
    pub payment_id: i32,
    pub fullname: String,
    pub email: String,
    pub phone: String,
}
