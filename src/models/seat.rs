use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A physical seat. Seats are shared by every schedule; whether one is taken
/// is derived from the orders placed against a given schedule.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Seat {
    pub id: i32,
    pub seat_code: String,
}
