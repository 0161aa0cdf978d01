//! Reservation core: persisting orders with their seats and answering which
//! seats of a schedule are still free.
//!
//! Two backends implement the traits below. [`PgReservationStore`] is what the
//! server runs on; [`MemoryReservationStore`] keeps everything in-process and
//! enforces the same seat foreign key, link primary key and occupancy rules.
//!
//! Occupancy invariant: for a given schedule a seat id is linked to at most one
//! order. `create_order` checks the requested seats against the links already
//! committed for the schedule while holding a per-schedule lock, and fails
//! with [`ReservationError::SeatsTaken`] instead of double-booking.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewOrder, Order, Seat};

pub mod memory;
pub mod postgres;

pub use memory::MemoryReservationStore;
pub use postgres::PgReservationStore;

#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: i32 },

    #[error("seats {seat_ids:?} are already booked for schedule {schedule_id}")]
    SeatsTaken { schedule_id: i32, seat_ids: Vec<i32> },

    #[error("persistence failure: {0}")]
    Persistence(#[source] anyhow::Error),
}

impl From<sqlx::Error> for ReservationError {
    fn from(err: sqlx::Error) -> Self {
        ReservationError::Persistence(err.into())
    }
}

pub type ReservationResult<T> = Result<T, ReservationError>;

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists the header and one link row per seat as a single unit. Either
    /// everything is committed or nothing is visible afterwards. Seat ids are
    /// not deduplicated; a repeated id violates the link key and aborts.
    /// The returned order carries its generated id and creation time but no
    /// seats; read it back with [`OrderStore::order_by_id`].
    async fn create_order(&self, order: NewOrder, seat_ids: &[i32]) -> ReservationResult<Order>;

    /// Header plus its seats sorted by seat code.
    async fn order_by_id(&self, id: i32) -> ReservationResult<Order>;

    /// Every order of the user, newest first, each with its seats. A user
    /// without orders gets an empty vector.
    async fn orders_by_user(&self, user_id: i32) -> ReservationResult<Vec<Order>>;
}

#[async_trait]
pub trait SeatAvailability: Send + Sync {
    /// Seats not linked to any order of the schedule, sorted by seat code.
    /// A snapshot: nothing is held for the caller.
    async fn available_seats(&self, schedule_id: i32) -> ReservationResult<Vec<Seat>>;
}
