use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::{OrderStore, ReservationError, ReservationResult, SeatAvailability};
use crate::models::{NewOrder, Order, Seat};

// First key of pg_advisory_xact_lock(int, int); the schedule id is the second.
const SCHEDULE_LOCK_CLASS: i32 = 0x5EA7;

const ORDER_COLUMNS: &str = "id, ticket_code, users_id AS user_id, schedules_id AS schedule_id, \
     payments_id AS payment_id, fullname, email, phone_number AS phone, created_at, updated_at";

#[derive(Clone)]
pub struct PgReservationStore {
    pool: PgPool,
}

impl PgReservationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn lock_schedule(tx: &mut Transaction<'_, Postgres>, schedule_id: i32) -> sqlx::Result<()> {
        sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
            .bind(SCHEDULE_LOCK_CLASS)
            .bind(schedule_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn taken_seats(
        tx: &mut Transaction<'_, Postgres>,
        schedule_id: i32,
        seat_ids: &[i32],
    ) -> sqlx::Result<Vec<i32>> {
        sqlx::query_scalar::<_, i32>(
            "SELECT DISTINCT os.seats_id
             FROM orders_seats os
             INNER JOIN orders o ON o.id = os.orders_id
             WHERE o.schedules_id = $1 AND os.seats_id = ANY($2)
             ORDER BY os.seats_id",
        )
        .bind(schedule_id)
        .bind(seat_ids)
        .fetch_all(&mut **tx)
        .await
    }

    async fn seats_of(&self, order_id: i32) -> sqlx::Result<Vec<Seat>> {
        sqlx::query_as::<_, Seat>(
            "SELECT s.id, s.seat_code
             FROM seats s
             INNER JOIN orders_seats os ON os.seats_id = s.id
             WHERE os.orders_id = $1
             ORDER BY s.seat_code ASC",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
    }
}

#[async_trait]
impl OrderStore for PgReservationStore {
    async fn create_order(&self, order: NewOrder, seat_ids: &[i32]) -> ReservationResult<Order> {
        // Dropping `tx` on any early return rolls it back.
        let mut tx = self.pool.begin().await?;

        Self::lock_schedule(&mut tx, order.schedule_id).await?;

        let taken = Self::taken_seats(&mut tx, order.schedule_id, seat_ids).await?;
        if !taken.is_empty() {
            warn!(schedule_id = order.schedule_id, seats = ?taken, "seats already booked");
            return Err(ReservationError::SeatsTaken {
                schedule_id: order.schedule_id,
                seat_ids: taken,
            });
        }

        let insert = format!(
            "INSERT INTO orders (ticket_code, users_id, schedules_id, payments_id, fullname, email, phone_number, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
             RETURNING {ORDER_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Order>(&insert)
            .bind(&order.ticket_code)
            .bind(order.user_id)
            .bind(order.schedule_id)
            .bind(order.payment_id)
            .bind(&order.fullname)
            .bind(&order.email)
            .bind(&order.phone)
            .fetch_one(&mut *tx)
            .await?;

        for seat_id in seat_ids {
            sqlx::query("INSERT INTO orders_seats (orders_id, seats_id) VALUES ($1, $2)")
                .bind(created.id)
                .bind(seat_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    debug!(order_id = created.id, seat_id, error = %e, "seat link insert failed");
                    e
                })?;
        }

        tx.commit().await?;

        info!(
            order_id = created.id,
            schedule_id = created.schedule_id,
            seats = seat_ids.len(),
            "order created"
        );
        Ok(created)
    }

    async fn order_by_id(&self, id: i32) -> ReservationResult<Order> {
        let select = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let mut order = sqlx::query_as::<_, Order>(&select)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ReservationError::NotFound { resource: "order", id })?;

        order.seats = self.seats_of(id).await?;
        Ok(order)
    }

    async fn orders_by_user(&self, user_id: i32) -> ReservationResult<Vec<Order>> {
        let select = format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE users_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        let mut orders = sqlx::query_as::<_, Order>(&select)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        if orders.is_empty() {
            return Ok(orders);
        }

        // One join for all seat lists instead of a query per order.
        let ids: Vec<i32> = orders.iter().map(|o| o.id).collect();
        let rows: Vec<(i32, i32, String)> = sqlx::query_as(
            "SELECT os.orders_id, s.id, s.seat_code
             FROM seats s
             INNER JOIN orders_seats os ON os.seats_id = s.id
             WHERE os.orders_id = ANY($1)
             ORDER BY s.seat_code ASC",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut seats: HashMap<i32, Vec<Seat>> = HashMap::new();
        for (order_id, id, seat_code) in rows {
            seats.entry(order_id).or_default().push(Seat { id, seat_code });
        }
        for order in &mut orders {
            order.seats = seats.remove(&order.id).unwrap_or_default();
        }
        Ok(orders)
    }
}

#[async_trait]
impl SeatAvailability for PgReservationStore {
    async fn available_seats(&self, schedule_id: i32) -> ReservationResult<Vec<Seat>> {
        let seats = sqlx::query_as::<_, Seat>(
            "SELECT s.id, s.seat_code
             FROM seats s
             WHERE NOT EXISTS (
                 SELECT 1
                 FROM orders_seats os
                 INNER JOIN orders o ON o.id = os.orders_id
                 WHERE o.schedules_id = $1 AND os.seats_id = s.id
             )
             ORDER BY s.seat_code ASC",
        )
        .bind(schedule_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(seats)
    }
}
