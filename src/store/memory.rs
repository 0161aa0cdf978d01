use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::{OrderStore, ReservationError, ReservationResult, SeatAvailability};
use crate::models::{NewOrder, Order, Seat};

/// In-process reservation backend.
///
/// A single lock covers the whole state, so every `create_order` is
/// serialised and all checks run before anything is written.
#[derive(Default)]
pub struct MemoryReservationStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    seats: BTreeMap<i32, Seat>,
    orders: BTreeMap<i32, Order>,
    links: BTreeSet<(i32, i32)>,
    next_order_id: i32,
}

impl MemoryReservationStore {
    /// Store with one seat per code, ids assigned from 1 in the given order.
    pub fn with_seats<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let seats = codes
            .into_iter()
            .zip(1..)
            .map(|(code, id)| (id, Seat { id, seat_code: code.into() }))
            .collect();

        Self {
            inner: Mutex::new(Inner { seats, ..Inner::default() }),
        }
    }

    pub fn seat_by_code(&self, code: &str) -> Option<Seat> {
        self.inner
            .lock()
            .seats
            .values()
            .find(|s| s.seat_code == code)
            .cloned()
    }

    pub fn order_count(&self) -> usize {
        self.inner.lock().orders.len()
    }
}

impl Inner {
    fn seats_of(&self, order_id: i32) -> Vec<Seat> {
        let mut seats: Vec<Seat> = self
            .links
            .range((order_id, i32::MIN)..=(order_id, i32::MAX))
            .filter_map(|(_, seat_id)| self.seats.get(seat_id).cloned())
            .collect();
        seats.sort_by(|a, b| a.seat_code.cmp(&b.seat_code));
        seats
    }

    fn booked_for(&self, schedule_id: i32) -> HashSet<i32> {
        self.links
            .iter()
            .filter(|(order_id, _)| {
                self.orders
                    .get(order_id)
                    .is_some_and(|o| o.schedule_id == schedule_id)
            })
            .map(|(_, seat_id)| *seat_id)
            .collect()
    }

    fn hydrated(&self, order: &Order) -> Order {
        let mut order = order.clone();
        order.seats = self.seats_of(order.id);
        order
    }
}

#[async_trait]
impl OrderStore for MemoryReservationStore {
    async fn create_order(&self, order: NewOrder, seat_ids: &[i32]) -> ReservationResult<Order> {
        let mut inner = self.inner.lock();

        let booked = inner.booked_for(order.schedule_id);
        let mut taken: Vec<i32> = seat_ids.iter().copied().filter(|id| booked.contains(id)).collect();
        if !taken.is_empty() {
            taken.sort_unstable();
            taken.dedup();
            return Err(ReservationError::SeatsTaken {
                schedule_id: order.schedule_id,
                seat_ids: taken,
            });
        }

        let mut seen = HashSet::with_capacity(seat_ids.len());
        for seat_id in seat_ids {
            if !inner.seats.contains_key(seat_id) {
                return Err(ReservationError::Persistence(anyhow!(
                    "insert into orders_seats violates foreign key: seat {seat_id} does not exist"
                )));
            }
            if !seen.insert(*seat_id) {
                return Err(ReservationError::Persistence(anyhow!(
                    "duplicate key in orders_seats: seat {seat_id} listed twice"
                )));
            }
        }

        inner.next_order_id += 1;
        let id = inner.next_order_id;
        let created = Order {
            id,
            ticket_code: order.ticket_code,
            user_id: order.user_id,
            schedule_id: order.schedule_id,
            payment_id: order.payment_id,
            fullname: order.fullname,
            email: order.email,
            phone: order.phone,
            created_at: Utc::now(),
            updated_at: None,
            seats: Vec::new(),
        };
        inner.orders.insert(id, created.clone());
        inner.links.extend(seat_ids.iter().map(|seat_id| (id, *seat_id)));

        Ok(created)
    }

    async fn order_by_id(&self, id: i32) -> ReservationResult<Order> {
        let inner = self.inner.lock();
        inner
            .orders
            .get(&id)
            .map(|o| inner.hydrated(o))
            .ok_or(ReservationError::NotFound { resource: "order", id })
    }

    async fn orders_by_user(&self, user_id: i32) -> ReservationResult<Vec<Order>> {
        let inner = self.inner.lock();
        let mut orders: Vec<Order> = inner
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .map(|o| inner.hydrated(o))
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }
}

#[async_trait]
impl SeatAvailability for MemoryReservationStore {
    async fn available_seats(&self, schedule_id: i32) -> ReservationResult<Vec<Seat>> {
        let inner = self.inner.lock();
        let booked = inner.booked_for(schedule_id);
        let mut seats: Vec<Seat> = inner
            .seats
            .values()
            .filter(|s| !booked.contains(&s.id))
            .cloned()
            .collect();
        seats.sort_by(|a, b| a.seat_code.cmp(&b.seat_code));
        Ok(seats)
    }
}
