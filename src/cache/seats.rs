use redis::AsyncCommands;
use tracing::{debug, warn};

use crate::cache::CacheService;
use crate::models::Seat;

// Bumped on every committed order for the schedule. Seat lists are stored
// under the generation that was current before they were read, so a list
// read before an order commits can only land under a dead key.
pub fn seats_generation_key(schedule_id: i32) -> String {
    format!("seats:gen:{}", schedule_id)
}

pub fn available_seats_key(schedule_id: i32, generation: u64) -> String {
    format!("seats:available:{}:{}", schedule_id, generation)
}

impl CacheService {
    /// Current generation of the schedule's seat list; `None` when Redis is
    /// unreachable, in which case callers skip the cache entirely.
    pub async fn seats_generation(&self, schedule_id: i32) -> Option<u64> {
        let mut conn = self.redis.conn.clone();
        let result: redis::RedisResult<Option<u64>> = conn.get(seats_generation_key(schedule_id)).await;
        match result {
            Ok(generation) => Some(generation.unwrap_or(0)),
            Err(e) => {
                warn!("seat generation read failed for schedule {}: {:?}", schedule_id, e);
                None
            }
        }
    }

    // Cached list of free seats for a schedule, if present and readable.
    pub async fn get_available_seats(&self, schedule_id: i32, generation: u64) -> Option<Vec<Seat>> {
        let mut conn = self.redis.conn.clone();
        let key = available_seats_key(schedule_id, generation);
        let data: Option<String> = match conn.get(&key).await {
            Ok(data) => data,
            Err(e) => {
                warn!("seat cache read failed for schedule {}: {:?}", schedule_id, e);
                return None;
            }
        };

        match serde_json::from_str(&data?) {
            Ok(seats) => {
                debug!("seat cache hit for schedule {} (generation {})", schedule_id, generation);
                Some(seats)
            }
            Err(e) => {
                warn!("discarding unreadable seat cache entry {}: {}", key, e);
                None
            }
        }
    }

    pub async fn save_available_seats(&self, schedule_id: i32, generation: u64, seats: &[Seat]) {
        let data = match serde_json::to_string(seats) {
            Ok(data) => data,
            Err(e) => {
                warn!("failed to serialise seats for schedule {}: {}", schedule_id, e);
                return;
            }
        };
        let mut conn = self.redis.conn.clone();
        let result: Result<(), _> = conn
            .set_ex(available_seats_key(schedule_id, generation), data, self.seats_ttl_seconds)
            .await;
        if let Err(e) = result {
            warn!("seat cache write failed for schedule {}: {:?}", schedule_id, e);
        }
    }

    // Called after every committed order. Entries of older generations are
    // never read again and expire with their TTL.
    pub async fn invalidate_available_seats(&self, schedule_id: i32) {
        let mut conn = self.redis.conn.clone();
        let result: Result<u64, _> = conn.incr(seats_generation_key(schedule_id), 1u64).await;
        match result {
            Ok(generation) => debug!("seat cache for schedule {} now at generation {}", schedule_id, generation),
            Err(e) => warn!("seat cache invalidation failed for schedule {}: {:?}", schedule_id, e),
        }
    }
}
