use crate::redis_client::RedisClient;

pub mod seats;

/// Redis-backed read cache. Every failure is logged and treated as a miss;
/// Postgres stays the source of truth.
#[derive(Clone)]
pub struct CacheService {
    redis: RedisClient,
    seats_ttl_seconds: u64,
}

impl CacheService {
    pub fn new(redis: RedisClient, seats_ttl_seconds: u64) -> Self {
        Self { redis, seats_ttl_seconds }
    }
}
