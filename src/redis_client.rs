use redis::{aio::ConnectionManager, Client};
use tracing::info;

/// Shared Redis handle. `ConnectionManager` reconnects on its own, so a Redis
/// restart only costs a few cache misses.
#[derive(Clone)]
pub struct RedisClient {
    pub conn: ConnectionManager,
}

impl RedisClient {
    pub async fn connect(redis_url: &str) -> redis::RedisResult<Self> {
        let client = Client::open(redis_url)?;
        let mut conn = client.get_connection_manager().await?;

        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        info!(reply = %pong, "Redis connection established");

        Ok(RedisClient { conn })
    }
}
