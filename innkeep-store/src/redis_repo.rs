use redis::RedisResult;
use tracing::debug;

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    /// Fixed-window counter. Returns `false` once `key` has been hit more
    /// than `limit` times inside the current window.
    pub async fn check_rate_limit(&self, key: &str, limit: i64, window_seconds: i64) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let (count,): (i64,) = rate_limit_pipeline(key, window_seconds)
            .query_async(&mut conn)
            .await?;

        if count > limit {
            debug!(key, count, limit, "rate limit exceeded");
        }
        Ok(count <= limit)
    }
}

/// `INCR` plus `EXPIRE ... NX`: the TTL is set when the window opens and
/// later hits inside the window leave it alone.
fn rate_limit_pipeline(key: &str, window_seconds: i64) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic()
        .incr(key, 1)
        .cmd("EXPIRE")
        .arg(key)
        .arg(window_seconds)
        .arg("NX")
        .ignore();
    pipe
}
