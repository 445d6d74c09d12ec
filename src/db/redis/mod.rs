use redis::Client;

pub mod trending;

pub use trending::RedisTrendingStore;
pub use trending::TrendingKey;

/// Creates a Redis client for the trending counters.
///
/// Opening the client does not connect; the first command does.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}
