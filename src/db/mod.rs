pub mod memory;
pub mod redis;

pub use self::memory::InMemoryTrendingStore;
pub use self::redis::create_redis_client;
pub use self::redis::RedisTrendingStore;
