pub mod app_config;
pub mod database;
pub mod events;
pub mod memory;
pub mod redis_repo;

pub use database::{DbClient, PgStore};
pub use events::EventProducer;
pub use memory::InMemoryStore;
pub use redis_repo::RedisClient;
