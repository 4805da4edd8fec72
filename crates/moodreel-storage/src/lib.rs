pub mod db;
pub mod migrations;
pub mod models;
pub mod store;

pub use db::Database;
pub use models::KvEntry;
pub use store::{KeyValueStore, MemoryStore};
