pub mod user_repo;
pub use user_repo::UserRepository;
pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod item_repo;
pub use item_repo::ItemRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;

pub mod store;
pub use store::{PgStore, Store};
pub mod memory_store;
pub use memory_store::MemoryStore;
