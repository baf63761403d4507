pub mod identifier;
pub mod manager;
pub mod memory;
pub mod populate;
pub mod postgres;
pub mod store;

pub use identifier::next_id;
pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{Document, Store, StoreError, Write};
