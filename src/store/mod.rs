//! Persistence layer — per-user conversational memory.

pub mod libsql_backend;
pub mod memory;
pub mod traits;

pub use libsql_backend::LibSqlStore;
pub use memory::InMemoryStore;
pub use traits::{UserHistory, UserHistoryStore};
