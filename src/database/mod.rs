pub mod manager;
pub mod memory;
pub mod query_builder;
pub mod repository;
pub mod source;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::{MemorySource, MemoryStore};
pub use repository::{PgStore, ProductRepository, ProductSource, UserChanges, UserRepository, UserSource};
pub use source::PgQuerySource;
