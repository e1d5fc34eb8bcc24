// Service exports
pub mod appwrite;
pub mod cache;
pub mod memory;
pub mod postgres;
pub mod store;

pub use appwrite::{AppwriteClient, AppwriteError};
pub use cache::{CacheError, CacheKey, CacheManager};
pub use memory::{MemoryStore, MemoryTransaction};
pub use postgres::{PgStoreTransaction, PostgresStore};
pub use store::{StorageError, Store, StoreTransaction};
