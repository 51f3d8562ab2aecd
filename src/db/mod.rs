//! Database layer: account store trait, PostgreSQL pool and repository, in-process store.

mod memory;
mod pool;
mod repositories;
mod store;

pub use memory::InMemoryAccountStore;
pub use pool::{create_pool, run_migrations, DbPool};
pub use repositories::{AccountRow, PgAccountStore};
pub use store::AccountStore;
