//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod keyed_locks;
pub mod snapshot_store;
pub mod test_dependencies;
pub mod timeout;
pub mod traits;

pub use deps::{KlaviyoAdapter, MedusaGateway, ServerDeps};
pub use keyed_locks::{KeyedLockGuard, KeyedLocks};
pub use snapshot_store::{MemorySnapshotStore, PostgresSnapshotStore};
pub use test_dependencies::TestDependencies;
pub use timeout::with_timeout;
pub use traits::*;
