//! Host list persistence.
//!
//! The CLI talks to storage through [`HostStore`], so the on-disk format can
//! change without touching the commands, and tests can run against
//! [`MemoryStore`].

mod file_store;
mod memory_store;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;

use crate::error::StorageResult;
use crate::types::HostList;

/// Durable storage for the host list.
pub trait HostStore {
    /// Load the stored list, or an empty list if nothing has been stored yet.
    fn load(&self) -> StorageResult<HostList>;

    /// Replace the stored list.
    fn save(&self, hosts: &HostList) -> StorageResult<()>;
}
