//! In-memory host list storage.

use crate::error::StorageResult;
use crate::storage::HostStore;
use crate::types::HostList;
use std::sync::Mutex;

/// Host list kept in memory; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    hosts: Mutex<HostList>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing list.
    pub fn with_hosts(hosts: HostList) -> Self {
        Self {
            hosts: Mutex::new(hosts),
        }
    }
}

impl HostStore for MemoryStore {
    fn load(&self) -> StorageResult<HostList> {
        Ok(self
            .hosts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    fn save(&self, hosts: &HostList) -> StorageResult<()> {
        *self
            .hosts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = hosts.clone();
        Ok(())
    }
}
