//! Flat-file host list storage.
//!
//! One host per line, UTF-8. Blank lines are ignored on load so the file can
//! be edited by hand.

use crate::error::{StorageError, StorageResult};
use crate::storage::HostStore;
use crate::types::HostList;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Host list stored in a plain text file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HostStore for FileStore {
    fn load(&self) -> StorageResult<HostList> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "host list absent, starting empty");
                return Ok(HostList::new());
            }
            Err(source) => {
                return Err(StorageError::ReadFailed {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let hosts = HostList::from_hosts(content.lines());
        debug!(path = %self.path.display(), hosts = hosts.len(), "loaded host list");
        Ok(hosts)
    }

    fn save(&self, hosts: &HostList) -> StorageResult<()> {
        fs::write(&self.path, hosts.to_string()).map_err(|source| StorageError::WriteFailed {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), hosts = hosts.len(), "saved host list");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("pscan.hosts"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("pscan.hosts"));

        let mut hl = HostList::new();
        hl.add("host1").unwrap();
        hl.add("host2").unwrap();
        store.save(&hl).unwrap();

        assert_eq!(fs::read_to_string(store.path()).unwrap(), "host1\nhost2\n");
        assert_eq!(store.load().unwrap(), hl);
    }

    #[test]
    fn test_hand_edited_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pscan.hosts");
        fs::write(&path, "host1\r\n\n  host2  \n").unwrap();

        let hl = FileStore::new(&path).load().unwrap();
        assert_eq!(hl.hosts(), ["host1", "host2"]);
    }

    #[test]
    fn test_unreadable_path_is_an_error() {
        let dir = tempdir().unwrap();
        // A directory cannot be read as a file.
        let store = FileStore::new(dir.path());
        assert!(matches!(store.load(), Err(StorageError::ReadFailed { .. })));
        assert!(matches!(
            store.save(&HostList::new()),
            Err(StorageError::WriteFailed { .. })
        ));
    }
}
