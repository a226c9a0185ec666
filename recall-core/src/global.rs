//! Process-wide shared memory store.
//!
//! The first caller creates the store; everyone after gets the same
//! instance. Initialization goes through a `OnceLock`, so concurrent first
//! calls still create exactly one store. Prefer passing the returned handle
//! into the code that needs it over calling [`global_store`] everywhere.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use tracing::debug;

use crate::error::{Error, Result};
use crate::memory::AgentMemoryStore;
use crate::storage::{DefaultRoot, StorageRoot};

/// Shared handle to an [`AgentMemoryStore`]
pub type SharedMemoryStore = Arc<Mutex<AgentMemoryStore>>;

/// Global store (lazy initialized)
static GLOBAL_STORE: OnceLock<SharedMemoryStore> = OnceLock::new();

/// Get or create the global store in the default data directory.
pub fn global_store() -> Result<SharedMemoryStore> {
    init_global_store(&DefaultRoot)
}

/// Get or create the global store beneath `root`.
///
/// `root` is only consulted on the very first call; later calls return the
/// existing instance whatever root they pass.
pub fn init_global_store(root: &impl StorageRoot) -> Result<SharedMemoryStore> {
    if let Some(store) = GLOBAL_STORE.get() {
        return Ok(Arc::clone(store));
    }

    // Resolve outside the once-cell so a resolver error leaves it unset
    let path = root.agent_memory_path()?;
    let store = GLOBAL_STORE.get_or_init(|| {
        debug!("Initializing global memory store at {:?}", path);
        Arc::new(Mutex::new(AgentMemoryStore::open(path)))
    });
    Ok(Arc::clone(store))
}

/// Lock a shared store, mapping poisoning to [`Error::LockPoisoned`].
pub fn lock(store: &SharedMemoryStore) -> Result<MutexGuard<'_, AgentMemoryStore>> {
    store.lock().map_err(|_| Error::LockPoisoned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::NewMemory;
    use crate::storage::FixedRoot;
    use std::thread;
    use tempfile::tempdir;

    // The only test in this crate that touches the global; keep it that way.
    #[test]
    fn test_single_instance_across_threads() {
        let dir = tempdir().unwrap();
        let root = FixedRoot::new(dir.path());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let root = root.clone();
                thread::spawn(move || init_global_store(&root).unwrap())
            })
            .collect();
        let stores: Vec<SharedMemoryStore> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        for store in &stores[1..] {
            assert!(Arc::ptr_eq(&stores[0], store));
        }

        let other = FixedRoot::new(dir.path().join("elsewhere"));
        let again = init_global_store(&other).unwrap();
        assert!(Arc::ptr_eq(&stores[0], &again));

        lock(&again).unwrap().add(NewMemory::new("shared"));
        assert_eq!(lock(&stores[3]).unwrap().len(), 1);
        assert!(dir.path().join("agent_memory.json").exists());
    }
}
