use std::collections::HashMap;
use std::sync::{Arc, Weak};

use osgi_vfs_native::{HandleId, VfsFile};
use parking_lot::Mutex;

use crate::node::MountedFile;

/// Maps native handles to the virtual file wrapping them.
///
/// Entries are weak: a virtual file that nobody refers to anymore is not
/// kept alive by the registry, and a later lookup creates a fresh one.
#[derive(Debug, Default)]
pub struct MountRegistry {
    entries: Mutex<HashMap<HandleId, Weak<MountedFile>>>,
}

impl MountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, handle: &VfsFile) -> Option<Arc<MountedFile>> {
        self.entries.lock().get(&handle.id()).and_then(Weak::upgrade)
    }

    /// Return the registered file for `handle`, or register the one built by
    /// `make`. Both happen under one lock.
    pub fn lookup_or_register<F>(&self, handle: &VfsFile, make: F) -> Arc<MountedFile>
    where
        F: FnOnce() -> Arc<MountedFile>,
    {
        let mut entries = self.entries.lock();
        if let Some(file) = entries.get(&handle.id()).and_then(Weak::upgrade) {
            return file;
        }
        let file = make();
        entries.insert(handle.id(), Arc::downgrade(&file));
        file
    }

    /// Register `file` for `handle`, replacing any previous entry.
    pub fn register(&self, handle: &VfsFile, file: &Arc<MountedFile>) {
        self.entries.lock().insert(handle.id(), Arc::downgrade(file));
    }

    /// Register `file` unless a live file is registered for `handle` already.
    ///
    /// Returns whether `file` was registered.
    pub fn register_if_absent(&self, handle: &VfsFile, file: &Arc<MountedFile>) -> bool {
        let mut entries = self.entries.lock();
        if entries
            .get(&handle.id())
            .is_some_and(|existing| existing.strong_count() > 0)
        {
            return false;
        }
        entries.insert(handle.id(), Arc::downgrade(file));
        true
    }

    /// Remove the entry for `handle` if it belongs to `file`. Does nothing
    /// when there is no such entry.
    pub fn unregister(&self, handle: &VfsFile, file: &MountedFile) {
        let mut entries = self.entries.lock();
        if entries
            .get(&handle.id())
            .is_some_and(|existing| std::ptr::eq(existing.as_ptr(), file))
        {
            entries.remove(&handle.id());
        }
    }

    /// Number of registered files that are still alive.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .values()
            .filter(|file| file.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
