//! The mount table and mount handles.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;
use tracing::debug;

use crate::ids::MountId;
use crate::path::VfsPathBuf;
use crate::vfs::VfsInner;

#[derive(Debug)]
struct MountEntry {
    id: MountId,
    backing: PathBuf,
}

/// Mount points and the host directories backing them.
///
/// Several mounts may stack on one mount point; the most recent one wins
/// until it is unmounted.
#[derive(Debug, Default)]
pub(crate) struct MountTable {
    mounts: HashMap<Vec<String>, Vec<MountEntry>>,
}

impl MountTable {
    pub(crate) fn insert(&mut self, mount_point: &VfsPathBuf, id: MountId, backing: PathBuf) {
        self.mounts
            .entry(mount_point.segments().to_vec())
            .or_default()
            .push(MountEntry { id, backing });
    }

    pub(crate) fn remove(&mut self, mount_point: &VfsPathBuf, id: MountId) -> bool {
        let Some(stack) = self.mounts.get_mut(mount_point.segments()) else {
            return false;
        };
        let before = stack.len();
        stack.retain(|entry| entry.id != id);
        let removed = stack.len() != before;
        if stack.is_empty() {
            self.mounts.remove(mount_point.segments());
        }
        removed
    }

    pub(crate) fn is_mount_point(&self, path: &VfsPathBuf) -> bool {
        self.mounts.contains_key(path.segments())
    }

    /// The host location of `path`, honoring the innermost mount above it.
    pub(crate) fn resolve(&self, path: &VfsPathBuf) -> PathBuf {
        let segments = path.segments();
        for len in (0..=segments.len()).rev() {
            let top = self
                .mounts
                .get(&segments[..len])
                .and_then(|stack| stack.last());
            if let Some(entry) = top {
                let mut host = entry.backing.clone();
                host.extend(&segments[len..]);
                return host;
            }
        }
        path.to_host()
    }

    pub(crate) fn len(&self) -> usize {
        self.mounts.values().map(Vec::len).sum()
    }
}

/// An active mount. Dropping or closing it unmounts and deletes the backing
/// temporary directory.
pub struct MountHandle {
    vfs: Arc<VfsInner>,
    id: MountId,
    mount_point: VfsPathBuf,
    dir: Option<TempDir>,
}

impl MountHandle {
    pub(crate) fn new(
        vfs: Arc<VfsInner>,
        id: MountId,
        mount_point: VfsPathBuf,
        dir: TempDir,
    ) -> Self {
        Self {
            vfs,
            id,
            mount_point,
            dir: Some(dir),
        }
    }

    pub fn id(&self) -> MountId {
        self.id
    }

    pub fn mount_point(&self) -> &VfsPathBuf {
        &self.mount_point
    }

    /// The temporary directory holding the extracted content.
    pub fn temp_dir(&self) -> Option<PathBuf> {
        self.dir.as_ref().map(|d| d.path().to_path_buf())
    }

    pub fn close(mut self) -> io::Result<()> {
        self.release()
    }

    fn release(&mut self) -> io::Result<()> {
        let Some(dir) = self.dir.take() else {
            return Ok(());
        };
        self.vfs.mounts.write().remove(&self.mount_point, self.id);
        debug!(mount_point = %self.mount_point, id = self.id.get(), "unmounted");
        dir.close()
    }
}

impl Drop for MountHandle {
    fn drop(&mut self) {
        crate::safe_release(self.release());
    }
}

impl fmt::Debug for MountHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountHandle")
            .field("id", &self.id)
            .field("mount_point", &self.mount_point)
            .field("temp_dir", &self.temp_dir())
            .finish()
    }
}
