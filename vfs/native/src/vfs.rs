use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::{Arc, Weak};

use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use tracing::debug;
use url::Url;

use crate::archive;
use crate::file::{FileInner, VfsFile};
use crate::ids::MountId;
use crate::mount::{MountHandle, MountTable};
use crate::path::VfsPathBuf;
use crate::temp::TempFileProvider;

/// URL scheme of virtual file locations.
pub const VFS_SCHEME: &str = "vfs";

static GLOBAL: Lazy<Vfs> = Lazy::new(Vfs::new);

pub(crate) struct VfsInner {
    pub(crate) mounts: RwLock<MountTable>,
    handles: Mutex<HashMap<VfsPathBuf, Weak<FileInner>>>,
}

impl VfsInner {
    pub(crate) fn resolve(&self, path: &VfsPathBuf) -> PathBuf {
        self.mounts.read().resolve(path)
    }

    pub(crate) fn is_mount_point(&self, path: &VfsPathBuf) -> bool {
        self.mounts.read().is_mount_point(path)
    }

    /// Forget the handle slot of `path` if nothing refers to it anymore.
    pub(crate) fn release_handle(&self, path: &VfsPathBuf) {
        let mut handles = self.handles.lock();
        if handles.get(path).is_some_and(|w| w.strong_count() == 0) {
            handles.remove(path);
        }
    }
}

/// A virtual filesystem overlaying zip mounts on top of the host filesystem.
///
/// Paths that are not below a mount point resolve to the host path of the
/// same name. Handles are interned: while a [`VfsFile`] for a path is alive,
/// asking for that path again returns the same handle.
#[derive(Clone)]
pub struct Vfs {
    inner: Arc<VfsInner>,
}

impl Vfs {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(VfsInner {
                mounts: RwLock::new(MountTable::default()),
                handles: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<VfsInner>) -> Self {
        Self { inner }
    }

    /// The process-wide instance.
    pub fn global() -> &'static Vfs {
        &GLOBAL
    }

    pub fn root(&self) -> VfsFile {
        self.get(VfsPathBuf::root())
    }

    /// The handle for a path, `/`-separated and relative to the root.
    pub fn get_child(&self, path: &str) -> VfsFile {
        self.get(VfsPathBuf::parse(path))
    }

    pub fn get(&self, path: VfsPathBuf) -> VfsFile {
        let mut handles = self.inner.handles.lock();
        if let Some(inner) = handles.get(&path).and_then(Weak::upgrade) {
            return VfsFile::from_inner(inner);
        }
        let file = VfsFile::new(self.inner.clone(), path.clone());
        handles.insert(path, file.downgrade());
        file
    }

    /// The handle a `vfs:` or `file:` URL refers to.
    pub fn get_url(&self, url: &Url) -> io::Result<VfsFile> {
        match url.scheme() {
            "file" => {
                let host = url.to_file_path().map_err(|()| {
                    io::Error::new(io::ErrorKind::InvalidInput, format!("not a file path: {url}"))
                })?;
                Ok(self.get(VfsPathBuf::from_host(&host)))
            }
            VFS_SCHEME => {
                let decoded = urlencoding::decode(url.path())
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
                Ok(self.get_child(&decoded))
            }
            other => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unsupported URL scheme '{other}': {url}"),
            )),
        }
    }

    pub fn open_url(&self, url: &Url) -> io::Result<File> {
        self.get_url(url)?.open()
    }

    pub fn is_mount_point(&self, file: &VfsFile) -> bool {
        self.inner.is_mount_point(file.path())
    }

    /// Number of active mounts.
    pub fn mount_count(&self) -> usize {
        self.inner.mounts.read().len()
    }

    /// Mount the zip archive `archive_file` at `mount_point`.
    ///
    /// The archive is extracted into a directory handed out by `temp`; it is
    /// read through the current mount table, so archives nested inside other
    /// mounts work.
    pub fn mount_zip(
        &self,
        archive_file: &VfsFile,
        mount_point: &VfsFile,
        temp: &TempFileProvider,
    ) -> io::Result<MountHandle> {
        let source = archive_file.physical_path();
        let dir = temp.create_temp_dir(archive_file.name())?;
        let contents = dir.path().join("contents");
        fs::create_dir(&contents)?;
        archive::extract_file(&source, &contents)?;
        Ok(self.attach(mount_point, contents, dir))
    }

    /// Mount the zip archive read from `input` at `mount_point`.
    pub fn mount_zip_stream(
        &self,
        input: &mut dyn Read,
        name: &str,
        mount_point: &VfsFile,
        temp: &TempFileProvider,
    ) -> io::Result<MountHandle> {
        let dir = temp.create_temp_dir(name)?;
        let spooled = dir.path().join("archive.zip");
        archive::spool(input, &spooled)?;
        let contents = dir.path().join("contents");
        fs::create_dir(&contents)?;
        archive::extract_file(&spooled, &contents)?;
        Ok(self.attach(mount_point, contents, dir))
    }

    fn attach(
        &self,
        mount_point: &VfsFile,
        contents: PathBuf,
        dir: tempfile::TempDir,
    ) -> MountHandle {
        let id = MountId::next();
        self.inner
            .mounts
            .write()
            .insert(mount_point.path(), id, contents.clone());
        debug!(
            mount_point = %mount_point.path(),
            backing = %contents.display(),
            id = id.get(),
            "mounted zip"
        );
        MountHandle::new(self.inner.clone(), id, mount_point.path().clone(), dir)
    }
}

impl Default for Vfs {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Vfs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vfs")
            .field("mounts", &self.mount_count())
            .finish()
    }
}
