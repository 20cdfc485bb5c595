use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Weak};

use url::Url;

use crate::ids::HandleId;
use crate::path::VfsPathBuf;
use crate::vfs::{VFS_SCHEME, VfsInner};

pub(crate) struct FileInner {
    id: HandleId,
    path: VfsPathBuf,
    vfs: Arc<VfsInner>,
}

impl Drop for FileInner {
    fn drop(&mut self) {
        self.vfs.release_handle(&self.path);
    }
}

/// A handle to a location in a [`crate::Vfs`].
///
/// The location does not have to exist. Whether it is a file or a directory
/// is decided on every call by looking through the mount table, so a zip
/// file turns into a directory once it has been mounted.
#[derive(Clone)]
pub struct VfsFile {
    inner: Arc<FileInner>,
}

impl VfsFile {
    pub(crate) fn new(vfs: Arc<VfsInner>, path: VfsPathBuf) -> Self {
        Self {
            inner: Arc::new(FileInner {
                id: HandleId::next(),
                path,
                vfs,
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<FileInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<FileInner> {
        Arc::downgrade(&self.inner)
    }

    pub fn id(&self) -> HandleId {
        self.inner.id
    }

    pub fn path(&self) -> &VfsPathBuf {
        &self.inner.path
    }

    pub fn name(&self) -> &str {
        self.inner.path.name()
    }

    /// The absolute virtual path, `/` for the root.
    pub fn path_name(&self) -> String {
        self.inner.path.to_string()
    }

    /// Where the content currently lives on the host.
    pub fn physical_path(&self) -> PathBuf {
        self.inner.vfs.resolve(&self.inner.path)
    }

    pub fn exists(&self) -> bool {
        self.physical_path().exists()
    }

    pub fn is_file(&self) -> bool {
        self.physical_path().is_file()
    }

    pub fn is_directory(&self) -> bool {
        self.physical_path().is_dir()
    }

    pub fn is_mount_point(&self) -> bool {
        self.inner.vfs.is_mount_point(&self.inner.path)
    }

    pub fn parent(&self) -> Option<VfsFile> {
        let parent = self.inner.path.parent()?;
        Some(self.vfs().get(parent))
    }

    /// The handle for `path` below this one. A leading `/` is ignored.
    pub fn child(&self, path: &str) -> VfsFile {
        self.vfs().get(self.inner.path.join(path))
    }

    /// Direct children in name order. Empty for plain files.
    pub fn children(&self) -> io::Result<Vec<VfsFile>> {
        let dir = self.physical_path();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = fs::read_dir(&dir)?
            .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
            .collect::<io::Result<Vec<_>>>()?;
        names.sort();
        Ok(names.iter().map(|name| self.child(name)).collect())
    }

    /// All descendants in pre-order.
    pub fn children_recursively(&self) -> io::Result<Vec<VfsFile>> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out)?;
        Ok(out)
    }

    fn collect_descendants(&self, out: &mut Vec<VfsFile>) -> io::Result<()> {
        for child in self.children()? {
            let is_dir = child.is_directory();
            out.push(child.clone());
            if is_dir {
                child.collect_descendants(out)?;
            }
        }
        Ok(())
    }

    pub fn open(&self) -> io::Result<File> {
        let path = self.physical_path();
        if path.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("{} is a directory", self.inner.path),
            ));
        }
        File::open(path)
    }

    /// `vfs:` URL of this location; directories end with `/`.
    pub fn to_url(&self) -> io::Result<Url> {
        let mut location = format!("{VFS_SCHEME}:");
        for segment in self.inner.path.segments() {
            location.push('/');
            location.push_str(&urlencoding::encode(segment));
        }
        if self.inner.path.is_root() || self.is_directory() {
            location.push('/');
        }
        Url::parse(&location).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn vfs(&self) -> crate::Vfs {
        crate::Vfs::from_inner(self.inner.vfs.clone())
    }
}

impl PartialEq for VfsFile {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for VfsFile {}

impl fmt::Debug for VfsFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VfsFile")
            .field("id", &self.inner.id)
            .field("path", &self.inner.path)
            .finish()
    }
}

impl fmt::Display for VfsFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.path)
    }
}
