use std::any::Any;
use std::backtrace::Backtrace;
use std::fmt;
use std::fs::File;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use osgi_vfs_api::utils::safe_close;
use osgi_vfs_api::{
    CodeSigner, EntryPaths, FindEntries, Result, VfsError, VirtualFile, VirtualFileRef,
    VirtualStream,
};
use osgi_vfs_native::{MountHandle, VfsFile};
use parking_lot::Mutex;
use tempfile::TempDir;
use tracing::{debug, warn};
use url::Url;

use crate::adaptor::MountContext;

/// A [`VirtualFile`] over a [`VfsFile`] handle.
///
/// Archives (see [`crate::MountConfig::archive_suffixes`]) are mounted the
/// first time their content is navigated into, and unmounted again by
/// [`VirtualFile::close`].
///
/// Files reached by navigation are shared through the adaptor's
/// [`crate::MountRegistry`] and keep the file they were reached from alive,
/// so a mount stays in place while anything below it is still in use.
pub struct MountedFile {
    handle: VfsFile,
    context: Arc<MountContext>,
    /// Handed out directly by the adaptor rather than only reached by
    /// navigation.
    root: AtomicBool,
    origin: Option<Arc<MountedFile>>,
    this: Weak<MountedFile>,
    state: Mutex<NodeState>,
}

#[derive(Default)]
struct NodeState {
    closed: bool,
    mount: Option<MountHandle>,
    stream: Option<StreamFile>,
    leak_trace: Option<Backtrace>,
}

/// A directory re-packed into a single archive for streaming.
struct StreamFile {
    dir: TempDir,
    file: PathBuf,
}

impl MountedFile {
    pub(crate) fn new(
        handle: VfsFile,
        context: Arc<MountContext>,
        root: bool,
        origin: Option<Arc<MountedFile>>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            handle,
            context,
            root: AtomicBool::new(root),
            origin,
            this: this.clone(),
            state: Mutex::new(NodeState::default()),
        })
    }

    /// A root that owns `mount` from the start.
    pub(crate) fn with_mount(
        handle: VfsFile,
        context: Arc<MountContext>,
        mount: MountHandle,
    ) -> Arc<Self> {
        let leak_trace = context.config.leak_debugging.then(Backtrace::force_capture);
        Arc::new_cyclic(|this| Self {
            handle,
            context,
            root: AtomicBool::new(true),
            origin: None,
            this: this.clone(),
            state: Mutex::new(NodeState {
                mount: Some(mount),
                leak_trace,
                ..Default::default()
            }),
        })
    }

    /// The native handle behind this file.
    pub fn handle(&self) -> &VfsFile {
        &self.handle
    }

    /// Whether this file currently holds a mount of its own.
    pub fn is_mounted(&self) -> bool {
        self.state.lock().mount.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub(crate) fn mark_root(&self) {
        self.root.store(true, Ordering::Release);
    }

    /// The shared file for `handle`, reached from this one.
    fn wrap(&self, handle: VfsFile) -> VirtualFileRef {
        let origin = self.this.upgrade();
        self.context.registry.lookup_or_register(&handle, || {
            MountedFile::new(handle.clone(), self.context.clone(), false, origin)
        })
    }

    fn check_open(&self) -> Result<()> {
        if self.state.lock().closed {
            return Err(VfsError::Closed(self.handle.path_name()));
        }
        Ok(())
    }

    fn is_archive(&self) -> bool {
        self.handle.is_file() && self.context.config.is_archive(self.handle.name())
    }

    /// Mount the archive behind this file if it is one and nothing has
    /// mounted it yet.
    fn ensure_mounted(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(VfsError::Closed(self.handle.path_name()));
        }
        if state.mount.is_some() || !self.is_archive() {
            return Ok(());
        }
        let mount = self
            .context
            .vfs
            .mount_zip(&self.handle, &self.handle, &self.context.temp)
            .map_err(|e| VfsError::backend(format!("Cannot mount {}", self.handle), e))?;
        debug!(path = %self.handle, "mounted archive on first access");
        state.mount = Some(mount);
        if self.context.config.leak_debugging {
            state.leak_trace = Some(Backtrace::force_capture());
        }
        Ok(())
    }

    /// The native handle for `path` below this file, mounting first.
    ///
    /// Paths that leave this file's subtree through `..` resolve to nothing.
    fn resolve(&self, path: &str) -> Result<Option<VfsFile>> {
        check_path(path)?;
        self.ensure_mounted()?;
        let target = self.handle.child(path);
        if !target.path().starts_with(self.handle.path()) {
            return Ok(None);
        }
        Ok(target.exists().then_some(target))
    }

    /// Archives are addressed as the directory they mount to, before and
    /// after mounting.
    fn addressed_as_directory(&self) -> bool {
        self.is_archive() || self.state.lock().mount.is_some()
    }

    fn is_stream_root(&self) -> bool {
        self.root.load(Ordering::Acquire)
            || self.handle.is_mount_point()
            || self.state.lock().mount.is_some()
    }

    /// Re-pack this directory into a temporary archive, once.
    fn stream_file(&self) -> Result<PathBuf> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(VfsError::Closed(self.handle.path_name()));
        }
        if let Some(stream) = &state.stream {
            return Ok(stream.file.clone());
        }
        let dir = self
            .context
            .temp
            .create_temp_dir("urlstream")
            .map_err(|e| VfsError::backend("Cannot create stream directory", e))?;
        let name = match self.handle.name() {
            "" => "root",
            name => name,
        };
        let file = dir.path().join(name);
        osgi_vfs_native::write_directory(&self.handle.physical_path(), &file).map_err(|e| {
            VfsError::backend(format!("Cannot write stream file for {}", self.handle), e)
        })?;
        debug!(path = %self.handle, file = %file.display(), "materialized stream file");
        state.stream = Some(StreamFile {
            dir,
            file: file.clone(),
        });
        Ok(file)
    }
}

fn check_path(path: &str) -> Result<()> {
    if path.contains('\0') {
        return Err(VfsError::InvalidInput(format!(
            "path contains a NUL byte: {path:?}"
        )));
    }
    Ok(())
}

impl VirtualFile for MountedFile {
    fn name(&self) -> Result<String> {
        self.check_open()?;
        Ok(self.handle.name().to_string())
    }

    fn path_name(&self) -> Result<String> {
        self.check_open()?;
        Ok(self.handle.path_name())
    }

    fn is_file(&self) -> Result<bool> {
        self.check_open()?;
        Ok(self.handle.is_file())
    }

    fn is_directory(&self) -> Result<bool> {
        self.check_open()?;
        Ok(self.handle.is_directory())
    }

    /// Archives get the directory form (`…/x.jar/`) whether mounted or not,
    /// including when they are reported as leaves by `find_entries`.
    fn to_url(&self) -> Result<Url> {
        self.check_open()?;
        let url = self
            .handle
            .to_url()
            .map_err(|e| VfsError::backend(format!("Cannot create URL for {}", self.handle), e))?;
        if url.path().ends_with('/') || !self.addressed_as_directory() {
            return Ok(url);
        }
        Url::parse(&format!("{url}/"))
            .map_err(|e| VfsError::IllegalState(format!("Cannot create URL for {}: {e}", self.handle)))
    }

    fn stream_url(&self) -> Result<Option<Url>> {
        self.check_open()?;
        if self.handle.is_file() {
            let url = self.handle.to_url().map_err(|e| {
                VfsError::backend(format!("Cannot create URL for {}", self.handle), e)
            })?;
            return Ok(Some(url));
        }
        if !self.handle.is_directory() || !self.is_stream_root() {
            return Ok(None);
        }
        let file = self.stream_file()?;
        Url::from_file_path(&file).map(Some).map_err(|()| {
            VfsError::IllegalState(format!("Cannot create URL for {}", file.display()))
        })
    }

    fn parent(&self) -> Result<Option<VirtualFileRef>> {
        self.check_open()?;
        Ok(self.handle.parent().map(|parent| self.wrap(parent)))
    }

    fn child(&self, path: &str) -> Result<Option<VirtualFileRef>> {
        Ok(self.resolve(path)?.map(|child| self.wrap(child)))
    }

    fn children(&self) -> Result<Vec<VirtualFileRef>> {
        self.ensure_mounted()?;
        let children = self
            .handle
            .children()
            .map_err(|e| VfsError::backend(format!("Cannot list {}", self.handle), e))?;
        Ok(children.into_iter().map(|child| self.wrap(child)).collect())
    }

    fn children_recursively(&self) -> Result<Vec<VirtualFileRef>> {
        self.ensure_mounted()?;
        let children = self
            .handle
            .children_recursively()
            .map_err(|e| VfsError::backend(format!("Cannot list {}", self.handle), e))?;
        Ok(children.into_iter().map(|child| self.wrap(child)).collect())
    }

    fn find_entries(
        &self,
        path: &str,
        pattern: Option<&str>,
        recurse: bool,
    ) -> Result<Option<FindEntries>> {
        let Some(target) = self.resolve(path)? else {
            return Ok(None);
        };
        if target == self.handle {
            return FindEntries::new(self, pattern, recurse).map(Some);
        }
        let start = self.wrap(target);
        FindEntries::new(&*start, pattern, recurse).map(Some)
    }

    fn entry_paths(&self, path: &str) -> Result<Option<EntryPaths>> {
        let Some(target) = self.resolve(path)? else {
            return Ok(None);
        };
        if target == self.handle {
            return EntryPaths::new(self, self).map(Some);
        }
        let start = self.wrap(target);
        EntryPaths::new(self, &*start).map(Some)
    }

    fn open_stream(&self) -> Result<VirtualStream> {
        self.check_open()?;
        let mounted = self.state.lock().mount.is_some() || self.handle.is_mount_point();
        if mounted {
            let file = self.stream_file()?;
            let stream = File::open(&file)
                .map_err(|e| VfsError::backend(format!("Cannot open {}", file.display()), e))?;
            return Ok(Box::new(stream));
        }
        let stream = self
            .handle
            .open()
            .map_err(|e| VfsError::backend(format!("Cannot open {}", self.handle), e))?;
        Ok(Box::new(stream))
    }

    fn code_signers(&self) -> Result<Option<Vec<CodeSigner>>> {
        self.check_open()?;
        Ok(None)
    }

    fn close(&self) {
        let (mount, stream) = {
            let mut state = self.state.lock();
            if state.closed {
                return;
            }
            state.closed = true;
            state.leak_trace = None;
            (state.mount.take(), state.stream.take())
        };
        if let Some(mount) = mount {
            safe_close("mount", mount.close());
        }
        if let Some(stream) = stream {
            safe_close("stream file", stream.dir.close());
        }
        self.context.registry.unregister(&self.handle, self);
        debug!(path = %self.handle, "closed virtual file");
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for MountedFile {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if state.mount.is_some() {
            if let Some(trace) = state.leak_trace.take() {
                warn!(
                    path = %self.handle,
                    "VirtualFile dropped without being closed, created at:\n{trace}"
                );
            }
        }
        self.context.registry.unregister(&self.handle, self);
    }
}

impl fmt::Debug for MountedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountedFile")
            .field("path", self.handle.path())
            .field("root", &self.root.load(Ordering::Relaxed))
            .field("origin", &self.origin.as_ref().map(|o| o.handle.path()))
            .finish_non_exhaustive()
    }
}

impl fmt::Display for MountedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.handle)
    }
}
