use std::io::{self, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use osgi_vfs_api::{NativeHandle, Result, VfsAdaptor, VfsError, VirtualFileRef, VirtualStream};
use osgi_vfs_native::{TempFileProvider, Vfs, VfsFile, register_exit_cleanup};
use tracing::debug;
use url::Url;

use crate::config::MountConfig;
use crate::node::MountedFile;
use crate::registry::MountRegistry;

/// State shared by an adaptor and every file it hands out.
#[derive(Debug)]
pub(crate) struct MountContext {
    pub(crate) vfs: Vfs,
    pub(crate) registry: MountRegistry,
    pub(crate) config: MountConfig,
    pub(crate) temp: Arc<TempFileProvider>,
}

/// A [`VfsAdaptor`] over an [`osgi_vfs_native::Vfs`].
#[derive(Debug, Clone)]
pub struct MountAdaptor {
    context: Arc<MountContext>,
}

impl MountAdaptor {
    /// An adaptor over the process-wide [`Vfs`].
    pub fn new(config: MountConfig) -> Result<Self> {
        Self::with_vfs(Vfs::global().clone(), config)
    }

    pub fn with_vfs(vfs: Vfs, config: MountConfig) -> Result<Self> {
        let temp = TempFileProvider::create(&config.temp_prefix).map_err(|e| {
            VfsError::IllegalState(format!("Cannot create VFS temp file provider: {e}"))
        })?;
        register_exit_cleanup(&temp);
        Ok(Self {
            context: Arc::new(MountContext {
                vfs,
                registry: MountRegistry::new(),
                config,
                temp,
            }),
        })
    }

    pub fn vfs(&self) -> &Vfs {
        &self.context.vfs
    }

    pub fn config(&self) -> &MountConfig {
        &self.context.config
    }

    pub fn registry(&self) -> &MountRegistry {
        &self.context.registry
    }

    pub fn temp_provider(&self) -> &Arc<TempFileProvider> {
        &self.context.temp
    }

    pub(crate) fn context(&self) -> Arc<MountContext> {
        self.context.clone()
    }

    /// The registered file for `handle`, creating one if needed.
    pub fn adapt_handle(&self, handle: VfsFile) -> Arc<MountedFile> {
        let context = self.context.clone();
        let file = self.context.registry.lookup_or_register(&handle, || {
            MountedFile::new(handle.clone(), context, true, None)
        });
        file.mark_root();
        file
    }
}

fn url_error(url: &Url, error: io::Error) -> VfsError {
    match error.kind() {
        io::ErrorKind::InvalidInput => VfsError::InvalidInput(error.to_string()),
        _ => VfsError::backend(format!("Cannot open {url}"), error),
    }
}

fn anonymous_name() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("stream{millis}-{n}")
}

impl VfsAdaptor for MountAdaptor {
    fn from_url(&self, url: &Url) -> Result<VirtualFileRef> {
        let handle = self.context.vfs.get_url(url).map_err(|e| url_error(url, e))?;
        Ok(self.adapt_handle(handle))
    }

    fn from_stream(&self, name: &str, input: Option<&mut dyn Read>) -> Result<VirtualFileRef> {
        let input = input.ok_or(VfsError::Null("input"))?;
        if name.trim().is_empty() {
            return Err(VfsError::Null("name"));
        }
        if name.contains('\0') {
            return Err(VfsError::InvalidInput(format!(
                "name contains a NUL byte: {name:?}"
            )));
        }

        let handle = self.context.vfs.get_child(name);
        if handle.path().is_root() {
            return Err(VfsError::InvalidInput(format!(
                "cannot mount a stream at the root: {name:?}"
            )));
        }
        let mount = self
            .context
            .vfs
            .mount_zip_stream(input, handle.name(), &handle, &self.context.temp)
            .map_err(|e| VfsError::backend(format!("Cannot mount stream {name}"), e))?;
        debug!(name, path = %handle, "mounted archive stream");

        let file = MountedFile::with_mount(handle.clone(), self.context.clone(), mount);
        self.context.registry.register_if_absent(&handle, &file);
        Ok(file)
    }

    fn from_anonymous_stream(&self, input: Option<&mut dyn Read>) -> Result<VirtualFileRef> {
        self.from_stream(&anonymous_name(), input)
    }

    fn adapt(&self, handle: NativeHandle) -> Result<VirtualFileRef> {
        let handle = handle
            .downcast_ref::<VfsFile>()
            .ok_or_else(|| VfsError::TypeMismatch("unsupported native handle".to_string()))?;
        Ok(self.adapt_handle(handle.clone()))
    }

    fn unadapt(&self, file: &VirtualFileRef) -> Result<NativeHandle> {
        let mounted = file
            .downcast_ref::<MountedFile>()
            .ok_or_else(|| VfsError::TypeMismatch(format!("{file:?}")))?;
        Ok(Arc::new(mounted.handle().clone()))
    }

    fn open_url(&self, url: &Url) -> Result<VirtualStream> {
        let stream = self.context.vfs.open_url(url).map_err(|e| url_error(url, e))?;
        Ok(Box::new(stream))
    }
}
