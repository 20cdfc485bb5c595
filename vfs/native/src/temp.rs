//! Scratch space for extracted archives.

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Once, Weak};

use parking_lot::Mutex;
use tempfile::TempDir;
use tracing::{debug, warn};

/// Hands out temporary directories below one private root directory.
///
/// Closing the provider deletes the root and everything below it. Dropping
/// it does the same.
#[derive(Debug)]
pub struct TempFileProvider {
    prefix: String,
    root: Mutex<Option<TempDir>>,
}

impl TempFileProvider {
    pub fn create(prefix: &str) -> io::Result<Arc<Self>> {
        let root = tempfile::Builder::new().prefix(prefix).tempdir()?;
        debug!(root = %root.path().display(), "created temp file provider");
        Ok(Arc::new(Self {
            prefix: prefix.to_string(),
            root: Mutex::new(Some(root)),
        }))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `None` once the provider has been closed.
    pub fn root(&self) -> Option<PathBuf> {
        self.root.lock().as_ref().map(|dir| dir.path().to_path_buf())
    }

    /// A fresh directory whose name starts with `name`.
    ///
    /// The directory is removed when the returned [`TempDir`] is dropped or
    /// closed.
    pub fn create_temp_dir(&self, name: &str) -> io::Result<TempDir> {
        let root = self.root().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "temp file provider is closed")
        })?;
        let prefix: String = name
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        tempfile::Builder::new()
            .prefix(&format!("{prefix}-"))
            .tempdir_in(root)
    }

    /// Delete the root directory. Later calls do nothing.
    pub fn close(&self) -> io::Result<()> {
        match self.root.lock().take() {
            Some(root) => {
                debug!(root = %root.path().display(), "closing temp file provider");
                root.close()
            }
            None => Ok(()),
        }
    }
}

static EXIT_PROVIDERS: Mutex<Vec<Weak<TempFileProvider>>> = parking_lot::const_mutex(Vec::new());
static EXIT_HOOK: Once = Once::new();

/// Close `provider` when the process exits normally.
///
/// Process-wide providers usually live in statics that are never dropped.
/// Failures during exit are logged, never raised.
pub fn register_exit_cleanup(provider: &Arc<TempFileProvider>) {
    {
        let mut providers = EXIT_PROVIDERS.lock();
        providers.retain(|p| p.strong_count() > 0);
        providers.push(Arc::downgrade(provider));
    }
    EXIT_HOOK.call_once(install_exit_hook);
}

/// Close every registered provider that is still alive.
pub fn run_exit_cleanup() {
    let providers: Vec<_> = EXIT_PROVIDERS.lock().drain(..).collect();
    for provider in providers.iter().filter_map(Weak::upgrade) {
        if let Err(e) = provider.close() {
            warn!(prefix = provider.prefix(), error = %e, "Cannot close VFS temp file provider");
        }
    }
}

#[cfg(unix)]
fn install_exit_hook() {
    extern "C" fn on_exit() {
        // Unwinding out of an `extern "C"` function aborts the process.
        let _ = std::panic::catch_unwind(run_exit_cleanup);
    }

    // SAFETY: `on_exit` is a plain function that never unwinds.
    let rc = unsafe { libc::atexit(on_exit) };
    if rc != 0 {
        warn!("unable to register temp file cleanup at exit");
    }
}

#[cfg(not(unix))]
fn install_exit_hook() {
    debug!("no exit hook on this platform, temp files are removed on close");
}
