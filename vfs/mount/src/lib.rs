//! [`osgi_vfs_api::VfsAdaptor`] implementation on top of
//! [`osgi_vfs_native`].
//!
//! Jar and war files are mounted lazily: a [`MountedFile`] for an archive
//! behaves like a plain file until its children or entries are asked for,
//! at which point the archive is extracted and mounted over its own path.

mod adaptor;
mod config;
mod node;
mod registry;

use std::sync::Arc;

use osgi_vfs_api::{AbstractVfs, Result, VfsAdaptor};

pub use adaptor::MountAdaptor;
pub use config::{ARCHIVE_SUFFIXES_ENV, MountConfig};
pub use node::MountedFile;
pub use registry::MountRegistry;

/// Install a [`MountAdaptor`] configured from the environment into
/// [`AbstractVfs`], unless an adaptor is installed already.
///
/// Returns the installed adaptor.
pub fn install() -> Result<Arc<dyn VfsAdaptor>> {
    if let Ok(adaptor) = AbstractVfs::adaptor() {
        return Ok(adaptor);
    }
    let adaptor: Arc<dyn VfsAdaptor> = Arc::new(MountAdaptor::new(MountConfig::from_env())?);
    Ok(AbstractVfs::install_with(|| adaptor))
}
