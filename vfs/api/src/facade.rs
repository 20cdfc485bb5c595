//! The process-wide entry point into the VFS abstraction.

use std::io::Read;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::debug;
use url::Url;

use crate::adaptor::{NativeHandle, VfsAdaptor};
use crate::{Result, VfsError, VirtualFileRef, VirtualStream};

static ADAPTOR: OnceCell<Arc<dyn VfsAdaptor>> = OnceCell::new();

/// Static access to the installed [`VfsAdaptor`].
///
/// A backend crate installs its adaptor once at startup; every call made
/// before that fails with [`VfsError::AdaptorNotInstalled`].
pub struct AbstractVfs;

impl AbstractVfs {
    /// Install `adaptor` unless one is already installed.
    ///
    /// Returns the adaptor that ends up installed.
    pub fn install_with<F>(init: F) -> Arc<dyn VfsAdaptor>
    where
        F: FnOnce() -> Arc<dyn VfsAdaptor>,
    {
        ADAPTOR
            .get_or_init(|| {
                debug!("installing VFS adaptor");
                init()
            })
            .clone()
    }

    /// Install `adaptor`, failing if a different one was installed before.
    pub fn install(adaptor: Arc<dyn VfsAdaptor>) -> Result<()> {
        ADAPTOR
            .set(adaptor)
            .map_err(|_| VfsError::IllegalState("VFS adaptor already installed".to_string()))
    }

    pub fn adaptor() -> Result<Arc<dyn VfsAdaptor>> {
        ADAPTOR.get().cloned().ok_or(VfsError::AdaptorNotInstalled)
    }

    pub fn from_url(url: &Url) -> Result<VirtualFileRef> {
        Self::adaptor()?.from_url(url)
    }

    pub fn from_uri(uri: &str) -> Result<VirtualFileRef> {
        Self::adaptor()?.from_uri(uri)
    }

    pub fn from_stream(name: &str, input: Option<&mut dyn Read>) -> Result<VirtualFileRef> {
        Self::adaptor()?.from_stream(name, input)
    }

    pub fn from_anonymous_stream(input: Option<&mut dyn Read>) -> Result<VirtualFileRef> {
        Self::adaptor()?.from_anonymous_stream(input)
    }

    pub fn adapt(handle: NativeHandle) -> Result<VirtualFileRef> {
        Self::adaptor()?.adapt(handle)
    }

    pub fn unadapt(file: &VirtualFileRef) -> Result<NativeHandle> {
        Self::adaptor()?.unadapt(file)
    }

    pub fn open_url(url: &Url) -> Result<VirtualStream> {
        Self::adaptor()?.open_url(url)
    }
}
