use std::any::Any;
use std::io::Read;
use std::sync::Arc;

use url::Url;

use crate::{Result, VfsError, VirtualFileRef, VirtualStream};

/// A backend-native file handle, as understood by one [`VfsAdaptor`].
pub type NativeHandle = Arc<dyn Any + Send + Sync>;

/// Bridges the [`crate::VirtualFile`] abstraction to one concrete virtual
/// filesystem implementation.
pub trait VfsAdaptor: Send + Sync + 'static {
    /// The virtual file at `url`.
    fn from_url(&self, url: &Url) -> Result<VirtualFileRef>;

    /// The virtual file at `uri`.
    fn from_uri(&self, uri: &str) -> Result<VirtualFileRef> {
        let url = Url::parse(uri).map_err(|e| VfsError::InvalidInput(format!("{uri}: {e}")))?;
        self.from_url(&url)
    }

    /// Mount the archive read from `input` under the virtual path `name`.
    fn from_stream(&self, name: &str, input: Option<&mut dyn Read>) -> Result<VirtualFileRef>;

    /// Like [`VfsAdaptor::from_stream`] with a generated unique name.
    fn from_anonymous_stream(&self, input: Option<&mut dyn Read>) -> Result<VirtualFileRef>;

    /// Wrap a native handle, reusing the existing wrapper if there is one.
    ///
    /// Fails with [`VfsError::TypeMismatch`] for handles of a foreign type.
    fn adapt(&self, handle: NativeHandle) -> Result<VirtualFileRef>;

    /// The native handle behind a virtual file.
    fn unadapt(&self, file: &VirtualFileRef) -> Result<NativeHandle>;

    /// Open a URL previously returned by [`crate::VirtualFile::to_url`] or
    /// [`crate::VirtualFile::stream_url`].
    fn open_url(&self, url: &Url) -> Result<VirtualStream>;
}
