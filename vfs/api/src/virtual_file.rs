use std::any::Any;
use std::fmt;
use std::io::Read;
use std::sync::Arc;

use url::Url;

use crate::enumeration::{EntryPaths, FindEntries};
use crate::Result;

/// Shared handle to a virtual file.
pub type VirtualFileRef = Arc<dyn VirtualFile>;

/// A readable byte stream over virtual file content.
pub type VirtualStream = Box<dyn Read + Send>;

/// A DER encoded X.509 certificate.
#[derive(Clone, PartialEq, Eq)]
pub struct Certificate(pub Vec<u8>);

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Certificate")
            .field(&format_args!("{} bytes", self.0.len()))
            .finish()
    }
}

/// The signer of some archive content together with its certificate chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSigner {
    pub certificates: Vec<Certificate>,
}

/// A basic abstraction of a file in a virtual filesystem.
///
/// Every method fails with an illegal-state error once [`VirtualFile::close`]
/// has been called. Lookups that find nothing return `Ok(None)`.
pub trait VirtualFile: fmt::Debug + Send + Sync + 'static {
    /// The simple name (`X.class`).
    fn name(&self) -> Result<String>;

    /// The path name relative to the VFS root (`/org/jboss/X.class`).
    fn path_name(&self) -> Result<String>;

    fn is_file(&self) -> Result<bool>;

    fn is_directory(&self) -> Result<bool>;

    /// The URL of this entry. Directory URLs end with `/`.
    fn to_url(&self) -> Result<Url>;

    /// The URL used for streaming.
    ///
    /// Returns `None` for a directory that is not the mounted root.
    fn stream_url(&self) -> Result<Option<Url>>;

    /// `None` at the filesystem root.
    fn parent(&self) -> Result<Option<VirtualFileRef>>;

    /// Look up a descendant. A leading `/` is ignored.
    fn child(&self, path: &str) -> Result<Option<VirtualFileRef>>;

    fn children(&self) -> Result<Vec<VirtualFileRef>>;

    /// All descendants in pre-order.
    fn children_recursively(&self) -> Result<Vec<VirtualFileRef>>;

    /// Entries below `path` whose name matches `pattern` (default `*`).
    ///
    /// Only files are returned, never directories. With `recurse` unset only
    /// the direct children of `path` are considered. Returns `None` when
    /// `path` does not exist.
    fn find_entries(
        &self,
        path: &str,
        pattern: Option<&str>,
        recurse: bool,
    ) -> Result<Option<FindEntries>>;

    /// The paths of `path` and everything below it, relative to this file.
    ///
    /// Directory paths end with `/`, no path starts with `/`. Returns `None`
    /// when `path` does not exist.
    fn entry_paths(&self, path: &str) -> Result<Option<EntryPaths>>;

    fn open_stream(&self) -> Result<VirtualStream>;

    /// The certificates of all code signers, `None` if not signed.
    fn certificates(&self) -> Result<Option<Vec<Certificate>>> {
        Ok(self.code_signers()?.map(|signers| {
            signers
                .into_iter()
                .flat_map(|signer| signer.certificates)
                .collect()
        }))
    }

    /// `None` if not signed.
    fn code_signers(&self) -> Result<Option<Vec<CodeSigner>>>;

    /// Release any mount and temporary files held by this file.
    ///
    /// Never fails and may be called more than once.
    fn close(&self);

    fn as_any(&self) -> &dyn Any;
}

impl dyn VirtualFile {
    #[inline]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}
