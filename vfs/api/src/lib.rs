//! A small, backend-agnostic virtual file abstraction.
//!
//! The OSGi layer reads bundles, plain directories and nested archives
//! through [`VirtualFile`]. Concrete virtual filesystems plug in by
//! implementing [`VfsAdaptor`] and installing it into [`AbstractVfs`].

mod adaptor;
mod error;
mod facade;
mod virtual_file;

pub mod enumeration;
pub mod manifest;
pub mod matcher;
pub mod utils;

pub use adaptor::{NativeHandle, VfsAdaptor};
pub use enumeration::{EntryPaths, FindEntries};
pub use error::{Result, VfsError};
pub use facade::AbstractVfs;
pub use manifest::{Attributes, MANIFEST_NAME, Manifest};
pub use matcher::PathMatcher;
pub use virtual_file::{Certificate, CodeSigner, VirtualFile, VirtualFileRef, VirtualStream};

/// Environment variable enabling detection of virtual files that are dropped
/// while still holding a mount.
pub const VFS_LEAK_DEBUGGING_ENV: &str = "OSGI_VFS_LEAK_DEBUGGING";
