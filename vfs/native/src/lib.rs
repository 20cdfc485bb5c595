//! A minimal read-only virtual filesystem.
//!
//! Virtual paths mirror host paths until a zip archive is mounted over one
//! of them; from then on everything below the mount point is served from a
//! temporary directory holding the extracted archive.

mod archive;
mod file;
mod ids;
mod mount;
mod path;
mod temp;
mod vfs;

pub use archive::{extract, extract_file, spool, write_directory};
pub use file::VfsFile;
pub use ids::{HandleId, MountId};
pub use mount::MountHandle;
pub use path::VfsPathBuf;
pub use temp::{TempFileProvider, register_exit_cleanup, run_exit_cleanup};
pub use vfs::{VFS_SCHEME, Vfs};

fn safe_release(result: std::io::Result<()>) {
    if let Err(e) = result {
        tracing::trace!(error = %e, "failed to release mount");
    }
}
