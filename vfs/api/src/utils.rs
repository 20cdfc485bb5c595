//! Small helpers used by the OSGi layer on top of virtual files.

use std::fmt::Display;
use std::io::{self, Read, Write};
use std::path::MAIN_SEPARATOR;

use tracing::trace;

use crate::manifest::{MANIFEST_NAME, Manifest};
use crate::{Result, VfsError, VirtualFile};

/// Read the manifest of an archive, `None` if it has none.
pub fn get_manifest(archive: &dyn VirtualFile) -> Result<Option<Manifest>> {
    let Some(manifest) = archive.child(MANIFEST_NAME)? else {
        return Ok(None);
    };
    let stream = manifest.open_stream()?;
    let parsed = Manifest::read(stream)
        .map_err(|e| VfsError::backend(format!("reading {MANIFEST_NAME}"), e))?;
    Ok(Some(parsed))
}

/// Copy everything from `input` to `output` and flush the output.
pub fn copy_stream<R, W>(input: &mut R, output: &mut W) -> io::Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let copied = io::copy(input, output);
    output.flush()?;
    copied
}

/// Log a failed cleanup at trace level instead of propagating it.
pub fn safe_close<E: Display>(what: &str, result: std::result::Result<(), E>) {
    if let Err(e) = result {
        trace!(resource = what, error = %e, "Failed to close resource");
    }
}

/// The directory of a class: `org.jboss.X` → `org/jboss`.
pub fn path_from_class_name(class_name: &str) -> String {
    match class_name.rfind('.') {
        Some(idx) => path_from_package_name(&class_name[..idx]),
        None => String::new(),
    }
}

pub fn path_from_package_name(package_name: &str) -> String {
    package_name.replace('.', &MAIN_SEPARATOR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_and_package_paths() {
        let sep = MAIN_SEPARATOR;
        assert_eq!(
            path_from_class_name("org.jboss.osgi.X"),
            format!("org{sep}jboss{sep}osgi")
        );
        assert_eq!(path_from_class_name("X"), "");
        assert_eq!(path_from_package_name("org.jboss"), format!("org{sep}jboss"));
    }

    #[test]
    fn copy_stream_copies_and_flushes() {
        let mut input: &[u8] = b"some bytes";
        let mut out = io::BufWriter::new(Vec::new());
        let n = copy_stream(&mut input, &mut out).unwrap();
        assert_eq!(n, 10);
        assert_eq!(out.get_ref().as_slice(), b"some bytes");
    }

    #[test]
    fn safe_close_swallows() {
        safe_close("nothing", Ok::<(), io::Error>(()));
        safe_close("broken", Err(io::Error::other("boom")));
    }
}
