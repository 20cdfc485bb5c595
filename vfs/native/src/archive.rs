//! Zip extraction and re-packing.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MANIFEST_DIR: &str = "META-INF";
const MANIFEST_FILE: &str = "MANIFEST.MF";

fn zip_error(error: zip::result::ZipError) -> io::Error {
    match error {
        zip::result::ZipError::Io(e) => e,
        other => io::Error::new(io::ErrorKind::InvalidData, other),
    }
}

/// Extract every entry of a zip archive below `dest`.
///
/// Entries whose names would escape `dest` are rejected by the zip reader.
pub fn extract<R: Read + Seek>(reader: R, dest: &Path) -> io::Result<()> {
    let mut archive = ZipArchive::new(reader).map_err(zip_error)?;
    archive.extract(dest).map_err(zip_error)
}

pub fn extract_file(archive: &Path, dest: &Path) -> io::Result<()> {
    extract(BufReader::new(File::open(archive)?), dest)
}

/// Pack the contents of `dir` into a new zip file at `dest`.
///
/// The manifest, when present, is written first so that readers which only
/// look at the leading entries find it. Entries are otherwise written in
/// name order.
pub fn write_directory(dir: &Path, dest: &Path) -> io::Result<()> {
    let mut writer = ZipWriter::new(BufWriter::new(File::create(dest)?));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let manifest = dir.join(MANIFEST_DIR).join(MANIFEST_FILE);
    let has_manifest = manifest.is_file();
    if has_manifest {
        writer
            .add_directory(format!("{MANIFEST_DIR}/"), options)
            .map_err(zip_error)?;
        writer
            .start_file(format!("{MANIFEST_DIR}/{MANIFEST_FILE}"), options)
            .map_err(zip_error)?;
        io::copy(&mut File::open(&manifest)?, &mut writer)?;
    }

    let entries = WalkDir::new(dir).sort_by_file_name().min_depth(1);
    for entry in entries {
        let entry = entry.map_err(io::Error::from)?;
        let rel_path = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let rel_str = rel_path.to_string_lossy().replace('\\', "/");

        if has_manifest
            && (rel_str == MANIFEST_DIR || rel_str == format!("{MANIFEST_DIR}/{MANIFEST_FILE}"))
        {
            continue;
        }

        if entry.file_type().is_dir() {
            writer
                .add_directory(format!("{rel_str}/"), options)
                .map_err(zip_error)?;
        } else if entry.file_type().is_file() {
            writer.start_file(rel_str, options).map_err(zip_error)?;
            io::copy(&mut File::open(entry.path())?, &mut writer)?;
        }
    }

    let mut out = writer.finish().map_err(zip_error)?;
    out.flush()
}

/// Copy `input` into a new file at `dest`.
pub fn spool<R: Read + ?Sized>(input: &mut R, dest: &Path) -> io::Result<u64> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = BufWriter::new(File::create(dest)?);
    let copied = io::copy(input, &mut out)?;
    out.flush()?;
    Ok(copied)
}
