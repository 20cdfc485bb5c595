#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use osgi_vfs_api::{VfsAdaptor, VirtualFileRef, VirtualStream};
use osgi_vfs_mount::{MountAdaptor, MountConfig};
use osgi_vfs_native::Vfs;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const MANIFEST: &str = "Manifest-Version: 1.0\nBundle-SymbolicName: example-simple\n";
pub const ACTIVATOR: &str = "org/jboss/test/osgi/vfs30/bundle/SimpleActivator.class";

/// An adaptor over a private [`Vfs`], so tests do not see each other's mounts.
pub fn adaptor() -> MountAdaptor {
    adaptor_with(MountConfig::default())
}

pub fn adaptor_with(config: MountConfig) -> MountAdaptor {
    MountAdaptor::with_vfs(Vfs::new(), config).unwrap()
}

pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        if name.ends_with('/') {
            writer
                .add_directory(*name, SimpleFileOptions::default())
                .unwrap();
        } else {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

/// The `example-simple` bundle: a manifest and one class.
pub fn simple_bundle() -> Vec<u8> {
    zip_bytes(&[
        ("META-INF/MANIFEST.MF", MANIFEST.as_bytes()),
        (ACTIVATOR, &[0xca, 0xfe, 0xba, 0xbe]),
    ])
}

pub fn write_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, data).unwrap();
    path
}

pub fn from_bytes(adaptor: &MountAdaptor, name: &str, bytes: &[u8]) -> VirtualFileRef {
    let mut bytes = bytes;
    let input: &mut dyn Read = &mut bytes;
    adaptor.from_stream(name, Some(input)).unwrap()
}

pub fn from_path(adaptor: &MountAdaptor, path: &Path) -> VirtualFileRef {
    let url = url::Url::from_file_path(path).unwrap();
    adaptor.from_url(&url).unwrap()
}

pub fn read_bytes(mut stream: VirtualStream) -> Vec<u8> {
    let mut out = Vec::new();
    stream.read_to_end(&mut out).unwrap();
    out
}

pub fn read_string(stream: VirtualStream) -> String {
    String::from_utf8(read_bytes(stream)).unwrap()
}

/// Names of all entries of a zip archive, in archive order.
pub fn zip_entry_names(bytes: Vec<u8>) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

pub fn zip_entry(bytes: Vec<u8>, name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut out = String::new();
    entry.read_to_string(&mut out).unwrap();
    out
}
