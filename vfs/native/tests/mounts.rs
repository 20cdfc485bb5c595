use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use osgi_vfs_native::{TempFileProvider, Vfs};
use pretty_assertions::assert_eq;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
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

fn write_jar(dir: &Path, name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, zip_bytes(entries)).unwrap();
    path
}

fn read_all(mut file: File) -> String {
    let mut out = String::new();
    file.read_to_string(&mut out).unwrap();
    out
}

#[test_log::test]
fn zip_mount_turns_file_into_directory() {
    let temp = tempfile::tempdir().unwrap();
    let jar = write_jar(
        temp.path(),
        "simple.jar",
        &[("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n"), ("a/b.txt", b"bee")],
    );
    let provider = TempFileProvider::create("osgitmp-native-").unwrap();
    let vfs = Vfs::new();

    let file = vfs.get(osgi_vfs_native::VfsPathBuf::from_host(&jar));
    assert!(file.is_file());
    assert!(!file.is_mount_point());

    let handle = vfs.mount_zip(&file, &file, &provider).unwrap();
    let extracted = handle.temp_dir().unwrap();
    assert!(file.is_directory());
    assert!(file.is_mount_point());
    assert_eq!(vfs.mount_count(), 1);

    let names: Vec<_> = file
        .children()
        .unwrap()
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    assert_eq!(names, vec!["META-INF", "a"]);

    let b = file.child("/a/b.txt");
    assert_eq!(b.path_name(), format!("{}/a/b.txt", jar.display()));
    assert_eq!(read_all(b.open().unwrap()), "bee");

    handle.close().unwrap();
    assert!(file.is_file());
    assert!(!b.exists());
    assert!(!extracted.exists());
    assert_eq!(vfs.mount_count(), 0);
}

#[test_log::test]
fn stream_mount_at_synthetic_path() {
    let provider = TempFileProvider::create("osgitmp-native-").unwrap();
    let vfs = Vfs::new();
    let bytes = zip_bytes(&[("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n")]);

    let point = vfs.get_child("/foo/bar");
    assert!(!point.exists());
    let handle = vfs
        .mount_zip_stream(&mut bytes.as_slice(), "bar", &point, &provider)
        .unwrap();

    let manifest = point.child("META-INF/MANIFEST.MF");
    assert_eq!(manifest.path_name(), "/foo/bar/META-INF/MANIFEST.MF");
    assert!(manifest.is_file());
    drop(handle);
    assert!(!manifest.exists());
}

#[test_log::test]
fn nested_archives_mount_through_outer_mount() {
    let temp = tempfile::tempdir().unwrap();
    let inner = zip_bytes(&[("inner.txt", b"inside")]);
    let outer = write_jar(temp.path(), "outer.jar", &[("lib/inner.jar", &inner)]);
    let provider = TempFileProvider::create("osgitmp-native-").unwrap();
    let vfs = Vfs::new();

    let outer_file = vfs.get(osgi_vfs_native::VfsPathBuf::from_host(&outer));
    let _outer_mount = vfs.mount_zip(&outer_file, &outer_file, &provider).unwrap();
    let inner_file = outer_file.child("lib/inner.jar");
    assert!(inner_file.is_file());

    let _inner_mount = vfs.mount_zip(&inner_file, &inner_file, &provider).unwrap();
    assert!(inner_file.is_directory());
    assert_eq!(read_all(inner_file.child("inner.txt").open().unwrap()), "inside");
}

#[test]
fn handles_are_interned_while_alive() {
    let vfs = Vfs::new();
    let a = vfs.get_child("/x/y");
    let b = vfs.get_child("x//y/");
    assert_eq!(a, b);
    assert_eq!(a.id(), b.id());

    let first_id = a.id();
    drop(a);
    drop(b);
    let c = vfs.get_child("/x/y");
    assert_ne!(c.id(), first_id);
}

#[test]
fn urls_round_trip() {
    let vfs = Vfs::new();
    let file = vfs.get_child("/some dir/file#1.txt");
    let url = file.to_url().unwrap();
    assert_eq!(url.scheme(), "vfs");
    assert_eq!(vfs.get_url(&url).unwrap(), file);

    let root = vfs.root();
    assert_eq!(root.to_url().unwrap().as_str(), "vfs:/");
    assert!(root.parent().is_none());
}

#[test]
fn unknown_scheme_is_invalid_input() {
    let vfs = Vfs::new();
    let url = url::Url::parse("http://example.com/a.jar").unwrap();
    let err = vfs.get_url(&url).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
}
