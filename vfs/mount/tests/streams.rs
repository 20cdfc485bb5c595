mod common;

use std::collections::BTreeSet;
use std::io::Read;

use osgi_vfs_api::utils::get_manifest;
use osgi_vfs_api::{MANIFEST_NAME, Manifest, VfsAdaptor, VfsError};
use pretty_assertions::assert_eq;

use common::*;

#[test_log::test]
fn manifest_access() {
    let adaptor = adaptor();
    let bundle = from_bytes(&adaptor, "example-simple.jar", &simple_bundle());

    let child = bundle.child(MANIFEST_NAME).unwrap().expect("manifest");
    let manifest = Manifest::read(child.open_stream().unwrap()).unwrap();
    assert_eq!(
        manifest.main_attributes().get("Bundle-SymbolicName"),
        Some("example-simple")
    );
    bundle.close();
}

#[test_log::test]
fn manifest_url_access() {
    let adaptor = adaptor();
    let bundle = from_bytes(&adaptor, "example-simple.jar", &simple_bundle());

    let child = bundle.child(MANIFEST_NAME).unwrap().expect("manifest");
    let url = child.to_url().unwrap();
    assert_eq!(url.as_str(), "vfs:/example-simple.jar/META-INF/MANIFEST.MF");
    assert_eq!(read_string(adaptor.open_url(&url).unwrap()), MANIFEST);
    bundle.close();
}

#[test]
fn entry_paths_list_everything_below_the_root() {
    let adaptor = adaptor();
    let bundle = from_bytes(&adaptor, "example-simple.jar", &simple_bundle());

    let actual: BTreeSet<String> = bundle.entry_paths("/").unwrap().unwrap().collect();
    let expected: BTreeSet<String> = [
        "META-INF/",
        "META-INF/MANIFEST.MF",
        "org/",
        "org/jboss/",
        "org/jboss/test/",
        "org/jboss/test/osgi/",
        "org/jboss/test/osgi/vfs30/",
        "org/jboss/test/osgi/vfs30/bundle/",
        ACTIVATOR,
    ]
    .into_iter()
    .map(String::from)
    .collect();
    assert_eq!(actual, expected);
    bundle.close();
}

#[test]
fn find_entries_returns_leaf_urls() {
    let adaptor = adaptor();
    let bundle = from_bytes(&adaptor, "example-simple.jar", &simple_bundle());

    let root = bundle.to_url().unwrap();
    let actual: BTreeSet<String> = bundle
        .find_entries("/", None, true)
        .unwrap()
        .unwrap()
        .map(|url| url.to_string())
        .collect();
    let expected: BTreeSet<String> = [
        format!("{root}{ACTIVATOR}"),
        format!("{root}META-INF/MANIFEST.MF"),
    ]
    .into_iter()
    .collect();
    assert_eq!(actual, expected);
    bundle.close();
}

#[test_log::test]
fn stream_url_is_a_consolidated_archive() {
    let adaptor = adaptor();
    let bundle = from_bytes(&adaptor, "example-simple.jar", &simple_bundle());

    let url = bundle.stream_url().unwrap().expect("stream url");
    assert_eq!(url.scheme(), "file");
    assert_eq!(bundle.stream_url().unwrap(), Some(url.clone()));

    let bytes = read_bytes(adaptor.open_url(&url).unwrap());
    let names = zip_entry_names(bytes.clone());
    assert_eq!(&names[..2], ["META-INF/", "META-INF/MANIFEST.MF"]);
    assert!(names.iter().any(|n| n == ACTIVATOR));
    assert_eq!(zip_entry(bytes, "META-INF/MANIFEST.MF"), MANIFEST);

    let path = url.to_file_path().unwrap();
    assert!(path.exists());
    bundle.close();
    assert!(!path.exists());
}

#[test]
fn stream_access_reads_the_archive() {
    let adaptor = adaptor();
    let bundle = from_bytes(&adaptor, "example-simple.jar", &simple_bundle());

    let bytes = read_bytes(bundle.open_stream().unwrap());
    assert_eq!(zip_entry(bytes, "META-INF/MANIFEST.MF"), MANIFEST);
    bundle.close();
}

#[test]
fn stream_names_become_virtual_paths() {
    let adaptor = adaptor();
    let cases = [
        ("foo", "/foo/META-INF/MANIFEST.MF"),
        ("/foo", "/foo/META-INF/MANIFEST.MF"),
        ("/foo/", "/foo/META-INF/MANIFEST.MF"),
        ("/foo/bar", "/foo/bar/META-INF/MANIFEST.MF"),
        ("file://foo/bar", "/file:/foo/bar/META-INF/MANIFEST.MF"),
    ];
    for (name, expected) in cases {
        let file = from_bytes(&adaptor, name, &simple_bundle());
        let manifest = file.child(MANIFEST_NAME).unwrap().expect("manifest");
        assert_eq!(manifest.path_name().unwrap(), expected, "stream name {name:?}");
        file.close();
    }
    assert_eq!(adaptor.vfs().mount_count(), 0);
}

#[test]
fn anonymous_streams_get_unique_names() {
    let adaptor = adaptor();
    let first_input = simple_bundle();
    let second_input = simple_bundle();
    let first = {
        let input: &mut dyn Read = &mut first_input.as_slice();
        adaptor.from_anonymous_stream(Some(input)).unwrap()
    };
    let second = {
        let input: &mut dyn Read = &mut second_input.as_slice();
        adaptor.from_anonymous_stream(Some(input)).unwrap()
    };

    let first_name = first.name().unwrap();
    assert!(first_name.starts_with("stream"), "{first_name}");
    assert_ne!(first_name, second.name().unwrap());
    assert!(first.child(MANIFEST_NAME).unwrap().is_some());

    first.close();
    second.close();
}

#[test]
fn missing_stream_or_name_is_rejected() {
    let adaptor = adaptor();
    assert!(matches!(
        adaptor.from_stream("foo", None),
        Err(VfsError::Null("input"))
    ));

    let bytes = simple_bundle();
    let input: &mut dyn Read = &mut bytes.as_slice();
    assert!(matches!(
        adaptor.from_stream("  ", Some(input)),
        Err(VfsError::Null("name"))
    ));
    assert!(matches!(
        adaptor.from_anonymous_stream(None),
        Err(VfsError::Null("input"))
    ));
}

#[test]
fn corrupt_stream_is_a_backend_error() {
    let adaptor = adaptor();
    let mut bytes: &[u8] = b"definitely not a zip file";
    let input: &mut dyn Read = &mut bytes;
    let err = adaptor.from_stream("broken.jar", Some(input)).unwrap_err();
    assert!(matches!(err, VfsError::Backend { .. }), "{err:?}");
    assert_eq!(adaptor.vfs().mount_count(), 0);
}

#[test]
fn manifest_helper_reads_bundle_headers() {
    let adaptor = adaptor();
    let bundle = from_bytes(&adaptor, "example-simple.jar", &simple_bundle());

    let manifest = get_manifest(&*bundle).unwrap().expect("manifest");
    assert_eq!(
        manifest.main_attributes().get("bundle-symbolicname"),
        Some("example-simple")
    );

    let no_manifest = from_bytes(&adaptor, "plain.jar", &zip_bytes(&[("a.txt", b"a")]));
    assert!(get_manifest(&*no_manifest).unwrap().is_none());

    bundle.close();
    no_manifest.close();
}
