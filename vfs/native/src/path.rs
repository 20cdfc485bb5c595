//! Normalized absolute virtual paths.

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// An absolute, normalized virtual path.
///
/// Parsing collapses repeated separators, drops `.` and resolves `..`
/// (which stops at the root). The root is displayed as `/`.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VfsPathBuf {
    segments: Vec<String>,
}

impl VfsPathBuf {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(path: &str) -> Self {
        let mut out = Self::root();
        out.push(path);
        out
    }

    /// Convert an absolute host path.
    pub fn from_host(path: &Path) -> Self {
        let mut out = Self::root();
        for component in path.components() {
            match component {
                Component::Prefix(prefix) => {
                    out.segments
                        .push(prefix.as_os_str().to_string_lossy().into_owned());
                }
                Component::RootDir | Component::CurDir => {}
                Component::ParentDir => {
                    out.segments.pop();
                }
                Component::Normal(name) => {
                    out.segments.push(name.to_string_lossy().into_owned());
                }
            }
        }
        out
    }

    /// The host path this virtual path denotes when nothing is mounted over
    /// it.
    pub fn to_host(&self) -> PathBuf {
        if cfg!(windows) {
            let mut host = PathBuf::new();
            for (idx, segment) in self.segments.iter().enumerate() {
                if idx == 0 {
                    host.push(format!("{segment}\\"));
                } else {
                    host.push(segment);
                }
            }
            host
        } else {
            PathBuf::from(self.to_string())
        }
    }

    /// Append a relative path, normalizing it on the way.
    pub fn push(&mut self, relative: &str) {
        for segment in relative.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    self.segments.pop();
                }
                name => self.segments.push(name.to_string()),
            }
        }
    }

    pub fn join(&self, relative: &str) -> Self {
        let mut out = self.clone();
        out.push(relative);
        out
    }

    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let mut out = self.clone();
        out.segments.pop();
        Some(out)
    }

    /// The last segment, empty for the root.
    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn starts_with(&self, prefix: &VfsPathBuf) -> bool {
        self.segments.starts_with(&prefix.segments)
    }
}

impl fmt::Display for VfsPathBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for VfsPathBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalizes() {
        assert_eq!(VfsPathBuf::parse("foo").to_string(), "/foo");
        assert_eq!(VfsPathBuf::parse("/foo/").to_string(), "/foo");
        assert_eq!(VfsPathBuf::parse("/foo//bar/./baz/..").to_string(), "/foo/bar");
        assert_eq!(VfsPathBuf::parse("file://foo/bar").to_string(), "/file:/foo/bar");
        assert_eq!(VfsPathBuf::parse("/../..").to_string(), "/");
        assert_eq!(VfsPathBuf::parse("").to_string(), "/");
    }

    #[test]
    fn names_and_parents() {
        let p = VfsPathBuf::parse("/a/b.jar");
        assert_eq!(p.name(), "b.jar");
        assert_eq!(p.parent().unwrap().to_string(), "/a");
        assert_eq!(VfsPathBuf::root().name(), "");
        assert!(VfsPathBuf::root().parent().is_none());
    }

    #[test]
    fn join_and_prefix() {
        let base = VfsPathBuf::parse("/a/b.jar");
        let child = base.join("/META-INF/MANIFEST.MF");
        assert_eq!(child.to_string(), "/a/b.jar/META-INF/MANIFEST.MF");
        assert!(child.starts_with(&base));
        assert!(!base.starts_with(&child));
        assert!(!VfsPathBuf::parse("/a/b.jarx").starts_with(&base));
    }

    #[cfg(unix)]
    #[test]
    fn host_round_trip() {
        let host = Path::new("/tmp/some/archive.jar");
        let path = VfsPathBuf::from_host(host);
        assert_eq!(path.to_string(), "/tmp/some/archive.jar");
        assert_eq!(path.to_host(), host);
    }
}
