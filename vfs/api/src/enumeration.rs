//! OSGi style entry enumerations (`findEntries` / `getEntryPaths`).
//!
//! Both enumerations are computed eagerly when created and then handed out
//! as plain iterators. They are not resumable; enumerate again to observe
//! changes to the tree.

use std::vec;

use url::Url;

use crate::matcher::PathMatcher;
use crate::{Result, VirtualFile};

/// The URLs of the files below some directory whose names match a pattern.
#[derive(Debug)]
pub struct FindEntries {
    urls: vec::IntoIter<Url>,
}

impl FindEntries {
    /// Walk `file` collecting matching leaves.
    ///
    /// `file` itself is never part of the result and neither are
    /// directories. Without `recurse` only the direct children of `file` are
    /// visited.
    pub fn new(file: &dyn VirtualFile, pattern: Option<&str>, recurse: bool) -> Result<Self> {
        let matcher = PathMatcher::from_optional(pattern);
        let mut urls = Vec::new();
        visit_leaves(file, &matcher, recurse, &mut urls)?;
        Ok(Self {
            urls: urls.into_iter(),
        })
    }
}

fn visit_leaves(
    dir: &dyn VirtualFile,
    matcher: &PathMatcher,
    recurse: bool,
    out: &mut Vec<Url>,
) -> Result<()> {
    for child in dir.children()? {
        if child.is_file()? {
            if matcher.matches(&child.name()?) {
                out.push(child.to_url()?);
            }
        } else if recurse && child.is_directory()? {
            visit_leaves(child.as_ref(), matcher, recurse, out)?;
        }
    }
    Ok(())
}

impl Iterator for FindEntries {
    type Item = Url;

    fn next(&mut self) -> Option<Url> {
        self.urls.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.urls.size_hint()
    }
}

impl ExactSizeIterator for FindEntries {}

/// The paths of a file and all of its descendants relative to some root.
#[derive(Debug)]
pub struct EntryPaths {
    paths: vec::IntoIter<String>,
}

impl EntryPaths {
    /// Collect the paths of `file` and everything below it, relative to
    /// `root`.
    pub fn new(root: &dyn VirtualFile, file: &dyn VirtualFile) -> Result<Self> {
        let root_path = root.path_name()?;
        let mut paths = Vec::new();

        if let Some(path) = relative_entry_path(&root_path, &file.path_name()?, file.is_directory()?)
        {
            paths.push(path);
        }
        for child in file.children_recursively()? {
            if let Some(path) =
                relative_entry_path(&root_path, &child.path_name()?, child.is_directory()?)
            {
                paths.push(path);
            }
        }

        Ok(Self {
            paths: paths.into_iter(),
        })
    }
}

/// Turn an absolute path name into a bundle entry path.
///
/// The root prefix is removed, directories get a trailing `/` and a leading
/// `/` is dropped. The root itself yields `None`.
pub fn relative_entry_path(root_path: &str, path_name: &str, is_directory: bool) -> Option<String> {
    let mut result = if root_path.is_empty() {
        path_name.to_string()
    } else {
        path_name
            .strip_prefix(root_path)
            .unwrap_or(path_name)
            .to_string()
    };

    if is_directory && !result.ends_with('/') {
        result.push('/');
    }
    if let Some(stripped) = result.strip_prefix('/') {
        result = stripped.to_string();
    }

    if result.is_empty() { None } else { Some(result) }
}

impl Iterator for EntryPaths {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.paths.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.paths.size_hint()
    }
}

impl ExactSizeIterator for EntryPaths {}
