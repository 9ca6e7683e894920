//! File resolution: configuration name to ordered candidate files

use crate::suffix::SuffixSource;
use overlay_fs::{FileSystem, SearchPath};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

/// One candidate file for a configuration name.
///
/// Candidates that do not exist are kept (with `modified == None`) so that a
/// file appearing or disappearing changes the [`ConfigFileList`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// The configuration name this file contributes to.
    pub name: String,
    /// The suffixed base name, e.g. `global_local`.
    pub suffixed_name: String,
    /// Full path of the candidate file.
    pub path: PathBuf,
    /// Modification time, or `None` if the file does not exist.
    pub modified: Option<SystemTime>,
}

impl FileDescriptor {
    pub fn exists(&self) -> bool {
        self.modified.is_some()
    }
}

/// The ordered candidate files for a name at one point in time.
///
/// Two lists are equal iff they are element-wise identical, absent
/// modification times included. This equality is the change fingerprint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFileList {
    files: Vec<FileDescriptor>,
}

impl ConfigFileList {
    pub fn files(&self) -> &[FileDescriptor] {
        &self.files
    }

    /// Only the candidates that exist.
    pub fn existing(&self) -> impl Iterator<Item = &FileDescriptor> {
        self.files.iter().filter(|f| f.exists())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FromIterator<FileDescriptor> for ConfigFileList {
    fn from_iter<I: IntoIterator<Item = FileDescriptor>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

/// Combines the suffix list with the search path.
pub struct FileResolver {
    search_path: SearchPath,
    suffixes: Arc<dyn SuffixSource>,
    extension: String,
    fs: Arc<dyn FileSystem>,
}

impl FileResolver {
    pub fn new(
        search_path: SearchPath,
        suffixes: Arc<dyn SuffixSource>,
        extension: impl Into<String>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            search_path,
            suffixes,
            extension: extension.into().trim_start_matches('.').to_string(),
            fs,
        }
    }

    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// List every candidate file for `name`, lowest precedence first.
    ///
    /// Suffixes are walked in ascending precedence; within a suffix the
    /// search path is walked last to first. Probes the filesystem once per
    /// candidate and has no other side effects.
    pub fn resolve(&self, name: &str) -> ConfigFileList {
        let suffixed_names = self.suffixes.suffixes_for(name);
        let mut files = Vec::with_capacity(suffixed_names.len() * self.search_path.len());

        for suffixed_name in suffixed_names {
            let file_name = format!("{}.{}", suffixed_name, self.extension);
            for dir in self.search_path.dirs().iter().rev() {
                let path = dir.join(&file_name);
                let modified = self.fs.probe(&path);
                files.push(FileDescriptor {
                    name: name.to_string(),
                    suffixed_name: suffixed_name.clone(),
                    path,
                    modified,
                });
            }
        }

        tracing::trace!(name, candidates = files.len(), "Resolved config files");
        ConfigFileList { files }
    }
}
