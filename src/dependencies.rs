//! Files whose contents can invalidate generated code.

use std::path::{Path, PathBuf};

use indexmap::IndexSet;

/// Ordered set of source files accumulated while resolving and compiling.
///
/// The set only grows during a build pass; a new pass starts from an empty set.
/// Build tools use it to decide when the generated container is stale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    files: IndexSet<PathBuf>,
}

impl DependencySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a file; callables without a declaring file are ignored.
    pub fn add(&mut self, file: Option<PathBuf>) {
        if let Some(file) = file {
            if self.files.insert(file.clone()) {
                tracing::trace!(file = %file.display(), "dependency added");
            }
        }
    }

    pub fn contains(&self, file: impl AsRef<Path>) -> bool {
        self.files.contains(file.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn to_vec(&self) -> Vec<PathBuf> {
        self.files.iter().cloned().collect()
    }
}
