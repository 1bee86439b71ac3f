//! Patch file discovery.
//!
//! Walks the patches root and records every Go source file together with
//! the import path implied by its location.

use std::path::{Component, Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{OverlayError, OverlayResult};

/// Suffix a file must carry to be treated as a patch.
pub const PATCH_SUFFIX: &str = ".go";

/// Import path recorded for files directly under the patches root.
pub const ROOT_IMPORT_PATH: &str = ".";

/// A replacement source file for a file inside an existing package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Patch {
    /// Import path of the package the file belongs to.
    pub import_path: String,

    /// Base name of the patch file (and of the file it replaces).
    pub filename: String,
}

impl Patch {
    /// Create a new patch.
    pub fn new(import_path: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            import_path: import_path.into(),
            filename: filename.into(),
        }
    }

    /// Location of the patch file under `patches_dir`.
    ///
    /// `.` components are dropped, so a root-level patch maps to
    /// `patches_dir/filename`.
    pub fn source_path(&self, patches_dir: &Path) -> PathBuf {
        patches_dir
            .join(&self.import_path)
            .join(&self.filename)
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    }
}

/// Discovers patch files under a patches root.
#[derive(Debug, Clone)]
pub struct PatchDiscovery {
    /// Root patches directory.
    patches_dir: PathBuf,
}

impl PatchDiscovery {
    /// Create a new patch discovery for the given directory.
    pub fn new(patches_dir: impl Into<PathBuf>) -> Self {
        Self {
            patches_dir: patches_dir.into(),
        }
    }

    /// Find all patch files, in traversal order.
    ///
    /// Entries are visited sorted by file name so repeated runs over the
    /// same tree yield the same order. Any traversal error, including a
    /// missing root, fails the whole discovery.
    pub fn find_patches(&self) -> OverlayResult<Vec<Patch>> {
        let mut patches = Vec::new();

        let walker = WalkDir::new(&self.patches_dir)
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|source| OverlayError::Walk {
                root: self.patches_dir.clone(),
                source,
            })?;

            if entry.file_type().is_dir() {
                continue;
            }

            if !entry
                .file_name()
                .as_encoded_bytes()
                .ends_with(PATCH_SUFFIX.as_bytes())
            {
                continue;
            }

            // Import paths and manifest entries are JSON strings.
            let non_utf8 = || OverlayError::NonUtf8Path {
                path: entry.path().to_path_buf(),
            };
            let filename = entry.file_name().to_str().ok_or_else(non_utf8)?;
            let import_path = self.import_path_of(entry.path()).ok_or_else(non_utf8)?;
            debug!(import_path = %import_path, filename, "Found patch");
            patches.push(Patch::new(import_path, filename));
        }

        Ok(patches)
    }

    /// Import path implied by a file's parent directory, or `None` if a
    /// directory name is not UTF-8.
    fn import_path_of(&self, file: &Path) -> Option<String> {
        let relative = file
            .parent()
            .and_then(|parent| parent.strip_prefix(&self.patches_dir).ok())
            .unwrap_or_else(|| Path::new(""));

        let segments = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_str()),
                _ => None,
            })
            .collect::<Option<Vec<&str>>>()?;

        if segments.is_empty() {
            Some(ROOT_IMPORT_PATH.to_string())
        } else {
            Some(segments.join("/"))
        }
    }
}

/// Distinct import paths of `patches`, in first-seen order.
pub fn distinct_import_paths(patches: &[Patch]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    patches
        .iter()
        .filter(|p| seen.insert(p.import_path.as_str()))
        .map(|p| p.import_path.clone())
        .collect()
}
