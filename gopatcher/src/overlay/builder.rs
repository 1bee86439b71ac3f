//! Overlay manifest construction.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{OverlayError, OverlayResult};
use crate::patches::Patch;
use crate::resolver::PackageTable;

/// The document `go build -overlay` reads.
///
/// Serializes as `{"Replace": {"<original>": "<replacement>", ...}}`. Keys are
/// kept sorted so the same inputs always produce the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayManifest {
    #[serde(rename = "Replace")]
    replace: BTreeMap<PathBuf, PathBuf>,
}

impl OverlayManifest {
    /// Create an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `original` with `replacement`.
    ///
    /// Each original file may be replaced only once; a second replacement
    /// for the same file is rejected.
    pub fn insert(&mut self, original: PathBuf, replacement: PathBuf) -> OverlayResult<()> {
        match self.replace.entry(original) {
            Entry::Vacant(slot) => {
                slot.insert(replacement);
                Ok(())
            }
            Entry::Occupied(slot) => Err(OverlayError::DuplicateTarget {
                original: slot.key().clone(),
                first: slot.get().clone(),
                second: replacement,
            }),
        }
    }

    /// Replacement for `original`, if any.
    pub fn replacement(&self, original: &Path) -> Option<&Path> {
        self.replace.get(original).map(PathBuf::as_path)
    }

    /// Number of replacements.
    pub fn len(&self) -> usize {
        self.replace.len()
    }

    /// Whether the manifest has no replacements.
    pub fn is_empty(&self) -> bool {
        self.replace.is_empty()
    }
}

/// Build the overlay for `patches` from resolved packages.
///
/// Each patch maps `<package dir>/<filename>` to
/// `<patches_dir>/<import path>/<filename>`. A patch whose import path is not
/// in `packages` fails the whole build.
pub fn build_overlay(
    patches: &[Patch],
    packages: &PackageTable,
    patches_dir: &Path,
) -> OverlayResult<OverlayManifest> {
    let mut manifest = OverlayManifest::new();

    for patch in patches {
        let package =
            packages
                .get(&patch.import_path)
                .ok_or_else(|| OverlayError::PackageNotFound {
                    import_path: patch.import_path.clone(),
                })?;

        let original = package.dir.join(&patch.filename);
        let replacement = patch.source_path(patches_dir);
        debug!(
            original = %original.display(),
            replacement = %replacement.display(),
            "Adding replacement"
        );
        manifest.insert(original, replacement)?;
    }

    Ok(manifest)
}
