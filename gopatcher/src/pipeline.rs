//! End-to-end overlay generation.
//!
//! ```text
//! PatchDiscovery ──► PackageQuery ──► build_overlay ──► write_manifest
//!   (patches)      (package table)     (manifest)       (patches.json)
//! ```
//!
//! Each stage consumes the complete output of the previous one. The first
//! error aborts the run and nothing is written.

use std::path::PathBuf;

use tracing::info;

use crate::config::PatcherConfig;
use crate::error::OverlayResult;
use crate::overlay::{build_overlay, write_manifest, OverlayManifest};
use crate::patches::{distinct_import_paths, PatchDiscovery};
use crate::resolver::{GoListQuery, PackageQuery};

/// Discover patches, resolve their packages and build the manifest.
pub fn generate_manifest(
    config: &PatcherConfig,
    query: &dyn PackageQuery,
) -> OverlayResult<OverlayManifest> {
    let patches = PatchDiscovery::new(config.patches_dir()).find_patches()?;
    info!(
        count = patches.len(),
        root = %config.patches_dir().display(),
        "Discovered patches"
    );

    let import_paths = distinct_import_paths(&patches);
    let packages = query.resolve(&import_paths)?;

    build_overlay(&patches, &packages, config.patches_dir())
}

/// Generate the manifest and write it, returning the manifest's path.
pub fn run(config: &PatcherConfig, query: &dyn PackageQuery) -> OverlayResult<PathBuf> {
    let manifest = generate_manifest(config, query)?;
    write_manifest(&manifest, &config.temp_parent())
}

/// [`run`] with the Go toolchain as the package backend.
pub fn run_with_go(config: &PatcherConfig) -> OverlayResult<PathBuf> {
    run(config, &GoListQuery::from_config(config))
}
