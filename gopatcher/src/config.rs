//! Run configuration shared by every pipeline stage.
//!
//! `PatcherConfig` is built once (the CLI builds it from its arguments) and
//! passed by reference to each component, so the patches root used for
//! discovery is the same one used to build replacement paths.

use std::path::{Path, PathBuf};

/// Default patches root, relative to the working directory.
pub const DEFAULT_PATCHES_DIR: &str = "patches";

/// Default toolchain binary used for package queries.
pub const DEFAULT_GO_BINARY: &str = "go";

/// Configuration for one overlay generation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatcherConfig {
    /// Root of the patch tree.
    pub patches_dir: PathBuf,

    /// Toolchain binary to run `list` with.
    pub go_binary: PathBuf,

    /// Directory the toolchain should resolve import paths from (`go -C`).
    pub module_dir: Option<PathBuf>,

    /// Build tags forwarded to `go list -tags`.
    pub build_tags: Vec<String>,

    /// Parent directory for the manifest's temporary directory.
    ///
    /// `None` uses the system temporary directory.
    pub temp_parent: Option<PathBuf>,
}

impl Default for PatcherConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PATCHES_DIR)
    }
}

impl PatcherConfig {
    /// Create a config for the given patches root with default settings.
    pub fn new(patches_dir: impl Into<PathBuf>) -> Self {
        Self {
            patches_dir: patches_dir.into(),
            go_binary: PathBuf::from(DEFAULT_GO_BINARY),
            module_dir: None,
            build_tags: Vec::new(),
            temp_parent: None,
        }
    }

    /// Set the toolchain binary.
    pub fn with_go_binary(mut self, go_binary: impl Into<PathBuf>) -> Self {
        self.go_binary = go_binary.into();
        self
    }

    /// Resolve import paths from another directory.
    pub fn with_module_dir(mut self, module_dir: impl Into<PathBuf>) -> Self {
        self.module_dir = Some(module_dir.into());
        self
    }

    /// Set the build tags used for resolution.
    pub fn with_build_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.build_tags = tags
            .into_iter()
            .map(Into::into)
            .filter(|t: &String| !t.is_empty())
            .collect();
        self
    }

    /// Place the manifest's temporary directory under `parent`.
    pub fn with_temp_parent(mut self, parent: impl Into<PathBuf>) -> Self {
        self.temp_parent = Some(parent.into());
        self
    }

    /// Get the patches root.
    pub fn patches_dir(&self) -> &Path {
        &self.patches_dir
    }

    /// Parent directory the manifest writer creates its directory in.
    pub fn temp_parent(&self) -> PathBuf {
        self.temp_parent.clone().unwrap_or_else(std::env::temp_dir)
    }
}
