//! Error types for the overlay pipeline.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Result type for pipeline operations.
pub type OverlayResult<T> = Result<T, OverlayError>;

/// Errors that can occur while building an overlay manifest.
///
/// Every variant is fatal to the run. Callers distinguish them only to
/// produce a better message (see [`OverlayError::hint`]).
#[derive(Debug, Error)]
pub enum OverlayError {
    /// Walking the patches directory failed.
    #[error("failed to list patches in {}", .root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A patch file or one of its directories is not named in UTF-8.
    #[error("patch path is not valid UTF-8: {}", .path.display())]
    NonUtf8Path { path: PathBuf },

    /// The toolchain binary could not be started.
    #[error("failed to start {program} list")]
    QuerySpawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Reading the toolchain's standard output failed.
    #[error("failed to read output of {program} list")]
    QueryRead {
        program: String,
        #[source]
        source: io::Error,
    },

    /// An object in the toolchain's JSON stream could not be decoded.
    #[error("failed to decode JSON from {program} list")]
    QueryDecode {
        program: String,
        #[source]
        source: serde_json::Error,
    },

    /// The toolchain exited unsuccessfully.
    #[error("{program} list command failed: {status}")]
    QueryFailed { program: String, status: ExitStatus },

    /// A patch references an import path the toolchain did not report.
    #[error("package {import_path} not found")]
    PackageNotFound { import_path: String },

    /// Two patches would replace the same original file.
    #[error(
        "{} is patched by both {} and {}",
        .original.display(),
        .first.display(),
        .second.display()
    )]
    DuplicateTarget {
        original: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    /// The manifest could not be serialized.
    #[error("failed to marshal overlay JSON")]
    Serialize(#[source] serde_json::Error),

    /// The temporary directory for the manifest could not be created.
    #[error("failed to create temporary directory in {}", .parent.display())]
    CreateDir {
        parent: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The manifest file could not be written.
    #[error("failed to write to temporary file [{}]", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl OverlayError {
    /// Remediation advice for the user, when there is any.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::QuerySpawn { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                Some("is the Go toolchain installed and on PATH? Use --go to point at it")
            }
            Self::PackageNotFound { .. } => Some(
                "patch directories must mirror import paths, e.g. patches/example.com/mod/pkg/file.go",
            ),
            Self::DuplicateTarget { .. } => {
                Some("two import paths resolve to the same package directory; keep only one")
            }
            _ => None,
        }
    }
}
