//! Package resolution through `go list -json`.

use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::{debug, info};

use super::descriptor::{decode_packages, PackageTable};
use crate::config::PatcherConfig;
use crate::error::{OverlayError, OverlayResult};

/// Resolves import paths to package descriptors.
pub trait PackageQuery {
    /// Resolve every import path in `import_paths` with a single query.
    ///
    /// Import paths the backend does not know are simply absent from the
    /// returned table; it is up to the caller to decide whether that is an
    /// error.
    fn resolve(&self, import_paths: &[String]) -> OverlayResult<PackageTable>;
}

/// Queries the Go toolchain with one batched `go list -json` call.
#[derive(Debug, Clone)]
pub struct GoListQuery {
    go_binary: PathBuf,
    module_dir: Option<PathBuf>,
    build_tags: Vec<String>,
}

impl GoListQuery {
    /// Create a query that runs `go_binary`.
    pub fn new(go_binary: impl Into<PathBuf>) -> Self {
        Self {
            go_binary: go_binary.into(),
            module_dir: None,
            build_tags: Vec::new(),
        }
    }

    /// Create a query from the run configuration.
    pub fn from_config(config: &PatcherConfig) -> Self {
        Self {
            go_binary: config.go_binary.clone(),
            module_dir: config.module_dir.clone(),
            build_tags: config.build_tags.clone(),
        }
    }

    /// Build the `list` command for `import_paths`.
    pub fn command(&self, import_paths: &[String]) -> Command {
        let mut command = Command::new(&self.go_binary);
        if let Some(dir) = &self.module_dir {
            command.arg("-C").arg(dir);
        }
        command.args(["list", "-json"]);
        if !self.build_tags.is_empty() {
            command.arg("-tags").arg(self.build_tags.join(","));
        }
        command.args(import_paths);
        command
    }

    fn program(&self) -> String {
        self.go_binary.display().to_string()
    }
}

impl PackageQuery for GoListQuery {
    fn resolve(&self, import_paths: &[String]) -> OverlayResult<PackageTable> {
        // Without arguments `go list` reports the package in the working
        // directory, which no patch asked for.
        if import_paths.is_empty() {
            debug!("No import paths to resolve, skipping go list");
            return Ok(PackageTable::new());
        }

        info!(count = import_paths.len(), "Resolving packages with go list");
        let table = stream_packages(self.command(import_paths), &self.program())?;
        info!(resolved = table.len(), "Package resolution complete");
        Ok(table)
    }
}

/// Run `command` and decode its standard output as a package stream.
///
/// Standard error is passed through to ours untouched. The exit status is
/// checked only after the whole stream has been consumed.
pub(crate) fn stream_packages(mut command: Command, program: &str) -> OverlayResult<PackageTable> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit());

    debug!(command = ?command, "Spawning package query");
    let mut child = command.spawn().map_err(|source| OverlayError::QuerySpawn {
        program: program.to_string(),
        source,
    })?;

    let Some(stdout) = child.stdout.take() else {
        let _ = child.kill();
        let _ = child.wait();
        return Err(OverlayError::QueryRead {
            program: program.to_string(),
            source: io::Error::new(io::ErrorKind::Other, "stdout was not captured"),
        });
    };

    let table = match decode_packages(BufReader::new(stdout), program) {
        Ok(table) => table,
        Err(e) => {
            // Reap the child; its exit status no longer matters.
            let _ = child.kill();
            let _ = child.wait();
            return Err(e);
        }
    };

    let status = child.wait().map_err(|source| OverlayError::QueryRead {
        program: program.to_string(),
        source,
    })?;
    if !status.success() {
        return Err(OverlayError::QueryFailed {
            program: program.to_string(),
            status,
        });
    }

    Ok(table)
}
