//! Manifest persistence.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::info;

use super::builder::OverlayManifest;
use crate::error::{OverlayError, OverlayResult};

/// File name of the manifest inside its temporary directory.
pub const MANIFEST_FILENAME: &str = "patches.json";

/// Prefix of the temporary directory holding the manifest.
pub const TEMP_DIR_PREFIX: &str = "gopatcher";

/// Write `manifest` to `<fresh dir under parent>/patches.json`.
///
/// The directory is left in place; removing it is the caller's business.
/// Returns the absolute path of the written file.
pub fn write_manifest(manifest: &OverlayManifest, parent: &Path) -> OverlayResult<PathBuf> {
    let bytes = serde_json::to_vec(manifest).map_err(OverlayError::Serialize)?;

    let temp_dir = tempfile::Builder::new()
        .prefix(TEMP_DIR_PREFIX)
        .tempdir_in(parent)
        .map_err(|source| OverlayError::CreateDir {
            parent: parent.to_path_buf(),
            source,
        })?;
    let path = persist_manifest(temp_dir, &bytes)?;

    info!(
        path = %path.display(),
        replacements = manifest.len(),
        "Wrote overlay manifest"
    );
    Ok(path)
}

/// Write `bytes` into `temp_dir` and keep the directory.
///
/// On failure `temp_dir` is dropped, which removes it again.
fn persist_manifest(temp_dir: TempDir, bytes: &[u8]) -> OverlayResult<PathBuf> {
    let dir = std::path::absolute(temp_dir.path()).map_err(|source| OverlayError::CreateDir {
        parent: temp_dir.path().to_path_buf(),
        source,
    })?;

    let path = dir.join(MANIFEST_FILENAME);
    write_file(&path, bytes).map_err(|source| OverlayError::Write {
        path: path.clone(),
        source,
    })?;

    let _ = temp_dir.keep();
    Ok(path)
}

fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }

    let mut file = options.open(path)?;
    file.write_all(bytes)?;
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_manifest() -> OverlayManifest {
        let mut manifest = OverlayManifest::new();
        manifest
            .insert(
                PathBuf::from("/src/widgets/list.go"),
                PathBuf::from("patches/widgets/list.go"),
            )
            .unwrap();
        manifest
    }

    #[test]
    fn test_write_manifest_layout() {
        let temp = TempDir::new().unwrap();

        let path = write_manifest(&sample_manifest(), temp.path()).unwrap();

        assert!(path.is_absolute());
        assert_eq!(path.file_name().unwrap(), MANIFEST_FILENAME);
        let dir = path.parent().unwrap();
        assert!(dir.starts_with(temp.path()));
        assert!(dir
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(TEMP_DIR_PREFIX));
    }

    #[test]
    fn test_write_manifest_contents() {
        let temp = TempDir::new().unwrap();

        let path = write_manifest(&sample_manifest(), temp.path()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            r#"{"Replace":{"/src/widgets/list.go":"patches/widgets/list.go"}}"#
        );
        let decoded: OverlayManifest = serde_json::from_str(&contents).unwrap();
        assert_eq!(decoded, sample_manifest());
    }

    #[test]
    fn test_write_manifest_uses_fresh_directory() {
        let temp = TempDir::new().unwrap();

        let first = write_manifest(&sample_manifest(), temp.path()).unwrap();
        let second = write_manifest(&OverlayManifest::new(), temp.path()).unwrap();

        assert_ne!(first.parent(), second.parent());
        assert!(first.exists());
        assert_eq!(std::fs::read_to_string(second).unwrap(), r#"{"Replace":{}}"#);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_manifest_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = write_manifest(&sample_manifest(), temp.path()).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o600, 0o600);
        assert_eq!(mode & 0o022, 0);
    }

    #[test]
    fn test_write_manifest_missing_parent() {
        let temp = TempDir::new().unwrap();
        let parent = temp.path().join("does-not-exist");

        let result = write_manifest(&sample_manifest(), &parent);
        assert!(matches!(result, Err(OverlayError::CreateDir { .. })));
    }

    #[test]
    fn test_failed_write_removes_directory() {
        let temp = TempDir::new().unwrap();
        let manifest_dir = tempfile::Builder::new()
            .prefix(TEMP_DIR_PREFIX)
            .tempdir_in(temp.path())
            .unwrap();
        let dir = manifest_dir.path().to_path_buf();
        // A directory in the way makes the file create fail.
        std::fs::create_dir(dir.join(MANIFEST_FILENAME)).unwrap();

        let result = persist_manifest(manifest_dir, b"{}");

        assert!(matches!(result, Err(OverlayError::Write { .. })));
        assert!(!dir.exists());
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_successful_write_keeps_directory() {
        let temp = TempDir::new().unwrap();
        let manifest_dir = tempfile::Builder::new()
            .prefix(TEMP_DIR_PREFIX)
            .tempdir_in(temp.path())
            .unwrap();

        let path = persist_manifest(manifest_dir, b"{}").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }
}
