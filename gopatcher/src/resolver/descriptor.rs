//! Package descriptors and the import path lookup table.

use std::collections::HashMap;
use std::io::{self, Read};
use std::path::PathBuf;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{OverlayError, OverlayResult};

/// Metadata about a resolved package, as reported by `go list -json`.
///
/// Only the fields the overlay needs are decoded; everything else in the
/// toolchain's output is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageDescriptor {
    /// Import path of the package.
    #[serde(rename = "ImportPath")]
    pub import_path: String,

    /// Absolute directory holding the package sources.
    #[serde(rename = "Dir")]
    pub dir: PathBuf,

    /// Package name from the `package` clause.
    #[serde(rename = "Name", default)]
    pub name: Option<String>,

    /// Whether the package is part of the standard library.
    #[serde(rename = "Standard", default)]
    pub standard: bool,
}

impl PackageDescriptor {
    /// Create a descriptor with only the required fields set.
    pub fn new(import_path: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            import_path: import_path.into(),
            dir: dir.into(),
            name: None,
            standard: false,
        }
    }
}

/// Resolved packages keyed by import path.
#[derive(Debug, Clone, Default)]
pub struct PackageTable {
    packages: HashMap<String, PackageDescriptor>,
}

impl PackageTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a descriptor. A later descriptor for the same import path
    /// replaces the earlier one.
    pub fn insert(&mut self, descriptor: PackageDescriptor) {
        if let Some(previous) = self
            .packages
            .insert(descriptor.import_path.clone(), descriptor)
        {
            warn!(
                import_path = %previous.import_path,
                dir = %previous.dir.display(),
                "Package reported more than once, keeping the last descriptor"
            );
        }
    }

    /// Look up a package by import path.
    pub fn get(&self, import_path: &str) -> Option<&PackageDescriptor> {
        self.packages.get(import_path)
    }

    /// Number of resolved packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether no packages were resolved.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl FromIterator<PackageDescriptor> for PackageTable {
    fn from_iter<I: IntoIterator<Item = PackageDescriptor>>(iter: I) -> Self {
        let mut table = Self::new();
        for descriptor in iter {
            table.insert(descriptor);
        }
        table
    }
}

/// Decode a stream of concatenated JSON package objects.
///
/// The stream is not a JSON array: objects follow each other separated by
/// arbitrary whitespace. Objects are decoded one at a time as the reader
/// yields bytes. `program` only names the producer in error messages.
pub fn decode_packages<R: Read>(reader: R, program: &str) -> OverlayResult<PackageTable> {
    let mut table = PackageTable::new();

    let stream = serde_json::Deserializer::from_reader(reader).into_iter::<PackageDescriptor>();
    for item in stream {
        let descriptor = item.map_err(|e| {
            if e.is_io() {
                OverlayError::QueryRead {
                    program: program.to_string(),
                    source: io::Error::from(e),
                }
            } else {
                OverlayError::QueryDecode {
                    program: program.to_string(),
                    source: e,
                }
            }
        })?;

        debug!(
            import_path = %descriptor.import_path,
            dir = %descriptor.dir.display(),
            standard = descriptor.standard,
            "Resolved package"
        );
        table.insert(descriptor);
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_PACKAGES: &str = r#"{
	"Dir": "/src/widgets",
	"ImportPath": "widgets",
	"Name": "widgets",
	"GoFiles": ["list.go"],
	"Module": {"Path": "widgets", "Main": true}
}
{
	"Dir": "/src/widgets/extra",
	"ImportPath": "widgets/extra",
	"Name": "extra"
}
"#;

    #[test]
    fn test_decode_concatenated_objects() {
        let table = decode_packages(TWO_PACKAGES.as_bytes(), "go").unwrap();

        assert_eq!(table.len(), 2);
        let widgets = table.get("widgets").unwrap();
        assert_eq!(widgets.dir, PathBuf::from("/src/widgets"));
        assert_eq!(widgets.name.as_deref(), Some("widgets"));
        assert!(!widgets.standard);
        assert_eq!(
            table.get("widgets/extra").unwrap().dir,
            PathBuf::from("/src/widgets/extra")
        );
    }

    #[test]
    fn test_decode_objects_without_separator() {
        let input = r#"{"ImportPath":"a","Dir":"/a"}{"ImportPath":"b","Dir":"/b"}"#;
        let table = decode_packages(input.as_bytes(), "go").unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.get("a").is_some());
        assert!(table.get("b").is_some());
    }

    #[test]
    fn test_decode_empty_stream() {
        let table = decode_packages("  \n".as_bytes(), "go").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_decode_standard_package() {
        let input = r#"{"ImportPath":"errors","Dir":"/usr/lib/go/src/errors","Standard":true}"#;
        let table = decode_packages(input.as_bytes(), "go").unwrap();

        assert!(table.get("errors").unwrap().standard);
    }

    #[test]
    fn test_decode_last_duplicate_wins() {
        let input = r#"{"ImportPath":"a","Dir":"/first"}
{"ImportPath":"a","Dir":"/second"}"#;
        let table = decode_packages(input.as_bytes(), "go").unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.get("a").unwrap().dir, PathBuf::from("/second"));
    }

    #[test]
    fn test_decode_garbage_fails() {
        let input = r#"{"ImportPath":"a","Dir":"/a"} not json"#;
        let result = decode_packages(input.as_bytes(), "go");

        assert!(matches!(result, Err(OverlayError::QueryDecode { .. })));
    }

    #[test]
    fn test_decode_missing_dir_fails() {
        let input = r#"{"ImportPath":"a"}"#;
        let result = decode_packages(input.as_bytes(), "go");

        assert!(matches!(result, Err(OverlayError::QueryDecode { .. })));
    }

    #[test]
    fn test_decode_truncated_object_fails() {
        let input = r#"{"ImportPath":"a","Dir":"/a"}{"ImportPath":"#;
        let result = decode_packages(input.as_bytes(), "go");

        assert!(result.is_err());
    }

    #[test]
    fn test_table_from_iterator() {
        let table: PackageTable = vec![
            PackageDescriptor::new("a", "/a"),
            PackageDescriptor::new("b", "/b"),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.len(), 2);
        assert!(table.get("c").is_none());
    }
}
