//! Overlay manifest construction and persistence.
//!
//! The manifest is the JSON document accepted by `go build -overlay`:
//!
//! ```text
//! {"Replace":{"/src/widgets/list.go":"patches/widgets/list.go"}}
//! ```

mod builder;
mod writer;

pub use builder::{build_overlay, OverlayManifest};
pub use writer::{write_manifest, MANIFEST_FILENAME, TEMP_DIR_PREFIX};
