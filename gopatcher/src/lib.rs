//! gopatcher - build overlays for patched Go packages
//!
//! This library turns a tree of replacement Go source files, laid out by
//! import path, into the overlay manifest consumed by
//! `go build -overlay=<file>`. The patched packages are never edited in
//! place; the toolchain swaps the files at build time.
//!
//! # Example
//!
//! ```ignore
//! use gopatcher::{pipeline, PatcherConfig};
//!
//! let config = PatcherConfig::new("patches");
//! let manifest_path = pipeline::run_with_go(&config)?;
//! println!("{}", manifest_path.display());
//! ```

pub mod config;
pub mod error;
pub mod overlay;
pub mod patches;
pub mod pipeline;
pub mod resolver;

pub use config::{PatcherConfig, DEFAULT_PATCHES_DIR};
pub use error::{OverlayError, OverlayResult};
