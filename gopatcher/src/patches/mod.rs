//! Patch discovery.
//!
//! A patch is a Go source file that replaces the file of the same name in
//! an existing package. Patches are laid out under the patches root by
//! import path:
//!
//! ```text
//! patches/
//! ├── github.com/pkg/errors/
//! │   └── stack.go          # replaces stack.go in github.com/pkg/errors
//! └── widgets/
//!     ├── list.go           # replaces list.go in widgets
//!     └── extra/
//!         └── map.go        # replaces map.go in widgets/extra
//! ```
//!
//! # Example
//!
//! ```ignore
//! use gopatcher::patches::PatchDiscovery;
//!
//! let discovery = PatchDiscovery::new("patches");
//! for patch in discovery.find_patches()? {
//!     println!("{} {}", patch.import_path, patch.filename);
//! }
//! ```

mod discovery;

pub use discovery::{
    distinct_import_paths, Patch, PatchDiscovery, PATCH_SUFFIX, ROOT_IMPORT_PATH,
};
