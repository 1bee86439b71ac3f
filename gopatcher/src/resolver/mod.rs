//! Package resolution.
//!
//! Turns the import paths referenced by patches into on-disk package
//! directories. The default backend, [`GoListQuery`], runs
//!
//! ```text
//! go [-C <module-dir>] list -json [-tags <tags>] <import-path>...
//! ```
//!
//! once for all distinct import paths and decodes the object stream it
//! prints into a [`PackageTable`].

mod descriptor;
mod go_list;

pub use descriptor::{decode_packages, PackageDescriptor, PackageTable};
pub use go_list::{GoListQuery, PackageQuery};
