//! Package archive handling
//!
//! FHIR packages are NPM-style gzip tarballs with a `package/` prefix. The
//! registry only needs the `dependencies` object of the archive's
//! package.json; everything else is served back untouched.

pub mod create;
pub mod manifest;

// Re-export main functions
pub use create::{create_package_tarball, create_tarball};
pub use manifest::{extract_dependencies, package_from_tarball, read_manifest};
