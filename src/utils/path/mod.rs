//! Filesystem path helpers.
//!
//! - [`fs`]: path normalization (`normalize_path`)

pub mod fs;

pub use fs::normalize_path;
