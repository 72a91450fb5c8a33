//! Filesystem helpers for regen
//!
//! Provides atomic writes, canonical content checksums, lexical path
//! normalization, and format-agnostic config loading.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use checksum::compute_content_checksum;
pub use config::ConfigStore;
pub use error::{Error, Result};
