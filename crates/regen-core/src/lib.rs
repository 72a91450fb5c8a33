//! Regeneration-safe merging for generated source files
//!
//! `regen-core` lets a code generator re-emit a file as often as its inputs
//! change without destroying what developers wrote inside it:
//!
//! - **Merge engine** ([`merge`]): combines the file on disk with a freshly
//!   rendered template. Custom blocks keep their existing content, generated
//!   blocks take the template's, and custom blocks the template no longer
//!   declares are reported as conflicts instead of being dropped silently.
//! - **Checksum registry** ([`registry`]): remembers what each generated block
//!   looked like when it was written, so hand edits can be flagged before
//!   the next overwrite.
//! - **Statistics** ([`stats`]): block counts for tooling.
//! - **Apply** ([`apply`]): the single-file read → check → merge → write
//!   sequence, driven by [`RegenConfig`].
//!
//! # Architecture
//!
//! ```text
//!                  regen-cli
//!                      |
//!                 regen-core
//!                  /       \
//!      regen-markers     regen-fs
//! ```

pub mod apply;
pub mod config;
pub mod error;
pub mod merge;
pub mod registry;
pub mod stats;

pub use apply::{Applier, ApplyOutcome, ApplyStatus, file_identity, orphan_path};
pub use config::{ConflictPolicy, RegenConfig};
pub use error::{Error, Result};
pub use merge::{ConflictKind, MergeConflict, MergeEngine, MergeOptions, MergeResult, merge};
pub use registry::{ChecksumRecord, ChecksumRegistry, FileChecksums, ModificationReport};
pub use stats::{MergeStatistics, get_merge_statistics};

pub use regen_markers::{
    BlockKind, ValidationReport, extract_custom_blocks, has_custom_code, validate_markers,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn corrupt_registry_error_mentions_path() {
        let error = Error::CorruptRegistry {
            path: PathBuf::from("/work/.regen/checksums.json"),
            message: "invalid checksum".into(),
        };

        let display = error.to_string();
        assert!(display.contains("/work/.regen/checksums.json"), "got: {display}");
        assert!(display.contains("invalid checksum"), "got: {display}");
    }
}
