//! Read-only block statistics for tooling.

use crate::merge::orphaned_blocks;
use regen_markers::{BlockKind, parse};
use serde::Serialize;
use tracing::debug;

/// Block counts of a prospective merge.
///
/// `custom_blocks` and `generated_blocks` count the distinct markers of the
/// new template; `conflicting_blocks` counts existing custom blocks that a
/// merge would report as orphaned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeStatistics {
    pub total_blocks: usize,
    pub custom_blocks: usize,
    pub generated_blocks: usize,
    pub conflicting_blocks: usize,
}

/// Computes [`MergeStatistics`] without merging. Pure.
pub fn get_merge_statistics(file_identity: &str, existing: &str, new: &str) -> MergeStatistics {
    let previous = parse(file_identity, existing);
    let template = parse(file_identity, new);

    let custom_blocks = template.count(BlockKind::Custom);
    let generated_blocks = template.count(BlockKind::Generated);
    let stats = MergeStatistics {
        total_blocks: custom_blocks + generated_blocks,
        custom_blocks,
        generated_blocks,
        conflicting_blocks: orphaned_blocks(&previous, &template).len(),
    };

    debug!(file = file_identity, ?stats, "computed merge statistics");
    stats
}
