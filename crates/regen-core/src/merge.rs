//! Regeneration-safe merge of an existing file with a freshly rendered template.
//!
//! Policy is block-granular:
//!
//! - **custom** blocks: the existing file's content wins;
//! - **generated** blocks: the new template always wins;
//! - everything outside blocks comes from the new template verbatim.
//!
//! A custom block of the existing file that has no slot left in the new
//! template is reported as a [`MergeConflict`] carrying its content, so the
//! caller can surface it instead of silently losing it.

use regen_markers::{Block, BlockKind, Line, ParsedFile, Token, parse, scan, validate_markers};
use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, warn};

/// Why a merge could not carry everything over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// A custom block of the existing file has no slot in the new template.
    MissingMarker,
    /// The merge itself failed unexpectedly.
    InternalError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeConflict {
    pub marker: String,
    pub kind: ConflictKind,
    pub message: String,
    /// The content that did not make it into the merged output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_content: Option<String>,
}

impl MergeConflict {
    fn missing_marker(block: &Block) -> Self {
        Self {
            marker: block.marker.clone(),
            kind: ConflictKind::MissingMarker,
            message: format!(
                "Custom block '{}' (lines {}-{}) was removed from the template; its content was not carried over",
                block.marker, block.start_line, block.end_line
            ),
            previous_content: Some(block.content.clone()),
        }
    }
}

/// Outcome of a merge. Always produced, even when the merge failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeResult {
    /// `false` means manual review is required before overwriting.
    pub success: bool,
    /// Best-effort merged text. Orphaned custom content is not included.
    pub merged_content: String,
    pub conflicts: Vec<MergeConflict>,
    pub custom_blocks_preserved_count: usize,
    pub generated_blocks_updated_count: usize,
}

impl MergeResult {
    /// Result for a merge that panicked. The merged content is the existing
    /// content, so writing it changes nothing.
    pub fn internal_failure(existing: &str, reason: &str) -> Self {
        Self {
            success: false,
            merged_content: existing.to_string(),
            conflicts: vec![MergeConflict {
                marker: "<internal>".to_string(),
                kind: ConflictKind::InternalError,
                message: format!("Merge aborted: {reason}"),
                previous_content: None,
            }],
            custom_blocks_preserved_count: 0,
            generated_blocks_updated_count: 0,
        }
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Conflicts that carry orphaned custom content.
    pub fn orphaned(&self) -> impl Iterator<Item = (&str, &str)> {
        self.conflicts.iter().filter_map(|c| {
            c.previous_content
                .as_deref()
                .map(|content| (c.marker.as_str(), content))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    /// Run the strict validator on the new template and log what it finds.
    pub validate_template: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            validate_template: true,
        }
    }
}

/// Stateless merge engine; safe to share across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeEngine {
    options: MergeOptions,
}

impl MergeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: MergeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> MergeOptions {
        self.options
    }

    /// Merges `existing` (the file on disk, possibly hand-edited) with `new`
    /// (the freshly rendered template).
    ///
    /// Never panics: an unexpected failure is turned into an
    /// [`ConflictKind::InternalError`] conflict.
    ///
    /// # Example
    /// ```
    /// use regen_core::MergeEngine;
    ///
    /// let existing = "// CUSTOM_START: find-all\nreturn cached();\n// CUSTOM_END: find-all\n";
    /// let template = "// CUSTOM_START: find-all\nreturn [];\n// CUSTOM_END: find-all\n";
    ///
    /// let result = MergeEngine::new().merge(existing, template, "svc.ts");
    /// assert!(result.success);
    /// assert_eq!(result.merged_content, existing);
    /// assert_eq!(result.custom_blocks_preserved_count, 1);
    /// ```
    pub fn merge(&self, existing: &str, new: &str, file_identity: &str) -> MergeResult {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.merge_unchecked(existing, new, file_identity)
        }));

        outcome.unwrap_or_else(|payload| {
            let reason = panic_message(payload.as_ref());
            error!(file = file_identity, %reason, "merge failed unexpectedly");
            MergeResult::internal_failure(existing, &reason)
        })
    }

    fn merge_unchecked(&self, existing: &str, new: &str, file_identity: &str) -> MergeResult {
        let previous = parse(file_identity, existing);
        let template = parse(file_identity, new);

        if self.options.validate_template {
            let report = validate_markers(new);
            for problem in &report.errors {
                warn!(file = file_identity, %problem, "template markers are malformed");
            }
        }

        let mut walk = Walk::new(&previous);
        for line in scan(new) {
            walk.step(line);
        }

        let conflicts: Vec<MergeConflict> = orphaned_blocks(&previous, &template)
            .into_iter()
            .map(|block| {
                warn!(
                    file = file_identity,
                    marker = %block.marker,
                    "custom block has no slot in the new template"
                );
                MergeConflict::missing_marker(block)
            })
            .collect();

        debug!(
            file = file_identity,
            preserved = walk.preserved,
            updated = walk.updated,
            conflicts = conflicts.len(),
            "merged"
        );

        MergeResult {
            success: conflicts.is_empty(),
            merged_content: walk.out,
            conflicts,
            custom_blocks_preserved_count: walk.preserved,
            generated_blocks_updated_count: walk.updated,
        }
    }
}

/// Merges with default options.
pub fn merge(existing: &str, new: &str, file_identity: &str) -> MergeResult {
    MergeEngine::new().merge(existing, new, file_identity)
}

/// Custom blocks of `previous` whose marker has no custom slot in `template`,
/// in the order they appear in `previous`.
pub(crate) fn orphaned_blocks<'p>(previous: &'p ParsedFile, template: &ParsedFile) -> Vec<&'p Block> {
    previous
        .indexed(BlockKind::Custom)
        .into_iter()
        .filter(|block| !template.contains(BlockKind::Custom, &block.marker))
        .collect()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Outside,
    Custom,
    Generated,
}

/// Line walk over the new template.
///
/// Block boundaries follow the same rules as the lenient parser: a start
/// marker closes whatever is open, and only an end marker of the open kind
/// ends a block.
struct Walk<'p> {
    previous: &'p ParsedFile,
    region: Region,
    out: String,
    preserved: usize,
    updated: usize,
}

impl<'p> Walk<'p> {
    fn new(previous: &'p ParsedFile) -> Self {
        Self {
            previous,
            region: Region::Outside,
            out: String::with_capacity(previous.raw_content().len()),
            preserved: 0,
            updated: 0,
        }
    }

    fn step(&mut self, line: Line<'_>) {
        match (self.region, line.token) {
            (_, Token::Start { kind, marker }) => {
                self.out.push_str(line.raw);
                self.region = match kind {
                    BlockKind::Custom => {
                        self.open_custom(marker, line.terminator());
                        Region::Custom
                    }
                    BlockKind::Generated => {
                        self.updated += 1;
                        Region::Generated
                    }
                };
            }
            (
                Region::Custom,
                Token::End {
                    kind: BlockKind::Custom,
                    ..
                },
            )
            | (
                Region::Generated,
                Token::End {
                    kind: BlockKind::Generated,
                    ..
                },
            ) => {
                self.out.push_str(line.raw);
                self.region = Region::Outside;
            }
            // Template placeholder inside a custom slot.
            (Region::Custom, _) => {}
            _ => self.out.push_str(line.raw),
        }
    }

    fn open_custom(&mut self, marker: &str, terminator: &str) {
        let Some(block) = self.previous.custom(marker) else {
            return;
        };
        let content = block.content.as_str();
        let newline = if terminator.is_empty() { "\n" } else { terminator };

        // Start marker was the template's last line.
        if terminator.is_empty() && !content.is_empty() {
            self.out.push_str(newline);
        }
        self.out.push_str(content);
        // Block was healed at EOF of the existing file.
        if !content.is_empty() && !content.ends_with('\n') && !terminator.is_empty() {
            self.out.push_str(newline);
        }
        self.preserved += 1;
    }
}
