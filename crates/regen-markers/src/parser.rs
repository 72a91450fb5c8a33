//! Lenient block parsing for existing files.
//!
//! Existing files may have been edited by hand outside the marker discipline,
//! so parsing never fails:
//!
//! - a start marker inside an open block closes the open block right there;
//! - a file ending inside a block closes it with what was accumulated;
//! - an end marker of the other kind inside a block is ordinary content;
//! - an end marker outside any block is ignored.

use crate::token::{BlockKind, Token, scan};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// A parsed block with its marker, content, and position information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub kind: BlockKind,
    /// The marker name identifying this block.
    pub marker: String,
    /// The raw lines between the markers, terminators included.
    pub content: String,
    /// The 1-based line number of the opening marker.
    pub start_line: usize,
    /// The 1-based line number of the closing marker, or of the last line
    /// that belonged to the block when it had to be closed early.
    pub end_line: usize,
}

/// A marker that was declared more than once for the same kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateMarker {
    pub kind: BlockKind,
    pub marker: String,
    /// Line of the earlier declaration that got shadowed.
    pub first_line: usize,
    /// Line of the declaration that now owns the index entry.
    pub line: usize,
}

/// The result of [`parse`].
///
/// Custom and generated markers live in separate indices; a name may appear in
/// both. Within one kind, a duplicated marker resolves to its last occurrence
/// and is recorded in [`ParsedFile::duplicates`].
#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
    file_identity: String,
    raw_content: String,
    blocks: Vec<Block>,
    custom_index: HashMap<String, usize>,
    generated_index: HashMap<String, usize>,
    duplicates: Vec<DuplicateMarker>,
}

impl ParsedFile {
    fn new(file_identity: &str, raw_content: &str) -> Self {
        Self {
            file_identity: file_identity.to_string(),
            raw_content: raw_content.to_string(),
            ..Self::default()
        }
    }

    fn index_mut(&mut self, kind: BlockKind) -> &mut HashMap<String, usize> {
        match kind {
            BlockKind::Custom => &mut self.custom_index,
            BlockKind::Generated => &mut self.generated_index,
        }
    }

    fn index(&self, kind: BlockKind) -> &HashMap<String, usize> {
        match kind {
            BlockKind::Custom => &self.custom_index,
            BlockKind::Generated => &self.generated_index,
        }
    }

    fn push(&mut self, block: Block) {
        let position = self.blocks.len();
        let (kind, marker, line) = (block.kind, block.marker.clone(), block.start_line);
        self.blocks.push(block);

        if let Some(previous) = self.index_mut(kind).insert(marker.clone(), position) {
            let first_line = self.blocks[previous].start_line;
            warn!(
                file = %self.file_identity,
                %kind,
                %marker,
                first_line,
                line,
                "duplicate marker; the later block wins"
            );
            self.duplicates.push(DuplicateMarker {
                kind,
                marker,
                first_line,
                line,
            });
        }
    }

    pub fn file_identity(&self) -> &str {
        &self.file_identity
    }

    pub fn raw_content(&self) -> &str {
        &self.raw_content
    }

    /// All blocks in order of appearance.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Looks up a block by kind and marker.
    pub fn get(&self, kind: BlockKind, marker: &str) -> Option<&Block> {
        self.index(kind).get(marker).map(|&i| &self.blocks[i])
    }

    pub fn custom(&self, marker: &str) -> Option<&Block> {
        self.get(BlockKind::Custom, marker)
    }

    pub fn generated(&self, marker: &str) -> Option<&Block> {
        self.get(BlockKind::Generated, marker)
    }

    pub fn contains(&self, kind: BlockKind, marker: &str) -> bool {
        self.index(kind).contains_key(marker)
    }

    /// Indexed blocks of one kind, ordered by first appearance of each marker.
    ///
    /// Each marker appears once and maps to the block that owns its index
    /// entry (the last occurrence when duplicated).
    pub fn indexed(&self, kind: BlockKind) -> Vec<&Block> {
        let index = self.index(kind);
        let mut seen = std::collections::HashSet::new();
        self.blocks
            .iter()
            .filter(|b| b.kind == kind && seen.insert(b.marker.as_str()))
            .filter_map(|b| index.get(&b.marker).map(|&i| &self.blocks[i]))
            .collect()
    }

    /// Number of distinct markers of one kind.
    pub fn count(&self, kind: BlockKind) -> usize {
        self.index(kind).len()
    }

    pub fn duplicates(&self) -> &[DuplicateMarker] {
        &self.duplicates
    }

    /// Marker → content projection of the custom index.
    pub fn custom_contents(&self) -> HashMap<String, String> {
        self.custom_index
            .iter()
            .map(|(marker, &i)| (marker.clone(), self.blocks[i].content.clone()))
            .collect()
    }
}

/// A block that has been opened but not yet closed.
struct OpenBlock<'a> {
    kind: BlockKind,
    marker: &'a str,
    start_line: usize,
    content: String,
}

impl OpenBlock<'_> {
    fn finish(self, end_line: usize) -> Block {
        Block {
            kind: self.kind,
            marker: self.marker.to_string(),
            content: self.content,
            start_line: self.start_line,
            end_line,
        }
    }
}

/// Parses all blocks from `text`. Never fails.
///
/// `file_identity` is only used to label diagnostics.
///
/// # Example
/// ```
/// use regen_markers::parse;
///
/// let text = "header\n// CUSTOM_START: hook\nkeep();\n// CUSTOM_END: hook\n";
/// let parsed = parse("svc.ts", text);
/// assert_eq!(parsed.blocks().len(), 1);
/// assert_eq!(parsed.custom("hook").unwrap().content, "keep();\n");
/// ```
pub fn parse(file_identity: &str, text: &str) -> ParsedFile {
    let mut parsed = ParsedFile::new(file_identity, text);
    let mut open: Option<OpenBlock<'_>> = None;
    let mut last_line = 0;

    for line in scan(text) {
        last_line = line.number;
        match line.token {
            Token::Start { kind, marker } => {
                if let Some(block) = open.take() {
                    debug!(
                        file = file_identity,
                        marker = block.marker,
                        line = line.number,
                        "start marker inside open block; closing it early"
                    );
                    let end_line = line.number.saturating_sub(1).max(block.start_line);
                    parsed.push(block.finish(end_line));
                }
                open = Some(OpenBlock {
                    kind,
                    marker,
                    start_line: line.number,
                    content: String::new(),
                });
            }
            Token::End { kind, marker } => match open.take() {
                Some(block) if block.kind == kind => {
                    if marker.is_some_and(|name| name != block.marker) {
                        debug!(
                            file = file_identity,
                            expected = block.marker,
                            found = marker,
                            line = line.number,
                            "end marker name differs from open block"
                        );
                    }
                    parsed.push(block.finish(line.number));
                }
                Some(mut block) => {
                    block.content.push_str(line.raw);
                    open = Some(block);
                }
                None => {
                    debug!(
                        file = file_identity,
                        line = line.number,
                        "end marker outside any block ignored"
                    );
                }
            },
            Token::Text => {
                if let Some(block) = open.as_mut() {
                    block.content.push_str(line.raw);
                }
            }
        }
    }

    if let Some(block) = open {
        debug!(
            file = file_identity,
            marker = block.marker,
            "file ended inside a block; closing it"
        );
        parsed.push(block.finish(last_line));
    }

    parsed
}

/// Checks whether `text` declares at least one custom block.
pub fn has_custom_code(text: &str) -> bool {
    scan(text).any(|line| {
        matches!(
            line.token,
            Token::Start {
                kind: BlockKind::Custom,
                ..
            }
        )
    })
}

/// Returns the content of every custom block, keyed by marker.
pub fn extract_custom_blocks(text: &str) -> HashMap<String, String> {
    parse("", text).custom_contents()
}
