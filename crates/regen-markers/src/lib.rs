//! Marker scanning for regenerated source files.
//!
//! Generated files are plain text in which comment lines delimit named
//! regions. Two kinds of region exist:
//!
//! ```text
//! // CUSTOM_START: find-all
//! return cached();            <- owned by the developer, survives regeneration
//! // CUSTOM_END: find-all
//!
//! // GENERATED_START: create
//! return repo.insert(dto);    <- owned by the generator, always overwritten
//! // GENERATED_END: create
//! ```
//!
//! The host language's comment syntax is irrelevant: markers are recognised
//! anywhere on a line. Several historical spellings are accepted at once so
//! files emitted by older templates stay parseable (see [`token`]).
//!
//! This crate contains three consumers of one tokenizer:
//!
//! - [`parser`]: the lenient parse used on existing (possibly hand-edited)
//!   files. It never fails and heals unterminated blocks.
//! - [`validate`]: the strict stack-machine check used on freshly rendered
//!   templates.
//! - the merge walk in `regen-core`, which consumes [`scan`] directly.

pub mod parser;
pub mod token;
pub mod validate;

pub use parser::{
    Block, DuplicateMarker, ParsedFile, extract_custom_blocks, has_custom_code, parse,
};
pub use token::{BlockKind, Line, Token, scan};
pub use validate::{ValidationReport, validate_markers};
