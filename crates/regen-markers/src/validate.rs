//! Strict well-formedness check for freshly rendered templates.
//!
//! A malformed template is a generator bug. Unlike [`crate::parse`], this
//! check reports every structural problem instead of healing it.

use crate::token::{BlockKind, Token, scan};
use serde::Serialize;
use std::collections::HashMap;

/// Outcome of [`validate_markers`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    /// Human-readable problems, in the order they were found.
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

struct Frame<'a> {
    kind: BlockKind,
    marker: &'a str,
    line: usize,
}

/// Validates marker structure with a stack machine.
///
/// Every start marker is pushed. An end marker pops the top of the stack only
/// when the kinds match and, if the end marker carries a name, the names match
/// too. Anything else is reported and leaves the stack untouched. Frames left
/// at the end of input are reported as unclosed. Duplicate marker names within
/// one kind are reported as well.
///
/// # Example
/// ```
/// use regen_markers::validate_markers;
///
/// let report = validate_markers("// CUSTOM_START: x\nbody\n");
/// assert!(!report.valid);
/// assert!(report.errors[0].contains("Unclosed custom block 'x'"));
/// ```
pub fn validate_markers(text: &str) -> ValidationReport {
    let mut stack: Vec<Frame<'_>> = Vec::new();
    let mut declared: HashMap<(BlockKind, &str), usize> = HashMap::new();
    let mut errors = Vec::new();

    for line in scan(text) {
        match line.token {
            Token::Start { kind, marker } => {
                if let Some(first) = declared.get(&(kind, marker)) {
                    errors.push(format!(
                        "Line {}: Duplicate {} marker '{}' (first declared on line {})",
                        line.number, kind, marker, first
                    ));
                } else {
                    declared.insert((kind, marker), line.number);
                }
                stack.push(Frame {
                    kind,
                    marker,
                    line: line.number,
                });
            }
            Token::End { kind, marker } => match stack.last() {
                None => errors.push(format!(
                    "Line {}: end marker without start ({} block)",
                    line.number, kind
                )),
                Some(top) if top.kind != kind => errors.push(format!(
                    "Line {}: mismatched block type: expected end of {} block '{}' (opened on line {}), found {} end marker",
                    line.number, top.kind, top.marker, top.line, kind
                )),
                Some(top) if marker.is_some_and(|name| name != top.marker) => {
                    errors.push(format!(
                        "Line {}: mismatched marker name: expected '{}', found '{}'",
                        line.number,
                        top.marker,
                        marker.unwrap_or_default()
                    ))
                }
                Some(_) => {
                    stack.pop();
                }
            },
            Token::Text => {}
        }
    }

    for frame in stack {
        errors.push(format!(
            "Unclosed {} block '{}' (opened on line {})",
            frame.kind, frame.marker, frame.line
        ));
    }

    ValidationReport::from_errors(errors)
}
