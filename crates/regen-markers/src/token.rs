//! Line tokenizer shared by parsing, validation and merging.
//!
//! Every consumer walks the same [`Line`] stream, so they can never disagree
//! about where a block begins or ends.
//!
//! Accepted marker spellings:
//!
//! | marker          | spellings                                                                 |
//! |-----------------|---------------------------------------------------------------------------|
//! | custom start    | `CUSTOM_START: <name>`, `CUSTOM_CODE_START: <name>`                       |
//! | custom end      | `CUSTOM_END`, `CUSTOM_CODE_END`, optionally `: <name>`                    |
//! | generated start | `GENERATED_START:`, `GENERATED_CODE_START:`, `GENERATED_METHOD_START:`, `GENERATED_FILE_START:`, `GENERATED:` followed by `<name>` |
//! | generated end   | `GENERATED_END`, `GENERATED_CODE_END`, `GENERATED_METHOD_END`, `GENERATED_FILE_END`, optionally `: <name>` |
//!
//! A marker must be the first word on its line, after optional indentation
//! and up to four comment characters (`//`, `#`, `/*`, `<!--`, `--`, ` * `).
//! A token later on the line, such as `log("CUSTOM_END")`, is ordinary text.
//! Comment closers (`*/`, `-->`, `%>`, `#}`, `}}`) are not part of a name.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Which side owns the content of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// Owned by the developer; preserved across regenerations.
    Custom,
    /// Owned by the generator; overwritten on every regeneration.
    Generated,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom => write!(f, "custom"),
            Self::Generated => write!(f, "generated"),
        }
    }
}

/// What a single line means to the block grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Opens a block named `marker`.
    Start { kind: BlockKind, marker: &'a str },
    /// Closes a block. The name is optional and only used for cross-checking.
    End {
        kind: BlockKind,
        marker: Option<&'a str>,
    },
    /// Anything that is not a marker.
    Text,
}

/// One line of input together with its token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based line number.
    pub number: usize,
    /// The line exactly as it appears in the input, terminator included.
    pub raw: &'a str,
    pub token: Token<'a>,
}

impl<'a> Line<'a> {
    /// The line without its `\n` / `\r\n` terminator.
    pub fn text(&self) -> &'a str {
        let raw = self.raw.strip_suffix('\n').unwrap_or(self.raw);
        raw.strip_suffix('\r').unwrap_or(raw)
    }

    /// The terminator of this line (`"\n"`, `"\r\n"` or `""` on a final
    /// unterminated line).
    pub fn terminator(&self) -> &'a str {
        &self.raw[self.text().len()..]
    }

    pub fn is_marker(&self) -> bool {
        !matches!(self.token, Token::Text)
    }
}

/// Single alternation over every accepted spelling, anchored to the start
/// of the line.
static MARKER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^\s*[^\w\s]{0,4}\s*(?:
            (?P<cs>CUSTOM_CODE_START|CUSTOM_START):\s*(?P<cs_name>\S+)
          | (?P<ce>CUSTOM_CODE_END|CUSTOM_END)\b(?:\s*:\s*(?P<ce_name>\S+))?
          | (?P<gs>GENERATED_CODE_START|GENERATED_METHOD_START|GENERATED_FILE_START|GENERATED_START|GENERATED):\s*(?P<gs_name>\S+)
          | (?P<ge>GENERATED_CODE_END|GENERATED_METHOD_END|GENERATED_FILE_END|GENERATED_END)\b(?:\s*:\s*(?P<ge_name>\S+))?
        )",
    )
    .expect("Invalid marker regex")
});

const COMMENT_CLOSERS: [&str; 5] = ["*/", "-->", "%>", "#}", "}}"];

/// Captured marker name with any trailing comment closer removed. `None`
/// when nothing is left.
fn name<'a>(caps: &Captures<'a>, group: &str) -> Option<&'a str> {
    let mut name = caps.name(group)?.as_str();
    while let Some(rest) = COMMENT_CLOSERS.iter().find_map(|c| name.strip_suffix(c)) {
        name = rest;
    }
    (!name.is_empty()).then_some(name)
}

/// Classifies a single line of text (without its terminator).
pub fn classify(text: &str) -> Token<'_> {
    let Some(caps) = MARKER_REGEX.captures(text) else {
        return Token::Text;
    };

    if let Some(marker) = name(&caps, "cs_name") {
        Token::Start {
            kind: BlockKind::Custom,
            marker,
        }
    } else if caps.name("ce").is_some() {
        Token::End {
            kind: BlockKind::Custom,
            marker: name(&caps, "ce_name"),
        }
    } else if caps.name("cs").is_some() {
        Token::Text
    } else if let Some(marker) = name(&caps, "gs_name") {
        Token::Start {
            kind: BlockKind::Generated,
            marker,
        }
    } else if caps.name("gs").is_some() {
        Token::Text
    } else {
        Token::End {
            kind: BlockKind::Generated,
            marker: name(&caps, "ge_name"),
        }
    }
}

/// Splits `text` into tokenized lines.
///
/// Concatenating the `raw` field of every yielded line reproduces `text`
/// byte for byte.
///
/// # Example
/// ```
/// use regen_markers::{BlockKind, Token, scan};
///
/// let lines: Vec<_> = scan("// CUSTOM_START: hook\nbody\n// CUSTOM_END\n").collect();
/// assert_eq!(lines.len(), 3);
/// assert_eq!(
///     lines[0].token,
///     Token::Start { kind: BlockKind::Custom, marker: "hook" }
/// );
/// assert_eq!(lines[1].token, Token::Text);
/// ```
pub fn scan(text: &str) -> impl Iterator<Item = Line<'_>> {
    text.split_inclusive('\n')
        .enumerate()
        .map(|(index, raw)| {
            let mut line = Line {
                number: index + 1,
                raw,
                token: Token::Text,
            };
            line.token = classify(line.text());
            line
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(kind: BlockKind, marker: &str) -> Token<'_> {
        Token::Start { kind, marker }
    }

    #[test]
    fn plain_text_is_text() {
        assert_eq!(classify("let x = 1;"), Token::Text);
        assert_eq!(classify(""), Token::Text);
    }

    #[test]
    fn custom_start_spellings() {
        assert_eq!(classify("// CUSTOM_START: a"), start(BlockKind::Custom, "a"));
        assert_eq!(
            classify("# CUSTOM_CODE_START:b"),
            start(BlockKind::Custom, "b")
        );
    }

    #[test]
    fn start_without_name_is_text() {
        assert_eq!(classify("// CUSTOM_START:"), Token::Text);
        assert_eq!(classify("// GENERATED_START:   "), Token::Text);
    }

    #[test]
    fn end_marker_name_is_optional() {
        assert_eq!(
            classify("// CUSTOM_END"),
            Token::End {
                kind: BlockKind::Custom,
                marker: None
            }
        );
        assert_eq!(
            classify("<!-- GENERATED_FILE_END: header -->"),
            Token::End {
                kind: BlockKind::Generated,
                marker: Some("header")
            }
        );
    }

    #[test]
    fn bare_generated_start() {
        assert_eq!(
            classify("-- GENERATED: columns"),
            start(BlockKind::Generated, "columns")
        );
    }

    #[test]
    fn embedded_token_is_not_a_marker() {
        assert_eq!(classify("MY_CUSTOM_START: nope"), Token::Text);
        assert_eq!(classify("// CUSTOM_ENDING"), Token::Text);
    }

    #[test]
    fn marker_must_lead_the_line() {
        assert_eq!(classify(r#"log("AUTO-GENERATED: report");"#), Token::Text);
        assert_eq!(classify(r#"x = "CUSTOM_END";"#), Token::Text);
        assert_eq!(classify("foo(); // CUSTOM_START: late"), Token::Text);
        assert_eq!(classify("see GENERATED_END: docs"), Token::Text);
        assert_eq!(
            classify("    * CUSTOM_START: doc"),
            start(BlockKind::Custom, "doc")
        );
        assert_eq!(
            classify("<!-- GENERATED_START: nav -->"),
            start(BlockKind::Generated, "nav")
        );
    }

    #[test]
    fn comment_closer_is_not_a_name() {
        assert_eq!(
            classify("/* CUSTOM_END: */"),
            Token::End {
                kind: BlockKind::Custom,
                marker: None
            }
        );
        assert_eq!(
            classify("/* CUSTOM_END: hook*/"),
            Token::End {
                kind: BlockKind::Custom,
                marker: Some("hook")
            }
        );
        assert_eq!(classify("/* CUSTOM_START: */"), Token::Text);
        assert_eq!(classify("{# GENERATED: #}"), Token::Text);
        assert_eq!(
            classify("<%# GENERATED_START: body%>"),
            start(BlockKind::Generated, "body")
        );
    }

    #[test]
    fn line_terminators_are_kept() {
        let lines: Vec<_> = scan("a\r\nb\nc").collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].text(), "a");
        assert_eq!(lines[0].terminator(), "\r\n");
        assert_eq!(lines[1].terminator(), "\n");
        assert_eq!(lines[2].terminator(), "");
        assert_eq!(lines[2].number, 3);
    }

    #[test]
    fn scan_of_empty_text_yields_nothing() {
        assert_eq!(scan("").count(), 0);
    }

    #[test]
    fn kind_display() {
        assert_eq!(BlockKind::Custom.to_string(), "custom");
        assert_eq!(BlockKind::Generated.to_string(), "generated");
    }
}
