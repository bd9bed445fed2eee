//! Diagnostics for the mcfunction toolchain.
//!
//! Provides [`Diagnostic`], [`Severity`], [`Span`], and [`LineIndex`] types
//! used to report errors, warnings, and informational messages from the
//! command parser and the document analyzer. Diagnostic codes are defined in
//! the [`codes`] module.
//!
//! All offsets are **character** offsets (Unicode scalar values), matching
//! how the command reader addresses a line. Spans produced while parsing a
//! single line are relative to that line; [`LineIndex`] lifts them to
//! document-wide offsets for renderers.

#![warn(missing_docs)]

/// Diagnostic ID constants.
pub mod codes;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

// ── LineIndex ────────────────────────────────────────────────────────────

/// Maps character offsets in a document to line and column positions.
///
/// Lines and columns are **0-indexed**. Use [`LineIndex::line_col`] to get a
/// `(line, col)` pair and [`LineIndex::offset`] for the inverse mapping.
///
/// The index is built in O(n) time and each lookup is O(log n) via binary
/// search.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Character offset of the start of each line.
    /// `line_starts[0]` is always 0.
    line_starts: Vec<usize>,
    /// Total number of characters in the document.
    len: usize,
}

impl LineIndex {
    /// Build a `LineIndex` from source text.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0usize];
        let mut len = 0usize;
        for (i, c) in text.chars().enumerate() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
            len = i + 1;
        }
        Self { line_starts, len }
    }

    /// Convert a character offset to a 0-indexed `(line, column)` pair.
    ///
    /// If `offset` is past the end of the source, the last line is returned
    /// with the column measured from that line's start.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next.saturating_sub(1),
        };
        let col = offset.saturating_sub(self.line_starts[line]);
        (line, col)
    }

    /// Document-wide character offset of `(line, col)`.
    ///
    /// Returns `None` if `line` is out of bounds. The column is clamped to
    /// the document length.
    pub fn offset(&self, line: usize, col: usize) -> Option<usize> {
        self.line_start(line)
            .map(|start| (start + col).min(self.len))
    }

    /// Character offset of the start of the given 0-indexed line.
    ///
    /// Returns `None` if `line` is out of bounds.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Total number of lines (at least 1, even for empty input).
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Severity {
    /// Hard error: the command is invalid.
    Error,
    /// Warning: the command may not behave as intended.
    Warn,
    /// Informational note.
    Info,
}

/// Half-open character span `[start, end)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Span {
    /// Character offset of the first character (0-based).
    pub start: usize,
    /// Character offset one past the last character.
    pub end: usize,
}

impl Span {
    /// Create a span covering `[start, end)`.
    ///
    /// Panics if `end < start`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(end >= start, "Span end ({end}) < start ({start})");
        Self { start, end }
    }

    /// Create a zero-width span at the given position.
    pub fn empty(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Number of characters covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span covers no characters.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `offset` lies inside the half-open range.
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Shift both ends by `delta` characters.
    pub fn offset_by(self, delta: usize) -> Self {
        Self {
            start: self.start + delta,
            end: self.end + delta,
        }
    }
}

/// A diagnostic message produced by the parser or analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Unique diagnostic code (e.g., `"MCF1101"`).
    pub id: Cow<'static, str>,
    /// Severity level.
    pub severity: Severity,
    /// Human-readable diagnostic message.
    pub message: String,
    /// Optional character span this diagnostic relates to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// Machine-readable context for tooling. Keys and values are free-form strings.
    ///
    /// Uses `BTreeMap` for deterministic key ordering in serialized output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

impl Diagnostic {
    /// Create a diagnostic with the given fields.
    pub fn new(
        id: impl Into<Cow<'static, str>>,
        severity: Severity,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            message: message.into(),
            span,
            context: None,
        }
    }

    /// Shorthand for an `Error` diagnostic.
    pub fn error(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Error, message, span)
    }

    /// Shorthand for a `Warn` diagnostic.
    pub fn warn(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Warn, message, span)
    }

    /// Shorthand for an `Info` diagnostic.
    pub fn info(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Info, message, span)
    }

    /// Attach machine-readable context metadata (builder pattern).
    pub fn with_context(mut self, ctx: BTreeMap<String, String>) -> Self {
        self.context = Some(ctx);
        self
    }

    /// Returns the human-readable explanation for this diagnostic's code, if available.
    pub fn explain(&self) -> Option<&'static str> {
        explain(&self.id)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warn => write!(f, "warn"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.id, self.message)
    }
}

/// Returns the human-readable explanation for a diagnostic code, if known.
pub fn explain(id: &str) -> Option<&'static str> {
    use codes::*;
    let text = match id {
        READER_UNEXPECTED_END => {
            "The line ended while the argument being read still needed more characters."
        }
        READER_EXPECTED_CHAR => {
            "A specific character (such as a closing bracket or `=`) was required here."
        }
        READER_EXPECTED_INT => "An integer was required here.",
        READER_EXPECTED_FLOAT => "A decimal number was required here.",
        READER_EXPECTED_BOOL => "A boolean (`true` or `false`) was required here.",
        READER_UNTERMINATED_QUOTE => "A quoted string must be closed with the same quote character.",
        READER_INVALID_ESCAPE => {
            "Inside quoted strings only the quote character and `\\` may be escaped."
        }
        TRAILING_INPUT => {
            "The command is complete, so any remaining text on the line is not understood."
        }
        EXPECTED_ALTERNATIVE => {
            "None of the keywords or arguments allowed at this point of the command matched."
        }
        INCOMPLETE_COMMAND => "The command needs further arguments before it can run.",
        EXPECTED_SEPARATOR => "Arguments must be separated from each other by a single space.",
        LITERAL_MISMATCH => "A keyword did not match; another alternative was tried instead.",
        UNSUPPORTED_PARSER => {
            "The command tree uses an argument type this analyzer cannot check; the argument is rejected."
        }
        LINE_TOO_LONG => "The line exceeds the configured maximum length and was skipped.",
        INVALID_REDIRECT => "The command tree redirects to a node that does not exist.",
        NUMBER_OUT_OF_RANGE => "The number lies outside the range accepted by this argument.",
        EXPECTED_STRING => "A string was required here.",
        INVALID_RESOURCE_LOCATION => {
            "Resource locations look like `namespace:path` using lowercase letters, digits and `_-./`."
        }
        UNKNOWN_REGISTRY_ENTRY => "The resource location is not registered for this argument.",
        UNKNOWN_FUNCTION => "No loaded datapack defines this function or function tag.",
        INVALID_SELECTOR => {
            "Entity arguments are a selector (`@p`, `@a`, `@r`, `@s`, `@e`) or a player name."
        }
        UNKNOWN_SELECTOR_OPTION => "The selector option is not recognized.",
        NBT_EXPECTED_VALUE => "A data value (compound, list, string or number) was required here.",
        NBT_EXPECTED_KEY => "A compound key was required here.",
        NBT_DUPLICATE_KEY => "A compound key may only appear once; later values overwrite earlier ones.",
        NBT_MIXED_LIST => "All elements of a list must have the same type.",
        NBT_INVALID_ARRAY => "Typed arrays are `[B; …]`, `[I; …]` or `[L; …]` with matching elements.",
        NBT_TOO_DEEP => "The data value is nested deeper than the configured limit.",
        NBT_EXPECTED_COMPOUND => "This argument requires a compound value (`{…}`).",
        FILE_OUTSIDE_DATAPACK => {
            "Function files are expected under `data/<namespace>/functions/` inside a datapack."
        }
        _ => return None,
    };
    Some(text)
}
