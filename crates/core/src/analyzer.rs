//! Cursor-addressed queries over a [`Document`].
//!
//! Every query first makes sure the addressed line has a bundle for its
//! current text, reparsing that line alone when it is stale, then answers
//! from the line's interval indexes. Offsets and spans in per-line queries
//! are character offsets within the line; [`Analyzer::diagnostics`] lifts
//! them to document offsets.

use crate::actions::{ActionData, ActionKind, MiscInfo, SubAction};
use crate::context::CommandContext;
use crate::dispatch::{Dispatcher, ParseNode};
use crate::document::{Document, DocumentError};
use crate::errors::CommandError;
use crate::line::{CommandLine, LineState, StoredParseResult, is_skipped_text};
use crate::suggestion::{Suggestion, SuggestionKind};
use mcfunction_toolchain_command_data::{CommandData, TreePath};
use mcfunction_toolchain_config::Config;
use mcfunction_toolchain_diagnostics::{Diagnostic, LineIndex, Span, codes};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Below this many stale lines [`Analyzer::parse_all`] stays on the calling
/// thread.
const PARALLEL_THRESHOLD: usize = 64;

/// Result of [`Analyzer::parse_line`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStatus {
    /// Reported errors of the line, spans relative to the line.
    pub errors: Vec<Diagnostic>,
    /// Whether this call produced a new bundle (the line was stale).
    pub diagnostics_ready: bool,
}

/// Hover contents at a cursor position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoverInfo {
    /// Span of the innermost hover.
    pub span: Span,
    /// Hover texts, innermost first.
    pub contents: Vec<String>,
}

/// A replacement produced by formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    /// Line the edit applies to.
    pub line: usize,
    /// Characters replaced, relative to the line.
    pub span: Span,
    /// Replacement text.
    pub new_text: String,
}

/// A cross-reference at a cursor position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLink {
    /// Span of the reference.
    pub span: Span,
    /// Referenced resource (e.g., a function id or `#tag`).
    pub target: String,
}

/// Line-level analysis engine shared by every open document.
#[derive(Debug, Clone)]
pub struct Analyzer {
    data: Arc<CommandData>,
    config: Config,
}

impl Analyzer {
    /// Analyzer over `data` with the given settings.
    pub fn new(data: Arc<CommandData>, config: Config) -> Self {
        Self { data, config }
    }

    /// Command data in use.
    pub fn data(&self) -> &CommandData {
        &self.data
    }

    /// Settings in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher::new(&self.data, self.config.limits)
    }

    /// Analyze one line of text from scratch.
    fn analyze(&self, text: &str) -> LineState {
        if is_skipped_text(text) {
            return LineState::Skipped;
        }
        let len = text.chars().count();
        let max = self.config.limits.max_line_length;
        if len > max {
            debug!(len, max, "line too long, not dispatched");
            let error = CommandError::reported(
                codes::LINE_TOO_LONG,
                format!("line is {len} characters long; the limit is {max}"),
                Span::new(0, len),
            )
            .with_context(ctx! { "length" => len.to_string(), "limit" => max.to_string() });
            return LineState::Parsed(StoredParseResult {
                errors: vec![error],
                ..StoredParseResult::default()
            });
        }
        let outcome = self.dispatcher().parse(text, &CommandContext::default());
        let success = outcome.is_success();
        let (nodes, extras) = outcome.into_parts();
        let nodes = nodes.unwrap_or_else(|failed| failed);
        debug!(
            len,
            success,
            errors = extras.reported_errors().count(),
            "parsed line"
        );
        LineState::Parsed(StoredParseResult {
            actions: extras.actions,
            errors: extras.errors,
            nodes,
        })
    }

    fn refresh(&self, line: &mut CommandLine) -> bool {
        if !line.is_stale() {
            return false;
        }
        let state = self.analyze(line.text());
        line.set_state(state);
        true
    }

    /// The line at `index`, reparsed first if stale.
    fn fresh_line<'d>(
        &self,
        doc: &'d mut Document,
        index: usize,
    ) -> Result<&'d CommandLine, DocumentError> {
        let line = doc.line_mut(index)?;
        self.refresh(line);
        Ok(line)
    }

    /// Parse line `index` if its text changed since the last parse and return
    /// its reported errors.
    pub fn parse_line(&self, doc: &mut Document, index: usize) -> Result<LineStatus, DocumentError> {
        let line = doc.line_mut(index)?;
        let diagnostics_ready = self.refresh(line);
        Ok(LineStatus {
            errors: reported(line),
            diagnostics_ready,
        })
    }

    /// Parse every stale line of `doc`, in parallel for large documents.
    /// Returns how many lines were parsed.
    pub fn parse_all(&self, doc: &mut Document) -> usize {
        let mut stale: Vec<&mut CommandLine> =
            doc.lines_mut().iter_mut().filter(|l| l.is_stale()).collect();
        let count = stale.len();
        if count < PARALLEL_THRESHOLD {
            for line in stale {
                self.refresh(line);
            }
            return count;
        }
        debug!(count, "parsing stale lines in parallel");
        stale.par_iter_mut().for_each(|line| {
            self.refresh(line);
        });
        count
    }

    /// Completion suggestions for the cursor at `offset` of line `index`.
    ///
    /// The text before the cursor is re-dispatched from the last cached
    /// parse-tree span that ends before the cursor and is followed by a
    /// space, with the context recorded for that span; without one the
    /// whole prefix is parsed from the root.
    pub fn suggestions_at(
        &self,
        doc: &mut Document,
        index: usize,
        offset: usize,
    ) -> Result<Vec<Suggestion>, DocumentError> {
        let line = self.fresh_line(doc, index)?;
        let text = line.text();
        let offset = offset.min(text.chars().count());
        let prefix: String = text.chars().take(offset).collect();
        if prefix.trim_start().starts_with('#') {
            return Ok(Vec::new());
        }

        let root = self.data.root();
        let resume = line.parsed().and_then(|parsed| {
            parsed
                .nodes
                .iter()
                .filter(|n| n.span.end < offset && prefix.chars().nth(n.span.end) == Some(' '))
                .max_by_key(|n| n.span.end)
        });
        let (start, path, context) = match resume {
            Some(node) => {
                let path = match root.node_at(&node.path).and_then(|n| n.redirect.as_ref()) {
                    Some(target) => root.resolve(target),
                    None => Some(node.path.clone()),
                };
                let Some(path) = path else {
                    return Ok(Vec::new());
                };
                (node.span.end + 1, path, node.final_context.clone())
            }
            None => (0, TreePath::root(), CommandContext::default()),
        };

        let outcome = self
            .dispatcher()
            .suggesting(true)
            .parse_from(&prefix, start, &path, &context);
        let mut seen = HashSet::new();
        let mut out: Vec<Suggestion> = Vec::new();
        for s in outcome.extras().suggestions.iter().cloned() {
            let s = s.into_suggestion(start, SuggestionKind::Text);
            if s.start <= offset && seen.insert((s.text.clone(), s.start)) {
                out.push(s);
            }
        }
        out.truncate(self.config.suggestions.max_results);
        Ok(out)
    }

    /// Hover texts at `offset` of line `index`.
    pub fn hover_at(
        &self,
        doc: &mut Document,
        index: usize,
        offset: usize,
    ) -> Result<Option<HoverInfo>, DocumentError> {
        let line = self.fresh_line(doc, index)?;
        let hovers = line.spans_at(offset, Some(ActionKind::Hover));
        let Some(first) = hovers.first() else {
            return Ok(None);
        };
        let contents = hovers
            .iter()
            .filter_map(|a| match &a.data {
                ActionData::Hover(text) => Some(text.clone()),
                _ => None,
            })
            .collect();
        Ok(Some(HoverInfo {
            span: first.span,
            contents,
        }))
    }

    /// Formatting edits for line `index`: outermost format spans, in order,
    /// without overlaps.
    pub fn format_ranges(
        &self,
        doc: &mut Document,
        index: usize,
    ) -> Result<Vec<TextEdit>, DocumentError> {
        let line = self.fresh_line(doc, index)?;
        Ok(format_edits(index, line))
    }

    /// The cross-reference at `offset` of line `index`, innermost first.
    pub fn source_at(
        &self,
        doc: &mut Document,
        index: usize,
        offset: usize,
    ) -> Result<Option<SourceLink>, DocumentError> {
        let line = self.fresh_line(doc, index)?;
        Ok(line
            .spans_at(offset, Some(ActionKind::Source))
            .into_iter()
            .find_map(|a| match &a.data {
                ActionData::Source(target) => Some(SourceLink {
                    span: a.span,
                    target: target.clone(),
                }),
                _ => None,
            }))
    }

    /// Analysis spans at `offset` of line `index`, innermost first.
    pub fn spans_at(
        &self,
        doc: &mut Document,
        index: usize,
        offset: usize,
        kind: Option<ActionKind>,
    ) -> Result<Vec<SubAction>, DocumentError> {
        let line = self.fresh_line(doc, index)?;
        Ok(line.spans_at(offset, kind).into_iter().cloned().collect())
    }

    /// Parse-tree spans at `offset` of line `index`, deepest first.
    pub fn nodes_at(
        &self,
        doc: &mut Document,
        index: usize,
        offset: usize,
    ) -> Result<Vec<ParseNode>, DocumentError> {
        let line = self.fresh_line(doc, index)?;
        Ok(line.nodes_at(offset).into_iter().cloned().collect())
    }

    /// Every reported diagnostic of `doc` with document-level spans, plus
    /// file-level notices (which carry no span).
    pub fn diagnostics(&self, doc: &mut Document) -> Vec<Diagnostic> {
        self.parse_all(doc);
        let mut out = Vec::new();
        if let Some(MiscInfo::FileError { message, .. }) = doc.datapack_notice() {
            out.push(Diagnostic::warn(codes::FILE_OUTSIDE_DATAPACK, message, None));
        }
        let line_index = LineIndex::new(&doc.text());
        for (i, line) in doc.lines().iter().enumerate() {
            let line_start = line_index.line_start(i).unwrap_or_default();
            for mut diagnostic in reported(line) {
                diagnostic.span = diagnostic.span.map(|s| s.offset_by(line_start));
                out.push(diagnostic);
            }
        }
        out
    }

    /// Text of `doc` with every format edit applied.
    pub fn format_document(&self, doc: &mut Document) -> String {
        self.parse_all(doc);
        let lines: Vec<String> = doc
            .lines()
            .iter()
            .enumerate()
            .map(|(i, line)| apply_edits(line.text(), &format_edits(i, line)))
            .collect();
        lines.join("\n")
    }
}

fn reported(line: &CommandLine) -> Vec<Diagnostic> {
    line.parsed()
        .map(|parsed| {
            parsed
                .errors
                .iter()
                .filter(|e| e.is_reported())
                .map(|e| e.diagnostic().clone())
                .collect()
        })
        .unwrap_or_default()
}

fn format_edits(index: usize, line: &CommandLine) -> Vec<TextEdit> {
    let Some(parsed) = line.parsed() else {
        return Vec::new();
    };
    let mut formats: Vec<&SubAction> = parsed
        .actions
        .iter()
        .filter(|a| a.kind() == ActionKind::Format)
        .collect();
    formats.sort_by(|a, b| a.span.start.cmp(&b.span.start).then(b.span.end.cmp(&a.span.end)));
    let mut edits: Vec<TextEdit> = Vec::new();
    for action in formats {
        if edits.last().is_some_and(|e| action.span.start < e.span.end) {
            continue;
        }
        if let ActionData::Format(text) = &action.data {
            edits.push(TextEdit {
                line: index,
                span: action.span,
                new_text: text.clone(),
            });
        }
    }
    edits
}

/// Apply non-overlapping edits sorted by start.
fn apply_edits(text: &str, edits: &[TextEdit]) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut at = 0;
    for edit in edits {
        let start = edit.span.start.min(chars.len());
        out.extend(&chars[at.min(start)..start]);
        out.push_str(&edit.new_text);
        at = edit.span.end.min(chars.len());
    }
    out.extend(&chars[at.min(chars.len())..]);
    out
}
