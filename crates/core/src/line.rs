//! Per-line analysis cache.
//!
//! A [`CommandLine`] owns its text and the bundle produced by the last parse
//! of that text. Interval indexes over the bundle are built on first query
//! and dropped together with the bundle whenever the text changes.

use crate::actions::{ActionKind, SubAction};
use crate::dispatch::ParseNode;
use crate::errors::CommandError;
use crate::intervals::{IntervalIndex, Spanned};
use mcfunction_toolchain_diagnostics::Span;
use serde::Serialize;
use std::sync::OnceLock;
use tracing::debug;

/// Everything kept from one parse of a line.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoredParseResult {
    /// Analysis spans.
    pub actions: Vec<SubAction>,
    /// Silent and reported errors.
    pub errors: Vec<CommandError>,
    /// Parse-tree spans.
    pub nodes: Vec<ParseNode>,
}

/// Parse state of a line.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LineState {
    /// Text changed since the last parse (or never parsed).
    #[default]
    Stale,
    /// Comment or blank line; nothing to parse.
    Skipped,
    /// Cached bundle for the current text.
    Parsed(StoredParseResult),
}

/// Position of one bundle entry in an interval index.
#[derive(Debug, Clone, Copy)]
struct Slot {
    span: Span,
    index: usize,
}

impl Spanned for Slot {
    fn span(&self) -> Span {
        self.span
    }
}

fn slots<T: Spanned>(items: &[T]) -> IntervalIndex<Slot> {
    IntervalIndex::new(
        items
            .iter()
            .enumerate()
            .map(|(index, item)| Slot {
                span: item.span(),
                index,
            })
            .collect(),
    )
}

/// Whether a line carries no command: blank or a `#` comment.
pub fn is_skipped_text(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// One line of a document and its cached analysis.
#[derive(Debug, Default)]
pub struct CommandLine {
    text: String,
    state: LineState,
    actions: OnceLock<IntervalIndex<Slot>>,
    nodes: OnceLock<IntervalIndex<Slot>>,
}

impl CommandLine {
    /// A stale line holding `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Line text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Current parse state.
    pub fn state(&self) -> &LineState {
        &self.state
    }

    /// Whether the line must be parsed before it can answer queries.
    pub fn is_stale(&self) -> bool {
        matches!(self.state, LineState::Stale)
    }

    /// The cached bundle, if the line has been parsed.
    pub fn parsed(&self) -> Option<&StoredParseResult> {
        match &self.state {
            LineState::Parsed(result) => Some(result),
            _ => None,
        }
    }

    /// Replace the text and drop everything cached for the old text.
    ///
    /// Setting identical text keeps the cache.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text == self.text {
            return;
        }
        debug!(old_len = self.text.len(), new_len = text.len(), "line invalidated");
        self.text = text;
        self.set_state(LineState::Stale);
    }

    /// Store a new state for the current text, dropping the old indexes.
    pub fn set_state(&mut self, state: LineState) {
        self.state = state;
        self.actions.take();
        self.nodes.take();
    }

    /// Actions containing `offset`, optionally filtered by kind, innermost
    /// (shortest) first. Empty for stale or skipped lines.
    pub fn spans_at(&self, offset: usize, kind: Option<ActionKind>) -> Vec<&SubAction> {
        let Some(parsed) = self.parsed() else {
            return Vec::new();
        };
        let index = self.actions.get_or_init(|| slots(&parsed.actions));
        let mut hits: Vec<&SubAction> = index
            .query_point(offset)
            .into_iter()
            .map(|slot| &parsed.actions[slot.index])
            .filter(|a| kind.is_none_or(|k| a.kind() == k))
            .collect();
        hits.sort_by_key(|a| a.span.len());
        hits
    }

    /// Parse-tree spans containing `offset`, deepest path first.
    pub fn nodes_at(&self, offset: usize) -> Vec<&ParseNode> {
        let Some(parsed) = self.parsed() else {
            return Vec::new();
        };
        let index = self.nodes.get_or_init(|| slots(&parsed.nodes));
        let mut hits: Vec<&ParseNode> = index
            .query_point(offset)
            .into_iter()
            .map(|slot| &parsed.nodes[slot.index])
            .collect();
        hits.sort_by(|a, b| b.path.depth().cmp(&a.path.depth()));
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CommandContext;
    use mcfunction_toolchain_command_data::TreePath;

    fn node(start: usize, end: usize, path: &[usize]) -> ParseNode {
        ParseNode {
            span: Span::new(start, end),
            path: TreePath::from_indices(path.to_vec()),
            context: CommandContext::default(),
            final_context: CommandContext::default(),
        }
    }

    fn parsed_line() -> CommandLine {
        let mut line = CommandLine::new("say hello");
        line.set_state(LineState::Parsed(StoredParseResult {
            actions: vec![
                SubAction::hover(Span::new(0, 9), "whole"),
                SubAction::hover(Span::new(4, 9), "message"),
                SubAction::format(Span::new(4, 9), "hello"),
            ],
            errors: Vec::new(),
            nodes: vec![node(0, 3, &[0]), node(4, 9, &[0, 0])],
        }));
        line
    }

    #[test]
    fn skipped_text() {
        assert!(is_skipped_text(""));
        assert!(is_skipped_text("   "));
        assert!(is_skipped_text("  # comment"));
        assert!(!is_skipped_text("say #not a comment"));
    }

    #[test]
    fn spans_innermost_first_and_filtered() {
        let line = parsed_line();
        let hovers = line.spans_at(5, Some(ActionKind::Hover));
        let spans: Vec<Span> = hovers.iter().map(|a| a.span).collect();
        assert_eq!(spans, vec![Span::new(4, 9), Span::new(0, 9)]);
        assert_eq!(line.spans_at(5, None).len(), 3);
        assert_eq!(line.spans_at(1, Some(ActionKind::Format)).len(), 0);
    }

    #[test]
    fn nodes_at_respects_half_open_spans() {
        let line = parsed_line();
        assert_eq!(line.nodes_at(0)[0].path.indices(), &[0]);
        assert!(line.nodes_at(3).is_empty());
        assert_eq!(line.nodes_at(4)[0].path.indices(), &[0, 0]);
    }

    #[test]
    fn nested_nodes_deepest_first() {
        let mut line = CommandLine::new("abcdef");
        line.set_state(LineState::Parsed(StoredParseResult {
            nodes: vec![node(0, 6, &[1]), node(2, 4, &[1, 0, 2])],
            ..StoredParseResult::default()
        }));
        let depths: Vec<usize> = line.nodes_at(3).iter().map(|n| n.path.depth()).collect();
        assert_eq!(depths, vec![3, 1]);
    }

    #[test]
    fn edit_clears_cache() {
        let mut line = parsed_line();
        assert_eq!(line.nodes_at(0).len(), 1);
        line.set_text("say hello");
        assert!(!line.is_stale());
        line.set_text("say bye");
        assert!(line.is_stale());
        assert!(line.nodes_at(0).is_empty());
        assert!(line.spans_at(5, None).is_empty());
    }
}
