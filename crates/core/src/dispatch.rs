//! Recursive walk of the command tree over one line.
//!
//! Each step tries the children of the current node against a reader that
//! spans the whole line, so every span recorded anywhere in a parse is an
//! absolute character offset into the line.
//!
//! Children are tried literals first, then arguments, each in declaration
//! order, with the reader restored to the step start before every attempt.
//! A literal whose keyword matches is authoritative: no later sibling is
//! tried and whatever its subtree produces is the step's result. An argument
//! wins only if it and its subtree succeed. When nothing succeeds, the
//! reported failure that reached furthest into the line (first in order on
//! ties) is kept and every other attempt keeps only its suggestions and its
//! errors, demoted to silent.

use crate::actions::SubAction;
use crate::context::CommandContext;
use crate::errors::CommandError;
use crate::intervals::Spanned;
use crate::parsers::{ParserInfo, ParserKind};
use crate::reader::StringReader;
use crate::result::{ReturnData, ReturnHelper, Returned};
use crate::suggestion::{SuggestResult, SuggestionKind};
use mcfunction_toolchain_command_data::{CommandData, CommandNode, NodeKind, TreePath};
use mcfunction_toolchain_config::Limits;
use mcfunction_toolchain_diagnostics::{Span, codes};
use serde::Serialize;
use tracing::{trace, warn};

/// Characters consumed by one dispatch step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseNode {
    /// Consumed characters.
    pub span: Span,
    /// Tree path of the node that consumed them.
    pub path: TreePath,
    /// Context entering the step.
    pub context: CommandContext,
    /// Context after merging the step's change.
    pub final_context: CommandContext,
}

impl Spanned for ParseNode {
    fn span(&self) -> Span {
        self.span
    }
}

/// Result of parsing a line: the parse-tree spans that were recorded, on
/// both success and failure.
pub type LineOutcome = Returned<Vec<ParseNode>, Vec<ParseNode>>;

/// Failure payload of a step: spans recorded before the failure and how far
/// into the line the attempt got.
#[derive(Debug)]
struct StepFailure {
    nodes: Vec<ParseNode>,
    end: usize,
}

impl StepFailure {
    fn at(end: usize) -> Self {
        Self {
            nodes: Vec::new(),
            end,
        }
    }
}

type Step = Returned<Vec<ParseNode>, StepFailure>;

/// Parses lines against the command tree of a [`CommandData`].
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'d> {
    data: &'d CommandData,
    limits: Limits,
    suggesting: bool,
}

impl<'d> Dispatcher<'d> {
    /// Dispatcher over `data` that does not collect suggestions.
    pub fn new(data: &'d CommandData, limits: Limits) -> Self {
        Self {
            data,
            limits,
            suggesting: false,
        }
    }

    /// Enable or disable suggestion collection (builder pattern).
    pub fn suggesting(mut self, suggesting: bool) -> Self {
        self.suggesting = suggesting;
        self
    }

    /// Parse a whole line from the root, seeded with `context`.
    pub fn parse(&self, text: &str, context: &CommandContext) -> LineOutcome {
        self.parse_from(text, 0, &TreePath::root(), context)
    }

    /// Parse `text` from character offset `start`, trying the children of
    /// the node at `path`.
    pub fn parse_from(
        &self,
        text: &str,
        start: usize,
        path: &TreePath,
        context: &CommandContext,
    ) -> LineOutcome {
        let mut reader = StringReader::new(text);
        reader.set_cursor(start);
        let step = match self.data.root().node_at(path) {
            Some(node) => self.step(&mut reader, node, path, context),
            None => ReturnHelper::new()
                .fail_with(CommandError::reported(
                    codes::INVALID_REDIRECT,
                    format!("no command node at {path}"),
                    Span::empty(start),
                ))
                .map_failure(|()| StepFailure::at(start)),
        };
        step.map_failure(|f| f.nodes)
    }

    fn step(
        &self,
        reader: &mut StringReader<'_>,
        node: &CommandNode,
        path: &TreePath,
        context: &CommandContext,
    ) -> Step {
        let start = reader.cursor();
        if node.children.is_empty() {
            if !reader.can_read() {
                return Returned::success(Vec::new());
            }
            return ReturnHelper::new().fail(StepFailure::at(start)).merge_extras(
                error_extras(CommandError::reported(
                    codes::TRAILING_INPUT,
                    "unexpected trailing input",
                    Span::new(start, reader.total_len()),
                )),
                false,
            );
        }

        let ordered: Vec<(usize, &str, &CommandNode)> = node
            .children
            .iter()
            .filter(|(_, _, c)| c.kind == NodeKind::Literal)
            .chain(node.children.iter().filter(|(_, _, c)| c.kind != NodeKind::Literal))
            .collect();

        let mut attempts: Vec<(ReturnData, StepFailure)> = Vec::new();
        for (pos, &(idx, name, child)) in ordered.iter().enumerate() {
            reader.set_cursor(start);
            trace!(path = %path.child(idx), name, start, "trying child");
            let (outcome, matched) = self.attempt(reader, idx, name, child, path, context);
            if outcome.is_success() || (matched && child.kind == NodeKind::Literal) {
                let mut extras = ReturnData::new();
                for (rejected, _) in attempts {
                    extras.merge(discard_spans(rejected));
                }
                let mut outcome = outcome.merge_extras(extras, true);
                if self.suggesting {
                    let later = self.sibling_suggestions(
                        reader,
                        start,
                        &ordered[pos + 1..],
                        path,
                        context,
                    );
                    outcome.extras_mut().suggestions.extend(later);
                }
                return outcome;
            }
            let (data, extras) = outcome.into_parts();
            if let Err(failure) = data {
                attempts.push((extras, failure));
            }
        }

        let mut best: Option<(usize, usize)> = None;
        for (i, (extras, failure)) in attempts.iter().enumerate() {
            if !extras.has_reported_errors() {
                continue;
            }
            match best {
                Some((_, end)) if end >= failure.end => {}
                _ => best = Some((i, failure.end)),
            }
        }

        let mut helper = ReturnHelper::new();
        let mut result = StepFailure::at(start);
        for (i, (extras, failure)) in attempts.into_iter().enumerate() {
            if best.is_some_and(|(b, _)| b == i) {
                helper.merge_extras(extras);
                result = failure;
            } else {
                helper.merge_extras(discard_spans(extras));
            }
        }
        if best.is_none() {
            reader.set_cursor(start);
            let expected: Vec<String> = ordered
                .iter()
                .map(|&(_, name, child)| match child.kind {
                    NodeKind::Literal => name.to_string(),
                    _ => format!("<{name}>"),
                })
                .collect();
            let expected = expected.join(", ");
            helper.add_error(
                CommandError::reported(
                    codes::EXPECTED_ALTERNATIVE,
                    format!("expected one of: {expected}"),
                    Span::new(start, reader.word_end()),
                )
                .with_context(ctx! { "expected" => expected }),
            );
        }
        helper.fail(result)
    }

    /// Parse one child and, if its parser accepts, the rest of the line below
    /// it. The flag reports whether the child's own parser accepted.
    fn attempt(
        &self,
        reader: &mut StringReader<'_>,
        idx: usize,
        name: &str,
        child: &CommandNode,
        path: &TreePath,
        context: &CommandContext,
    ) -> (Step, bool) {
        let start = reader.cursor();
        let child_path = path.child(idx);
        let kind = match ParserKind::for_node(child) {
            Ok(kind) => kind,
            Err(unsupported) => {
                warn!(path = %child_path, parser = %unsupported.0, "unsupported argument parser");
                let err = CommandError::reported(
                    codes::UNSUPPORTED_PARSER,
                    unsupported.to_string(),
                    Span::new(start, reader.word_end()),
                )
                .with_context(ctx! { "parser" => unsupported.0 });
                let step = ReturnHelper::new().fail(StepFailure::at(start));
                return (step.merge_extras(error_extras(err), false), false);
            }
        };
        let parser = kind.parser();
        let info = ParserInfo {
            context,
            data: self.data,
            properties: child.properties.as_ref(),
            path: &child_path,
            node_name: name,
            suggesting: self.suggesting,
            limits: &self.limits,
        };

        let mut helper = ReturnHelper::new();
        let (outcome, extras) = parser.parse(reader, &info).into_parts();
        helper.merge_extras(resolve_suggestions(extras, start, parser.suggestion_kind()));
        let Ok(change) = outcome else {
            trace!(path = %child_path, end = reader.cursor(), "child rejected");
            return (helper.fail(StepFailure::at(reader.cursor())), false);
        };

        let span = Span::new(start, reader.cursor());
        let merged = match &change {
            Some(change) => context.apply(change),
            None => context.clone(),
        };
        let hover = match kind {
            ParserKind::Literal => self
                .data
                .root()
                .names(&child_path)
                .map(|names| names.join(" "))
                .unwrap_or_else(|| name.to_string()),
            _ => format!("<{name}>: {}", kind.id()),
        };
        helper.add_action(SubAction::hover(span, hover));
        let node = ParseNode {
            span,
            path: child_path.clone(),
            context: context.clone(),
            final_context: merged.clone(),
        };

        let (rest, extras) = self
            .continue_after(reader, child, &child_path, &merged)
            .into_parts();
        helper.merge_extras(extras);
        let step = match rest {
            Ok(mut nodes) => {
                nodes.insert(0, node);
                helper.succeed(nodes)
            }
            Err(mut failure) => {
                failure.nodes.insert(0, node);
                helper.fail(failure)
            }
        };
        (step, true)
    }

    /// After a child accepted its text: finish the line, or expect a single
    /// space and descend into the child (or its redirect target).
    fn continue_after(
        &self,
        reader: &mut StringReader<'_>,
        child: &CommandNode,
        child_path: &TreePath,
        context: &CommandContext,
    ) -> Step {
        let at = reader.cursor();
        if !reader.can_read() {
            if child.is_executable() {
                return Returned::success(Vec::new());
            }
            return ReturnHelper::new().fail(StepFailure::at(at)).merge_extras(
                error_extras(CommandError::reported(
                    codes::INCOMPLETE_COMMAND,
                    "incomplete command",
                    Span::empty(at),
                )),
                false,
            );
        }
        if reader.peek() != Some(' ') {
            return ReturnHelper::new().fail(StepFailure::at(at)).merge_extras(
                error_extras(CommandError::reported(
                    codes::EXPECTED_SEPARATOR,
                    "expected a space between arguments",
                    Span::new(at, at + 1),
                )),
                false,
            );
        }
        reader.skip();
        let Some(target) = &child.redirect else {
            return self.step(reader, child, child_path, context);
        };
        let root = self.data.root();
        match root
            .resolve(target)
            .and_then(|path| root.node_at(&path).map(|node| (node, path)))
        {
            Some((node, path)) => self.step(reader, node, &path, context),
            None => {
                let target = target.join(" ");
                ReturnHelper::new().fail(StepFailure::at(at)).merge_extras(
                    error_extras(
                        CommandError::reported(
                            codes::INVALID_REDIRECT,
                            format!("redirect target '{target}' does not exist"),
                            Span::empty(at),
                        )
                        .with_context(ctx! { "target" => target }),
                    ),
                    false,
                )
            }
        }
    }

    /// Suggestions from the parsers of siblings that were never tried
    /// because an earlier sibling won.
    fn sibling_suggestions(
        &self,
        reader: &StringReader<'_>,
        start: usize,
        siblings: &[(usize, &str, &CommandNode)],
        path: &TreePath,
        context: &CommandContext,
    ) -> Vec<SuggestResult> {
        let mut out = Vec::new();
        for &(idx, name, child) in siblings {
            let Ok(kind) = ParserKind::for_node(child) else {
                continue;
            };
            let mut reader = reader.clone();
            reader.set_cursor(start);
            let child_path = path.child(idx);
            let info = ParserInfo {
                context,
                data: self.data,
                properties: child.properties.as_ref(),
                path: &child_path,
                node_name: name,
                suggesting: true,
                limits: &self.limits,
            };
            let parser = kind.parser();
            let extras = parser.parse(&mut reader, &info).into_parts().1;
            out.extend(resolve_suggestions(extras, start, parser.suggestion_kind()).suggestions);
        }
        out
    }
}

fn error_extras(error: CommandError) -> ReturnData {
    ReturnData {
        errors: vec![error],
        ..ReturnData::default()
    }
}

/// Keep only what a rejected alternative may contribute: its suggestions and
/// its errors, demoted.
fn discard_spans(mut extras: ReturnData) -> ReturnData {
    extras.demote_errors();
    ReturnData {
        errors: extras.errors,
        suggestions: extras.suggestions,
        ..ReturnData::default()
    }
}

/// Give bare-text suggestions the step's start offset and the parser's kind.
fn resolve_suggestions(mut extras: ReturnData, start: usize, kind: SuggestionKind) -> ReturnData {
    extras.suggestions = extras
        .suggestions
        .into_iter()
        .map(|s| SuggestResult::Full(s.into_suggestion(start, kind)))
        .collect();
    extras
}
