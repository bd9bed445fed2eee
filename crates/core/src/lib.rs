//! mcfunction toolchain core library.
//!
//! Parses lines of command text against a Brigadier-style command tree and
//! caches per-line analysis for editor queries. The main entry points are
//! [`Dispatcher`] for one-shot parsing of a line and [`Analyzer`] +
//! [`Document`] for incremental, cursor-addressed queries (diagnostics,
//! completions, hovers, formatting and source links).

#![warn(missing_docs)]

/// Build a diagnostic context map: `ctx!{"key" => value, ...}`.
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        std::collections::BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}

/// Analysis spans and file-level notices.
pub mod actions;
/// Document-level query API over cached line analysis.
pub mod analyzer;
/// Execution context threaded through a parse.
pub mod context;
/// Recursive walk of the command tree.
pub mod dispatch;
/// Document model: lines plus datapack location.
pub mod document;
/// Silent and reported parse errors.
pub mod errors;
/// Sorted interval index for point queries.
pub mod intervals;
/// Per-line cache of analysis results.
pub mod line;
/// Node parsers, one per argument kind.
pub mod parsers;
/// Character cursor over a single line.
pub mod reader;
/// Success/failure results with side channels.
pub mod result;
/// Completion suggestions.
pub mod suggestion;

// ── Convenience re-exports ──────────────────────────────────────────────────

pub use actions::{ActionData, ActionKind, MiscInfo, SubAction};
pub use analyzer::{Analyzer, HoverInfo, LineStatus, SourceLink, TextEdit};
pub use context::{CommandContext, ContextChange, EntityInfo};
pub use dispatch::{Dispatcher, LineOutcome, ParseNode};
pub use document::{Document, DocumentError, function_id_for_path};
pub use errors::CommandError;
pub use intervals::{IntervalIndex, Spanned};
pub use line::{CommandLine, LineState, StoredParseResult};
pub use parsers::nbt::{NbtNode, NbtType, NbtValue};
pub use parsers::{NodeParser, ParserInfo, ParserKind};
pub use reader::{ReaderError, ReaderErrorKind, StringReader};
pub use result::{ReturnData, ReturnHelper, Returned, merge_extras};
pub use suggestion::{InsertFormat, SuggestResult, Suggestion, SuggestionKind};

// Re-exported from sibling crates.
pub use mcfunction_toolchain_command_data::{CommandData, CommandNode, GlobalData, LocalData, TreePath};
pub use mcfunction_toolchain_config::{Config, Limits};
pub use mcfunction_toolchain_diagnostics::{Diagnostic, Severity, Span, codes};
