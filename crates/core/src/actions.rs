use crate::parsers::nbt::NbtNode;
use mcfunction_toolchain_diagnostics::Span;
use serde::Serialize;

/// Kind tag of a [`SubAction`], used to filter span queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Hover text.
    Hover,
    /// Canonical replacement text.
    Format,
    /// Cross-reference target.
    Source,
    /// Parsed structured-data document.
    Nbt,
}

/// Kind-specific payload of a [`SubAction`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum ActionData {
    /// Markdown shown when hovering the span.
    Hover(String),
    /// Text the span should be replaced with when formatting.
    Format(String),
    /// Id of the resource the span refers to (e.g., a function id).
    Source(String),
    /// The typed document parsed from the span.
    Nbt(Box<NbtNode>),
}

impl ActionData {
    /// The kind tag.
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionData::Hover(_) => ActionKind::Hover,
            ActionData::Format(_) => ActionKind::Format,
            ActionData::Source(_) => ActionKind::Source,
            ActionData::Nbt(_) => ActionKind::Nbt,
        }
    }
}

/// An analysis span ("action"): a half-open character range of a line with
/// a kind-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubAction {
    /// Characters covered.
    pub span: Span,
    /// Payload.
    pub data: ActionData,
}

impl SubAction {
    /// Hover action.
    pub fn hover(span: Span, text: impl Into<String>) -> Self {
        Self {
            span,
            data: ActionData::Hover(text.into()),
        }
    }

    /// Format action.
    pub fn format(span: Span, replacement: impl Into<String>) -> Self {
        Self {
            span,
            data: ActionData::Format(replacement.into()),
        }
    }

    /// Source action.
    pub fn source(span: Span, target: impl Into<String>) -> Self {
        Self {
            span,
            data: ActionData::Source(target.into()),
        }
    }

    /// Structured-data document action.
    pub fn nbt(span: Span, doc: NbtNode) -> Self {
        Self {
            span,
            data: ActionData::Nbt(Box::new(doc)),
        }
    }

    /// The kind tag.
    pub fn kind(&self) -> ActionKind {
        self.data.kind()
    }
}

/// A non-positional notice about a whole file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MiscInfo {
    /// Raise a file-level error in `group`.
    FileError {
        /// File the notice applies to.
        file_path: String,
        /// Notice group; a later clear of the same group removes it.
        group: String,
        /// Message text.
        message: String,
    },
    /// Clear file-level errors in `group` (all groups when `None`).
    ClearError {
        /// File the notice applies to.
        file_path: String,
        /// Group to clear.
        #[serde(skip_serializing_if = "Option::is_none")]
        group: Option<String>,
    },
}
