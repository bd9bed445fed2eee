use serde::Serialize;

/// Presentation kind of a suggestion, mirroring editor completion kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum SuggestionKind {
    Text,
    Function,
    Field,
    Variable,
    Property,
    Value,
    Enum,
    Keyword,
    Snippet,
    File,
    Reference,
    Constant,
    Event,
}

/// How the editor should interpret [`Suggestion::text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertFormat {
    /// Insert verbatim.
    PlainText,
    /// Editor snippet syntax (`$1`, `${1:x}`).
    Snippet,
}

/// A structured completion item.
///
/// `start` is the character gap where `text` replaces everything up to the
/// cursor; it never exceeds the cursor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Suggestion {
    /// Replacement text.
    pub text: String,
    /// Insertion start (0-indexed character gap).
    pub start: usize,
    /// Display label when it differs from `text`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Extra detail shown next to the label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Presentation kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<SuggestionKind>,
    /// Insert format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insert_format: Option<InsertFormat>,
}

impl Suggestion {
    /// Plain suggestion inserting `text` at `start`.
    pub fn new(text: impl Into<String>, start: usize) -> Self {
        Self {
            text: text.into(),
            start,
            label: None,
            description: None,
            kind: None,
            insert_format: None,
        }
    }

    /// Set the kind (builder pattern).
    pub fn with_kind(mut self, kind: SuggestionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set the description (builder pattern).
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the label (builder pattern).
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label shown to the user: `label` if set, else `text`.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.text)
    }
}

/// Either a bare replacement string or a full [`Suggestion`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum SuggestResult {
    /// Replacement text; start and kind come from the producing node.
    Text(String),
    /// Fully specified suggestion.
    Full(Suggestion),
}

impl SuggestResult {
    /// Replacement text.
    pub fn text(&self) -> &str {
        match self {
            SuggestResult::Text(t) => t,
            SuggestResult::Full(s) => &s.text,
        }
    }

    /// Resolve into a full suggestion, filling in defaults for bare strings
    /// and for a missing kind.
    pub fn into_suggestion(self, start: usize, kind: SuggestionKind) -> Suggestion {
        match self {
            SuggestResult::Text(text) => Suggestion::new(text, start).with_kind(kind),
            SuggestResult::Full(mut s) => {
                s.kind.get_or_insert(kind);
                s
            }
        }
    }
}

impl From<String> for SuggestResult {
    fn from(s: String) -> Self {
        SuggestResult::Text(s)
    }
}

impl From<&str> for SuggestResult {
    fn from(s: &str) -> Self {
        SuggestResult::Text(s.to_string())
    }
}

impl From<Suggestion> for SuggestResult {
    fn from(s: Suggestion) -> Self {
        SuggestResult::Full(s)
    }
}

/// Candidates from `options` that start with `typed`, as suggestions at `start`.
pub(crate) fn matching<'o>(
    typed: &str,
    start: usize,
    options: impl IntoIterator<Item = &'o str>,
) -> Vec<SuggestResult> {
    options
        .into_iter()
        .filter(|o| o.starts_with(typed))
        .map(|o| Suggestion::new(o, start).into())
        .collect()
}
