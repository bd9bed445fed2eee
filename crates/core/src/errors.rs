use mcfunction_toolchain_diagnostics::{Diagnostic, Span};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// An error produced while parsing a line.
///
/// Silent errors belong to alternatives that were rejected in favour of
/// another branch and must never reach the user. Reported errors surface as
/// diagnostics. Combinators may move an error between the two classes but
/// never drop it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "visibility", content = "diagnostic", rename_all = "lowercase")]
pub enum CommandError {
    /// Hidden from the user.
    Silent(Diagnostic),
    /// Surfaced as a diagnostic.
    Reported(Diagnostic),
}

impl CommandError {
    /// A reported error-severity diagnostic.
    pub fn reported(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        CommandError::Reported(Diagnostic::error(id, message, Some(span)))
    }

    /// A silent error-severity diagnostic.
    pub fn silent(id: impl Into<Cow<'static, str>>, message: impl Into<String>, span: Span) -> Self {
        CommandError::Silent(Diagnostic::error(id, message, Some(span)))
    }

    /// Attach machine-readable context to the wrapped diagnostic.
    pub fn with_context(self, ctx: BTreeMap<String, String>) -> Self {
        match self {
            CommandError::Silent(d) => CommandError::Silent(d.with_context(ctx)),
            CommandError::Reported(d) => CommandError::Reported(d.with_context(ctx)),
        }
    }

    /// The wrapped diagnostic.
    pub fn diagnostic(&self) -> &Diagnostic {
        match self {
            CommandError::Silent(d) | CommandError::Reported(d) => d,
        }
    }

    /// Unwrap into the diagnostic.
    pub fn into_diagnostic(self) -> Diagnostic {
        match self {
            CommandError::Silent(d) | CommandError::Reported(d) => d,
        }
    }

    /// Whether the error must be shown.
    pub fn is_reported(&self) -> bool {
        matches!(self, CommandError::Reported(_))
    }

    /// Reclassify as silent.
    pub fn demote(self) -> Self {
        CommandError::Silent(self.into_diagnostic())
    }

    /// Reclassify as reported.
    pub fn promote(self) -> Self {
        CommandError::Reported(self.into_diagnostic())
    }

    /// Span of the wrapped diagnostic.
    pub fn span(&self) -> Option<Span> {
        self.diagnostic().span
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcfunction_toolchain_diagnostics::codes;

    #[test]
    fn demote_and_promote_keep_the_diagnostic() {
        let e = CommandError::reported(codes::TRAILING_INPUT, "trailing", Span::new(0, 3));
        let d = e.clone().demote();
        assert!(!d.is_reported());
        assert_eq!(d.diagnostic(), e.diagnostic());
        assert_eq!(d.promote(), e);
    }

    #[test]
    fn serializes_with_visibility_tag() {
        let e = CommandError::silent(codes::LITERAL_MISMATCH, "no match", Span::empty(0));
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["visibility"], "silent");
        assert_eq!(v["diagnostic"]["id"], codes::LITERAL_MISMATCH);
    }
}
