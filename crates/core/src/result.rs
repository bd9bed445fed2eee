//! Uniform success/failure container with side channels.
//!
//! Every parse step returns a [`Returned`]: Success or Failure, each carrying
//! the same [`ReturnData`] record of actions, errors, misc notices and
//! suggestions. Side channels only ever grow; combinators concatenate them
//! regardless of which state either operand is in.

use crate::actions::{MiscInfo, SubAction};
use crate::errors::CommandError;
use crate::suggestion::SuggestResult;
use serde::Serialize;

/// Side-channel record carried by every [`Returned`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReturnData {
    /// Analysis spans.
    pub actions: Vec<SubAction>,
    /// Silent and reported errors.
    pub errors: Vec<CommandError>,
    /// File-level notices.
    pub misc: Vec<MiscInfo>,
    /// Completion suggestions.
    pub suggestions: Vec<SuggestResult>,
}

impl ReturnData {
    /// Empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every channel of `other` after this record's entries.
    pub fn merge(&mut self, other: ReturnData) {
        self.actions.extend(other.actions);
        self.errors.extend(other.errors);
        self.misc.extend(other.misc);
        self.suggestions.extend(other.suggestions);
    }

    /// Reclassify every error as silent.
    pub fn demote_errors(&mut self) {
        for e in std::mem::take(&mut self.errors) {
            self.errors.push(e.demote());
        }
    }

    /// Whether any error is reported.
    pub fn has_reported_errors(&self) -> bool {
        self.errors.iter().any(CommandError::is_reported)
    }

    /// Reported errors, in order.
    pub fn reported_errors(&self) -> impl Iterator<Item = &CommandError> {
        self.errors.iter().filter(|e| e.is_reported())
    }

    /// Whether all channels are empty.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
            && self.errors.is_empty()
            && self.misc.is_empty()
            && self.suggestions.is_empty()
    }
}

/// Concatenate two side-channel records (`a` first).
pub fn merge_extras(mut a: ReturnData, b: ReturnData) -> ReturnData {
    a.merge(b);
    a
}

/// Outcome of a parse step.
#[derive(Debug, Clone, PartialEq)]
pub enum Returned<T, E = ()> {
    /// The step accepted its input.
    Success {
        /// Produced value.
        data: T,
        /// Side channels.
        extras: ReturnData,
    },
    /// The step rejected its input.
    Failure {
        /// Failure payload.
        data: E,
        /// Side channels.
        extras: ReturnData,
    },
}

impl<T, E> Returned<T, E> {
    /// Success with empty side channels.
    pub fn success(data: T) -> Self {
        Returned::Success {
            data,
            extras: ReturnData::new(),
        }
    }

    /// Failure with empty side channels.
    pub fn failure(data: E) -> Self {
        Returned::Failure {
            data,
            extras: ReturnData::new(),
        }
    }

    /// Whether this is a success.
    pub fn is_success(&self) -> bool {
        matches!(self, Returned::Success { .. })
    }

    /// Whether this is a failure.
    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Side channels.
    pub fn extras(&self) -> &ReturnData {
        match self {
            Returned::Success { extras, .. } | Returned::Failure { extras, .. } => extras,
        }
    }

    /// Mutable side channels.
    pub fn extras_mut(&mut self) -> &mut ReturnData {
        match self {
            Returned::Success { extras, .. } | Returned::Failure { extras, .. } => extras,
        }
    }

    /// Split into the tagged payload and the side channels.
    pub fn into_parts(self) -> (Result<T, E>, ReturnData) {
        match self {
            Returned::Success { data, extras } => (Ok(data), extras),
            Returned::Failure { data, extras } => (Err(data), extras),
        }
    }

    /// Rebuild from a tagged payload and side channels.
    pub fn from_parts(data: Result<T, E>, extras: ReturnData) -> Self {
        match data {
            Ok(data) => Returned::Success { data, extras },
            Err(data) => Returned::Failure { data, extras },
        }
    }

    /// Transform the success value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Returned<U, E> {
        let (data, extras) = self.into_parts();
        Returned::from_parts(data.map(f), extras)
    }

    /// Transform the failure payload.
    pub fn map_failure<F>(self, f: impl FnOnce(E) -> F) -> Returned<T, F> {
        let (data, extras) = self.into_parts();
        Returned::from_parts(data.map_err(f), extras)
    }

    /// Chain another step on success. Failures short-circuit; side channels
    /// of both steps are concatenated.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Returned<U, E>) -> Returned<U, E> {
        match self {
            Returned::Success { data, extras } => f(data).merge_extras(extras, true),
            Returned::Failure { data, extras } => Returned::Failure { data, extras },
        }
    }

    /// Add `other` side channels (`before` puts them ahead of this record's).
    pub fn merge_extras(mut self, other: ReturnData, before: bool) -> Self {
        let own = self.extras_mut();
        if before {
            let mine = std::mem::replace(own, other);
            own.merge(mine);
        } else {
            own.merge(other);
        }
        self
    }

    /// Reclassify every error as silent.
    pub fn demote_errors(mut self) -> Self {
        self.extras_mut().demote_errors();
        self
    }
}

/// Accumulates side channels across the sub-steps of one parser.
///
/// Sub-results are absorbed with [`ReturnHelper::merge`], which hands back
/// the payload as a plain `Result` so the caller can use `?`-style control
/// flow; the helper then finishes with [`succeed`](ReturnHelper::succeed) or
/// [`fail`](ReturnHelper::fail).
#[derive(Debug, Default)]
pub struct ReturnHelper {
    extras: ReturnData,
}

impl ReturnHelper {
    /// Empty helper.
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb `r`'s side channels and return its payload.
    pub fn merge<T, E>(&mut self, r: Returned<T, E>) -> Result<T, E> {
        let (data, extras) = r.into_parts();
        self.extras.merge(extras);
        data
    }

    /// Absorb a side-channel record.
    pub fn merge_extras(&mut self, extras: ReturnData) -> &mut Self {
        self.extras.merge(extras);
        self
    }

    /// Record an error.
    pub fn add_error(&mut self, error: impl Into<CommandError>) -> &mut Self {
        self.extras.errors.push(error.into());
        self
    }

    /// Record an analysis span.
    pub fn add_action(&mut self, action: SubAction) -> &mut Self {
        self.extras.actions.push(action);
        self
    }

    /// Record a suggestion.
    pub fn add_suggestion(&mut self, suggestion: impl Into<SuggestResult>) -> &mut Self {
        self.extras.suggestions.push(suggestion.into());
        self
    }

    /// Record several suggestions.
    pub fn add_suggestions<S: Into<SuggestResult>>(
        &mut self,
        suggestions: impl IntoIterator<Item = S>,
    ) -> &mut Self {
        self.extras
            .suggestions
            .extend(suggestions.into_iter().map(Into::into));
        self
    }

    /// Whether any reported error has been recorded.
    pub fn has_reported_errors(&self) -> bool {
        self.extras.has_reported_errors()
    }

    /// Side channels recorded so far.
    pub fn extras(&self) -> &ReturnData {
        &self.extras
    }

    /// Finish with a success.
    pub fn succeed<T, E>(self, data: T) -> Returned<T, E> {
        Returned::Success {
            data,
            extras: self.extras,
        }
    }

    /// Finish with a failure.
    pub fn fail<T, E>(self, data: E) -> Returned<T, E> {
        Returned::Failure {
            data,
            extras: self.extras,
        }
    }

    /// Record `error` and finish with a unit failure.
    pub fn fail_with<T>(mut self, error: impl Into<CommandError>) -> Returned<T, ()> {
        self.add_error(error);
        self.fail(())
    }
}
