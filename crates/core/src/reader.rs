//! Character cursor over a single line of command text.
//!
//! The cursor counts characters (Unicode scalar values), not bytes, so every
//! span it reports lines up with editor columns. Besides the raw cursor
//! primitives it offers the Brigadier string and number readers shared by the
//! node parsers.

use crate::errors::CommandError;
use mcfunction_toolchain_diagnostics::{Diagnostic, Span, codes};
use thiserror::Error;

/// What went wrong while reading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReaderErrorKind {
    /// The line ended while more characters were needed.
    #[error("unexpected end of input")]
    UnexpectedEnd,
    /// A specific character was required.
    #[error("expected '{0}'")]
    ExpectedChar(char),
    /// A quoted string was required.
    #[error("expected a quote to start a string")]
    ExpectedStartOfQuote,
    /// An integer was required.
    #[error("expected an integer")]
    ExpectedInt,
    /// A token looked numeric but is not a valid integer.
    #[error("invalid integer '{0}'")]
    InvalidInt(String),
    /// A decimal number was required.
    #[error("expected a number")]
    ExpectedFloat,
    /// A token looked numeric but is not a valid number.
    #[error("invalid number '{0}'")]
    InvalidFloat(String),
    /// A boolean was required.
    #[error("expected true or false")]
    ExpectedBool,
    /// A token is neither `true` nor `false`.
    #[error("invalid boolean '{0}', expected true or false")]
    InvalidBool(String),
    /// A quoted string was never closed.
    #[error("unterminated quoted string")]
    UnterminatedQuote,
    /// An escape sequence inside a quoted string is not valid.
    #[error("invalid escape sequence '\\{0}'")]
    InvalidEscape(char),
}

impl ReaderErrorKind {
    /// Diagnostic code reported for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            ReaderErrorKind::UnexpectedEnd => codes::READER_UNEXPECTED_END,
            ReaderErrorKind::ExpectedChar(_) | ReaderErrorKind::ExpectedStartOfQuote => {
                codes::READER_EXPECTED_CHAR
            }
            ReaderErrorKind::ExpectedInt | ReaderErrorKind::InvalidInt(_) => {
                codes::READER_EXPECTED_INT
            }
            ReaderErrorKind::ExpectedFloat | ReaderErrorKind::InvalidFloat(_) => {
                codes::READER_EXPECTED_FLOAT
            }
            ReaderErrorKind::ExpectedBool | ReaderErrorKind::InvalidBool(_) => {
                codes::READER_EXPECTED_BOOL
            }
            ReaderErrorKind::UnterminatedQuote => codes::READER_UNTERMINATED_QUOTE,
            ReaderErrorKind::InvalidEscape(_) => codes::READER_INVALID_ESCAPE,
        }
    }
}

/// A reader failure with the exact span where it happened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct ReaderError {
    /// What went wrong.
    pub kind: ReaderErrorKind,
    /// Characters involved (zero-width at the cursor when nothing was read).
    pub span: Span,
}

impl ReaderError {
    fn new(kind: ReaderErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

impl From<ReaderError> for CommandError {
    fn from(err: ReaderError) -> Self {
        CommandError::Reported(Diagnostic::error(
            err.kind.code(),
            err.kind.to_string(),
            Some(err.span),
        ))
    }
}

/// Whether `c` may appear in an unquoted string.
pub fn is_allowed_in_unquoted(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+')
}

fn is_allowed_number(c: char) -> bool {
    c.is_ascii_digit() || c == '.' || c == '-'
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

/// Cursor over one line of text.
///
/// Cloning a reader is cheap; the text is borrowed.
#[derive(Debug, Clone)]
pub struct StringReader<'a> {
    text: &'a str,
    /// Character offset.
    cursor: usize,
    /// Byte offset matching `cursor`.
    byte: usize,
    /// Total characters in `text`.
    len: usize,
}

impl<'a> StringReader<'a> {
    /// Reader positioned at the start of `text`.
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            cursor: 0,
            byte: 0,
            len: text.chars().count(),
        }
    }

    /// The whole line.
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Number of characters in the line.
    pub fn total_len(&self) -> usize {
        self.len
    }

    /// Current character offset.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor to character offset `offset`, clamped to the line end.
    pub fn set_cursor(&mut self, offset: usize) {
        let offset = offset.min(self.len);
        if offset == self.cursor {
            return;
        }
        self.byte = byte_of(self.text, offset);
        self.cursor = offset;
    }

    /// Whether at least one more character can be read.
    pub fn can_read(&self) -> bool {
        self.cursor < self.len
    }

    /// Next character without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.text[self.byte..].chars().next()
    }

    /// Character `n` positions past the cursor.
    pub fn peek_at(&self, n: usize) -> Option<char> {
        self.text[self.byte..].chars().nth(n)
    }

    /// Advance past one character, if any.
    pub fn skip(&mut self) {
        if let Some(c) = self.peek() {
            self.byte += c.len_utf8();
            self.cursor += 1;
        }
    }

    /// Consume and return the next character.
    pub fn read(&mut self) -> Result<char, ReaderError> {
        let c = self.peek().ok_or_else(|| {
            ReaderError::new(ReaderErrorKind::UnexpectedEnd, Span::empty(self.cursor))
        })?;
        self.skip();
        Ok(c)
    }

    /// Consume `expected` or fail without moving.
    pub fn expect(&mut self, expected: char) -> Result<(), ReaderError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.skip();
                Ok(())
            }
            Some(_) => Err(ReaderError::new(
                ReaderErrorKind::ExpectedChar(expected),
                Span::new(self.cursor, self.cursor + 1),
            )),
            None => Err(ReaderError::new(
                ReaderErrorKind::ExpectedChar(expected),
                Span::empty(self.cursor),
            )),
        }
    }

    /// Consume characters while `pred` holds and return them.
    pub fn read_while(&mut self, mut pred: impl FnMut(char) -> bool) -> &'a str {
        let start = self.byte;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.skip();
        }
        &self.text[start..self.byte]
    }

    /// Skip spaces and tabs.
    pub fn skip_whitespace(&mut self) {
        self.read_while(char::is_whitespace);
    }

    /// Unread text from the cursor to the end of the line.
    pub fn remaining(&self) -> &'a str {
        &self.text[self.byte..]
    }

    /// Text between two character offsets.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        let start = byte_of(self.text, start.min(self.len));
        let end = byte_of(self.text, end.min(self.len)).max(start);
        &self.text[start..end]
    }

    /// Character offset where the word under the cursor ends (next space or
    /// end of line).
    pub fn word_end(&self) -> usize {
        self.cursor + self.remaining().chars().take_while(|&c| c != ' ').count()
    }

    // ── Brigadier primitives ────────────────────────────────────────────

    /// Read `[0-9A-Za-z_\-.+]*`.
    pub fn read_unquoted_string(&mut self) -> &'a str {
        self.read_while(is_allowed_in_unquoted)
    }

    /// Read a `"` or `'` delimited string, resolving `\\` and `\<quote>`.
    pub fn read_quoted_string(&mut self) -> Result<String, ReaderError> {
        let start = self.cursor;
        let quote = match self.peek() {
            Some(c) if is_quote(c) => c,
            Some(_) => {
                return Err(ReaderError::new(
                    ReaderErrorKind::ExpectedStartOfQuote,
                    Span::new(start, start + 1),
                ));
            }
            None => {
                return Err(ReaderError::new(
                    ReaderErrorKind::ExpectedStartOfQuote,
                    Span::empty(start),
                ));
            }
        };
        self.skip();
        let mut out = String::new();
        let mut escaped = false;
        while let Some(c) = self.peek() {
            if escaped {
                if c == quote || c == '\\' {
                    out.push(c);
                    escaped = false;
                } else {
                    let at = self.cursor - 1;
                    self.set_cursor(at);
                    return Err(ReaderError::new(
                        ReaderErrorKind::InvalidEscape(c),
                        Span::new(at, at + 2),
                    ));
                }
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                self.skip();
                return Ok(out);
            } else {
                out.push(c);
            }
            self.skip();
        }
        Err(ReaderError::new(
            ReaderErrorKind::UnterminatedQuote,
            Span::new(start, self.cursor),
        ))
    }

    /// Read a quoted string if one starts here, otherwise an unquoted one.
    pub fn read_string(&mut self) -> Result<String, ReaderError> {
        match self.peek() {
            Some(c) if is_quote(c) => self.read_quoted_string(),
            _ => Ok(self.read_unquoted_string().to_string()),
        }
    }

    fn read_number_token(&mut self) -> (usize, &'a str) {
        let start = self.cursor;
        (start, self.read_while(is_allowed_number))
    }

    fn read_number<T: std::str::FromStr>(
        &mut self,
        missing: ReaderErrorKind,
        invalid: fn(String) -> ReaderErrorKind,
    ) -> Result<T, ReaderError> {
        let (start, token) = self.read_number_token();
        if token.is_empty() {
            return Err(ReaderError::new(missing, Span::empty(start)));
        }
        match token.parse::<T>() {
            Ok(v) => Ok(v),
            Err(_) => {
                let end = self.cursor;
                self.set_cursor(start);
                Err(ReaderError::new(
                    invalid(token.to_string()),
                    Span::new(start, end),
                ))
            }
        }
    }

    /// Read a 32-bit integer.
    pub fn read_int(&mut self) -> Result<i32, ReaderError> {
        self.read_number(ReaderErrorKind::ExpectedInt, ReaderErrorKind::InvalidInt)
    }

    /// Read a 64-bit integer.
    pub fn read_long(&mut self) -> Result<i64, ReaderError> {
        self.read_number(ReaderErrorKind::ExpectedInt, ReaderErrorKind::InvalidInt)
    }

    /// Read a 32-bit float.
    pub fn read_float(&mut self) -> Result<f32, ReaderError> {
        self.read_number(ReaderErrorKind::ExpectedFloat, ReaderErrorKind::InvalidFloat)
    }

    /// Read a 64-bit float.
    pub fn read_double(&mut self) -> Result<f64, ReaderError> {
        self.read_number(ReaderErrorKind::ExpectedFloat, ReaderErrorKind::InvalidFloat)
    }

    /// Read `true` or `false`.
    pub fn read_bool(&mut self) -> Result<bool, ReaderError> {
        let start = self.cursor;
        let token = self.read_unquoted_string();
        match token {
            "true" => Ok(true),
            "false" => Ok(false),
            "" => Err(ReaderError::new(
                ReaderErrorKind::ExpectedBool,
                Span::empty(start),
            )),
            other => {
                let end = self.cursor;
                self.set_cursor(start);
                Err(ReaderError::new(
                    ReaderErrorKind::InvalidBool(other.to_string()),
                    Span::new(start, end),
                ))
            }
        }
    }
}

fn byte_of(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map_or(text.len(), |(b, _)| b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_read_and_cursor_track_characters() {
        let mut r = StringReader::new("é b");
        assert_eq!(r.peek(), Some('é'));
        assert_eq!(r.read().unwrap(), 'é');
        assert_eq!(r.cursor(), 1);
        assert_eq!(r.remaining(), " b");
        r.set_cursor(2);
        assert_eq!(r.peek(), Some('b'));
        r.set_cursor(99);
        assert!(!r.can_read());
        assert_eq!(
            r.read().unwrap_err(),
            ReaderError::new(ReaderErrorKind::UnexpectedEnd, Span::empty(3))
        );
    }

    #[test]
    fn expect_reports_exact_span() {
        let mut r = StringReader::new("a=b");
        r.skip();
        assert!(r.expect('=').is_ok());
        let err = r.expect('=').unwrap_err();
        assert_eq!(err.kind, ReaderErrorKind::ExpectedChar('='));
        assert_eq!(err.span, Span::new(2, 3));
        assert_eq!(r.cursor(), 2);
    }

    #[test]
    fn quoted_strings_and_escapes() {
        let mut r = StringReader::new(r#""a \"b\" \\c" rest"#);
        assert_eq!(r.read_quoted_string().unwrap(), r#"a "b" \c"#);
        assert_eq!(r.remaining(), " rest");

        let mut r = StringReader::new(r#"'it\'s'"#);
        assert_eq!(r.read_string().unwrap(), "it's");

        let mut r = StringReader::new(r#""bad \n""#);
        let err = r.read_quoted_string().unwrap_err();
        assert_eq!(err.kind, ReaderErrorKind::InvalidEscape('n'));
        assert_eq!(err.span, Span::new(5, 7));

        let mut r = StringReader::new(r#""open"#);
        let err = r.read_quoted_string().unwrap_err();
        assert_eq!(err.kind, ReaderErrorKind::UnterminatedQuote);
        assert_eq!(err.span, Span::new(0, 5));
    }

    #[test]
    fn numbers() {
        let mut r = StringReader::new("-12 3.5 1.2.3");
        assert_eq!(r.read_int().unwrap(), -12);
        r.skip();
        assert_eq!(r.read_double().unwrap(), 3.5);
        r.skip();
        let err = r.read_float().unwrap_err();
        assert_eq!(err.kind, ReaderErrorKind::InvalidFloat("1.2.3".into()));
        assert_eq!(err.span, Span::new(8, 13));
        assert_eq!(r.cursor(), 8, "cursor resets to the token start");

        let mut r = StringReader::new("x");
        assert_eq!(r.read_long().unwrap_err().kind, ReaderErrorKind::ExpectedInt);
        let mut r = StringReader::new("99999999999");
        assert!(r.read_int().is_err());
        let mut r = StringReader::new("99999999999");
        assert_eq!(r.read_long().unwrap(), 99_999_999_999);
    }

    #[test]
    fn booleans() {
        let mut r = StringReader::new("true false maybe");
        assert!(r.read_bool().unwrap());
        r.skip();
        assert!(!r.read_bool().unwrap());
        r.skip();
        let err = r.read_bool().unwrap_err();
        assert_eq!(err.kind, ReaderErrorKind::InvalidBool("maybe".into()));
        assert_eq!(err.span, Span::new(11, 16));
    }

    #[test]
    fn slice_and_word_end() {
        let r = StringReader::new("say héllo world");
        assert_eq!(r.slice(4, 9), "héllo");
        assert_eq!(r.word_end(), 3);
        assert_eq!(r.slice(10, 99), "world");
    }

    #[test]
    fn reader_error_becomes_reported_command_error() {
        let err = ReaderError::new(ReaderErrorKind::ExpectedInt, Span::empty(4));
        let cmd: CommandError = err.into();
        assert!(cmd.is_reported());
        assert_eq!(cmd.diagnostic().id, codes::READER_EXPECTED_INT);
        assert_eq!(cmd.diagnostic().span, Some(Span::empty(4)));
    }
}
