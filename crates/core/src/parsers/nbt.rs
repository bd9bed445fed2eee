//! Structured data (SNBT) sub-parser.
//!
//! Parses compound, list, typed-array and primitive values into a typed
//! [`NbtNode`] tree whose spans are offsets into the command line. Nested
//! entries go through the same [`Returned`] protocol as command nodes, so
//! their errors and hovers land at their own offsets.

use super::{NodeParser, ParseOutcome, ParserInfo};
use crate::actions::SubAction;
use crate::context::ContextChange;
use crate::errors::CommandError;
use crate::reader::{StringReader, is_allowed_in_unquoted};
use crate::result::{ReturnHelper, Returned};
use crate::suggestion::SuggestionKind;
use mcfunction_toolchain_diagnostics::{Span, codes};
use serde::Serialize;
use std::fmt::{self, Write as _};

/// Type of a structured-data value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum NbtType {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    List,
    ByteArray,
    IntArray,
    LongArray,
    Compound,
}

impl fmt::Display for NbtType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NbtType::Byte => "byte",
            NbtType::Short => "short",
            NbtType::Int => "int",
            NbtType::Long => "long",
            NbtType::Float => "float",
            NbtType::Double => "double",
            NbtType::String => "string",
            NbtType::List => "list",
            NbtType::ByteArray => "byte array",
            NbtType::IntArray => "int array",
            NbtType::LongArray => "long array",
            NbtType::Compound => "compound",
        };
        f.write_str(name)
    }
}

/// One `key: value` entry of a compound.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NbtEntry {
    /// Key text (unquoted).
    pub key: String,
    /// Span of the key as written.
    pub key_span: Span,
    /// The value.
    pub value: NbtNode,
}

/// A structured-data value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum NbtValue {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    List(Vec<NbtNode>),
    ByteArray(Vec<i8>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    Compound(Vec<NbtEntry>),
}

/// A value together with the characters it was parsed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NbtNode {
    /// The value.
    pub value: NbtValue,
    /// Characters covered.
    pub span: Span,
}

impl NbtValue {
    /// The value's type.
    pub fn nbt_type(&self) -> NbtType {
        match self {
            NbtValue::Byte(_) => NbtType::Byte,
            NbtValue::Short(_) => NbtType::Short,
            NbtValue::Int(_) => NbtType::Int,
            NbtValue::Long(_) => NbtType::Long,
            NbtValue::Float(_) => NbtType::Float,
            NbtValue::Double(_) => NbtType::Double,
            NbtValue::String(_) => NbtType::String,
            NbtValue::List(_) => NbtType::List,
            NbtValue::ByteArray(_) => NbtType::ByteArray,
            NbtValue::IntArray(_) => NbtType::IntArray,
            NbtValue::LongArray(_) => NbtType::LongArray,
            NbtValue::Compound(_) => NbtType::Compound,
        }
    }

    /// Canonical SNBT rendering.
    pub fn to_snbt(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for NbtValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NbtValue::Byte(v) => write!(f, "{v}b"),
            NbtValue::Short(v) => write!(f, "{v}s"),
            NbtValue::Int(v) => write!(f, "{v}"),
            NbtValue::Long(v) => write!(f, "{v}L"),
            NbtValue::Float(v) => write!(f, "{v:?}f"),
            NbtValue::Double(v) => write!(f, "{v:?}d"),
            NbtValue::String(s) => write_quoted(f, s),
            NbtValue::List(items) => {
                f.write_char('[')?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, "{}", item.value)?;
                }
                f.write_char(']')
            }
            NbtValue::ByteArray(items) => write_array(f, 'B', items.iter().map(|v| format!("{v}b"))),
            NbtValue::IntArray(items) => write_array(f, 'I', items.iter().map(i32::to_string)),
            NbtValue::LongArray(items) => write_array(f, 'L', items.iter().map(|v| format!("{v}L"))),
            NbtValue::Compound(entries) => {
                f.write_char('{')?;
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    if !entry.key.is_empty() && entry.key.chars().all(is_allowed_in_unquoted) {
                        f.write_str(&entry.key)?;
                    } else {
                        write_quoted(f, &entry.key)?;
                    }
                    write!(f, ":{}", entry.value.value)?;
                }
                f.write_char('}')
            }
        }
    }
}

fn write_array(
    f: &mut fmt::Formatter<'_>,
    prefix: char,
    items: impl Iterator<Item = String>,
) -> fmt::Result {
    write!(f, "[{prefix};")?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_char(',')?;
        }
        f.write_str(&item)?;
    }
    f.write_char(']')
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    let quote = if s.contains('"') && !s.contains('\'') { '\'' } else { '"' };
    f.write_char(quote)?;
    for c in s.chars() {
        if c == quote || c == '\\' {
            f.write_char('\\')?;
        }
        f.write_char(c)?;
    }
    f.write_char(quote)
}

/// Parse a structured-data value at the cursor.
///
/// With `compound_only` the value must start with `{`. Nesting deeper than
/// `max_depth` fails with a reported error.
pub fn parse_nbt(
    reader: &mut StringReader<'_>,
    max_depth: usize,
    compound_only: bool,
) -> Returned<NbtNode> {
    if compound_only && reader.peek() != Some('{') {
        let start = reader.cursor();
        return ReturnHelper::new().fail_with(CommandError::reported(
            codes::NBT_EXPECTED_COMPOUND,
            "expected a compound value '{...}'",
            Span::new(start, reader.word_end().max(start)),
        ));
    }
    let mut parser = SnbtParser { reader, max_depth };
    parser.value(1)
}

struct SnbtParser<'r, 'a> {
    reader: &'r mut StringReader<'a>,
    max_depth: usize,
}

impl SnbtParser<'_, '_> {
    fn value(&mut self, depth: usize) -> Returned<NbtNode> {
        let start = self.reader.cursor();
        if depth > self.max_depth {
            return ReturnHelper::new().fail_with(
                CommandError::reported(
                    codes::NBT_TOO_DEEP,
                    format!("data is nested deeper than {} levels", self.max_depth),
                    Span::empty(start),
                )
                .with_context(ctx! { "max_depth" => self.max_depth.to_string() }),
            );
        }
        match self.reader.peek() {
            Some('{') => self.compound(depth),
            Some('[') => match (self.reader.peek_at(1), self.reader.peek_at(2)) {
                (Some('B' | 'I' | 'L'), Some(';')) => self.array(),
                _ => self.list(depth),
            },
            Some('"' | '\'') => match self.reader.read_quoted_string() {
                Ok(s) => Returned::success(NbtNode {
                    value: NbtValue::String(s),
                    span: Span::new(start, self.reader.cursor()),
                }),
                Err(e) => ReturnHelper::new().fail_with(e),
            },
            _ => {
                let token = self.reader.read_unquoted_string();
                if token.is_empty() {
                    return ReturnHelper::new().fail_with(CommandError::reported(
                        codes::NBT_EXPECTED_VALUE,
                        "expected a value",
                        Span::empty(start),
                    ));
                }
                Returned::success(NbtNode {
                    value: classify(token),
                    span: Span::new(start, self.reader.cursor()),
                })
            }
        }
    }

    /// After an element: `,` continues, `close` ends. Returns `Ok(true)` on
    /// the closing bracket.
    fn separator(&mut self, close: char) -> Result<bool, CommandError> {
        self.reader.skip_whitespace();
        match self.reader.peek() {
            Some(',') => {
                self.reader.skip();
                self.reader.skip_whitespace();
                Ok(false)
            }
            Some(c) if c == close => {
                self.reader.skip();
                Ok(true)
            }
            _ => match self.reader.expect(close) {
                Ok(()) => Ok(true),
                Err(e) => Err(e.into()),
            },
        }
    }

    fn compound(&mut self, depth: usize) -> Returned<NbtNode> {
        let start = self.reader.cursor();
        let mut helper = ReturnHelper::new();
        self.reader.skip();
        self.reader.skip_whitespace();
        let mut entries: Vec<NbtEntry> = Vec::new();
        if self.reader.peek() == Some('}') {
            self.reader.skip();
        } else {
            loop {
                let key_start = self.reader.cursor();
                let key = match self.reader.peek() {
                    Some('"' | '\'') => match self.reader.read_quoted_string() {
                        Ok(k) => k,
                        Err(e) => return helper.fail_with(e),
                    },
                    _ => self.reader.read_unquoted_string().to_string(),
                };
                let key_span = Span::new(key_start, self.reader.cursor());
                if key_span.is_empty() {
                    return helper.fail_with(CommandError::reported(
                        codes::NBT_EXPECTED_KEY,
                        "expected a key",
                        Span::empty(key_start),
                    ));
                }
                self.reader.skip_whitespace();
                if let Err(e) = self.reader.expect(':') {
                    return helper.fail_with(e);
                }
                self.reader.skip_whitespace();
                let Ok(value) = helper.merge(self.value(depth + 1)) else {
                    return helper.fail(());
                };
                helper.add_action(SubAction::hover(
                    key_span,
                    format!("`{key}`: {}", value.value.nbt_type()),
                ));
                if entries.iter().any(|e| e.key == key) {
                    helper.add_error(
                        CommandError::reported(
                            codes::NBT_DUPLICATE_KEY,
                            format!("duplicate key '{key}'"),
                            key_span,
                        )
                        .with_context(ctx! { "key" => key.as_str() }),
                    );
                } else {
                    entries.push(NbtEntry {
                        key,
                        key_span,
                        value,
                    });
                }
                match self.separator('}') {
                    Ok(true) => break,
                    Ok(false) => {}
                    Err(e) => return helper.fail_with(e),
                }
            }
        }
        helper.succeed(NbtNode {
            value: NbtValue::Compound(entries),
            span: Span::new(start, self.reader.cursor()),
        })
    }

    fn list(&mut self, depth: usize) -> Returned<NbtNode> {
        let start = self.reader.cursor();
        let mut helper = ReturnHelper::new();
        self.reader.skip();
        self.reader.skip_whitespace();
        let mut items: Vec<NbtNode> = Vec::new();
        if self.reader.peek() == Some(']') {
            self.reader.skip();
        } else {
            loop {
                let Ok(item) = helper.merge(self.value(depth + 1)) else {
                    return helper.fail(());
                };
                if let Some(first) = items.first()
                    && first.value.nbt_type() != item.value.nbt_type()
                {
                    helper.add_error(
                        CommandError::reported(
                            codes::NBT_MIXED_LIST,
                            format!(
                                "list of {} cannot contain a {}",
                                first.value.nbt_type(),
                                item.value.nbt_type()
                            ),
                            item.span,
                        )
                        .with_context(ctx! {
                            "expected" => first.value.nbt_type().to_string(),
                            "found" => item.value.nbt_type().to_string(),
                        }),
                    );
                }
                items.push(item);
                match self.separator(']') {
                    Ok(true) => break,
                    Ok(false) => {}
                    Err(e) => return helper.fail_with(e),
                }
            }
        }
        helper.succeed(NbtNode {
            value: NbtValue::List(items),
            span: Span::new(start, self.reader.cursor()),
        })
    }

    fn array(&mut self) -> Returned<NbtNode> {
        let start = self.reader.cursor();
        let helper = ReturnHelper::new();
        self.reader.skip();
        let prefix = self.reader.peek();
        self.reader.skip();
        self.reader.skip();
        self.reader.skip_whitespace();
        let (mut bytes, mut ints, mut longs) = (Vec::new(), Vec::new(), Vec::new());
        if self.reader.peek() == Some(']') {
            self.reader.skip();
        } else {
            loop {
                let el_start = self.reader.cursor();
                let token = self.reader.read_unquoted_string();
                let span = Span::new(el_start, self.reader.cursor());
                if token.is_empty() {
                    return helper.fail_with(CommandError::reported(
                        codes::NBT_EXPECTED_VALUE,
                        "expected an array element",
                        span,
                    ));
                }
                let ok = match (prefix, classify(token)) {
                    (Some('B'), NbtValue::Byte(v)) => {
                        bytes.push(v);
                        true
                    }
                    (Some('I'), NbtValue::Int(v)) => {
                        ints.push(v);
                        true
                    }
                    (Some('L'), NbtValue::Long(v)) => {
                        longs.push(v);
                        true
                    }
                    _ => false,
                };
                if !ok {
                    let kind = match prefix {
                        Some('B') => NbtType::ByteArray,
                        Some('I') => NbtType::IntArray,
                        _ => NbtType::LongArray,
                    };
                    return helper.fail_with(
                        CommandError::reported(
                            codes::NBT_INVALID_ARRAY,
                            format!("'{token}' is not a valid {kind} element"),
                            span,
                        )
                        .with_context(ctx! { "array" => kind.to_string(), "element" => token }),
                    );
                }
                match self.separator(']') {
                    Ok(true) => break,
                    Ok(false) => {}
                    Err(e) => return helper.fail_with(e),
                }
            }
        }
        let value = match prefix {
            Some('B') => NbtValue::ByteArray(bytes),
            Some('I') => NbtValue::IntArray(ints),
            _ => NbtValue::LongArray(longs),
        };
        helper.succeed(NbtNode {
            value,
            span: Span::new(start, self.reader.cursor()),
        })
    }
}

fn is_numeric_body(body: &str) -> bool {
    body.chars().any(|c| c.is_ascii_digit())
        && body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
}

fn finite_double(body: &str) -> Option<NbtValue> {
    body.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(NbtValue::Double)
}

/// Type an unquoted token: suffixed or plain numbers, booleans, else a string.
/// Numbers that overflow their type fall back to strings.
fn classify(token: &str) -> NbtValue {
    match token {
        "true" => return NbtValue::Byte(1),
        "false" => return NbtValue::Byte(0),
        _ => {}
    }
    let fallback = || NbtValue::String(token.to_string());
    let Some(last) = token.chars().last() else {
        return fallback();
    };
    let body = &token[..token.len() - last.len_utf8()];
    let integral = |b: &str| {
        b.chars().enumerate().all(|(i, c)| {
            c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))
        }) && b.chars().any(|c| c.is_ascii_digit())
    };
    let parsed = match last.to_ascii_lowercase() {
        'b' if integral(body) => body.parse().ok().map(NbtValue::Byte),
        's' if integral(body) => body.parse().ok().map(NbtValue::Short),
        'l' if integral(body) => body.parse().ok().map(NbtValue::Long),
        'f' if is_numeric_body(body) => body
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .map(NbtValue::Float),
        'd' if is_numeric_body(body) => finite_double(body),
        _ if integral(token) => token.parse().ok().map(NbtValue::Int),
        _ if is_numeric_body(token) => finite_double(token),
        _ => None,
    };
    parsed.unwrap_or_else(fallback)
}

/// `minecraft:nbt_compound_tag` (`compound_only`) and `minecraft:nbt_tag`.
///
/// On success emits the parsed document over the whole value, key hovers,
/// a format span when the canonical rendering differs from the source, and
/// a context change recording the root type.
#[derive(Debug)]
pub struct NbtArgumentParser {
    /// Whether the root must be a compound.
    pub compound_only: bool,
}

impl NodeParser for NbtArgumentParser {
    fn parse(&self, reader: &mut StringReader<'_>, info: &ParserInfo<'_>) -> ParseOutcome {
        let mut helper = ReturnHelper::new();
        let parsed = parse_nbt(reader, info.limits.max_nbt_depth, self.compound_only);
        let Ok(doc) = helper.merge(parsed) else {
            return helper.fail(());
        };
        // Values with reported errors (duplicate keys) are never reformatted.
        let canonical = doc.value.to_snbt();
        if !helper.has_reported_errors()
            && reader.slice(doc.span.start, doc.span.end) != canonical
        {
            helper.add_action(SubAction::format(doc.span, canonical));
        }
        let nbt_type = doc.value.nbt_type();
        helper.add_action(SubAction::nbt(doc.span, doc));
        helper.succeed(Some(ContextChange {
            nbt_type: Some(nbt_type),
            ..Default::default()
        }))
    }

    fn suggestion_kind(&self) -> SuggestionKind {
        SuggestionKind::Field
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{ActionData, ActionKind};
    use crate::parsers::test_support::{EMPTY_DATA, run};

    fn parse(text: &str) -> Returned<NbtNode> {
        let mut r = StringReader::new(text);
        parse_nbt(&mut r, 16, false)
    }

    fn value(text: &str) -> NbtValue {
        match parse(text) {
            Returned::Success { data, .. } => data.value,
            Returned::Failure { extras, .. } => panic!("{text}: {:?}", extras.errors),
        }
    }

    #[test]
    fn primitives_by_suffix() {
        assert_eq!(value("1b"), NbtValue::Byte(1));
        assert_eq!(value("-2s"), NbtValue::Short(-2));
        assert_eq!(value("3"), NbtValue::Int(3));
        assert_eq!(value("4L"), NbtValue::Long(4));
        assert_eq!(value("1.5f"), NbtValue::Float(1.5));
        assert_eq!(value("2.5"), NbtValue::Double(2.5));
        assert_eq!(value("3d"), NbtValue::Double(3.0));
        assert_eq!(value("true"), NbtValue::Byte(1));
        assert_eq!(value("hello"), NbtValue::String("hello".into()));
        assert_eq!(value("300b"), NbtValue::String("300b".into()));
        assert_eq!(value("'q\"s'"), NbtValue::String("q\"s".into()));
    }

    #[test]
    fn non_finite_numbers_stay_strings() {
        assert_eq!(value("1e39f"), NbtValue::String("1e39f".into()));
        assert_eq!(value("1e400d"), NbtValue::String("1e400d".into()));
        assert_eq!(value("1e400"), NbtValue::String("1e400".into()));
        assert_eq!(value("3.4e38f"), NbtValue::Float(3.4e38));
    }

    #[test]
    fn compound_spans_are_line_offsets() {
        let mut r = StringReader::new("x {a: 1, b: [I; 1, 2]}");
        r.set_cursor(2);
        let Returned::Success { data, extras } = parse_nbt(&mut r, 16, true) else {
            panic!("expected success");
        };
        assert_eq!(data.span, Span::new(2, 22));
        let NbtValue::Compound(entries) = &data.value else {
            panic!("expected compound");
        };
        assert_eq!(entries[0].key_span, Span::new(3, 4));
        assert_eq!(entries[1].value.value, NbtValue::IntArray(vec![1, 2]));
        let hovers: Vec<&SubAction> = extras
            .actions
            .iter()
            .filter(|a| a.kind() == ActionKind::Hover)
            .collect();
        assert_eq!(hovers.len(), 2);
        assert_eq!(hovers[1].data, ActionData::Hover("`b`: int array".into()));
    }

    #[test]
    fn semantic_errors_keep_success() {
        let out = parse("{a:1,a:2}");
        assert!(out.is_success());
        assert_eq!(out.extras().errors[0].diagnostic().id, codes::NBT_DUPLICATE_KEY);
        assert_eq!(out.extras().errors[0].span(), Some(Span::new(5, 6)));

        let out = parse("[1, \"x\"]");
        assert!(out.is_success());
        assert_eq!(out.extras().errors[0].diagnostic().id, codes::NBT_MIXED_LIST);
        assert_eq!(out.extras().errors[0].span(), Some(Span::new(4, 7)));
    }

    #[test]
    fn structural_errors_fail_at_their_offset() {
        for (text, code, at) in [
            ("{a:}", codes::NBT_EXPECTED_VALUE, 3),
            ("{:1}", codes::NBT_EXPECTED_KEY, 1),
            ("{a 1}", codes::READER_EXPECTED_CHAR, 3),
            ("[1 2]", codes::READER_EXPECTED_CHAR, 3),
            ("[B; 1b, 2]", codes::NBT_INVALID_ARRAY, 8),
            ("{a:{b:\"x}}", codes::READER_UNTERMINATED_QUOTE, 6),
        ] {
            let out = parse(text);
            assert!(out.is_failure(), "{text}");
            let err = &out.extras().errors[0];
            assert_eq!(err.diagnostic().id, code, "{text}");
            assert_eq!(err.span().map(|s| s.start), Some(at), "{text}");
        }
    }

    #[test]
    fn depth_limit() {
        let mut r = StringReader::new("{a:{b:{}}}");
        assert!(parse_nbt(&mut r, 3, false).is_success());
        let mut r = StringReader::new("{a:{b:{}}}");
        let out = parse_nbt(&mut r, 2, false);
        assert!(out.is_failure());
        assert_eq!(out.extras().errors[0].diagnostic().id, codes::NBT_TOO_DEEP);
    }

    #[test]
    fn canonical_rendering() {
        assert_eq!(value("{ a : 1b , 'b c': [ 1.0f ] }").to_snbt(), "{a:1b,\"b c\":[1.0f]}");
        assert_eq!(value("[L; 1l, 2L]").to_snbt(), "[L;1L,2L]");
        assert_eq!(value("\"it's\"").to_snbt(), "\"it's\"");
    }

    #[test]
    fn argument_parser_emits_doc_format_and_context() {
        let parser = NbtArgumentParser { compound_only: true };
        let (out, _) = run(&parser, "{a: 1}", None, &EMPTY_DATA, false);
        let Returned::Success { data, extras } = out else {
            panic!("expected success");
        };
        assert_eq!(data.and_then(|c| c.nbt_type), Some(NbtType::Compound));
        let kinds: Vec<ActionKind> = extras.actions.iter().map(SubAction::kind).collect();
        assert_eq!(kinds, vec![ActionKind::Hover, ActionKind::Format, ActionKind::Nbt]);
        assert_eq!(extras.actions[1].data, ActionData::Format("{a:1}".into()));

        let (out, _) = run(&parser, "{a:1}", None, &EMPTY_DATA, false);
        assert!(!out.extras().actions.iter().any(|a| a.kind() == ActionKind::Format));

        let (out, _) = run(&parser, "[1]", None, &EMPTY_DATA, false);
        assert!(out.is_failure());
        assert_eq!(out.extras().errors[0].diagnostic().id, codes::NBT_EXPECTED_COMPOUND);

        let any = NbtArgumentParser { compound_only: false };
        let (out, _) = run(&any, "[1]", None, &EMPTY_DATA, false);
        assert!(out.is_success());
    }
}
