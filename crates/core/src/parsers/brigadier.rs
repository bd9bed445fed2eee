use super::{NodeParser, NumberKind, ParseOutcome, ParserInfo};
use crate::errors::CommandError;
use crate::reader::StringReader;
use crate::result::ReturnHelper;
use crate::suggestion::{SuggestionKind, matching};
use mcfunction_toolchain_diagnostics::{Span, codes};
use serde_json::Value;

/// `brigadier:bool`
#[derive(Debug)]
pub struct BoolParser;

impl NodeParser for BoolParser {
    fn parse(&self, reader: &mut StringReader<'_>, info: &ParserInfo<'_>) -> ParseOutcome {
        let start = reader.cursor();
        let mut helper = ReturnHelper::new();
        let typed = reader.remaining();
        if info.suggesting && !typed.contains(' ') {
            helper.add_suggestions(matching(typed, start, ["false", "true"]));
        }
        match reader.read_bool() {
            Ok(_) => helper.succeed(None),
            Err(e) => helper.fail_with(e),
        }
    }

    fn suggestion_kind(&self) -> SuggestionKind {
        SuggestionKind::Constant
    }
}

/// A parsed numeric argument.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }

    fn below(self, bound: &Value) -> bool {
        match (self, bound.as_i64()) {
            (Number::Int(v), Some(b)) => v < b,
            _ => bound.as_f64().is_some_and(|b| self.as_f64() < b),
        }
    }

    fn above(self, bound: &Value) -> bool {
        match (self, bound.as_i64()) {
            (Number::Int(v), Some(b)) => v > b,
            _ => bound.as_f64().is_some_and(|b| self.as_f64() > b),
        }
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{v}"),
            Number::Float(v) => write!(f, "{v}"),
        }
    }
}

/// `brigadier:integer`, `brigadier:long`, `brigadier:float`, `brigadier:double`
/// with optional inclusive `min`/`max` properties.
#[derive(Debug)]
pub struct NumberParser(pub NumberKind);

impl NodeParser for NumberParser {
    fn parse(&self, reader: &mut StringReader<'_>, info: &ParserInfo<'_>) -> ParseOutcome {
        let start = reader.cursor();
        let helper = ReturnHelper::new();
        let read = match self.0 {
            NumberKind::Integer => reader.read_int().map(|v| Number::Int(v.into())),
            NumberKind::Long => reader.read_long().map(Number::Int),
            NumberKind::Float => reader.read_float().map(|v| Number::Float(v.into())),
            NumberKind::Double => reader.read_double().map(Number::Float),
        };
        let value = match read {
            Ok(v) => v,
            Err(e) => return helper.fail_with(e),
        };
        let span = Span::new(start, reader.cursor());
        if let Some(min) = info.property("min")
            && value.below(min)
        {
            return helper.fail_with(
                CommandError::reported(
                    codes::NUMBER_OUT_OF_RANGE,
                    format!("{value} is below the minimum of {min}"),
                    span,
                )
                .with_context(ctx! { "bound" => "min", "limit" => min.to_string() }),
            );
        }
        if let Some(max) = info.property("max")
            && value.above(max)
        {
            return helper.fail_with(
                CommandError::reported(
                    codes::NUMBER_OUT_OF_RANGE,
                    format!("{value} is above the maximum of {max}"),
                    span,
                )
                .with_context(ctx! { "bound" => "max", "limit" => max.to_string() }),
            );
        }
        helper.succeed(None)
    }
}

/// `brigadier:string` with `type` = `word` (default), `phrase` or `greedy`.
#[derive(Debug)]
pub struct StringParser;

impl NodeParser for StringParser {
    fn parse(&self, reader: &mut StringReader<'_>, info: &ParserInfo<'_>) -> ParseOutcome {
        let start = reader.cursor();
        let helper = ReturnHelper::new();
        let read = match info.str_property("type").unwrap_or("word") {
            "greedy" => {
                let rest = reader.remaining();
                reader.set_cursor(reader.total_len());
                Ok(rest.to_string())
            }
            "phrase" => reader.read_string(),
            _ => Ok(reader.read_unquoted_string().to_string()),
        };
        match read {
            Err(e) => helper.fail_with(e),
            Ok(s) if s.is_empty() && reader.cursor() == start => {
                helper.fail_with(CommandError::reported(
                    codes::EXPECTED_STRING,
                    "expected a string",
                    Span::new(start, reader.word_end()),
                ))
            }
            Ok(_) => helper.succeed(None),
        }
    }

    fn suggestion_kind(&self) -> SuggestionKind {
        SuggestionKind::Text
    }
}
