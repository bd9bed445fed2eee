use super::{NodeParser, ParseOutcome, ParserInfo};
use crate::actions::SubAction;
use crate::errors::CommandError;
use crate::reader::StringReader;
use crate::result::ReturnHelper;
use crate::suggestion::{Suggestion, SuggestionKind};
use mcfunction_toolchain_diagnostics::{Span, codes};

/// Namespace assumed when an id omits one.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

fn is_resource_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':' | '/')
}

fn valid_namespace(ns: &str) -> bool {
    !ns.is_empty()
        && ns
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.'))
}

fn valid_path(path: &str) -> bool {
    !path.is_empty()
        && path.chars().all(|c| {
            c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.' | '/')
        })
}

/// Normalize an id to `namespace:path` form.
pub fn normalize(id: &str) -> String {
    if id.contains(':') {
        id.to_string()
    } else {
        format!("{DEFAULT_NAMESPACE}:{id}")
    }
}

/// Read a resource location at the cursor.
///
/// Returns the normalized id and the span of the raw text. A malformed id
/// is a reported error with the cursor left after the offending token.
pub fn read_resource_location(reader: &mut StringReader<'_>) -> Result<(String, Span), CommandError> {
    let start = reader.cursor();
    let raw = reader.read_while(is_resource_char);
    let span = Span::new(start, reader.cursor());
    if raw.is_empty() {
        return Err(CommandError::reported(
            codes::INVALID_RESOURCE_LOCATION,
            "expected a resource location",
            Span::new(start, reader.word_end()),
        ));
    }
    let (ns, path) = raw.split_once(':').unwrap_or((DEFAULT_NAMESPACE, raw));
    if !valid_namespace(ns) || !valid_path(path) {
        return Err(CommandError::reported(
            codes::INVALID_RESOURCE_LOCATION,
            format!("'{raw}' is not a valid resource location"),
            span,
        )
        .with_context(ctx! { "id" => raw }));
    }
    Ok((normalize(raw), span))
}

/// Candidates matching `typed`, accepting ids written without the default
/// namespace.
fn suggest_ids<'c>(
    helper: &mut ReturnHelper,
    typed: &str,
    start: usize,
    candidates: impl IntoIterator<Item = &'c str>,
    kind: SuggestionKind,
) {
    for id in candidates {
        let short = id.strip_prefix("minecraft:");
        if id.starts_with(typed) {
            helper.add_suggestion(Suggestion::new(id, start).with_kind(kind));
        } else if let Some(short) = short
            && short.starts_with(typed)
        {
            helper.add_suggestion(Suggestion::new(short, start).with_kind(kind));
        }
    }
}

/// `minecraft:resource_location` with an optional `registry` property.
///
/// Ids missing from a known registry are reported but the parse succeeds;
/// registries absent from the command data are not validated.
#[derive(Debug)]
pub struct ResourceLocationParser;

impl NodeParser for ResourceLocationParser {
    fn parse(&self, reader: &mut StringReader<'_>, info: &ParserInfo<'_>) -> ParseOutcome {
        let start = reader.cursor();
        let mut helper = ReturnHelper::new();
        let registry = info.str_property("registry");
        let result = read_resource_location(reader);
        if info.should_suggest(reader)
            && let Some(ids) = registry.and_then(|r| info.data.registry(r))
        {
            let typed = reader.slice(start, reader.cursor());
            suggest_ids(
                &mut helper,
                typed,
                start,
                ids.iter().map(String::as_str),
                SuggestionKind::Value,
            );
        }
        let (id, span) = match result {
            Ok(v) => v,
            Err(e) => return helper.fail_with(e),
        };
        if let Some(registry) = registry
            && info.data.registry_contains(registry, &id) == Some(false)
        {
            helper.add_error(
                CommandError::reported(
                    codes::UNKNOWN_REGISTRY_ENTRY,
                    format!("unknown {registry} entry '{id}'"),
                    span,
                )
                .with_context(ctx! { "registry" => registry, "id" => id.as_str() }),
            );
        }
        helper.succeed(None)
    }
}

/// `minecraft:function`: a function id or a `#tag`, checked against the
/// datapack functions when they are loaded. Emits a source span pointing at
/// the referenced function.
#[derive(Debug)]
pub struct FunctionParser;

impl NodeParser for FunctionParser {
    fn parse(&self, reader: &mut StringReader<'_>, info: &ParserInfo<'_>) -> ParseOutcome {
        let start = reader.cursor();
        let mut helper = ReturnHelper::new();
        let is_tag = reader.peek() == Some('#');
        if is_tag {
            reader.skip();
        }
        let result = read_resource_location(reader);
        if info.should_suggest(reader) {
            let typed = reader.slice(start, reader.cursor());
            let candidates = info.data.function_candidates();
            suggest_ids(
                &mut helper,
                typed,
                start,
                candidates.iter().map(String::as_str),
                SuggestionKind::Function,
            );
        }
        let (id, raw_span) = match result {
            Ok(v) => v,
            Err(e) => return helper.fail_with(e),
        };
        let span = Span::new(start, raw_span.end);
        let target = if is_tag { format!("#{id}") } else { id.clone() };
        if info.data.has_local() {
            let known = if is_tag {
                info.data.has_function_tag(&id)
            } else {
                info.data.has_function(&id)
            };
            if !known {
                helper.add_error(
                    CommandError::reported(
                        codes::UNKNOWN_FUNCTION,
                        format!("unknown function '{target}'"),
                        span,
                    )
                    .with_context(ctx! { "function" => target.as_str() }),
                );
            }
        }
        helper.add_action(SubAction::source(span, target));
        helper.succeed(None)
    }

    fn suggestion_kind(&self) -> SuggestionKind {
        SuggestionKind::Function
    }
}
