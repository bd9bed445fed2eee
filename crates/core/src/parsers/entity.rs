use super::nbt::parse_nbt;
use super::resource::read_resource_location;
use super::{NodeParser, ParseOutcome, ParserInfo};
use crate::context::{ContextChange, EntityInfo};
use crate::errors::CommandError;
use crate::reader::StringReader;
use crate::result::{ReturnHelper, Returned};
use crate::suggestion::{Suggestion, SuggestionKind, matching};
use mcfunction_toolchain_diagnostics::{Span, codes};

const PLAYER: &str = "minecraft:player";
const ENTITY_TYPE_REGISTRY: &str = "minecraft:entity_type";
const SELECTORS: [&str; 5] = ["@a", "@e", "@p", "@r", "@s"];
const OPTIONS: [&str; 21] = [
    "advancements",
    "distance",
    "dx",
    "dy",
    "dz",
    "gamemode",
    "level",
    "limit",
    "name",
    "nbt",
    "predicate",
    "scores",
    "sort",
    "tag",
    "team",
    "type",
    "x",
    "x_rotation",
    "y",
    "y_rotation",
    "z",
];
const SORTS: [&str; 4] = ["arbitrary", "furthest", "nearest", "random"];

/// `minecraft:entity`: a selector (`@p @a @r @s @e` with `[key=value,...]`
/// options) or a player name.
///
/// Narrows the entity type where it can and stores the result as
/// `other_entity`, or as `executor` when the node's `context` property is
/// `"executor"` (as on `execute as <targets>`).
#[derive(Debug)]
pub struct EntityParser;

impl NodeParser for EntityParser {
    fn parse(&self, reader: &mut StringReader<'_>, info: &ParserInfo<'_>) -> ParseOutcome {
        let mut helper = ReturnHelper::new();
        let parsed = if reader.peek() == Some('@') {
            parse_selector(reader, info, &mut helper)
        } else {
            parse_player_name(reader, info, &mut helper)
        };
        let Ok(entity) = parsed else {
            return helper.fail(());
        };
        let change = if info.str_property("context") == Some("executor") {
            ContextChange {
                executor: Some(entity),
                ..Default::default()
            }
        } else {
            ContextChange {
                other_entity: Some(entity),
                ..Default::default()
            }
        };
        helper.succeed(Some(change))
    }

    fn suggestion_kind(&self) -> SuggestionKind {
        SuggestionKind::Variable
    }
}

fn parse_player_name(
    reader: &mut StringReader<'_>,
    info: &ParserInfo<'_>,
    helper: &mut ReturnHelper,
) -> Result<EntityInfo, ()> {
    let start = reader.cursor();
    let name = reader.read_while(|c| c != ' ');
    if info.should_suggest(reader) {
        helper.add_suggestions(matching(name, start, SELECTORS));
    }
    if name.is_empty() {
        helper.add_error(CommandError::reported(
            codes::INVALID_SELECTOR,
            "expected a selector or player name",
            Span::empty(start),
        ));
        return Err(());
    }
    let valid = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        helper.add_error(
            CommandError::reported(
                codes::INVALID_SELECTOR,
                format!("'{name}' is not a valid player name"),
                Span::new(start, reader.cursor()),
            )
            .with_context(ctx! { "name" => name }),
        );
        return Err(());
    }
    Ok(EntityInfo::of([PLAYER]))
}

fn parse_selector(
    reader: &mut StringReader<'_>,
    info: &ParserInfo<'_>,
    helper: &mut ReturnHelper,
) -> Result<EntityInfo, ()> {
    let start = reader.cursor();
    reader.skip();
    let variable = reader.peek();
    if variable.is_some() {
        reader.skip();
    }
    if info.should_suggest(reader) {
        let typed = reader.slice(start, reader.cursor());
        helper.add_suggestions(matching(typed, start, SELECTORS));
    }
    let mut entity = match variable {
        Some('p' | 'a' | 'r') => EntityInfo::of([PLAYER]),
        Some('e') => EntityInfo::any(),
        Some('s') => info.context.executor.clone().unwrap_or_default(),
        _ => {
            helper.add_error(CommandError::reported(
                codes::INVALID_SELECTOR,
                "expected one of @a, @e, @p, @r or @s",
                Span::new(start, reader.cursor()),
            ));
            return Err(());
        }
    };
    if reader.peek() != Some('[') {
        if info.should_suggest(reader) {
            helper.add_suggestion(
                Suggestion::new(format!("{}[", reader.slice(start, reader.cursor())), start)
                    .with_kind(SuggestionKind::Variable),
            );
        }
        return Ok(entity);
    }
    reader.skip();
    reader.skip_whitespace();
    if reader.peek() == Some(']') {
        reader.skip();
        return Ok(entity);
    }
    loop {
        reader.skip_whitespace();
        let key_start = reader.cursor();
        let key = reader.read_unquoted_string();
        if info.should_suggest(reader) {
            helper.add_suggestions(
                matching(key, key_start, OPTIONS)
                    .into_iter()
                    .map(|s| s.into_suggestion(key_start, SuggestionKind::Property)),
            );
        }
        let key_span = Span::new(key_start, reader.cursor());
        if key.is_empty() {
            helper.add_error(CommandError::reported(
                codes::INVALID_SELECTOR,
                "expected a selector option",
                Span::empty(key_start),
            ));
            return Err(());
        }
        if !OPTIONS.contains(&key) {
            helper.add_error(
                CommandError::reported(
                    codes::UNKNOWN_SELECTOR_OPTION,
                    format!("unknown selector option '{key}'"),
                    key_span,
                )
                .with_context(ctx! { "option" => key }),
            );
            return Err(());
        }
        reader.skip_whitespace();
        if let Err(e) = reader.expect('=') {
            helper.add_error(e);
            return Err(());
        }
        reader.skip_whitespace();
        if let Some(narrowed) = parse_option_value(key, reader, info, helper)? {
            entity = narrowed;
        }
        reader.skip_whitespace();
        match reader.peek() {
            Some(',') => reader.skip(),
            Some(']') => {
                reader.skip();
                return Ok(entity);
            }
            _ => {
                if let Err(e) = reader.expect(']') {
                    helper.add_error(e);
                }
                return Err(());
            }
        }
    }
}

/// Parse the value of one selector option. Returns a narrowed entity when
/// the option constrains the type.
fn parse_option_value(
    key: &str,
    reader: &mut StringReader<'_>,
    info: &ParserInfo<'_>,
    helper: &mut ReturnHelper,
) -> Result<Option<EntityInfo>, ()> {
    let negated = matches!(
        key,
        "type" | "name" | "tag" | "team" | "gamemode" | "nbt" | "predicate"
    ) && reader.peek() == Some('!');
    if negated {
        reader.skip();
    }
    match key {
        "type" => {
            let tag = reader.peek() == Some('#');
            if tag {
                reader.skip();
            }
            let (id, span) = read_resource_location(reader).map_err(|e| {
                helper.add_error(e);
            })?;
            if !tag && info.data.registry_contains(ENTITY_TYPE_REGISTRY, &id) == Some(false) {
                helper.add_error(
                    CommandError::reported(
                        codes::UNKNOWN_REGISTRY_ENTRY,
                        format!("unknown entity type '{id}'"),
                        span,
                    )
                    .with_context(ctx! { "registry" => ENTITY_TYPE_REGISTRY, "id" => id.as_str() }),
                );
            }
            Ok((!negated && !tag).then(|| EntityInfo::of([id])))
        }
        "nbt" => {
            let doc = parse_nbt(reader, info.limits.max_nbt_depth, true);
            match doc {
                Returned::Success { extras, .. } => {
                    helper.merge_extras(extras);
                    Ok(None)
                }
                Returned::Failure { extras, .. } => {
                    helper.merge_extras(extras);
                    Err(())
                }
            }
        }
        "limit" => reader.read_int().map(|_| None).map_err(|e| {
            helper.add_error(e);
        }),
        "x" | "y" | "z" | "dx" | "dy" | "dz" => reader.read_double().map(|_| None).map_err(|e| {
            helper.add_error(e);
        }),
        "distance" | "level" | "x_rotation" | "y_rotation" => {
            let start = reader.cursor();
            let range = reader.read_while(|c| c.is_ascii_digit() || c == '.' || c == '-');
            if range.is_empty() || range == ".." {
                helper.add_error(CommandError::reported(
                    codes::INVALID_SELECTOR,
                    "expected a number or range",
                    Span::new(start, reader.word_end()),
                ));
                return Err(());
            }
            Ok(None)
        }
        "sort" => {
            let start = reader.cursor();
            let value = reader.read_unquoted_string();
            if info.should_suggest(reader) {
                helper.add_suggestions(matching(value, start, SORTS));
            }
            if !SORTS.contains(&value) {
                helper.add_error(CommandError::reported(
                    codes::INVALID_SELECTOR,
                    format!("invalid sort '{value}'"),
                    Span::new(start, reader.cursor()),
                ));
                return Err(());
            }
            Ok(None)
        }
        "scores" | "advancements" => read_braced(reader, helper).map(|()| None),
        _ => reader.read_string().map(|_| None).map_err(|e| {
            helper.add_error(e);
        }),
    }
}

/// Skip a balanced `{...}` block.
fn read_braced(reader: &mut StringReader<'_>, helper: &mut ReturnHelper) -> Result<(), ()> {
    let start = reader.cursor();
    if let Err(e) = reader.expect('{') {
        helper.add_error(e);
        return Err(());
    }
    let mut depth = 1usize;
    while let Some(c) = reader.peek() {
        reader.skip();
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            _ => {}
        }
    }
    helper.add_error(CommandError::reported(
        codes::READER_EXPECTED_CHAR,
        "expected '}'",
        Span::new(start, reader.cursor()),
    ));
    Err(())
}
