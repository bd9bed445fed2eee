//! Node parsers.
//!
//! Every child of the command tree is parsed by exactly one [`NodeParser`],
//! picked from the closed [`ParserKind`] enumeration by the node's kind and
//! parser id. A parser consumes only its own characters, reports an error
//! when text is present but invalid, leaves the cursor where it failed, and
//! offers suggestions only when the cursor sits at the end of the readable
//! text in suggesting mode.

use crate::context::{CommandContext, ContextChange};
use crate::reader::StringReader;
use crate::result::Returned;
use crate::suggestion::SuggestionKind;
use mcfunction_toolchain_command_data::{CommandData, CommandNode, NodeKind, TreePath};
use mcfunction_toolchain_config::Limits;
use serde_json::Value;
use thiserror::Error;

/// Boolean, number and string parsers.
pub mod brigadier;
/// Entity selectors and player names.
pub mod entity;
/// Literal keywords.
pub mod literal;
/// Structured data (SNBT).
pub mod nbt;
/// Resource locations and function references.
pub mod resource;

/// Result of one node parse: an optional context change on success.
pub type ParseOutcome = Returned<Option<ContextChange>>;

/// Everything a parser may consult besides the reader.
#[derive(Debug, Clone, Copy)]
pub struct ParserInfo<'a> {
    /// Context entering this step.
    pub context: &'a CommandContext,
    /// Command data for lookups.
    pub data: &'a CommandData,
    /// The node's parser properties.
    pub properties: Option<&'a serde_json::Map<String, Value>>,
    /// Path of the node being parsed.
    pub path: &'a TreePath,
    /// Name of the node (the keyword for literals).
    pub node_name: &'a str,
    /// Whether suggestions are wanted.
    pub suggesting: bool,
    /// Engine limits.
    pub limits: &'a Limits,
}

impl ParserInfo<'_> {
    /// Raw property value.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.and_then(|p| p.get(key))
    }

    /// String property value.
    pub fn str_property(&self, key: &str) -> Option<&str> {
        self.property(key).and_then(Value::as_str)
    }

    /// Whether suggestions should be produced at the reader's position.
    pub fn should_suggest(&self, reader: &StringReader<'_>) -> bool {
        self.suggesting && !reader.can_read()
    }
}

/// Parser for one kind of node.
pub trait NodeParser: Sync {
    /// Parse this node's text starting at the reader's cursor.
    fn parse(&self, reader: &mut StringReader<'_>, info: &ParserInfo<'_>) -> ParseOutcome;

    /// Kind given to suggestions that don't set one.
    fn suggestion_kind(&self) -> SuggestionKind {
        SuggestionKind::Value
    }
}

/// Numeric argument flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    /// `brigadier:integer`
    Integer,
    /// `brigadier:long`
    Long,
    /// `brigadier:float`
    Float,
    /// `brigadier:double`
    Double,
}

/// The closed set of node kinds the engine can parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserKind {
    /// Literal keyword.
    Literal,
    /// `brigadier:bool`
    Bool,
    /// `brigadier:integer|long|float|double`
    Number(NumberKind),
    /// `brigadier:string`
    String,
    /// `minecraft:resource_location`
    ResourceLocation,
    /// `minecraft:function`
    Function,
    /// `minecraft:entity`
    Entity,
    /// `minecraft:nbt_compound_tag`
    NbtCompound,
    /// `minecraft:nbt_tag`
    NbtTag,
}

/// A node names a parser id outside [`ParserKind`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported argument parser `{0}`")]
pub struct UnsupportedParser(pub String);

static LITERAL: literal::LiteralParser = literal::LiteralParser;
static BOOL: brigadier::BoolParser = brigadier::BoolParser;
static INTEGER: brigadier::NumberParser = brigadier::NumberParser(NumberKind::Integer);
static LONG: brigadier::NumberParser = brigadier::NumberParser(NumberKind::Long);
static FLOAT: brigadier::NumberParser = brigadier::NumberParser(NumberKind::Float);
static DOUBLE: brigadier::NumberParser = brigadier::NumberParser(NumberKind::Double);
static STRING: brigadier::StringParser = brigadier::StringParser;
static RESOURCE_LOCATION: resource::ResourceLocationParser = resource::ResourceLocationParser;
static FUNCTION: resource::FunctionParser = resource::FunctionParser;
static ENTITY: entity::EntityParser = entity::EntityParser;
static NBT_COMPOUND: nbt::NbtArgumentParser = nbt::NbtArgumentParser { compound_only: true };
static NBT_TAG: nbt::NbtArgumentParser = nbt::NbtArgumentParser {
    compound_only: false,
};

impl ParserKind {
    /// Kind for an argument parser id.
    pub fn from_id(id: &str) -> Option<ParserKind> {
        Some(match id {
            "brigadier:bool" => ParserKind::Bool,
            "brigadier:integer" => ParserKind::Number(NumberKind::Integer),
            "brigadier:long" => ParserKind::Number(NumberKind::Long),
            "brigadier:float" => ParserKind::Number(NumberKind::Float),
            "brigadier:double" => ParserKind::Number(NumberKind::Double),
            "brigadier:string" => ParserKind::String,
            "minecraft:resource_location" => ParserKind::ResourceLocation,
            "minecraft:function" => ParserKind::Function,
            "minecraft:entity" => ParserKind::Entity,
            "minecraft:nbt_compound_tag" => ParserKind::NbtCompound,
            "minecraft:nbt_tag" => ParserKind::NbtTag,
            _ => return None,
        })
    }

    /// Kind for a tree node.
    pub fn for_node(node: &CommandNode) -> Result<ParserKind, UnsupportedParser> {
        match node.kind {
            NodeKind::Literal => Ok(ParserKind::Literal),
            NodeKind::Root => Err(UnsupportedParser("root".into())),
            NodeKind::Argument => {
                let id = node.parser.as_deref().unwrap_or_default();
                ParserKind::from_id(id).ok_or_else(|| UnsupportedParser(id.to_string()))
            }
        }
    }

    /// Parser id (`"literal"` for literals).
    pub fn id(self) -> &'static str {
        match self {
            ParserKind::Literal => "literal",
            ParserKind::Bool => "brigadier:bool",
            ParserKind::Number(NumberKind::Integer) => "brigadier:integer",
            ParserKind::Number(NumberKind::Long) => "brigadier:long",
            ParserKind::Number(NumberKind::Float) => "brigadier:float",
            ParserKind::Number(NumberKind::Double) => "brigadier:double",
            ParserKind::String => "brigadier:string",
            ParserKind::ResourceLocation => "minecraft:resource_location",
            ParserKind::Function => "minecraft:function",
            ParserKind::Entity => "minecraft:entity",
            ParserKind::NbtCompound => "minecraft:nbt_compound_tag",
            ParserKind::NbtTag => "minecraft:nbt_tag",
        }
    }

    /// The parser implementation.
    pub fn parser(self) -> &'static dyn NodeParser {
        match self {
            ParserKind::Literal => &LITERAL,
            ParserKind::Bool => &BOOL,
            ParserKind::Number(NumberKind::Integer) => &INTEGER,
            ParserKind::Number(NumberKind::Long) => &LONG,
            ParserKind::Number(NumberKind::Float) => &FLOAT,
            ParserKind::Number(NumberKind::Double) => &DOUBLE,
            ParserKind::String => &STRING,
            ParserKind::ResourceLocation => &RESOURCE_LOCATION,
            ParserKind::Function => &FUNCTION,
            ParserKind::Entity => &ENTITY,
            ParserKind::NbtCompound => &NBT_COMPOUND,
            ParserKind::NbtTag => &NBT_TAG,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use mcfunction_toolchain_command_data::GlobalData;
    use std::sync::LazyLock;

    pub(crate) static EMPTY_DATA: LazyLock<CommandData> =
        LazyLock::new(|| CommandData::new(GlobalData::with_commands(CommandNode::root()), None));
    pub(crate) static LIMITS: Limits = Limits {
        max_line_length: 1000,
        max_nbt_depth: 16,
    };
    pub(crate) static CONTEXT: CommandContext = CommandContext {
        executor: None,
        other_entity: None,
        nbt_type: None,
    };
    pub(crate) static ROOT: TreePath = TreePath::root();

    /// Run `parser` over `text` with the given properties.
    pub(crate) fn run(
        parser: &dyn NodeParser,
        text: &str,
        properties: Option<&serde_json::Map<String, Value>>,
        data: &CommandData,
        suggesting: bool,
    ) -> (ParseOutcome, usize) {
        let mut reader = StringReader::new(text);
        let info = ParserInfo {
            context: &CONTEXT,
            data,
            properties,
            path: &ROOT,
            node_name: "arg",
            suggesting,
            limits: &LIMITS,
        };
        let out = parser.parse(&mut reader, &info);
        (out, reader.cursor())
    }

    pub(crate) fn props(v: Value) -> serde_json::Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => serde_json::Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_kind() {
        for id in [
            "brigadier:bool",
            "brigadier:integer",
            "brigadier:long",
            "brigadier:float",
            "brigadier:double",
            "brigadier:string",
            "minecraft:resource_location",
            "minecraft:function",
            "minecraft:entity",
            "minecraft:nbt_compound_tag",
            "minecraft:nbt_tag",
        ] {
            assert_eq!(ParserKind::from_id(id).map(ParserKind::id), Some(id));
        }
        assert_eq!(ParserKind::from_id("minecraft:block_pos"), None);
    }

    #[test]
    fn unknown_parser_is_unsupported() {
        let node = CommandNode::argument("minecraft:vec3");
        assert_eq!(
            ParserKind::for_node(&node),
            Err(UnsupportedParser("minecraft:vec3".into()))
        );
        assert_eq!(ParserKind::for_node(&CommandNode::literal()), Ok(ParserKind::Literal));
    }
}
