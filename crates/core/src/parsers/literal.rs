use super::{NodeParser, ParseOutcome, ParserInfo};
use crate::errors::CommandError;
use crate::reader::StringReader;
use crate::result::ReturnHelper;
use crate::suggestion::{Suggestion, SuggestionKind};
use mcfunction_toolchain_diagnostics::{Span, codes};

/// Matches the node name exactly, followed by a space or the end of line.
///
/// A mismatch is always silent: another sibling may still accept the text.
#[derive(Debug)]
pub struct LiteralParser;

impl NodeParser for LiteralParser {
    fn parse(&self, reader: &mut StringReader<'_>, info: &ParserInfo<'_>) -> ParseOutcome {
        let start = reader.cursor();
        let word = reader.read_while(|c| c != ' ');
        let mut helper = ReturnHelper::new();
        if info.should_suggest(reader) && info.node_name.starts_with(word) {
            helper.add_suggestion(
                Suggestion::new(info.node_name, start).with_kind(SuggestionKind::Keyword),
            );
        }
        if word == info.node_name {
            return helper.succeed(None);
        }
        let end = reader.cursor();
        reader.set_cursor(start);
        helper.fail_with(CommandError::silent(
            codes::LITERAL_MISMATCH,
            format!("expected '{}'", info.node_name),
            Span::new(start, end),
        ))
    }

    fn suggestion_kind(&self) -> SuggestionKind {
        SuggestionKind::Keyword
    }
}
