//! End-to-end dispatch of whole lines against the fixture command tree.

mod common;

use common::{nodes, parse, parse_suggesting, reported_ids, suggestion_texts};
use mcfunction_toolchain_core::{
    ActionData, CommandContext, Config, Dispatcher, EntityInfo, NbtType, Span, SuggestResult,
    Suggestion, SuggestionKind, codes,
};

fn paths(outcome: &mcfunction_toolchain_core::LineOutcome) -> Vec<Vec<usize>> {
    nodes(outcome)
        .iter()
        .map(|n| n.path.indices().to_vec())
        .collect()
}

// ─── Core scenarios ─────────────────────────────────────────────────────────

#[test]
fn say_hello_spans() {
    let out = parse("say hello");
    assert!(out.is_success());
    let spans: Vec<Span> = nodes(&out).iter().map(|n| n.span).collect();
    assert_eq!(spans, vec![Span::new(0, 3), Span::new(4, 9)]);
}

#[test]
fn partial_keyword_suggests_it() {
    let out = parse_suggesting("sa");
    assert!(out.is_failure());
    let expected =
        SuggestResult::Full(Suggestion::new("say", 0).with_kind(SuggestionKind::Keyword));
    assert!(out.extras().suggestions.contains(&expected));
}

#[test]
fn empty_line_lists_every_root_literal() {
    let out = parse_suggesting("");
    assert_eq!(
        suggestion_texts(&out),
        vec!["say", "function", "give", "data", "execute", "kill", "time"]
    );
    assert_eq!(reported_ids(&out), vec![codes::EXPECTED_ALTERNATIVE]);
}

// ─── Arguments ──────────────────────────────────────────────────────────────

#[test]
fn number_out_of_range_fails_at_the_number() {
    let out = parse("give @p stone 65");
    assert!(out.is_failure());
    assert_eq!(reported_ids(&out), vec![codes::NUMBER_OUT_OF_RANGE]);
    let err = out.extras().reported_errors().next().and_then(|e| e.span());
    assert_eq!(err, Some(Span::new(14, 16)));
    // Spans recorded before the failure are kept.
    assert_eq!(nodes(&out).len(), 3);
}

#[test]
fn optional_trailing_argument() {
    assert!(parse("give @p stone").is_success());
    assert!(parse("give @p stone 64").is_success());
}

#[test]
fn unknown_registry_entry_is_reported_on_success() {
    let out = parse("give @p gold 1");
    assert!(out.is_success());
    assert_eq!(reported_ids(&out), vec![codes::UNKNOWN_REGISTRY_ENTRY]);
    let span = out.extras().reported_errors().next().and_then(|e| e.span());
    assert_eq!(span, Some(Span::new(8, 12)));
}

#[test]
fn function_references() {
    let out = parse("function demo:missing");
    assert!(out.is_success());
    assert_eq!(reported_ids(&out), vec![codes::UNKNOWN_FUNCTION]);

    let out = parse("function #demo:load");
    assert!(out.extras().errors.is_empty());
    let source = out
        .extras()
        .actions
        .iter()
        .find(|a| matches!(a.data, ActionData::Source(_)));
    assert_eq!(source.map(|a| a.span), Some(Span::new(9, 19)));
    assert_eq!(
        source.map(|a| &a.data),
        Some(&ActionData::Source("#demo:load".into()))
    );
}

#[test]
fn executable_literal_with_optional_argument() {
    assert!(parse("kill").is_success());
    assert!(parse("kill @e").is_success());
    let out = parse("kill @e extra");
    assert_eq!(reported_ids(&out), vec![codes::TRAILING_INPUT]);
    let span = out.extras().reported_errors().next().and_then(|e| e.span());
    assert_eq!(span, Some(Span::new(8, 13)));
}

// ─── Alternatives ───────────────────────────────────────────────────────────

#[test]
fn literal_sibling_beats_earlier_argument() {
    let out = parse("time set day");
    assert!(out.is_success());
    assert_eq!(paths(&out).last(), Some(&vec![6, 0, 1]));

    let out = parse("time set 5");
    assert!(out.is_success());
    assert_eq!(paths(&out).last(), Some(&vec![6, 0, 0]));

    let out = parse("time set dayx");
    assert!(out.is_failure());
    assert_eq!(reported_ids(&out), vec![codes::READER_EXPECTED_INT]);
}

#[test]
fn unknown_command_names_alternatives() {
    let out = parse("tellraw @a hi");
    assert_eq!(reported_ids(&out), vec![codes::EXPECTED_ALTERNATIVE]);
    let d = out
        .extras()
        .reported_errors()
        .next()
        .map(|e| e.diagnostic().clone());
    assert_eq!(d.as_ref().and_then(|d| d.span), Some(Span::new(0, 7)));
    assert!(d.is_some_and(|d| d.message.contains("say, function, give")));
}

// ─── Redirects and context ──────────────────────────────────────────────────

#[test]
fn execute_chain_redirects_and_carries_context() {
    let out = parse("execute as @e[type=pig] run kill @s");
    assert!(out.is_success(), "{:?}", out.extras().errors);
    assert_eq!(
        paths(&out),
        vec![
            vec![4],
            vec![4, 0],
            vec![4, 0, 0],
            vec![4, 1],
            vec![5],
            vec![5, 0],
        ]
    );
    let last = &nodes(&out)[5];
    let pig = Some(EntityInfo::of(["minecraft:pig"]));
    assert_eq!(last.context.executor, pig);
    assert_eq!(last.final_context.other_entity, pig);
    assert_eq!(nodes(&out)[0].context, CommandContext::default());
}

#[test]
fn caller_can_seed_the_context() {
    let seed = CommandContext {
        executor: Some(EntityInfo::of(["minecraft:cow"])),
        ..CommandContext::default()
    };
    let out = Dispatcher::new(&common::DATA, Config::default().limits).parse("kill @s", &seed);
    assert!(out.is_success());
    assert_eq!(
        nodes(&out)[1].final_context.other_entity,
        Some(EntityInfo::of(["minecraft:cow"]))
    );
}

#[test]
fn redirected_step_suggests_target_children() {
    let out = parse_suggesting("execute as @e ");
    assert_eq!(suggestion_texts(&out), vec!["as", "run"]);
    assert!(out.extras().suggestions.iter().all(|s| match s {
        SuggestResult::Full(s) => s.start == 14,
        SuggestResult::Text(_) => false,
    }));
}

#[test]
fn registry_suggestions_mid_line() {
    let out = parse_suggesting("give @p st");
    assert_eq!(suggestion_texts(&out), vec!["stick", "stone"]);
}

// ─── Structured data through the command line ──────────────────────────────

#[test]
fn nbt_argument_emits_doc_format_and_type() {
    let out = parse("data merge entity @e {a:1b, b:[1, 2]}");
    assert!(out.is_success(), "{:?}", out.extras().errors);
    let doc = out
        .extras()
        .actions
        .iter()
        .find(|a| matches!(a.data, ActionData::Nbt(_)));
    assert_eq!(doc.map(|a| a.span), Some(Span::new(21, 37)));
    let format = out
        .extras()
        .actions
        .iter()
        .find_map(|a| match &a.data {
            ActionData::Format(text) => Some(text.as_str()),
            _ => None,
        });
    assert_eq!(format, Some("{a:1b,b:[1,2]}"));
    let last = nodes(&out).last().map(|n| n.final_context.nbt_type);
    assert_eq!(last, Some(Some(NbtType::Compound)));
}

#[test]
fn nbt_errors_land_at_their_own_offset() {
    let out = parse("data merge entity @e {a:1,a:2}");
    assert!(out.is_success());
    assert_eq!(reported_ids(&out), vec![codes::NBT_DUPLICATE_KEY]);
    let span = out.extras().reported_errors().next().and_then(|e| e.span());
    assert_eq!(span, Some(Span::new(26, 27)));

    let out = parse("data merge entity @e {a:{b:}}");
    assert!(out.is_failure());
    assert_eq!(reported_ids(&out), vec![codes::NBT_EXPECTED_VALUE]);
    let span = out.extras().reported_errors().next().and_then(|e| e.span());
    assert_eq!(span.map(|s| s.start), Some(27));
}

#[test]
fn nbt_depth_follows_limits() {
    let mut limits = Config::default().limits;
    limits.max_nbt_depth = 2;
    let d = Dispatcher::new(&common::DATA, limits);
    let ctx = CommandContext::default();
    assert!(d.parse("data merge entity @e {a:{}}", &ctx).is_success());
    let out = d.parse("data merge entity @e {a:{b:{}}}", &ctx);
    assert_eq!(reported_ids(&out), vec![codes::NBT_TOO_DEEP]);
}

// ─── Properties ─────────────────────────────────────────────────────────────

#[test]
fn parsing_is_deterministic() {
    for line in [
        "execute as @e[type=pig] run kill @s",
        "give @p stone 65",
        "data merge entity @e {a:[1,2b]}",
        "tellraw",
    ] {
        assert_eq!(parse_suggesting(line), parse_suggesting(line), "{line}");
    }
}

#[test]
fn sibling_spans_of_one_kind_never_overlap() {
    for line in [
        "execute as @e[type=pig] run kill @s",
        "give @p stone 65",
        "give @e[type=cow,limit=1] diamond 3",
        "time set dayx",
    ] {
        let out = parse(line);
        let spans: Vec<Span> = nodes(&out).iter().map(|n| n.span).collect();
        for pair in spans.windows(2) {
            assert!(pair[0].end <= pair[1].start, "{line}: {spans:?}");
        }
    }
}
