//! Fuzz smoke tests for the dispatcher and the analyzer.
//!
//! Random and mutated lines go through the full pipeline to check that
//! nothing panics and that every span stays inside its line. A simple
//! deterministic PRNG keeps failures reproducible.

mod common;

use common::{analyzer, parse, parse_suggesting};
use mcfunction_toolchain_core::{Document, LineOutcome, Returned};

// ─── Simple deterministic PRNG (LCG) ────────────────────────────────────────

struct SimpleRng(u64);

impl SimpleRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range(&mut self, max: usize) -> usize {
        (self.next() as usize) % max
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.gen_range(items.len())]
    }
}

const SEEDS: &[&str] = &[
    "say hello world",
    "give @p minecraft:stone 12",
    "give @e[type=pig,limit=2,sort=nearest] stick",
    "data merge entity @s {Tags:[\"a\",'b'], Pos:[1d,2d,3d], x:{y:[I;1,2]}}",
    "execute as @a[nbt={OnGround:1b}] run function demo:tick",
    "function #demo:load",
    "time set day",
    "kill @e[type=!player]",
];

const ALPHABET: &[&str] = &[
    " ", "@", "[", "]", "{", "}", ":", ",", "=", "\"", "'", "#", "!", ";", "1", "b", "x", "é", "\\",
    ".", "-", "e",
];

fn mutate(rng: &mut SimpleRng, line: &str) -> String {
    let mut chars: Vec<String> = line.chars().map(String::from).collect();
    for _ in 0..=rng.gen_range(4) {
        let at = rng.gen_range(chars.len() + 1);
        match rng.gen_range(3) {
            0 => chars.insert(at, rng.pick(ALPHABET).to_string()),
            1 if at < chars.len() => {
                chars.remove(at);
            }
            _ => chars.truncate(at),
        }
    }
    chars.concat()
}

fn random_line(rng: &mut SimpleRng) -> String {
    (0..rng.gen_range(24))
        .map(|_| rng.pick(ALPHABET))
        .collect::<String>()
}

fn assert_bounded(outcome: &LineOutcome, line: &str) {
    let len = line.chars().count();
    let nodes = match outcome {
        Returned::Success { data, .. } | Returned::Failure { data, .. } => data,
    };
    for node in nodes {
        assert!(node.span.end <= len, "node {:?} past end of {line:?}", node.span);
    }
    for action in &outcome.extras().actions {
        assert!(action.span.end <= len, "action {:?} past end of {line:?}", action.span);
    }
    for error in &outcome.extras().errors {
        if let Some(span) = error.span() {
            assert!(span.end <= len, "error {span:?} past end of {line:?}");
        }
    }
}

#[test]
fn mutated_lines_never_panic() {
    let mut rng = SimpleRng::new(0x6d63_666e);
    for _ in 0..400 {
        let seed = rng.pick(SEEDS);
        let line = mutate(&mut rng, seed);
        assert_bounded(&parse(&line), &line);
        assert_bounded(&parse_suggesting(&line), &line);
    }
}

#[test]
fn random_lines_never_panic() {
    let mut rng = SimpleRng::new(42);
    for _ in 0..400 {
        let line = random_line(&mut rng);
        assert_bounded(&parse(&line), &line);
    }
}

#[test]
fn parsing_is_deterministic_under_mutation() {
    let mut rng = SimpleRng::new(7);
    for _ in 0..100 {
        let seed = rng.pick(SEEDS);
        let line = mutate(&mut rng, seed);
        assert_eq!(parse_suggesting(&line), parse_suggesting(&line), "{line:?}");
    }
}

#[test]
fn random_edits_through_the_analyzer() {
    let a = analyzer();
    let mut rng = SimpleRng::new(0xfeed);
    let mut doc = Document::from_text(&SEEDS.join("\n"));
    a.parse_all(&mut doc);
    for _ in 0..200 {
        let index = rng.gen_range(doc.line_count());
        let old = doc.line(index).unwrap().text().to_string();
        let text = mutate(&mut rng, &old);
        doc.set_line(index, text.clone()).unwrap();

        let status = a.parse_line(&mut doc, index).unwrap();
        assert_eq!(status.diagnostics_ready, text != old);
        let len = text.chars().count();
        for offset in [0, len / 2, len] {
            for s in a.suggestions_at(&mut doc, index, offset).unwrap() {
                assert!(s.start <= offset, "{text:?} @ {offset}: {s:?}");
            }
            let _ = a.hover_at(&mut doc, index, offset).unwrap();
        }
        let _ = a.format_ranges(&mut doc, index).unwrap();
    }
    // Whole-document passes agree with the per-line cache.
    let formatted = a.format_document(&mut doc);
    assert_eq!(formatted.split('\n').count(), doc.line_count());
    let _ = a.diagnostics(&mut doc);
}
