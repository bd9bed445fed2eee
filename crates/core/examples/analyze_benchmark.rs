//! Lightweight analysis benchmark harness for local baselines.
//!
//! Run from repository root:
//! `cargo run -p mcfunction_toolchain_core --example analyze_benchmark --release`
//!
//! Set `MCFN_DATA_JSON` to a command data file to benchmark against a real
//! command tree; otherwise a small built-in tree is used.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use mcfunction_toolchain_command_data::persist::load_data_file;
use mcfunction_toolchain_core::{
    Analyzer, CommandData, CommandNode, Config, Document, GlobalData,
};
use serde_json::json;

fn builtin_data() -> GlobalData {
    let entity = || CommandNode::argument("minecraft:entity");
    let commands = CommandNode::root()
        .with_child(
            "say",
            CommandNode::literal().with_child(
                "message",
                CommandNode::argument("brigadier:string")
                    .with_property("type", json!("greedy")),
            ),
        )
        .with_child(
            "give",
            CommandNode::literal().with_child(
                "targets",
                entity().with_child(
                    "item",
                    CommandNode::argument("minecraft:resource_location")
                        .with_executable(true)
                        .with_child(
                            "count",
                            CommandNode::argument("brigadier:integer")
                                .with_property("min", json!(1)),
                        ),
                ),
            ),
        )
        .with_child(
            "data",
            CommandNode::literal().with_child(
                "merge",
                CommandNode::literal().with_child(
                    "entity",
                    CommandNode::literal().with_child(
                        "target",
                        entity().with_child(
                            "nbt",
                            CommandNode::argument("minecraft:nbt_compound_tag"),
                        ),
                    ),
                ),
            ),
        )
        .with_child(
            "execute",
            CommandNode::literal()
                .with_child(
                    "as",
                    CommandNode::literal().with_child(
                        "targets",
                        entity()
                            .with_property("context", json!("executor"))
                            .with_redirect(["execute"]),
                    ),
                )
                .with_child(
                    "run",
                    CommandNode::literal().with_redirect(Vec::<String>::new()),
                ),
        );
    GlobalData::with_commands(commands)
}

fn load_data() -> Result<GlobalData, String> {
    match std::env::var("MCFN_DATA_JSON") {
        Ok(path) => load_data_file(Path::new(&path))
            .map_err(|e| format!("failed to load command data at '{path}': {e}")),
        Err(_) => Ok(builtin_data()),
    }
}

fn sample_text(lines: usize) -> String {
    let templates = [
        "say hello there",
        "give @p minecraft:stone 12",
        "execute as @e[type=minecraft:pig,limit=3] run say oink",
        "data merge entity @s {Tags:[\"a\",\"b\"], Motion:[0d,1d,0d], Owner:{id:[I;1,2,3,4]}}",
        "# comment",
    ];
    (0..lines)
        .map(|i| templates[i % templates.len()])
        .collect::<Vec<_>>()
        .join("\n")
}

fn per_iter(elapsed: Duration, iterations: usize) -> f64 {
    elapsed.as_secs_f64() * 1000.0 / iterations as f64
}

fn run_benchmark(label: &str, analyzer: &Analyzer, lines: usize, iterations: usize) {
    let text = sample_text(lines);

    let full_start = Instant::now();
    for _ in 0..iterations {
        let mut doc = Document::from_text(&text);
        analyzer.parse_all(&mut doc);
    }
    let full_elapsed = full_start.elapsed();

    let mut doc = Document::from_text(&text);
    analyzer.parse_all(&mut doc);
    let edit_start = Instant::now();
    for i in 0..iterations {
        let line = i % lines;
        let _ = doc.set_line(line, format!("give @p minecraft:stone {}", i % 64 + 1));
        let _ = analyzer.parse_line(&mut doc, line);
    }
    let edit_elapsed = edit_start.elapsed();

    let suggest_start = Instant::now();
    for i in 0..iterations {
        let _ = analyzer.suggestions_at(&mut doc, i % lines, 8);
    }
    let suggest_elapsed = suggest_start.elapsed();

    println!("Benchmark: {label}");
    println!("  lines: {lines}, input_chars: {}", text.chars().count());
    println!(
        "  parse_all: total={:?}, per_iter={:.3} ms",
        full_elapsed,
        per_iter(full_elapsed, iterations)
    );
    println!(
        "  edit+reparse line: total={:?}, per_iter={:.3} ms",
        edit_elapsed,
        per_iter(edit_elapsed, iterations)
    );
    println!(
        "  suggestions: total={:?}, per_iter={:.3} ms",
        suggest_elapsed,
        per_iter(suggest_elapsed, iterations)
    );
}

fn main() {
    let global = match load_data() {
        Ok(global) => global,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    let analyzer = Analyzer::new(Arc::new(CommandData::new(global, None)), Config::default());
    run_benchmark("small", &analyzer, 40, 200);
    run_benchmark("large", &analyzer, 2_000, 20);
}
