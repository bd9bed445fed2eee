//! Shared test helpers for `mcfunction_toolchain_core` integration tests.

#![allow(unreachable_pub)]

use mcfunction_toolchain_core::{
    Analyzer, CommandContext, CommandData, CommandNode, Config, Dispatcher, GlobalData,
    LineOutcome, LocalData, ParseNode, Returned,
};
use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

/// Command tree covering every parser kind, built once per test binary.
pub static TREE_JSON: &str = r#"{
  "type": "root",
  "children": {
    "say": {
      "type": "literal",
      "children": {
        "message": {
          "type": "argument",
          "parser": "brigadier:string",
          "properties": { "type": "greedy" }
        }
      }
    },
    "function": {
      "type": "literal",
      "children": {
        "name": { "type": "argument", "parser": "minecraft:function" }
      }
    },
    "give": {
      "type": "literal",
      "children": {
        "targets": {
          "type": "argument",
          "parser": "minecraft:entity",
          "children": {
            "item": {
              "type": "argument",
              "parser": "minecraft:resource_location",
              "properties": { "registry": "minecraft:item" },
              "executable": true,
              "children": {
                "count": {
                  "type": "argument",
                  "parser": "brigadier:integer",
                  "properties": { "min": 1, "max": 64 }
                }
              }
            }
          }
        }
      }
    },
    "data": {
      "type": "literal",
      "children": {
        "merge": {
          "type": "literal",
          "children": {
            "entity": {
              "type": "literal",
              "children": {
                "target": {
                  "type": "argument",
                  "parser": "minecraft:entity",
                  "children": {
                    "nbt": { "type": "argument", "parser": "minecraft:nbt_compound_tag" }
                  }
                }
              }
            }
          }
        }
      }
    },
    "execute": {
      "type": "literal",
      "children": {
        "as": {
          "type": "literal",
          "children": {
            "targets": {
              "type": "argument",
              "parser": "minecraft:entity",
              "properties": { "context": "executor" },
              "redirect": ["execute"]
            }
          }
        },
        "run": { "type": "literal", "redirect": [] }
      }
    },
    "kill": {
      "type": "literal",
      "executable": true,
      "children": {
        "targets": { "type": "argument", "parser": "minecraft:entity" }
      }
    },
    "time": {
      "type": "literal",
      "children": {
        "set": {
          "type": "literal",
          "children": {
            "value": {
              "type": "argument",
              "parser": "brigadier:integer",
              "properties": { "min": 0 }
            },
            "day": { "type": "literal" }
          }
        }
      }
    }
  }
}"#;

/// Command data loaded once per test binary via LazyLock.
pub static DATA: LazyLock<Arc<CommandData>> = LazyLock::new(|| {
    let commands: CommandNode = serde_json::from_str(TREE_JSON)
        .unwrap_or_else(|e| panic!("failed to parse fixture tree: {e}"));
    let mut global = GlobalData::with_commands(commands);
    global.registries = Some(BTreeMap::from([
        (
            "minecraft:item".to_string(),
            ["minecraft:diamond", "minecraft:stick", "minecraft:stone"]
                .map(String::from)
                .to_vec(),
        ),
        (
            "minecraft:entity_type".to_string(),
            ["minecraft:cow", "minecraft:pig", "minecraft:player"]
                .map(String::from)
                .to_vec(),
        ),
    ]));
    let local = LocalData {
        functions: vec!["demo:init".into(), "demo:tick".into()],
        function_tags: BTreeMap::from([("demo:load".to_string(), vec!["demo:init".into()])]),
    };
    Arc::new(CommandData::new(global, Some(local)))
});

/// Analyzer over the fixture data with default settings.
#[allow(dead_code)]
pub fn analyzer() -> Analyzer {
    Analyzer::new(Arc::clone(&DATA), Config::default())
}

/// Analyzer over the fixture data with custom settings.
#[allow(dead_code)]
pub fn analyzer_with(config: Config) -> Analyzer {
    Analyzer::new(Arc::clone(&DATA), config)
}

/// Parse one line against the fixture tree from the default context.
#[allow(dead_code)]
pub fn parse(text: &str) -> LineOutcome {
    Dispatcher::new(&DATA, Config::default().limits).parse(text, &CommandContext::default())
}

/// Parse with suggestions enabled.
#[allow(dead_code)]
pub fn parse_suggesting(text: &str) -> LineOutcome {
    Dispatcher::new(&DATA, Config::default().limits)
        .suggesting(true)
        .parse(text, &CommandContext::default())
}

/// Parse-tree spans recorded on either outcome.
#[allow(dead_code)]
pub fn nodes(outcome: &LineOutcome) -> &[ParseNode] {
    match outcome {
        Returned::Success { data, .. } | Returned::Failure { data, .. } => data,
    }
}

/// Ids of the reported errors, in order.
#[allow(dead_code)]
pub fn reported_ids(outcome: &LineOutcome) -> Vec<String> {
    outcome
        .extras()
        .reported_errors()
        .map(|e| e.diagnostic().id.to_string())
        .collect()
}

/// Text of every suggestion, in order.
#[allow(dead_code)]
pub fn suggestion_texts(outcome: &LineOutcome) -> Vec<String> {
    outcome
        .extras()
        .suggestions
        .iter()
        .map(|s| s.text().to_string())
        .collect()
}
