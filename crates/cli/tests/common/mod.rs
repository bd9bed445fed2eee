//! Shared fixtures for `mcfn` integration tests.

#![allow(unreachable_pub)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use assert_cmd::cargo;

/// Command data covering the commands exercised by the CLI tests.
pub static DATA_JSON: &str = r#"{
  "commands": {
    "type": "root",
    "children": {
      "say": {
        "type": "literal",
        "children": {
          "message": { "type": "argument", "parser": "brigadier:string", "properties": { "type": "greedy" } }
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
                  "count": { "type": "argument", "parser": "brigadier:integer", "properties": { "min": 1, "max": 64 } }
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
      }
    }
  },
  "registries": {
    "minecraft:item": ["minecraft:diamond", "minecraft:stick", "minecraft:stone"]
  },
  "meta_info": { "version": "1.20.4" }
}"#;

/// The `mcfn` binary.
pub fn mcfn() -> Command {
    Command::new(cargo::cargo_bin!("mcfn"))
}

/// A temporary workspace holding `data.json` and a datapack `pack/`.
pub struct Workspace {
    pub dir: tempfile::TempDir,
}

#[allow(dead_code)]
impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("data.json"), DATA_JSON).expect("write data.json");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn data(&self) -> String {
        self.path().join("data.json").to_string_lossy().to_string()
    }

    /// Write `content` to a function file of namespace `demo` in the pack.
    pub fn function(&self, name: &str, content: &str) -> String {
        let path = self
            .path()
            .join("pack/data/demo/functions")
            .join(format!("{name}.mcfunction"));
        self.write(&path, content)
    }

    /// Write `content` to a file outside any datapack.
    pub fn loose(&self, name: &str, content: &str) -> String {
        let path = self.path().join(name);
        self.write(&path, content)
    }

    fn write(&self, path: &PathBuf, content: &str) -> String {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create dirs");
        }
        fs::write(path, content).expect("write file");
        path.to_string_lossy().to_string()
    }
}

/// Parse stdout as JSON, failing with both streams on error.
#[allow(dead_code)]
pub fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap_or_else(|e| {
        panic!(
            "invalid json ({e}): stdout={stdout} stderr={}",
            String::from_utf8_lossy(&output.stderr)
        )
    })
}
