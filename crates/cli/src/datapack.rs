//! Local data of the datapack a file belongs to.
//!
//! Functions are the `.mcfunction` files under `data/<ns>/functions/`;
//! function tags are the JSON files under `data/<ns>/tags/functions/`
//! (singular directory names are accepted for both).

use std::fs;
use std::path::{Path, PathBuf};

use mcfunction_toolchain_core::{LocalData, function_id_for_path};
use serde_json::Value;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// The `data` directory of the datapack containing `file`, if any.
pub(crate) fn data_dir_for(file: &Path) -> Option<PathBuf> {
    function_id_for_path(file)?;
    file.ancestors()
        .skip(1)
        .find(|dir| {
            dir.file_name().is_some_and(|n| n == "data")
                && file
                    .strip_prefix(dir)
                    .ok()
                    .and_then(|rest| rest.iter().nth(1))
                    .is_some_and(|c| c == "functions" || c == "function")
        })
        .map(Path::to_path_buf)
}

/// Every function and function tag below `data_dir`.
pub(crate) fn scan(data_dir: &Path) -> LocalData {
    let mut local = LocalData::default();
    for entry in WalkDir::new(data_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let Ok(rel) = entry.path().strip_prefix(data_dir) else {
            continue;
        };
        let parts: Vec<&str> = rel.iter().filter_map(|c| c.to_str()).collect();
        match parts.as_slice() {
            [ns, "functions" | "function", rest @ ..] if !rest.is_empty() => {
                if let Some(id) = resource_id(ns, rest, ".mcfunction") {
                    local.functions.push(id);
                }
            }
            [ns, "tags", "functions" | "function", rest @ ..] if !rest.is_empty() => {
                let Some(id) = resource_id(ns, rest, ".json") else {
                    continue;
                };
                match tag_values(entry.path()) {
                    Some(values) => {
                        local.function_tags.insert(id, values);
                    }
                    None => warn!(path = %entry.path().display(), "unreadable function tag"),
                }
            }
            _ => {}
        }
    }
    debug!(
        dir = %data_dir.display(),
        functions = local.functions.len(),
        tags = local.function_tags.len(),
        "scanned datapack"
    );
    local
}

fn resource_id(namespace: &str, segments: &[&str], extension: &str) -> Option<String> {
    let (file, dirs) = segments.split_last()?;
    let stem = file.strip_suffix(extension).filter(|s| !s.is_empty())?;
    let mut path: Vec<&str> = dirs.to_vec();
    path.push(stem);
    Some(format!("{namespace}:{}", path.join("/")))
}

/// Members of a tag file: `{"values": ["ns:f", {"id": "ns:g"}, ...]}`.
fn tag_values(path: &Path) -> Option<Vec<String>> {
    let text = fs::read_to_string(path).ok()?;
    let json: Value = serde_json::from_str(&text).ok()?;
    let values = json.get("values")?.as_array()?;
    Some(
        values
            .iter()
            .filter_map(|v| match v {
                Value::String(id) => Some(id.clone()),
                Value::Object(entry) => entry.get("id")?.as_str().map(String::from),
                _ => None,
            })
            .collect(),
    )
}
