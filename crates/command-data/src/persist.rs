//! Durable mirror of [`GlobalData`].
//!
//! Each category (`commands`, `registries`, `meta_info`) is stored as its own
//! `<category>.json` file in a cache directory. Writes go through a temporary
//! file and a rename so a crash never leaves a half-written category behind.

use crate::{CommandNode, GlobalData, MetaInfo};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

const COMMANDS: &str = "commands";
const REGISTRIES: &str = "registries";
const META_INFO: &str = "meta_info";

/// Errors raised while reading or writing the persisted mirror.
#[derive(Debug, Error)]
pub enum CacheError {
    /// A filesystem operation failed.
    #[error("cache I/O on {path}: {source}")]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// A category file did not contain valid JSON for its type.
    #[error("invalid JSON in cache category `{category}`: {source}")]
    Json {
        /// Category name (file stem).
        category: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// The cache directory has no command tree.
    #[error("cache directory {0} contains no `{COMMANDS}.json`")]
    MissingCommands(PathBuf),
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> CacheError + '_ {
    move |source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn category_path(dir: &Path, category: &str) -> PathBuf {
    dir.join(format!("{category}.json"))
}

fn write_category<T: Serialize>(dir: &Path, category: &str, value: &T) -> Result<(), CacheError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| CacheError::Json {
        category: category.to_string(),
        source,
    })?;
    let final_path = category_path(dir, category);
    let tmp_path = dir.join(format!(".{category}.json.tmp"));
    fs::write(&tmp_path, json.as_bytes()).map_err(io_err(&tmp_path))?;
    fs::rename(&tmp_path, &final_path).map_err(io_err(&final_path))?;
    Ok(())
}

fn remove_category(dir: &Path, category: &str) -> Result<(), CacheError> {
    let path = category_path(dir, category);
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_err(&path)(e)),
    }
}

fn read_category<T: DeserializeOwned>(dir: &Path, category: &str) -> Result<Option<T>, CacheError> {
    let path = category_path(dir, category);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            tracing::warn!(category, path = %path.display(), error = %e, "unreadable cache category");
            return Err(io_err(&path)(e));
        }
    };
    serde_json::from_str(&text).map(Some).map_err(|source| {
        tracing::warn!(category, path = %path.display(), error = %source, "malformed cache category");
        CacheError::Json {
            category: category.to_string(),
            source,
        }
    })
}

/// Write every present category of `data` into `dir`.
///
/// The directory is created if needed. Files of absent categories are removed
/// so that [`read_cache`] reproduces `data` exactly.
pub fn write_cache(dir: &Path, data: &GlobalData) -> Result<(), CacheError> {
    fs::create_dir_all(dir).map_err(io_err(dir))?;
    write_category(dir, COMMANDS, &data.commands)?;
    match &data.registries {
        Some(r) => write_category(dir, REGISTRIES, r)?,
        None => remove_category(dir, REGISTRIES)?,
    }
    match &data.meta_info {
        Some(m) => write_category(dir, META_INFO, m)?,
        None => remove_category(dir, META_INFO)?,
    }
    tracing::debug!(dir = %dir.display(), "wrote command data cache");
    Ok(())
}

/// Read the categories in `dir` back into a [`GlobalData`].
pub fn read_cache(dir: &Path) -> Result<GlobalData, CacheError> {
    let commands: CommandNode = read_category(dir, COMMANDS)?
        .ok_or_else(|| CacheError::MissingCommands(dir.to_path_buf()))?;
    let registries: Option<BTreeMap<String, Vec<String>>> = read_category(dir, REGISTRIES)?;
    let meta_info: Option<MetaInfo> = read_category(dir, META_INFO)?;
    tracing::debug!(dir = %dir.display(), "read command data cache");
    Ok(GlobalData {
        commands,
        registries,
        meta_info,
    })
}

/// Load a single JSON document holding a whole [`GlobalData`].
pub fn load_data_file(path: &Path) -> Result<GlobalData, CacheError> {
    let text = fs::read_to_string(path).map_err(io_err(path))?;
    serde_json::from_str(&text).map_err(|source| CacheError::Json {
        category: path.display().to_string(),
        source,
    })
}
