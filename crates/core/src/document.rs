//! Documents: ordered lines plus where the file sits in a datapack.

use crate::actions::MiscInfo;
use crate::line::CommandLine;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Notice group for the datapack-location check.
pub const DATAPACK_GROUP: &str = "datapack";

/// Errors from addressing lines of a [`Document`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// The line index is past the end of the document.
    #[error("line {line} is out of range (document has {count} lines)")]
    LineOutOfRange {
        /// Requested line.
        line: usize,
        /// Number of lines in the document.
        count: usize,
    },
}

/// Function id of a file at `.../data/<namespace>/functions/<path>.mcfunction`
/// (`function/` is accepted too), e.g. `pack:util/reset`.
pub fn function_id_for_path(path: &Path) -> Option<String> {
    let parts: Vec<&str> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect();
    let (file, dirs) = parts.split_last()?;
    let stem = file.strip_suffix(".mcfunction")?;
    if stem.is_empty() {
        return None;
    }
    let data = (0..dirs.len().saturating_sub(2)).rev().find(|&i| {
        dirs[i] == "data" && matches!(dirs[i + 2], "functions" | "function")
    })?;
    let namespace = dirs[data + 1];
    let mut segments: Vec<&str> = dirs[data + 3..].to_vec();
    segments.push(stem);
    Some(format!("{namespace}:{}", segments.join("/")))
}

/// Split text into lines on `\n`, dropping a trailing `\r` from each.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// An open function file.
#[derive(Debug, Default)]
pub struct Document {
    path: Option<PathBuf>,
    function_id: Option<String>,
    lines: Vec<CommandLine>,
}

impl Document {
    /// Document for `text`, optionally located at `path`.
    pub fn new(path: Option<PathBuf>, text: &str) -> Self {
        let function_id = path.as_deref().and_then(function_id_for_path);
        Self {
            path,
            function_id,
            lines: split_lines(text).map(CommandLine::new).collect(),
        }
    }

    /// In-memory document with no file location.
    pub fn from_text(text: &str) -> Self {
        Self::new(None, text)
    }

    /// File location, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The document's own function id when it sits inside a datapack.
    pub fn function_id(&self) -> Option<&str> {
        self.function_id.as_deref()
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// All lines.
    pub fn lines(&self) -> &[CommandLine] {
        &self.lines
    }

    pub(crate) fn lines_mut(&mut self) -> &mut [CommandLine] {
        &mut self.lines
    }

    fn out_of_range(&self, line: usize) -> DocumentError {
        DocumentError::LineOutOfRange {
            line,
            count: self.lines.len(),
        }
    }

    /// Line `line`.
    pub fn line(&self, line: usize) -> Result<&CommandLine, DocumentError> {
        self.lines.get(line).ok_or_else(|| self.out_of_range(line))
    }

    /// Mutable line `line`.
    pub fn line_mut(&mut self, line: usize) -> Result<&mut CommandLine, DocumentError> {
        let count = self.lines.len();
        self.lines
            .get_mut(line)
            .ok_or(DocumentError::LineOutOfRange { line, count })
    }

    /// Replace the text of one line, invalidating it.
    pub fn set_line(&mut self, line: usize, text: impl Into<String>) -> Result<(), DocumentError> {
        self.line_mut(line)?.set_text(text);
        Ok(())
    }

    /// Insert a new line before index `line` (`line == line_count()` appends).
    pub fn insert_line(&mut self, line: usize, text: impl Into<String>) -> Result<(), DocumentError> {
        if line > self.lines.len() {
            return Err(self.out_of_range(line));
        }
        self.lines.insert(line, CommandLine::new(text));
        Ok(())
    }

    /// Remove line `line` and return its text.
    pub fn remove_line(&mut self, line: usize) -> Result<String, DocumentError> {
        if line >= self.lines.len() {
            return Err(self.out_of_range(line));
        }
        Ok(self.lines.remove(line).text().to_string())
    }

    /// Replace the whole text. Lines whose text is unchanged at the same
    /// index keep their cache.
    pub fn set_text(&mut self, text: &str) {
        let mut count = 0;
        for (i, new) in split_lines(text).enumerate() {
            match self.lines.get_mut(i) {
                Some(line) => line.set_text(new),
                None => self.lines.push(CommandLine::new(new)),
            }
            count = i + 1;
        }
        self.lines.truncate(count);
    }

    /// Full text, lines joined with `\n`.
    pub fn text(&self) -> String {
        let lines: Vec<&str> = self.lines.iter().map(CommandLine::text).collect();
        lines.join("\n")
    }

    /// File-level notice for the datapack-location check: an error when the
    /// file is outside any datapack, otherwise a clear of that error. `None`
    /// for documents without a path.
    pub fn datapack_notice(&self) -> Option<MiscInfo> {
        let file_path = self.path.as_deref()?.display().to_string();
        Some(match self.function_id {
            Some(_) => MiscInfo::ClearError {
                file_path,
                group: Some(DATAPACK_GROUP.to_string()),
            },
            None => MiscInfo::FileError {
                file_path,
                group: DATAPACK_GROUP.to_string(),
                message: "file is not inside a datapack (expected .../data/<namespace>/functions/...)"
                    .to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_id_from_datapack_path() {
        let id = function_id_for_path(Path::new(
            "/world/datapacks/pack/data/demo/functions/util/reset.mcfunction",
        ));
        assert_eq!(id.as_deref(), Some("demo:util/reset"));
        let id = function_id_for_path(Path::new("data/demo/function/tick.mcfunction"));
        assert_eq!(id.as_deref(), Some("demo:tick"));
    }

    #[test]
    fn function_id_rejects_other_layouts() {
        assert!(function_id_for_path(Path::new("demo/functions/tick.mcfunction")).is_none());
        assert!(function_id_for_path(Path::new("data/demo/functions/tick.txt")).is_none());
        assert!(function_id_for_path(Path::new("data/demo/tags/tick.mcfunction")).is_none());
        assert!(function_id_for_path(Path::new("tick.mcfunction")).is_none());
    }

    #[test]
    fn lines_split_on_newlines() {
        let doc = Document::from_text("say a\r\n# note\n");
        let texts: Vec<&str> = doc.lines().iter().map(CommandLine::text).collect();
        assert_eq!(texts, vec!["say a", "# note", ""]);
        assert_eq!(doc.text(), "say a\n# note\n");
    }

    #[test]
    fn line_edits_and_ranges() {
        let mut doc = Document::from_text("a\nb");
        doc.insert_line(2, "c").unwrap();
        doc.set_line(0, "z").unwrap();
        assert_eq!(doc.remove_line(1).unwrap(), "b");
        assert_eq!(doc.text(), "z\nc");
        assert_eq!(
            doc.line(5).unwrap_err(),
            DocumentError::LineOutOfRange { line: 5, count: 2 }
        );
        assert!(doc.insert_line(4, "x").is_err());
    }

    #[test]
    fn set_text_truncates() {
        let mut doc = Document::from_text("a\nb\nc");
        doc.set_text("a\nx");
        assert_eq!(doc.line_count(), 2);
        assert_eq!(doc.text(), "a\nx");
    }

    #[test]
    fn datapack_notice_by_location() {
        let inside = Document::new(Some("data/p/functions/f.mcfunction".into()), "");
        assert!(matches!(inside.datapack_notice(), Some(MiscInfo::ClearError { .. })));
        assert_eq!(inside.function_id(), Some("p:f"));
        let outside = Document::new(Some("scratch/f.mcfunction".into()), "");
        let Some(MiscInfo::FileError { group, .. }) = outside.datapack_notice() else {
            panic!("expected a file error");
        };
        assert_eq!(group, DATAPACK_GROUP);
        assert!(Document::from_text("").datapack_notice().is_none());
    }
}
