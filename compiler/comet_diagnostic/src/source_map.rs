//! Registry of the source files seen during one compilation.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::span_utils::LineOffsetTable;

/// Index of a file in a [`SourceMap`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct FileId(u32);

impl FileId {
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file#{}", self.0)
    }
}

/// One registered file: its path, text and line table.
#[derive(Clone, Debug)]
pub struct SourceFile {
    path: PathBuf,
    text: Arc<str>,
    lines: LineOffsetTable,
}

impl SourceFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &Arc<str> {
        &self.text
    }

    /// 1-based (line, column) of a byte offset in this file.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        self.lines.offset_to_line_col(&self.text, offset)
    }
}

/// Append-only table of source files.
#[derive(Clone, Debug, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file and return its id.
    ///
    /// # Panics
    /// Panics if more than `u32::MAX` files are registered.
    pub fn add(&mut self, path: impl Into<PathBuf>, text: impl Into<Arc<str>>) -> FileId {
        let text = text.into();
        let id = FileId(
            u32::try_from(self.files.len())
                .unwrap_or_else(|_| panic!("source map exceeded u32::MAX files")),
        );
        self.files.push(SourceFile {
            path: path.into(),
            lines: LineOffsetTable::build(&text),
            text,
        });
        id
    }

    pub fn get(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.0 as usize)
    }

    /// Find an already registered file by path.
    pub fn find(&self, path: &Path) -> Option<FileId> {
        self.files
            .iter()
            .position(|file| file.path == path)
            .and_then(|idx| u32::try_from(idx).ok())
            .map(FileId)
    }

    /// Render `path:line:col` for a location, or just the path when the
    /// file is unknown to this map.
    pub fn describe(&self, id: FileId, offset: u32) -> String {
        match self.get(id) {
            Some(file) => {
                let (line, col) = file.line_col(offset);
                format!("{}:{line}:{col}", file.path.display())
            }
            None => id.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
