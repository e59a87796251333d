//! Printable diagnostics
//!
//! Compiler diagnostics are reported as `"<file> (<line>,<col>): <message>"`,
//! one per line. Tools scrape this format, so it must not change.

use crate::engine::EngineDiagnostic;
use std::fmt;
use std::path::PathBuf;
use tsbuild_config::jsonc::offset_to_line_col;

/// A located compiler diagnostic, lines and columns 1-based
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl Diagnostic {
    /// Translate an engine diagnostic, `None` when it has no file or offset
    pub fn from_engine(diagnostic: &EngineDiagnostic) -> Option<Self> {
        let file = diagnostic.file.as_ref()?;
        let start = diagnostic.start?;
        let (line, column) = offset_to_line_col(&file.text, start);
        Some(Self {
            file: file.path.clone(),
            line,
            column,
            message: diagnostic.message.flatten(),
        })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({},{}): {}",
            self.file.display(),
            self.line,
            self.column,
            self.message
        )
    }
}

/// Convert a 1-based line and column into a byte offset within `text`
///
/// Positions past the end of a line or the text clamp to the nearest valid
/// offset.
pub fn line_col_to_offset(text: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    for _ in 1..line {
        match text[offset..].find('\n') {
            Some(newline) => offset += newline + 1,
            None => return text.len(),
        }
    }
    let line_end = text[offset..]
        .find('\n')
        .map(|end| offset + end)
        .unwrap_or(text.len());
    let mut chars = text[offset..line_end].char_indices();
    match chars.nth(column.saturating_sub(1)) {
        Some((index, _)) => offset + index,
        None => line_end,
    }
}
