//! The compiler behind a build
//!
//! A [`CompilerEngine`] type checks and emits a program built from a set of
//! root files. Each call constructs its program from scratch.

use crate::error::BuildResult;
use std::fmt;
use std::path::{Path, PathBuf};
use tsbuild_config::CompilerOptions;

/// A compiler that can emit a program and enumerate its source files
pub trait CompilerEngine {
    /// Compile the program rooted at `root_names`
    ///
    /// Returns normally even when the program has errors; failures here mean
    /// the compiler itself could not run.
    fn emit(&self, root_names: &[PathBuf], options: &CompilerOptions) -> BuildResult<EngineOutput>;

    /// Every source file that is part of the program, roots included
    fn program_files(
        &self,
        root_names: &[PathBuf],
        options: &CompilerOptions,
    ) -> BuildResult<Vec<PathBuf>>;
}

impl<E: CompilerEngine + ?Sized> CompilerEngine for &E {
    fn emit(&self, root_names: &[PathBuf], options: &CompilerOptions) -> BuildResult<EngineOutput> {
        (**self).emit(root_names, options)
    }

    fn program_files(
        &self,
        root_names: &[PathBuf],
        options: &CompilerOptions,
    ) -> BuildResult<Vec<PathBuf>> {
        (**self).program_files(root_names, options)
    }
}

/// Everything one compile reported
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineOutput {
    /// Syntactic, semantic and option diagnostics found before emitting
    pub pre_emit_diagnostics: Vec<EngineDiagnostic>,
    pub emit: EmitOutput,
}

/// Result of the emit phase
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmitOutput {
    /// No output was written
    pub emit_skipped: bool,
    pub diagnostics: Vec<EngineDiagnostic>,
    pub emitted_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCategory {
    Error,
    Warning,
    Suggestion,
    Message,
}

impl DiagnosticCategory {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "error" => Some(Self::Error),
            "warning" => Some(Self::Warning),
            "suggestion" => Some(Self::Suggestion),
            "message" => Some(Self::Message),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Suggestion => "suggestion",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source file a diagnostic points into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// Message text with optional nested detail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageChain {
    pub text: String,
    pub next: Vec<MessageChain>,
}

impl MessageChain {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            next: Vec::new(),
        }
    }

    pub fn with_next(mut self, next: MessageChain) -> Self {
        self.next.push(next);
        self
    }

    /// Render the chain, each nesting level on its own line indented two
    /// spaces further than its parent
    pub fn flatten(&self) -> String {
        let mut out = String::new();
        self.flatten_into(&mut out, 0);
        out
    }

    fn flatten_into(&self, out: &mut String, depth: usize) {
        if depth > 0 {
            out.push('\n');
            out.push_str(&"  ".repeat(depth));
        }
        out.push_str(&self.text);
        for next in &self.next {
            next.flatten_into(out, depth + 1);
        }
    }
}

impl From<&str> for MessageChain {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for MessageChain {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// A diagnostic as reported by the compiler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineDiagnostic {
    pub file: Option<SourceFile>,
    /// Byte offset into `file.text`
    pub start: Option<usize>,
    pub code: Option<u32>,
    pub category: DiagnosticCategory,
    pub message: MessageChain,
}

impl EngineDiagnostic {
    /// A diagnostic with no location
    pub fn global(category: DiagnosticCategory, message: impl Into<MessageChain>) -> Self {
        Self {
            file: None,
            start: None,
            code: None,
            category,
            message: message.into(),
        }
    }

    /// A diagnostic at `start` within `file`
    pub fn located(
        file: SourceFile,
        start: usize,
        category: DiagnosticCategory,
        message: impl Into<MessageChain>,
    ) -> Self {
        Self {
            file: Some(file),
            start: Some(start),
            code: None,
            category,
            message: message.into(),
        }
    }

    pub fn with_code(mut self, code: u32) -> Self {
        self.code = Some(code);
        self
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file.as_ref().map(|f| f.path.as_path())
    }
}
