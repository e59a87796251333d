//! Shared fixtures for tsbuild integration tests
#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tsbuild::{
    BuildError, BuildResult, CompilerEngine, CompilerOptions, DiagnosticCategory, EmitOutput,
    EngineDiagnostic, EngineOutput, HandlerSpec, Handlers, SourceFile,
};

/// Create a project directory containing the given files
pub fn create_project(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (file_path, content) in files {
        write_file(dir.path(), file_path, content);
    }
    dir
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

pub fn handlers(entries: &[(&str, &str)]) -> Handlers {
    entries
        .iter()
        .map(|(name, handler)| (name.to_string(), HandlerSpec::new(*handler)))
        .collect()
}

pub fn paths(items: &[&str]) -> Vec<PathBuf> {
    items.iter().map(PathBuf::from).collect()
}

/// An error located in `file` at byte offset `start`
pub fn error_at(file: &str, text: &str, start: usize, message: &str) -> EngineDiagnostic {
    EngineDiagnostic::located(
        SourceFile::new(file, text),
        start,
        DiagnosticCategory::Error,
        message,
    )
}

/// Engine returning canned results and recording what it was asked
#[derive(Default)]
pub struct FakeEngine {
    pub output: EngineOutput,
    pub program_files: Vec<PathBuf>,
    pub fail_with: Option<String>,
    pub calls: RefCell<Vec<(Vec<PathBuf>, CompilerOptions)>>,
}

impl FakeEngine {
    pub fn emitting(files: &[&str]) -> Self {
        Self {
            output: EngineOutput {
                pre_emit_diagnostics: Vec::new(),
                emit: EmitOutput {
                    emit_skipped: false,
                    diagnostics: Vec::new(),
                    emitted_files: paths(files),
                },
            },
            ..Self::default()
        }
    }

    pub fn skipping(diagnostics: Vec<EngineDiagnostic>) -> Self {
        Self {
            output: EngineOutput {
                pre_emit_diagnostics: diagnostics,
                emit: EmitOutput {
                    emit_skipped: true,
                    diagnostics: Vec::new(),
                    emitted_files: Vec::new(),
                },
            },
            ..Self::default()
        }
    }

    pub fn listing(files: &[&str]) -> Self {
        Self {
            program_files: paths(files),
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    fn record(&self, root_names: &[PathBuf], options: &CompilerOptions) -> BuildResult<()> {
        self.calls
            .borrow_mut()
            .push((root_names.to_vec(), options.clone()));
        match &self.fail_with {
            Some(message) => Err(BuildError::Engine(message.clone())),
            None => Ok(()),
        }
    }
}

impl CompilerEngine for FakeEngine {
    fn emit(&self, root_names: &[PathBuf], options: &CompilerOptions) -> BuildResult<EngineOutput> {
        self.record(root_names, options)?;
        Ok(self.output.clone())
    }

    fn program_files(
        &self,
        root_names: &[PathBuf],
        options: &CompilerOptions,
    ) -> BuildResult<Vec<PathBuf>> {
        self.record(root_names, options)?;
        Ok(self.program_files.clone())
    }
}
