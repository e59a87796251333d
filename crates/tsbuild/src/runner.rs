//! Compilation runner
//!
//! Compiles a set of entry points as one program, prints the diagnostics the
//! compiler reported and hands back the JavaScript files it wrote.

use crate::diagnostics::Diagnostic;
use crate::engine::CompilerEngine;
use crate::error::{BuildError, BuildResult};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tsbuild_config::CompilerOptions;

/// Extension of compiled output files
pub const OUTPUT_EXTENSION: &str = "js";

/// Stands in for a path in errors writing the diagnostic stream
const OUTPUT_STREAM: &str = "<diagnostic output>";

/// Outcome of one compile
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmitResult {
    pub emit_skipped: bool,
    /// Every file the compiler wrote, maps and declarations included
    pub emitted_files: Vec<PathBuf>,
    /// Diagnostics that were printed, in print order
    pub diagnostics: Vec<Diagnostic>,
}

impl EmitResult {
    /// Emitted JavaScript files only
    pub fn output_files(&self) -> Vec<PathBuf> {
        self.emitted_files
            .iter()
            .filter(|path| is_output_file(path))
            .cloned()
            .collect()
    }
}

/// Runs whole-program compiles through a [`CompilerEngine`]
pub struct CompilationRunner<'a, E> {
    engine: E,
    output: Box<dyn Write + 'a>,
}

impl<'a, E: CompilerEngine> CompilationRunner<'a, E> {
    /// Create a runner that prints diagnostics to stdout
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            output: Box::new(io::stdout()),
        }
    }

    /// Print diagnostics to `output` instead of stdout
    pub fn with_output(mut self, output: impl Write + 'a) -> Self {
        self.output = Box::new(output);
        self
    }

    /// Compile `entry_points` and return the JavaScript files written
    ///
    /// Diagnostics are printed before the result is known. Fails with
    /// [`BuildError::CompilationFailed`] only when the compiler skipped
    /// emitting; type errors alone do not fail the run.
    pub fn run(
        &mut self,
        entry_points: &[PathBuf],
        options: &CompilerOptions,
    ) -> BuildResult<Vec<PathBuf>> {
        let result = self.run_with_result(entry_points, options)?;
        if result.emit_skipped {
            return Err(BuildError::CompilationFailed {
                diagnostics: result.diagnostics,
            });
        }
        Ok(result.output_files())
    }

    /// Compile `entry_points` and return everything the compile reported
    ///
    /// Unlike [`run`](Self::run) a skipped emit is not an error here.
    pub fn run_with_result(
        &mut self,
        entry_points: &[PathBuf],
        options: &CompilerOptions,
    ) -> BuildResult<EmitResult> {
        let mut options = options.clone();
        options.set_list_emitted_files(true);

        let output = self.engine.emit(entry_points, &options)?;

        let mut diagnostics = Vec::new();
        let all = output
            .pre_emit_diagnostics
            .iter()
            .chain(output.emit.diagnostics.iter());
        for engine_diagnostic in all {
            if let Some(diagnostic) = Diagnostic::from_engine(engine_diagnostic) {
                writeln!(self.output, "{}", diagnostic)
                    .map_err(|e| BuildError::io(OUTPUT_STREAM, e))?;
                diagnostics.push(diagnostic);
            }
        }
        self.output
            .flush()
            .map_err(|e| BuildError::io(OUTPUT_STREAM, e))?;

        Ok(EmitResult {
            emit_skipped: output.emit.emit_skipped,
            emitted_files: output.emit.emitted_files,
            diagnostics,
        })
    }
}

fn is_output_file(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(OUTPUT_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_output_file() {
        assert!(is_output_file(Path::new("dist/app.js")));
        assert!(!is_output_file(Path::new("dist/app.js.map")));
        assert!(!is_output_file(Path::new("dist/app.d.ts")));
        assert!(!is_output_file(Path::new("dist/app.mjs")));
        assert!(!is_output_file(Path::new("dist/js")));
    }
}
