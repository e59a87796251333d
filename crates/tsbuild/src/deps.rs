//! Source files a build depends on
use crate::engine::CompilerEngine;
use crate::error::BuildResult;
use std::path::PathBuf;
use tsbuild_config::CompilerOptions;

/// Lists every source file of a program, for rebuilding when one changes
pub struct DependencyLister<E> {
    engine: E,
}

impl<E: CompilerEngine> DependencyLister<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// Entry points plus every file they reference, directly or not
    ///
    /// Nothing is compiled or written.
    pub fn list(
        &self,
        entry_points: &[PathBuf],
        options: &CompilerOptions,
    ) -> BuildResult<Vec<PathBuf>> {
        self.engine.program_files(entry_points, options)
    }
}
