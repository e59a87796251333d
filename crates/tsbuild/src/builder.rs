//! Build orchestration
//!
//! [`Builder`] runs the steps of a build in order: resolve compiler options,
//! resolve entry points, then compile them or list their sources.
use crate::deps::DependencyLister;
use crate::engine::CompilerEngine;
use crate::entry_points::resolve_entry_points;
use crate::error::BuildResult;
use crate::handler::Handlers;
use crate::runner::CompilationRunner;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tsbuild_config::{CompilerOptions, ConfigResolver, Logger, DEFAULT_CONFIG_FILE};

/// Build context - result of a successful build
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Options the program was compiled with
    pub options: CompilerOptions,
    /// Source files compiled, relative to the working directory
    pub entry_points: Vec<PathBuf>,
    /// JavaScript files written
    pub emitted: Vec<PathBuf>,
    /// Build statistics
    pub stats: BuildStats,
}

/// Build statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildStats {
    /// Number of entry points compiled
    pub entry_points: usize,
    /// Number of JavaScript files written
    pub emitted_files: usize,
    /// Time spent resolving options and entry points
    pub resolution_time: Duration,
    /// Time spent compiling
    pub compilation_time: Duration,
    /// Total build time
    pub total_time: Duration,
}

/// Main builder for orchestrating builds
pub struct Builder {
    /// Project directory, every relative path is resolved against it
    cwd: PathBuf,
    /// Deployment target, e.g. `aws` or `google`
    target: String,
    handlers: Option<Handlers>,
    config_file: String,
    logger: Option<Box<dyn Logger>>,
    verbose: bool,
}

impl Builder {
    /// Create a new builder for the project at the given path
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            target: String::new(),
            handlers: None,
            config_file: DEFAULT_CONFIG_FILE.to_string(),
            logger: None,
            verbose: false,
        }
    }

    /// Set the deployment target
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Set the functions to build
    pub fn with_handlers(mut self, handlers: Handlers) -> Self {
        self.handlers = Some(handlers);
        self
    }

    /// Read compiler options from a file other than tsconfig.json
    pub fn with_config_file(mut self, name: impl Into<String>) -> Self {
        self.config_file = name.into();
        self
    }

    /// Receive warnings and, when verbose, progress messages
    pub fn with_logger(mut self, logger: impl Logger + 'static) -> Self {
        self.logger = Some(Box::new(logger));
        self
    }

    /// Enable/disable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Compiler options for this project
    pub fn options(&self) -> BuildResult<CompilerOptions> {
        let mut resolver = ConfigResolver::new().with_config_file(self.config_file.as_str());
        if let Some(logger) = self.logger.as_deref() {
            resolver = resolver.with_logger(logger);
        }
        Ok(resolver.resolve(&self.cwd)?)
    }

    /// Source files the build starts from
    pub fn entry_points(&self) -> BuildResult<Vec<PathBuf>> {
        self.progress(&format!(
            "Resolving entry points for target '{}'",
            self.target
        ));
        resolve_entry_points(&self.cwd, &self.target, self.handlers.as_ref())
    }

    /// Execute the build
    pub fn build<E: CompilerEngine>(&self, engine: &E) -> BuildResult<BuildContext> {
        let build_start = Instant::now();

        let options = self.options()?;
        let entry_points = self.entry_points()?;
        let resolution_time = build_start.elapsed();

        self.progress(&format!(
            "Compiling {}",
            count(entry_points.len(), "entry point", "entry points")
        ));

        let compile_start = Instant::now();
        let emitted = CompilationRunner::new(engine).run(&entry_points, &options)?;
        let compilation_time = compile_start.elapsed();

        self.progress(&format!(
            "Emitted {} in {:.2}s",
            count(emitted.len(), "file", "files"),
            compilation_time.as_secs_f64()
        ));

        let stats = BuildStats {
            entry_points: entry_points.len(),
            emitted_files: emitted.len(),
            resolution_time,
            compilation_time,
            total_time: build_start.elapsed(),
        };

        Ok(BuildContext {
            options,
            entry_points,
            emitted,
            stats,
        })
    }

    /// Every source file the build reads, for rebuilding on change
    pub fn watch_files<E: CompilerEngine>(&self, engine: &E) -> BuildResult<Vec<PathBuf>> {
        let options = self.options()?;
        let entry_points = self.entry_points()?;
        DependencyLister::new(engine).list(&entry_points, &options)
    }

    fn progress(&self, message: &str) {
        if !self.verbose {
            return;
        }
        match self.logger.as_deref() {
            Some(logger) => logger.log(message),
            None => println!("{}", message),
        }
    }
}

fn count(n: usize, singular: &str, plural: &str) -> String {
    format!("{} {}", n, if n == 1 { singular } else { plural })
}
