//! tsbuild Configuration System
//!
//! Resolves the compiler options a TypeScript build runs with:
//! - Project configuration (tsconfig.json, JSON with comments)
//! - `extends` chains, relative and through `node_modules`
//! - Option validation and normalization
//! - Root file expansion from `files`, `include` and `exclude`
//! - A built-in default option set when no config file exists
//!
//! # Precedence
//!
//! The working directory always wins over the config file's own `rootDir`.
//! The override is silent unless a [`Logger`] is supplied, in which case a
//! warning is logged whenever the two differ.
//!
//! # Example
//!
//! ```no_run
//! use tsbuild_config::ConfigResolver;
//! use std::path::Path;
//!
//! let options = ConfigResolver::new().resolve(Path::new(".")).unwrap();
//! println!("rootDir: {:?}", options.root_dir());
//! ```

pub mod files;
pub mod jsonc;
pub mod loader;
pub mod options;
pub mod schema;

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {error}")]
    Io {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("Failed to parse {file} ({line},{column}): {message}")]
    Parse {
        file: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Invalid configuration in {file}:\n{}", format_diagnostics(.errors))]
    Validation {
        file: PathBuf,
        errors: Vec<ConfigDiagnostic>,
    },
}

impl ConfigError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            error,
        }
    }

    /// Validation errors carried by this error, empty for other kinds
    pub fn diagnostics(&self) -> &[ConfigDiagnostic] {
        match self {
            Self::Validation { errors, .. } => errors,
            _ => &[],
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// One problem found while expanding a config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDiagnostic {
    /// Config file the problem was found in
    pub file: PathBuf,
    /// Option or top-level field the problem concerns
    pub field: Option<String>,
    /// Human-readable message
    pub message: String,
}

impl ConfigDiagnostic {
    pub fn new(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            field: None,
            message: message.into(),
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl fmt::Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.message)
    }
}

fn format_diagnostics(errors: &[ConfigDiagnostic]) -> String {
    errors
        .iter()
        .map(|e| format!("  {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Receiver for informational messages from the build
///
/// Passed in by the caller; when absent nothing is logged.
pub trait Logger {
    fn log(&self, message: &str);
}

impl<F> Logger for F
where
    F: Fn(&str),
{
    fn log(&self, message: &str) {
        self(message)
    }
}

/// Logger that writes every message to stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, message: &str) {
        eprintln!("{}", message);
    }
}

// Re-export main types
pub use loader::{parse_config_file, resolve, ConfigResolver, ParsedConfig, DEFAULT_CONFIG_FILE};
pub use options::{default_compiler_options, normalize_path, CompilerOptions};
pub use schema::{OptionDecl, OptionKind};
