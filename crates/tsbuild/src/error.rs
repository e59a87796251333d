/// Build system error types
use crate::diagnostics::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;
use tsbuild_config::ConfigError;

pub type BuildResult<T> = Result<T, BuildError>;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Entry point '{}' named by package.json does not exist", .path.display())]
    ManifestEntrypointMissing { path: PathBuf },

    #[error("Failed to parse manifest at {}: {error}", .path.display())]
    ManifestParse { path: PathBuf, error: String },

    #[error("Function '{name}': unable to determine the exported symbol of handler '{handler}'")]
    HandlerNameUnresolvable { name: String, handler: String },

    #[error(
        "Function '{name}': no source file for handler '{handler}' (tried {})",
        format_candidates(.candidates)
    )]
    HandlerFileMissing {
        name: String,
        handler: String,
        candidates: Vec<PathBuf>,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("TypeScript compilation failed ({} diagnostic(s))", .diagnostics.len())]
    CompilationFailed { diagnostics: Vec<Diagnostic> },

    #[error("Compiler error: {0}")]
    Engine(String),

    #[error("I/O error at {}: {error}", .path.display())]
    Io {
        path: PathBuf,
        error: std::io::Error,
    },
}

impl BuildError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            error,
        }
    }

    /// Create a manifest parse error
    pub fn manifest_parse(path: impl Into<PathBuf>, error: impl ToString) -> Self {
        Self::ManifestParse {
            path: path.into(),
            error: error.to_string(),
        }
    }

    /// Create an engine error
    pub fn engine(error: impl ToString) -> Self {
        Self::Engine(error.to_string())
    }

    pub fn handler_name_unresolvable(name: impl Into<String>, handler: impl Into<String>) -> Self {
        Self::HandlerNameUnresolvable {
            name: name.into(),
            handler: handler.into(),
        }
    }
}

fn format_candidates(candidates: &[PathBuf]) -> String {
    candidates
        .iter()
        .map(|c| c.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
