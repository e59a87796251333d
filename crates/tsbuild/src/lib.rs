//! tsbuild compilation orchestration
//!
//! Builds TypeScript functions for deployment:
//! - Entry-point resolution from handler specifiers or package.json
//! - Whole-program compilation with diagnostics reporting
//! - Source file listing for watch mode
//! - A `tsc` process engine behind the [`CompilerEngine`] trait
//!
//! Compiler options come from [`tsbuild_config`].

pub mod builder;
pub mod deps;
pub mod diagnostics;
pub mod engine;
pub mod entry_points;
pub mod error;
pub mod handler;
pub mod manifest;
pub mod runner;
pub mod tsc;

// Re-export main types
pub use builder::{BuildContext, BuildStats, Builder};
pub use deps::DependencyLister;
pub use diagnostics::Diagnostic;
pub use engine::{
    CompilerEngine, DiagnosticCategory, EmitOutput, EngineDiagnostic, EngineOutput, MessageChain,
    SourceFile,
};
pub use entry_points::{resolve_entry_points, GOOGLE_TARGET};
pub use error::{BuildError, BuildResult};
pub use handler::{HandlerPath, HandlerSpec, Handlers};
pub use manifest::PackageManifest;
pub use runner::{CompilationRunner, EmitResult};
pub use tsc::TscEngine;

// Re-export configuration types for convenience
pub use tsbuild_config::{CompilerOptions, ConsoleLogger, Logger};
