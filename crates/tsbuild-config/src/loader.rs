//! Configuration Loader
//!
//! Finds and parses the project config file, following `extends` chains and
//! falling back to the built-in defaults when the project has none.

use crate::files::{self, FileSelection, FileSpecs};
use crate::options::{default_compiler_options, normalize_path, CompilerOptions};
use crate::{jsonc, schema, ConfigDiagnostic, ConfigError, ConfigResult, Logger};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when none is named
pub const DEFAULT_CONFIG_FILE: &str = "tsconfig.json";

/// A config file after `extends` resolution and validation
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedConfig {
    /// The config file that was parsed
    pub path: PathBuf,
    /// Normalized compiler options
    pub options: CompilerOptions,
    /// Root files selected by `files`, `include` and `exclude`
    pub file_names: Vec<PathBuf>,
    /// Base config files pulled in through `extends`, in load order
    pub extended: Vec<PathBuf>,
}

/// Resolves the compiler options for a working directory
///
/// ```no_run
/// use tsbuild_config::{ConfigResolver, ConsoleLogger};
/// use std::path::Path;
///
/// let logger = ConsoleLogger;
/// let options = ConfigResolver::new()
///     .with_config_file("tsconfig.build.json")
///     .with_logger(&logger)
///     .resolve(Path::new("."))
///     .unwrap();
/// ```
pub struct ConfigResolver<'a> {
    config_file_name: String,
    logger: Option<&'a dyn Logger>,
}

impl<'a> ConfigResolver<'a> {
    /// Create a resolver looking for `tsconfig.json`
    pub fn new() -> Self {
        Self {
            config_file_name: DEFAULT_CONFIG_FILE.to_string(),
            logger: None,
        }
    }

    /// Look for a differently named config file
    pub fn with_config_file(mut self, name: impl Into<String>) -> Self {
        self.config_file_name = name.into();
        self
    }

    /// Report the `rootDir` override to this logger
    pub fn with_logger(mut self, logger: &'a dyn Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Path the config file is expected at for `cwd`
    pub fn config_path(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.config_file_name)
    }

    /// Resolve compiler options for `cwd`
    ///
    /// A missing config file is not an error; the defaults are returned. When
    /// a config file is found its `rootDir` is always replaced by `cwd`.
    pub fn resolve(&self, cwd: &Path) -> ConfigResult<CompilerOptions> {
        let config_path = self.config_path(cwd);

        if !config_path.exists() {
            return Ok(default_compiler_options());
        }

        let parsed = parse_config_file(&config_path)?;
        let mut options = parsed.options;

        if let Some(logger) = self.logger {
            let differs = options
                .root_dir()
                .is_some_and(|root| normalize_path(Path::new(root)) != normalize_path(cwd));
            if differs {
                logger.log(&format!(
                    "Warning: \"rootDir\" from {} is overridden to \"{}\"",
                    config_path.display(),
                    cwd.display()
                ));
            }
        }

        options.set_root_dir(cwd);
        Ok(options)
    }
}

impl Default for ConfigResolver<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve compiler options for `cwd` from `config_file_name`
pub fn resolve(
    cwd: &Path,
    config_file_name: &str,
    logger: Option<&dyn Logger>,
) -> ConfigResult<CompilerOptions> {
    let mut resolver = ConfigResolver::new().with_config_file(config_file_name);
    if let Some(logger) = logger {
        resolver = resolver.with_logger(logger);
    }
    resolver.resolve(cwd)
}

/// Parse, merge and validate a config file and everything it extends
pub fn parse_config_file(path: &Path) -> ConfigResult<ParsedConfig> {
    let mut state = LoadState::default();
    let layer = load_layer(path, &mut state)?;

    let file_names = files::expand(&layer.selection, &layer.options, path, &mut state.errors);

    if !state.errors.is_empty() {
        return Err(ConfigError::Validation {
            file: path.to_path_buf(),
            errors: state.errors,
        });
    }

    Ok(ParsedConfig {
        path: path.to_path_buf(),
        options: layer.options,
        file_names,
        extended: state.extended,
    })
}

/// Bookkeeping shared across one `extends` chain
#[derive(Default)]
struct LoadState {
    /// Files currently being loaded, outermost first
    stack: Vec<PathBuf>,
    extended: Vec<PathBuf>,
    errors: Vec<ConfigDiagnostic>,
}

/// One config file merged with everything it extends
#[derive(Default)]
struct Layer {
    options: CompilerOptions,
    selection: FileSelection,
}

fn load_layer(path: &Path, state: &mut LoadState) -> ConfigResult<Layer> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    let raw = jsonc::parse_object(&text).map_err(|e| ConfigError::Parse {
        file: path.to_path_buf(),
        line: e.line,
        column: e.column,
        message: e.message,
    })?;

    let dir = files::config_dir(path).to_path_buf();
    let mut layer = Layer::default();

    state.stack.push(normalize_path(path));

    for specifier in extends_specifiers(&raw, path, &mut state.errors) {
        let base = match resolve_extends(&specifier, &dir) {
            Some(base) => base,
            None => {
                state.errors.push(
                    ConfigDiagnostic::new(path, format!("File '{}' not found.", specifier))
                        .with_field("extends"),
                );
                continue;
            }
        };

        if state.stack.contains(&base) {
            let chain = state
                .stack
                .iter()
                .chain(std::iter::once(&base))
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            state.errors.push(
                ConfigDiagnostic::new(
                    path,
                    format!("Circularity detected while resolving configuration: {}", chain),
                )
                .with_field("extends"),
            );
            continue;
        }

        state.extended.push(base.clone());
        let base_layer = load_layer(&base, state)?;
        layer.options.merge(base_layer.options);
        layer.selection.merge(base_layer.selection);
    }

    let own = own_options(&raw, path, &dir, &mut layer.options, &mut state.errors);
    layer.options.merge(own);
    layer
        .selection
        .merge(own_selection(&raw, path, &dir, &mut state.errors));

    state.stack.pop();
    Ok(layer)
}

fn extends_specifiers(
    raw: &Map<String, Value>,
    path: &Path,
    errors: &mut Vec<ConfigDiagnostic>,
) -> Vec<String> {
    match raw.get("extends") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(spec)) => vec![spec.clone()],
        Some(Value::Array(items)) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Some(_) => {
            errors.push(
                ConfigDiagnostic::new(path, "'extends' must be a string or an array of strings.")
                    .with_field("extends"),
            );
            Vec::new()
        }
    }
}

/// Locate the base config named by an `extends` specifier
fn resolve_extends(specifier: &str, dir: &Path) -> Option<PathBuf> {
    let spec_path = Path::new(specifier);
    let is_relative = specifier.starts_with("./") || specifier.starts_with("../");

    if spec_path.is_absolute() || is_relative {
        return with_json_fallback(&dir.join(spec_path));
    }

    // Bare specifier: search node_modules directories upwards
    for ancestor in dir.ancestors() {
        let package = ancestor.join("node_modules").join(spec_path);
        if package.is_dir() {
            let config = package.join(DEFAULT_CONFIG_FILE);
            if config.is_file() {
                return Some(normalize_path(&config));
            }
        }
        if let Some(found) = with_json_fallback(&package) {
            return Some(found);
        }
    }

    None
}

fn with_json_fallback(candidate: &Path) -> Option<PathBuf> {
    if candidate.is_file() {
        return Some(normalize_path(candidate));
    }
    let mut with_ext = candidate.as_os_str().to_owned();
    with_ext.push(".json");
    let with_ext = PathBuf::from(with_ext);
    if with_ext.is_file() {
        return Some(normalize_path(&with_ext));
    }
    None
}

/// Validate the file's own `compilerOptions`
///
/// `inherited` is the options merged from base configs so far; a `null`
/// value removes the option from it.
fn own_options(
    raw: &Map<String, Value>,
    path: &Path,
    dir: &Path,
    inherited: &mut CompilerOptions,
    errors: &mut Vec<ConfigDiagnostic>,
) -> CompilerOptions {
    let mut options = CompilerOptions::new();

    let entries = match raw.get("compilerOptions") {
        None | Some(Value::Null) => return options,
        Some(Value::Object(entries)) => entries,
        Some(_) => {
            errors.push(
                ConfigDiagnostic::new(path, "'compilerOptions' must be an object.")
                    .with_field("compilerOptions"),
            );
            return options;
        }
    };

    for (name, value) in entries {
        let name = schema::canonical_name(name);
        let decl = match schema::lookup(name) {
            Some(decl) => decl,
            None => {
                errors.push(
                    ConfigDiagnostic::new(path, format!("Unknown compiler option '{}'.", name))
                        .with_field(name),
                );
                continue;
            }
        };

        match schema::normalize(decl, value, dir) {
            Ok(Some(normalized)) => options.set(name, normalized),
            Ok(None) => {
                inherited.remove(name);
                options.remove(name);
            }
            Err(message) => errors.push(ConfigDiagnostic::new(path, message).with_field(name)),
        }
    }

    options
}

fn own_selection(
    raw: &Map<String, Value>,
    path: &Path,
    dir: &Path,
    errors: &mut Vec<ConfigDiagnostic>,
) -> FileSelection {
    let mut field = |name: &str| -> Option<FileSpecs> {
        match raw.get(name) {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) if items.iter().all(Value::is_string) => {
                let patterns = items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect();
                Some(FileSpecs::new(dir, patterns))
            }
            Some(_) => {
                errors.push(
                    ConfigDiagnostic::new(path, format!("'{}' must be an array of strings.", name))
                        .with_field(name),
                );
                None
            }
        }
    };

    FileSelection {
        files: field("files"),
        include: field("include"),
        exclude: field("exclude"),
    }
}
