//! Compiler options
//!
//! The options are kept as the JSON object the compiler understands. Only a
//! handful of them mean anything to the build itself; the rest are passed
//! through untouched.

use crate::schema::{self, OptionKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Component, Path, PathBuf};

/// Option name → value mapping handed to the compiler
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompilerOptions(Map<String, Value>);

impl CompilerOptions {
    /// Create an empty option set
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Boolean option value, `None` when unset or not a boolean
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.0.get(name).and_then(Value::as_bool)
    }

    /// String option value, `None` when unset or not a string
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// The directory output paths are computed relative to
    pub fn root_dir(&self) -> Option<&str> {
        self.get_str("rootDir")
    }

    pub fn set_root_dir(&mut self, dir: impl AsRef<Path>) {
        self.set("rootDir", dir.as_ref().to_string_lossy().into_owned());
    }

    pub fn out_dir(&self) -> Option<&str> {
        self.get_str("outDir")
    }

    /// Whether the compiler reports the paths of the files it wrote
    pub fn list_emitted_files(&self) -> bool {
        self.get_bool("listEmittedFiles").unwrap_or(false)
    }

    pub fn set_list_emitted_files(&mut self, enabled: bool) {
        self.set("listEmittedFiles", enabled);
    }

    pub fn allow_js(&self) -> bool {
        self.get_bool("allowJs").unwrap_or(false)
    }

    /// Overlay `other` on top of these options; `other` wins
    pub fn merge(&mut self, other: CompilerOptions) {
        for (name, value) in other.0 {
            self.0.insert(name, value);
        }
    }

    /// Copy with every relative path-valued option resolved against `base`
    pub fn with_absolute_paths(&self, base: &Path) -> CompilerOptions {
        let mut resolved = self.clone();
        for (name, value) in resolved.0.iter_mut() {
            let kind = match schema::lookup(name) {
                Some(decl) => decl.kind,
                None => continue,
            };
            match (kind, value) {
                (OptionKind::Path, Value::String(path)) => {
                    *path = absolutize(base, path);
                }
                (OptionKind::PathList, Value::Array(items)) => {
                    for item in items.iter_mut() {
                        if let Value::String(path) = item {
                            *path = absolutize(base, path);
                        }
                    }
                }
                _ => {}
            }
        }
        resolved
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for CompilerOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Options used when the project has no config file
///
/// Returns a fresh value on every call.
pub fn default_compiler_options() -> CompilerOptions {
    let mut options = CompilerOptions::new();
    options.set("module", "commonjs");
    options.set("target", "es5");
    options.set("lib", vec!["es2020"]);
    options.set("strict", true);
    options.set("noImplicitAny", true);
    options.set("strictNullChecks", true);
    options.set("strictFunctionTypes", true);
    options.set("strictBindCallApply", true);
    options.set("strictPropertyInitialization", true);
    options.set("noImplicitThis", true);
    options.set("alwaysStrict", true);
    options.set("allowJs", true);
    options.set("checkJs", true);
    options.set("moduleResolution", "node");
    options.set("esModuleInterop", true);
    options.set("experimentalDecorators", true);
    options.set("emitDecoratorMetadata", true);
    options.set("forceConsistentCasingInFileNames", true);
    options.set("sourceMap", true);
    options.set("rootDir", "./");
    options
}

/// Resolve `path` against `base` and normalize the result
pub(crate) fn absolutize(base: &Path, path: &str) -> String {
    normalize_path(&base.join(path))
        .to_string_lossy()
        .into_owned()
}

/// Lexically normalize a path, folding `.` and `..` components
///
/// Does not touch the filesystem, so symlinks are not resolved.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
