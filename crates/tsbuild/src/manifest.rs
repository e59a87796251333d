//! package.json reading
use crate::error::{BuildError, BuildResult};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const MANIFEST_FILE: &str = "package.json";

/// Entry file used when the manifest has no `main`
pub const DEFAULT_MAIN: &str = "index.ts";

/// The fields of package.json the build reads
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PackageManifest {
    #[serde(default)]
    pub main: Option<String>,
}

impl PackageManifest {
    /// Load from a file path
    pub fn from_file(path: &Path) -> BuildResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| BuildError::manifest_parse(path, e))
    }

    /// Source file for `main`: a compiled `.js` path maps back to its `.ts`
    pub fn source_entry(&self) -> String {
        match self.main.as_deref() {
            Some(main) => match main.strip_suffix(".js") {
                Some(stem) => format!("{}.ts", stem),
                None => main.to_string(),
            },
            None => DEFAULT_MAIN.to_string(),
        }
    }
}
