//! Entry-point resolution
//!
//! Works out which source files a deployment target compiles. Google Cloud
//! Functions deployments compile the file named by package.json; every other
//! target compiles the file behind each handler.

use crate::error::{BuildError, BuildResult};
use crate::handler::{HandlerPath, Handlers};
use crate::manifest::{PackageManifest, MANIFEST_FILE};
use std::path::{Path, PathBuf};

/// Target whose entry point comes from package.json
pub const GOOGLE_TARGET: &str = "google";

/// Resolve the source files to compile, relative to `cwd`
///
/// Every returned path exists. The first handler that cannot be resolved
/// fails the whole call.
pub fn resolve_entry_points(
    cwd: &Path,
    target: &str,
    handlers: Option<&Handlers>,
) -> BuildResult<Vec<PathBuf>> {
    if target == GOOGLE_TARGET {
        let manifest_path = cwd.join(MANIFEST_FILE);
        if manifest_path.is_file() {
            let manifest = PackageManifest::from_file(&manifest_path)?;
            let entry = PathBuf::from(manifest.source_entry());
            if !cwd.join(&entry).is_file() {
                return Err(BuildError::ManifestEntrypointMissing { path: entry });
            }
            return Ok(vec![entry]);
        }
    }

    let mut entry_points = Vec::new();
    for (name, spec) in handlers.into_iter().flatten() {
        let entry = resolve_handler(cwd, name, &spec.handler)?;
        if !entry_points.contains(&entry) {
            entry_points.push(entry);
        }
    }
    Ok(entry_points)
}

/// Find the source file of one handler, trying `.ts` before `.js`
fn resolve_handler(cwd: &Path, name: &str, handler: &str) -> BuildResult<PathBuf> {
    let path = HandlerPath::parse(handler)
        .ok_or_else(|| BuildError::handler_name_unresolvable(name, handler))?;

    let candidates: Vec<PathBuf> = path.candidates().into_iter().map(PathBuf::from).collect();
    match candidates.iter().find(|c| cwd.join(c).is_file()) {
        Some(found) => Ok(found.clone()),
        None => Err(BuildError::HandlerFileMissing {
            name: name.to_string(),
            handler: handler.to_string(),
            candidates,
        }),
    }
}
