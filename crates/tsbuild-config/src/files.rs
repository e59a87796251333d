//! Root file expansion
//!
//! Turns the `files`, `include` and `exclude` fields of a config file into the
//! list of source files the project consists of.

use crate::options::{normalize_path, CompilerOptions};
use crate::ConfigDiagnostic;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Patterns from `include` or `exclude` and the directory they are relative to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSpecs {
    pub base: PathBuf,
    pub patterns: Vec<String>,
}

impl FileSpecs {
    pub fn new(base: impl Into<PathBuf>, patterns: Vec<String>) -> Self {
        Self {
            base: base.into(),
            patterns,
        }
    }
}

/// The file selection fields of a config file after `extends` merging
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSelection {
    pub files: Option<FileSpecs>,
    pub include: Option<FileSpecs>,
    pub exclude: Option<FileSpecs>,
}

impl FileSelection {
    /// Overlay `other` on top of this selection; fields set in `other` win
    pub fn merge(&mut self, other: FileSelection) {
        if other.files.is_some() {
            self.files = other.files;
        }
        if other.include.is_some() {
            self.include = other.include;
        }
        if other.exclude.is_some() {
            self.exclude = other.exclude;
        }
    }
}

const DEFAULT_INCLUDE: &str = "**/*";

const DEFAULT_EXCLUDE: &[&str] = &["node_modules", "bower_components", "jspm_packages"];

/// Expand a file selection into root file names
///
/// Problems are appended to `errors`; the files that could be resolved are
/// still returned.
pub fn expand(
    selection: &FileSelection,
    options: &CompilerOptions,
    config_path: &Path,
    errors: &mut Vec<ConfigDiagnostic>,
) -> Vec<PathBuf> {
    let config_dir = config_dir(config_path);
    let mut file_names = Vec::new();

    if let Some(files) = &selection.files {
        for name in &files.patterns {
            let path = normalize_path(&files.base.join(name));
            if !path.is_file() {
                let message = format!("File '{}' not found.", path.display());
                errors.push(ConfigDiagnostic::new(config_path, message).with_field("files"));
            } else if !file_names.contains(&path) {
                file_names.push(path);
            }
        }
    }

    let include = match (&selection.include, &selection.files) {
        (Some(include), _) => include.clone(),
        (None, None) => FileSpecs::new(config_dir, vec![DEFAULT_INCLUDE.to_string()]),
        (None, Some(_)) => return file_names,
    };

    let exclude = match &selection.exclude {
        Some(exclude) => exclude.clone(),
        None => {
            let mut patterns: Vec<String> = DEFAULT_EXCLUDE.iter().map(|p| p.to_string()).collect();
            if let Some(out_dir) = options.out_dir() {
                patterns.push(out_dir.to_string());
            }
            FileSpecs::new(config_dir, patterns)
        }
    };

    let include_set = PatternSet::build(&include, config_path, errors);
    let exclude_set = PatternSet::build(&exclude, config_path, errors);

    let allow_js = options.allow_js();
    let mut matched = BTreeSet::new();

    for root in include_set.roots() {
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !exclude_set.matches(entry.path(), true)
            });

        for entry in walker.filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = normalize_path(entry.path());
            if has_supported_extension(&path, allow_js)
                && include_set.matches(&path, false)
                && !exclude_set.matches(&path, false)
            {
                matched.insert(path);
            }
        }
    }

    if matched.is_empty() && file_names.is_empty() {
        errors.push(ConfigDiagnostic::new(
            config_path,
            format!(
                "No inputs were found in config file '{}'. Specified 'include' paths were '{:?}' and 'exclude' paths were '{:?}'.",
                config_path.display(),
                include.patterns,
                exclude.patterns
            ),
        ));
    }

    for path in matched {
        if !file_names.contains(&path) {
            file_names.push(path);
        }
    }

    file_names
}

/// Directory a config file's relative paths are resolved against
pub fn config_dir(config_path: &Path) -> &Path {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Whether a file is a compiler input by its extension
pub fn has_supported_extension(path: &Path, allow_js: bool) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name,
        None => return false,
    };
    let typescript = [".ts", ".tsx"];
    let javascript = [".js", ".jsx"];
    typescript.iter().any(|ext| name.ends_with(ext))
        || (allow_js && javascript.iter().any(|ext| name.ends_with(ext)))
}

/// Compiled `include` or `exclude` patterns
///
/// Each pattern is split at its first wildcard component: the literal part is
/// the directory the pattern is anchored at, the rest is matched below it.
/// Patterns sharing a directory share one matcher.
struct PatternSet {
    groups: Vec<PatternGroup>,
}

struct PatternGroup {
    dir: PathBuf,
    matcher: Gitignore,
    /// Some pattern names `dir` itself
    whole_dir: bool,
}

impl PatternSet {
    fn build(specs: &FileSpecs, config_path: &Path, errors: &mut Vec<ConfigDiagnostic>) -> Self {
        let mut by_dir: BTreeMap<PathBuf, Vec<String>> = BTreeMap::new();
        for pattern in &specs.patterns {
            let (dir, glob) = anchor_pattern(&specs.base, pattern);
            by_dir.entry(dir).or_default().push(glob);
        }

        let mut groups = Vec::with_capacity(by_dir.len());
        for (dir, globs) in by_dir {
            let mut builder = GitignoreBuilder::new(&dir);
            for glob in &globs {
                if let Err(e) = builder.add_line(None, &format!("/{}", glob)) {
                    errors.push(ConfigDiagnostic::new(
                        config_path,
                        format!("Invalid file pattern '{}': {}", glob, e),
                    ));
                }
            }
            let whole_dir = globs.iter().any(|glob| glob == "**");
            match builder.build() {
                Ok(matcher) => groups.push(PatternGroup {
                    dir,
                    matcher,
                    whole_dir,
                }),
                Err(e) => errors.push(ConfigDiagnostic::new(
                    config_path,
                    format!("Invalid file patterns: {}", e),
                )),
            }
        }

        Self { groups }
    }

    /// Directories that need walking to find matches
    fn roots(&self) -> impl Iterator<Item = &Path> {
        self.groups
            .iter()
            .map(|group| group.dir.as_path())
            .filter(|dir| dir.is_dir())
    }

    fn matches(&self, path: &Path, is_dir: bool) -> bool {
        self.groups.iter().any(|group| match path.strip_prefix(&group.dir) {
            Ok(relative) if relative.as_os_str().is_empty() => is_dir && group.whole_dir,
            Ok(relative) => group
                .matcher
                .matched_path_or_any_parents(relative, is_dir)
                .is_ignore(),
            Err(_) => false,
        })
    }
}

/// Split a pattern into its literal directory and the glob below it
fn anchor_pattern(base: &Path, pattern: &str) -> (PathBuf, String) {
    let full = normalize_path(&base.join(pattern));

    let mut dir = PathBuf::new();
    let mut glob: Vec<String> = Vec::new();
    for component in full.components() {
        let text = component.as_os_str().to_string_lossy();
        if glob.is_empty() && !text.contains(['*', '?']) {
            dir.push(component.as_os_str());
        } else {
            glob.push(text.into_owned());
        }
    }

    if !glob.is_empty() {
        return (dir, glob.join("/"));
    }

    // No wildcard: the pattern names one file or directory
    if full.is_dir() {
        return (full, "**".to_string());
    }
    match (full.parent(), full.file_name()) {
        (Some(parent), Some(name)) => (parent.to_path_buf(), name.to_string_lossy().into_owned()),
        _ => (full, "**".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_supported_extensions() {
        assert!(has_supported_extension(Path::new("a.ts"), false));
        assert!(has_supported_extension(Path::new("a.d.ts"), false));
        assert!(has_supported_extension(Path::new("a.tsx"), false));
        assert!(!has_supported_extension(Path::new("a.js"), false));
        assert!(has_supported_extension(Path::new("a.js"), true));
        assert!(!has_supported_extension(Path::new("a.json"), true));
    }

    #[test]
    fn test_anchor_pattern() {
        let base = Path::new("/p");
        assert_eq!(
            anchor_pattern(base, "./src/**/*.ts"),
            (PathBuf::from("/p/src"), "**/*.ts".to_string())
        );
        assert_eq!(
            anchor_pattern(base, "**/*"),
            (PathBuf::from("/p"), "**/*".to_string())
        );
        assert_eq!(
            anchor_pattern(base, "../shared/*.ts"),
            (PathBuf::from("/shared"), "*.ts".to_string())
        );
        assert_eq!(
            anchor_pattern(base, "missing-file.ts"),
            (PathBuf::from("/p"), "missing-file.ts".to_string())
        );
    }

    #[test]
    fn test_include_outside_base() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "src/a.ts");
        touch(root, "config/unused.ts");

        let selection = FileSelection {
            files: None,
            include: Some(FileSpecs::new(root.join("config"), vec!["../src".to_string()])),
            exclude: None,
        };
        let mut errors = Vec::new();
        let files = expand(
            &selection,
            &CompilerOptions::new(),
            &root.join("tsconfig.json"),
            &mut errors,
        );

        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(names(root, &files), vec!["src/a.ts"]);
    }

    #[test]
    fn test_excluded_directory_is_pruned() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "lib/a.ts");
        touch(root, "vendor/b.ts");

        let exclude = FileSpecs::new(root, vec!["vendor".to_string()]);
        let mut errors = Vec::new();
        let set = PatternSet::build(&exclude, &root.join("tsconfig.json"), &mut errors);

        assert!(set.matches(&root.join("vendor"), true));
        assert!(set.matches(&root.join("vendor/b.ts"), false));
        assert!(!set.matches(&root.join("lib"), true));
    }

    #[test]
    fn test_default_include_skips_node_modules() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "a.ts");
        touch(root, "src/b.ts");
        touch(root, "node_modules/dep/index.ts");
        touch(root, "readme.md");

        let mut errors = Vec::new();
        let files = expand(
            &FileSelection::default(),
            &CompilerOptions::new(),
            &root.join("tsconfig.json"),
            &mut errors,
        );

        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(names(root, &files), vec!["a.ts", "src/b.ts"]);
    }

    #[test]
    fn test_include_and_exclude() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "src/a.ts");
        touch(root, "src/a.test.ts");
        touch(root, "src/nested/b.ts");
        touch(root, "other/c.ts");

        let selection = FileSelection {
            files: None,
            include: Some(FileSpecs::new(root, vec!["src".to_string()])),
            exclude: Some(FileSpecs::new(root, vec!["**/*.test.ts".to_string()])),
        };
        let mut errors = Vec::new();
        let files = expand(
            &selection,
            &CompilerOptions::new(),
            &root.join("tsconfig.json"),
            &mut errors,
        );

        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(names(root, &files), vec!["src/a.ts", "src/nested/b.ts"]);
    }

    #[test]
    fn test_out_dir_excluded_by_default() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "src/a.ts");
        touch(root, "dist/a.d.ts");

        let mut options = CompilerOptions::new();
        options.set("outDir", root.join("dist").to_string_lossy().into_owned());
        let mut errors = Vec::new();
        let files = expand(
            &FileSelection::default(),
            &options,
            &root.join("tsconfig.json"),
            &mut errors,
        );

        assert_eq!(names(root, &files), vec!["src/a.ts"]);
    }

    #[test]
    fn test_explicit_files_only() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "main.ts");
        touch(root, "other.ts");

        let selection = FileSelection {
            files: Some(FileSpecs::new(root, vec!["main.ts".to_string(), "gone.ts".to_string()])),
            include: None,
            exclude: None,
        };
        let mut errors = Vec::new();
        let files = expand(
            &selection,
            &CompilerOptions::new(),
            &root.join("tsconfig.json"),
            &mut errors,
        );

        assert_eq!(names(root, &files), vec!["main.ts"]);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("gone.ts"));
    }

    #[test]
    fn test_no_inputs() {
        let temp = TempDir::new().unwrap();
        let mut errors = Vec::new();
        let files = expand(
            &FileSelection::default(),
            &CompilerOptions::new(),
            &temp.path().join("tsconfig.json"),
            &mut errors,
        );

        assert!(files.is_empty());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with("No inputs were found"));
    }
}
