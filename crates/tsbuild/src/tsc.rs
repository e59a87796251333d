//! `tsc` process engine
//!
//! Drives the TypeScript command-line compiler. Each call writes a throw-away
//! project file listing the root files and options, runs `tsc` on it and
//! parses the plain-text report:
//!
//! ```text
//! src/app.ts(3,7): error TS2322: Type 'number' is not assignable to type 'string'.
//! error TS2688: Cannot find type definition file for 'node'.
//! TSFILE: /work/app/src/app.js
//! ```

use crate::diagnostics::line_col_to_offset;
use crate::engine::{
    CompilerEngine, DiagnosticCategory, EmitOutput, EngineDiagnostic, EngineOutput, MessageChain,
    SourceFile,
};
use crate::error::{BuildError, BuildResult};
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;
use tsbuild_config::{normalize_path, CompilerOptions};

const PROJECT_FILE: &str = "tsconfig.json";

const SCRATCH_PREFIX: &str = ".tsbuild-";

/// [`CompilerEngine`] backed by the `tsc` executable
#[derive(Debug, Clone)]
pub struct TscEngine {
    working_dir: PathBuf,
    tsc_path: Option<PathBuf>,
}

/// Project file handed to `tsc`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectFile<'a> {
    compiler_options: &'a CompilerOptions,
    files: Vec<String>,
}

impl TscEngine {
    /// Create an engine resolving relative paths against `working_dir`
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            tsc_path: None,
        }
    }

    /// Use a specific `tsc` executable
    pub fn with_tsc_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.tsc_path = Some(path.into());
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// The compiler to run: the configured one, else the project's local
    /// install, else whatever `tsc` is on `PATH`
    pub fn tsc_command(&self) -> PathBuf {
        if let Some(path) = &self.tsc_path {
            return path.clone();
        }
        let local = self.working_dir.join("node_modules").join(".bin").join("tsc");
        if local.is_file() {
            return local;
        }
        PathBuf::from("tsc")
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        normalize_path(&self.working_dir.join(path))
    }

    /// Write the project file for one compile into `dir`
    fn write_project(
        &self,
        dir: &Path,
        root_names: &[PathBuf],
        options: &CompilerOptions,
    ) -> BuildResult<PathBuf> {
        let options = options.with_absolute_paths(&self.working_dir);
        let project = ProjectFile {
            compiler_options: &options,
            files: root_names
                .iter()
                .map(|root| self.absolute(root).to_string_lossy().into_owned())
                .collect(),
        };
        let content = serde_json::to_string_pretty(&project).map_err(BuildError::engine)?;

        let path = dir.join(PROJECT_FILE);
        fs::write(&path, content).map_err(|e| BuildError::io(&path, e))?;
        Ok(path)
    }

    fn command_args(project: &Path, list_files_only: bool) -> Vec<String> {
        let mut args = vec![
            "--project".to_string(),
            project.to_string_lossy().into_owned(),
            "--pretty".to_string(),
            "false".to_string(),
        ];
        if list_files_only {
            args.push("--listFilesOnly".to_string());
        }
        args
    }

    /// Directory holding one compile's project file
    ///
    /// Created inside the working directory: tsc derives defaults such as
    /// `typeRoots` from the location of the project file.
    fn scratch_dir(&self) -> BuildResult<TempDir> {
        tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(&self.working_dir)
            .map_err(|e| BuildError::io(&self.working_dir, e))
    }

    /// Run `tsc` over a fresh project file
    fn invoke(
        &self,
        root_names: &[PathBuf],
        options: &CompilerOptions,
        list_files_only: bool,
    ) -> BuildResult<Output> {
        let temp = self.scratch_dir()?;
        let project = self.write_project(temp.path(), root_names, options)?;

        let tsc = self.tsc_command();
        let output = Command::new(&tsc)
            .args(Self::command_args(&project, list_files_only))
            .current_dir(&self.working_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| BuildError::engine(format!("failed to run {}: {}", tsc.display(), e)))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            eprintln!("{}", stderr.trim_end());
        }

        close(temp)?;
        Ok(output)
    }
}

fn close(temp: TempDir) -> BuildResult<()> {
    let path = temp.path().to_path_buf();
    temp.close().map_err(|e| BuildError::io(path, e))
}

impl CompilerEngine for TscEngine {
    fn emit(&self, root_names: &[PathBuf], options: &CompilerOptions) -> BuildResult<EngineOutput> {
        let output = self.invoke(root_names, options, false)?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        let exit_skipped = match output.status.code() {
            Some(0) | Some(2) => false,
            Some(1) => true,
            code => return Err(unexpected_exit(code, &stdout, &output.stderr)),
        };
        // A clean program under noEmit exits 0 without writing anything
        let emit_skipped = exit_skipped || options.get_bool("noEmit") == Some(true);

        let parser = OutputParser::new()?;
        let report = parser.parse(&stdout, &self.working_dir, |path| {
            fs::read_to_string(path).ok()
        });

        Ok(EngineOutput {
            // tsc reports every diagnostic in one stream
            pre_emit_diagnostics: report.diagnostics,
            emit: EmitOutput {
                emit_skipped,
                diagnostics: Vec::new(),
                emitted_files: report.emitted_files,
            },
        })
    }

    fn program_files(
        &self,
        root_names: &[PathBuf],
        options: &CompilerOptions,
    ) -> BuildResult<Vec<PathBuf>> {
        let output = self.invoke(root_names, options, true)?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        if output.status.code() != Some(0) {
            return Err(unexpected_exit(output.status.code(), &stdout, &output.stderr));
        }
        Ok(parse_file_list(&stdout, &self.working_dir))
    }
}

fn unexpected_exit(code: Option<i32>, stdout: &str, stderr: &[u8]) -> BuildError {
    let status = match code {
        Some(code) => format!("exit code {}", code),
        None => "a signal".to_string(),
    };
    let stderr = String::from_utf8_lossy(stderr);
    let report: Vec<&str> = [stdout.trim(), stderr.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();
    if report.is_empty() {
        BuildError::engine(format!("tsc terminated with {}", status))
    } else {
        BuildError::engine(format!("tsc terminated with {}:\n{}", status, report.join("\n")))
    }
}

/// One path per line, as printed by `--listFilesOnly`
fn parse_file_list(stdout: &str, working_dir: &Path) -> Vec<PathBuf> {
    stdout
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| normalize_path(&working_dir.join(line)))
        .collect()
}

/// Diagnostics and emitted files read from `tsc` output
#[derive(Debug, Default, PartialEq)]
pub struct ParsedReport {
    pub diagnostics: Vec<EngineDiagnostic>,
    pub emitted_files: Vec<PathBuf>,
}

/// Parser for `tsc --pretty false` output
pub struct OutputParser {
    located: Regex,
    global: Regex,
    emitted: Regex,
}

impl OutputParser {
    pub fn new() -> BuildResult<Self> {
        let compile = |pattern: &str| Regex::new(pattern).map_err(BuildError::engine);
        Ok(Self {
            located: compile(
                r"^(?P<file>.+?)\((?P<line>\d+),(?P<col>\d+)\): (?P<cat>error|warning|suggestion|message) TS(?P<code>\d+): (?P<msg>.*)$",
            )?,
            global: compile(
                r"^(?P<cat>error|warning|suggestion|message) TS(?P<code>\d+): (?P<msg>.*)$",
            )?,
            emitted: compile(r"^TSFILE: (?P<path>.+)$")?,
        })
    }

    /// Parse a report; `read` supplies the text of the files diagnostics
    /// point into, relative paths being resolved against `working_dir`
    pub fn parse<F>(&self, stdout: &str, working_dir: &Path, mut read: F) -> ParsedReport
    where
        F: FnMut(&Path) -> Option<String>,
    {
        let mut report = ParsedReport::default();
        let mut texts: HashMap<PathBuf, Option<String>> = HashMap::new();

        for line in stdout.lines() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }

            if let Some(caps) = self.emitted.captures(line) {
                report.emitted_files.push(PathBuf::from(&caps["path"]));
                continue;
            }

            if let Some(caps) = self.located.captures(line) {
                let path = PathBuf::from(&caps["file"]);
                let text = texts
                    .entry(path.clone())
                    .or_insert_with(|| read(&normalize_path(&working_dir.join(&path))))
                    .clone();
                let line_no = caps["line"].parse().unwrap_or(1);
                let column = caps["col"].parse().unwrap_or(1);
                let start = text
                    .as_deref()
                    .map(|text| line_col_to_offset(text, line_no, column));

                report.diagnostics.push(EngineDiagnostic {
                    file: Some(SourceFile::new(path, text.unwrap_or_default())),
                    start,
                    code: caps["code"].parse().ok(),
                    category: category(&caps["cat"]),
                    message: MessageChain::new(&caps["msg"]),
                });
                continue;
            }

            if let Some(caps) = self.global.captures(line) {
                let mut diagnostic =
                    EngineDiagnostic::global(category(&caps["cat"]), &caps["msg"]);
                diagnostic.code = caps["code"].parse().ok();
                report.diagnostics.push(diagnostic);
                continue;
            }

            // Indented lines continue the previous diagnostic's message
            let indent = line.len() - line.trim_start().len();
            if indent > 0 {
                if let Some(last) = report.diagnostics.last_mut() {
                    push_at_depth(&mut last.message, indent / 2, line.trim_start());
                }
            }
        }

        report
    }
}

fn category(text: &str) -> DiagnosticCategory {
    DiagnosticCategory::parse(text).unwrap_or(DiagnosticCategory::Error)
}

/// Attach `text` at nesting level `depth` (1 = direct child) below the most
/// recent entry of `chain`
fn push_at_depth(chain: &mut MessageChain, depth: usize, text: &str) {
    let mut node = chain;
    for _ in 1..depth.max(1) {
        if node.next.is_empty() {
            break;
        }
        let last = node.next.len() - 1;
        node = &mut node.next[last];
    }
    node.next.push(MessageChain::new(text));
}
