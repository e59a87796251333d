//! Known compiler options
//!
//! Each option the compiler accepts in `compilerOptions` is declared here with
//! the shape of value it takes. Validation and normalization of a config file
//! are driven entirely by this table.

use crate::options::absolutize;
use serde_json::Value;
use std::path::Path;

/// Shape of value an option accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Boolean,
    String,
    Number,
    /// A file or directory, resolved against the declaring config file
    Path,
    /// A list of strings
    List,
    /// A list of paths, each resolved like [`OptionKind::Path`]
    PathList,
    /// One of a fixed set of case-insensitive values
    Enum(&'static [&'static str]),
    Object,
    Array,
}

impl OptionKind {
    /// Type name used in validation messages
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::String | Self::Path | Self::Enum(_) => "string",
            Self::Number => "number",
            Self::List | Self::PathList | Self::Array => "Array",
            Self::Object => "object",
        }
    }
}

/// Declaration of one compiler option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionDecl {
    pub name: &'static str,
    pub kind: OptionKind,
}

const fn decl(name: &'static str, kind: OptionKind) -> OptionDecl {
    OptionDecl { name, kind }
}

const TARGETS: &[&str] = &[
    "es3", "es5", "es6", "es2015", "es2016", "es2017", "es2018", "es2019", "es2020", "es2021",
    "es2022", "es2023", "esnext",
];

const MODULES: &[&str] = &[
    "none", "commonjs", "amd", "umd", "system", "es6", "es2015", "es2020", "es2022", "esnext",
    "node16", "nodenext", "preserve",
];

const MODULE_RESOLUTION: &[&str] = &["classic", "node", "node10", "node16", "nodenext", "bundler"];

const JSX: &[&str] = &["preserve", "react", "react-native", "react-jsx", "react-jsxdev"];

const NEW_LINE: &[&str] = &["crlf", "lf"];

const MODULE_DETECTION: &[&str] = &["auto", "legacy", "force"];

const IMPORTS_NOT_USED: &[&str] = &["remove", "preserve", "error"];

static OPTIONS: &[OptionDecl] = &[
    // Language and environment
    decl("target", OptionKind::Enum(TARGETS)),
    decl("lib", OptionKind::List),
    decl("jsx", OptionKind::Enum(JSX)),
    decl("jsxFactory", OptionKind::String),
    decl("jsxFragmentFactory", OptionKind::String),
    decl("jsxImportSource", OptionKind::String),
    decl("reactNamespace", OptionKind::String),
    decl("noLib", OptionKind::Boolean),
    decl("useDefineForClassFields", OptionKind::Boolean),
    decl("experimentalDecorators", OptionKind::Boolean),
    decl("emitDecoratorMetadata", OptionKind::Boolean),
    decl("moduleDetection", OptionKind::Enum(MODULE_DETECTION)),
    // Modules
    decl("module", OptionKind::Enum(MODULES)),
    decl("moduleResolution", OptionKind::Enum(MODULE_RESOLUTION)),
    decl("rootDir", OptionKind::Path),
    decl("rootDirs", OptionKind::PathList),
    decl("baseUrl", OptionKind::Path),
    decl("paths", OptionKind::Object),
    decl("typeRoots", OptionKind::PathList),
    decl("types", OptionKind::List),
    decl("moduleSuffixes", OptionKind::List),
    decl("customConditions", OptionKind::List),
    decl("allowUmdGlobalAccess", OptionKind::Boolean),
    decl("allowImportingTsExtensions", OptionKind::Boolean),
    decl("resolveJsonModule", OptionKind::Boolean),
    decl("resolvePackageJsonExports", OptionKind::Boolean),
    decl("resolvePackageJsonImports", OptionKind::Boolean),
    decl("noResolve", OptionKind::Boolean),
    // JavaScript support
    decl("allowJs", OptionKind::Boolean),
    decl("checkJs", OptionKind::Boolean),
    decl("maxNodeModuleJsDepth", OptionKind::Number),
    // Emit
    decl("outDir", OptionKind::Path),
    decl("outFile", OptionKind::Path),
    decl("declaration", OptionKind::Boolean),
    decl("declarationMap", OptionKind::Boolean),
    decl("declarationDir", OptionKind::Path),
    decl("emitDeclarationOnly", OptionKind::Boolean),
    decl("sourceMap", OptionKind::Boolean),
    decl("inlineSourceMap", OptionKind::Boolean),
    decl("inlineSources", OptionKind::Boolean),
    decl("mapRoot", OptionKind::String),
    decl("sourceRoot", OptionKind::String),
    decl("removeComments", OptionKind::Boolean),
    decl("noEmit", OptionKind::Boolean),
    decl("noEmitOnError", OptionKind::Boolean),
    decl("noEmitHelpers", OptionKind::Boolean),
    decl("importHelpers", OptionKind::Boolean),
    decl("importsNotUsedAsValues", OptionKind::Enum(IMPORTS_NOT_USED)),
    decl("downlevelIteration", OptionKind::Boolean),
    decl("preserveConstEnums", OptionKind::Boolean),
    decl("stripInternal", OptionKind::Boolean),
    decl("newLine", OptionKind::Enum(NEW_LINE)),
    decl("emitBOM", OptionKind::Boolean),
    decl("charset", OptionKind::String),
    // Interop constraints
    decl("isolatedModules", OptionKind::Boolean),
    decl("verbatimModuleSyntax", OptionKind::Boolean),
    decl("allowSyntheticDefaultImports", OptionKind::Boolean),
    decl("esModuleInterop", OptionKind::Boolean),
    decl("preserveSymlinks", OptionKind::Boolean),
    decl("forceConsistentCasingInFileNames", OptionKind::Boolean),
    // Type checking
    decl("strict", OptionKind::Boolean),
    decl("noImplicitAny", OptionKind::Boolean),
    decl("strictNullChecks", OptionKind::Boolean),
    decl("strictFunctionTypes", OptionKind::Boolean),
    decl("strictBindCallApply", OptionKind::Boolean),
    decl("strictPropertyInitialization", OptionKind::Boolean),
    decl("noImplicitThis", OptionKind::Boolean),
    decl("useUnknownInCatchVariables", OptionKind::Boolean),
    decl("alwaysStrict", OptionKind::Boolean),
    decl("noUnusedLocals", OptionKind::Boolean),
    decl("noUnusedParameters", OptionKind::Boolean),
    decl("exactOptionalPropertyTypes", OptionKind::Boolean),
    decl("noImplicitReturns", OptionKind::Boolean),
    decl("noFallthroughCasesInSwitch", OptionKind::Boolean),
    decl("noUncheckedIndexedAccess", OptionKind::Boolean),
    decl("noImplicitOverride", OptionKind::Boolean),
    decl("noPropertyAccessFromIndexSignature", OptionKind::Boolean),
    decl("allowUnusedLabels", OptionKind::Boolean),
    decl("allowUnreachableCode", OptionKind::Boolean),
    // Completeness
    decl("skipLibCheck", OptionKind::Boolean),
    decl("skipDefaultLibCheck", OptionKind::Boolean),
    // Projects
    decl("incremental", OptionKind::Boolean),
    decl("composite", OptionKind::Boolean),
    decl("tsBuildInfoFile", OptionKind::Path),
    decl("disableSourceOfProjectReferenceRedirect", OptionKind::Boolean),
    // Output formatting and diagnostics
    decl("pretty", OptionKind::Boolean),
    decl("listFiles", OptionKind::Boolean),
    decl("listEmittedFiles", OptionKind::Boolean),
    decl("traceResolution", OptionKind::Boolean),
    decl("diagnostics", OptionKind::Boolean),
    decl("extendedDiagnostics", OptionKind::Boolean),
    decl("noErrorTruncation", OptionKind::Boolean),
    decl("plugins", OptionKind::Array),
];

/// Legacy spellings and their canonical option name
static ALIASES: &[(&str, &str)] = &[("out", "outFile")];

/// Find the declaration of a canonical option name
pub fn lookup(name: &str) -> Option<&'static OptionDecl> {
    OPTIONS.iter().find(|d| d.name == name)
}

/// Rewrite a legacy option name to its canonical spelling
pub fn canonical_name(name: &str) -> &str {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(name)
}

/// All declared options
pub fn declarations() -> &'static [OptionDecl] {
    OPTIONS
}

/// Validate and normalize one option value from a config file
///
/// Returns `Ok(None)` for `null`, which unsets the option. Path values are
/// resolved against `base_dir`, the directory of the declaring file.
pub(crate) fn normalize(
    decl: &OptionDecl,
    value: &Value,
    base_dir: &Path,
) -> Result<Option<Value>, String> {
    if value.is_null() {
        return Ok(None);
    }

    let type_error = || {
        format!(
            "Compiler option '{}' requires a value of type {}.",
            decl.name,
            decl.kind.describe()
        )
    };

    let normalized = match decl.kind {
        OptionKind::Boolean if value.is_boolean() => value.clone(),
        OptionKind::String if value.is_string() => value.clone(),
        OptionKind::Number if value.is_number() => value.clone(),
        OptionKind::Object if value.is_object() => value.clone(),
        OptionKind::Array if value.is_array() => value.clone(),
        OptionKind::Path => match value.as_str() {
            Some(path) => Value::String(absolutize(base_dir, path)),
            None => return Err(type_error()),
        },
        OptionKind::List | OptionKind::PathList => {
            let items = value.as_array().ok_or_else(type_error)?;
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let item = item.as_str().ok_or_else(type_error)?;
                let item = match decl.kind {
                    OptionKind::PathList => absolutize(base_dir, item),
                    _ if decl.name == "lib" => item.to_lowercase(),
                    _ => item.to_string(),
                };
                out.push(Value::String(item));
            }
            Value::Array(out)
        }
        OptionKind::Enum(allowed) => {
            let raw = value.as_str().ok_or_else(type_error)?;
            let lowered = raw.to_lowercase();
            if !allowed.contains(&lowered.as_str()) {
                let choices = allowed
                    .iter()
                    .map(|v| format!("'{}'", v))
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(format!(
                    "Argument for '--{}' option must be: {}.",
                    decl.name, choices
                ));
            }
            Value::String(lowered)
        }
        _ => return Err(type_error()),
    };

    Ok(Some(normalized))
}
