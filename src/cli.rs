use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Analyze the dependency tree of TypeScript/JavaScript files and report
/// circular dependencies.
///
/// Entry files are given as paths or globs relative to the current
/// directory. Options not given on the command line are read from
/// `depgraph.toml` in the current directory, when it exists.
#[derive(Parser, Debug)]
#[command(name = "depgraph", version, about, long_about = None)]
pub struct Cli {
    /// The file paths or globs.
    #[arg(required = true)]
    pub files: Vec<String>,

    /// Directory identities are shortened against (default: current directory).
    #[arg(long)]
    pub context: Option<PathBuf>,

    /// Comma separated extensions to resolve.
    #[arg(long, visible_alias = "ext", value_delimiter = ',')]
    pub extensions: Option<Vec<String>>,

    /// Comma separated extensions indicating a file is JavaScript-like.
    #[arg(long, value_delimiter = ',')]
    pub js: Option<Vec<String>>,

    /// Regex of included identities (default: everything).
    #[arg(long)]
    pub include: Option<String>,

    /// Regex of excluded identities; an empty string excludes nothing (default: node_modules).
    #[arg(long)]
    pub exclude: Option<String>,

    /// Write the analysis as JSON to this file.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Do not print the dependency tree.
    #[arg(long)]
    pub no_tree: bool,

    /// Do not print circular dependencies.
    #[arg(long)]
    pub no_circular: bool,

    /// Do not print warnings.
    #[arg(long)]
    pub no_warning: bool,

    /// tsconfig used to resolve path aliases (default: tsconfig.json in the context directory).
    #[arg(long)]
    pub tsconfig: Option<PathBuf>,

    /// Drop dependencies that only carry types in .ts/.tsx files.
    #[arg(short = 'T', long)]
    pub transform: bool,

    /// Exit with CODE when CASE occurs, e.g. `circular:1`. `circular` is the only case.
    #[arg(long, value_name = "CASE:CODE", value_delimiter = ',', value_parser = parse_exit_code)]
    pub exit_code: Vec<ExitCodeRule>,

    /// Glob of files to check for being unreachable from the entries.
    #[arg(long, value_name = "GLOB")]
    pub detect_unused_files_from: Option<String>,

    /// Skip `import(...)` for the whole tree, or only for cycle detection.
    #[arg(long, value_enum)]
    pub skip_dynamic_imports: Option<SkipDynamicImports>,

    /// Worker threads for the traversal (default: one per core).
    #[arg(long)]
    pub threads: Option<usize>,

    /// Log resolution and parsing progress to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Where `import(...)` is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SkipDynamicImports {
    /// Not extracted at all.
    Tree,
    /// Extracted, but not followed when searching cycles.
    Circular,
}

impl SkipDynamicImports {
    /// Parse the config-file spelling (`"tree"` / `"circular"`).
    pub fn from_name(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }
}

/// Condition that maps to a process exit code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitCase {
    Circular,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExitCodeRule {
    pub case: ExitCase,
    pub code: i32,
}

/// Parse one `CASE:CODE` pair.
fn parse_exit_code(value: &str) -> Result<ExitCodeRule, String> {
    let (label, code) = value
        .split_once(':')
        .ok_or_else(|| format!("expected CASE:CODE, got {value:?}"))?;
    let code: i32 = code
        .trim()
        .parse()
        .map_err(|_| format!("exit code should be a number, got {code:?}"))?;
    if !(0..=128).contains(&code) {
        return Err(format!("exit code should be between 0 and 128, got {code}"));
    }
    let case = match label.trim() {
        "circular" => ExitCase::Circular,
        other => return Err(format!("unsupported exit case {other:?}")),
    };
    Ok(ExitCodeRule { case, code })
}
