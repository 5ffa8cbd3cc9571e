use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;

use crate::error::GraphError;

/// Default candidate extensions, in probe order. `""` is always probed first.
pub const DEFAULT_EXTENSIONS: &[&str] = &["", ".ts", ".tsx", ".mjs", ".js", ".jsx", ".json"];

/// Default extensions whose files are parsed for dependencies.
pub const DEFAULT_JS: &[&str] = &[".ts", ".tsx", ".mjs", ".js", ".jsx"];

/// Default exclusion pattern.
pub const DEFAULT_EXCLUDE: &str = "node_modules";

/// Phase reported to the progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    Start,
    End,
}

/// Observability hook, called right before and right after a file is parsed.
pub type ProgressFn = Arc<dyn Fn(ProgressPhase, &Path) + Send + Sync>;

/// Everything a graph build needs, constructed once at the boundary and
/// passed down by reference. Nothing in the core reads the environment.
#[derive(Clone)]
pub struct ParseOptions {
    /// Base directory that relative entry globs are expanded against.
    pub root: PathBuf,
    /// When set, tree keys and ids are rewritten relative to this directory.
    pub context: Option<PathBuf>,
    /// Candidate suffixes probed by the resolver, in order.
    pub extensions: Vec<String>,
    /// Extensions marking a file as source-like (parsed for dependencies).
    pub js: Vec<String>,
    /// Identities not matching this are ignored. `None` includes everything.
    pub include: Option<Regex>,
    /// Identities matching this are ignored. `None` excludes nothing.
    pub exclude: Option<Regex>,
    /// tsconfig used for path-alias resolution.
    pub tsconfig: Option<PathBuf>,
    /// Elide type-only dependencies of `.ts`/`.tsx` files before extraction.
    pub transform: bool,
    /// Do not extract `import(...)` at all.
    pub skip_dynamic_imports: bool,
    pub progress: Option<ProgressFn>,
    /// Worker threads for the traversal pool. `None` lets rayon decide.
    pub threads: Option<usize>,
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("root", &self.root)
            .field("context", &self.context)
            .field("extensions", &self.extensions)
            .field("js", &self.js)
            .field("include", &self.include.as_ref().map(Regex::as_str))
            .field("exclude", &self.exclude.as_ref().map(Regex::as_str))
            .field("tsconfig", &self.tsconfig)
            .field("transform", &self.transform)
            .field("skip_dynamic_imports", &self.skip_dynamic_imports)
            .field("progress", &self.progress.is_some())
            .field("threads", &self.threads)
            .finish()
    }
}

impl ParseOptions {
    /// Options with the default extension lists and filters, rooted at `root`.
    ///
    /// `root` doubles as the context directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            context: Some(root.clone()),
            root,
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| (*s).to_owned()).collect(),
            js: DEFAULT_JS.iter().map(|s| (*s).to_owned()).collect(),
            include: None,
            // A literal pattern always compiles.
            exclude: Regex::new(DEFAULT_EXCLUDE).ok(),
            tsconfig: None,
            transform: false,
            skip_dynamic_imports: false,
            progress: None,
            threads: None,
        }
    }

    /// Set the candidate extensions. Accepts `ts`, `.ts` or `""`; the empty
    /// suffix is always kept at the front.
    pub fn with_extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = normalize_extensions(exts, true);
        self
    }

    /// Set the source-like extensions.
    pub fn with_js<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.js = normalize_extensions(exts, false);
        self
    }

    /// Compile and set the include pattern. An empty pattern includes everything.
    pub fn with_include(mut self, pattern: &str) -> Result<Self, GraphError> {
        self.include = compile_filter("include", pattern)?;
        Ok(self)
    }

    /// Compile and set the exclude pattern. An empty pattern excludes nothing.
    pub fn with_exclude(mut self, pattern: &str) -> Result<Self, GraphError> {
        self.exclude = compile_filter("exclude", pattern)?;
        Ok(self)
    }

    pub fn with_context(mut self, context: Option<PathBuf>) -> Self {
        self.context = context;
        self
    }

    pub fn with_tsconfig(mut self, tsconfig: Option<PathBuf>) -> Self {
        self.tsconfig = tsconfig;
        self
    }

    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    /// `true` when `id` survives the include/exclude filters.
    pub fn is_included(&self, id: &Path) -> bool {
        let text = id.to_string_lossy();
        let included = self.include.as_ref().is_none_or(|re| re.is_match(&text));
        let excluded = self.exclude.as_ref().is_some_and(|re| re.is_match(&text));
        included && !excluded
    }

    /// `true` when `id` has one of the source-like extensions.
    pub fn is_source_like(&self, id: &Path) -> bool {
        match id.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.js.iter().any(|js| js.strip_prefix('.') == Some(ext)),
            None => false,
        }
    }

    /// The tsconfig to use: the explicit one, or `<context>/tsconfig.json`
    /// when it exists. An explicit path that is not a file is fatal.
    pub fn effective_tsconfig(&self) -> Result<Option<PathBuf>, GraphError> {
        match &self.tsconfig {
            Some(path) if path.is_file() => Ok(Some(path.clone())),
            Some(path) => Err(GraphError::TsconfigMissing { path: path.clone() }),
            None => {
                let base = self.context.as_deref().unwrap_or(&self.root);
                let candidate = base.join("tsconfig.json");
                Ok(candidate.is_file().then_some(candidate))
            }
        }
    }

    pub(crate) fn report(&self, phase: ProgressPhase, id: &Path) {
        if let Some(progress) = &self.progress {
            progress(phase, id);
        }
    }
}

fn compile_filter(which: &'static str, pattern: &str) -> Result<Option<Regex>, GraphError> {
    if pattern.is_empty() {
        return Ok(None);
    }
    Regex::new(pattern)
        .map(Some)
        .map_err(|source| GraphError::InvalidFilter {
            which,
            pattern: pattern.to_owned(),
            source,
        })
}

fn normalize_extensions<I, S>(exts: I, with_empty: bool) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    if with_empty {
        out.push(String::new());
    }
    for ext in exts {
        let ext = ext.as_ref().trim();
        if ext.is_empty() {
            continue;
        }
        let ext = if ext.starts_with('.') {
            ext.to_owned()
        } else {
            format!(".{ext}")
        };
        if !out.contains(&ext) {
            out.push(ext);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extensions_keep_empty_suffix_first() {
        let opts = ParseOptions::new("/proj").with_extensions(["ts", ".js", "", "ts"]);
        assert_eq!(opts.extensions, vec!["", ".ts", ".js"]);
    }

    #[test]
    fn test_default_filters_exclude_node_modules() {
        let opts = ParseOptions::new("/proj");
        assert!(opts.is_included(Path::new("/proj/src/a.ts")));
        assert!(!opts.is_included(Path::new("/proj/node_modules/x/index.js")));
    }

    #[test]
    fn test_empty_exclude_excludes_nothing() {
        let opts = ParseOptions::new("/proj").with_exclude("").unwrap();
        assert!(opts.is_included(Path::new("/proj/node_modules/x/index.js")));
    }

    #[test]
    fn test_include_pattern_restricts() {
        let opts = ParseOptions::new("/proj").with_include(r"\.tsx?$").unwrap();
        assert!(opts.is_included(Path::new("/proj/a.ts")));
        assert!(!opts.is_included(Path::new("/proj/a.json")));
    }

    #[test]
    fn test_invalid_filter_is_fatal() {
        let err = ParseOptions::new("/proj").with_include("(unclosed").unwrap_err();
        assert!(matches!(err, GraphError::InvalidFilter { which: "include", .. }));
    }

    #[test]
    fn test_source_like_extensions() {
        let opts = ParseOptions::new("/proj");
        assert!(opts.is_source_like(Path::new("a.tsx")));
        assert!(opts.is_source_like(Path::new("a.mjs")));
        assert!(!opts.is_source_like(Path::new("a.json")));
        assert!(!opts.is_source_like(Path::new("fs")));
    }

    #[test]
    fn test_explicit_tsconfig_must_exist() {
        let opts = ParseOptions::new("/proj")
            .with_tsconfig(Some(PathBuf::from("/definitely/not/here/tsconfig.json")));
        assert!(matches!(
            opts.effective_tsconfig(),
            Err(GraphError::TsconfigMissing { .. })
        ));
    }
}
