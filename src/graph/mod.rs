pub mod builder;
pub mod edge;
pub mod node;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use edge::Dependency;

/// Identity -> `None` (ignored) or the ordered edges of an analyzed file.
///
/// A missing key means the file was never reached. `Some(vec![])` is a leaf,
/// which is distinct from an ignored `None`. Ordered so that serializing the
/// same graph twice is byte-identical.
pub type DependencyTree = BTreeMap<PathBuf, Option<Vec<Dependency>>>;

/// Result of a single graph-build run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildOutput {
    /// Identities of every file matched by the entry globs, in match order.
    pub entries: Vec<PathBuf>,
    pub tree: DependencyTree,
}

impl BuildOutput {
    /// No entry glob matched anything.
    pub fn has_no_entries(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries matched, but every reached file was excluded by the filters.
    pub fn all_ignored(&self) -> bool {
        !self.tree.is_empty() && self.tree.values().all(Option::is_none)
    }
}

/// The serializable artifact handed to presentation code.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisOutput {
    pub entries: Vec<PathBuf>,
    pub tree: DependencyTree,
    pub cycles: Vec<Vec<PathBuf>>,
}

/// Express `path` relative to `context`, or return it unchanged when it does
/// not live under `context` (built-in module names, files outside the project).
pub fn shorten_path(path: &Path, context: &Path) -> PathBuf {
    match path.strip_prefix(context) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
        _ => path.to_path_buf(),
    }
}

/// Rewrite every key, issuer and resolved id relative to `context`.
pub fn shorten_tree(tree: DependencyTree, context: &Path) -> DependencyTree {
    tree.into_iter()
        .map(|(key, deps)| {
            let short_key = shorten_path(&key, context);
            let deps = deps.map(|deps| {
                deps.into_iter()
                    .map(|dep| Dependency {
                        issuer: short_key.clone(),
                        id: dep.id.map(|id| shorten_path(&id, context)),
                        ..dep
                    })
                    .collect()
            });
            (short_key, deps)
        })
        .collect()
}
