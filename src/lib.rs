//! Module dependency graphs for TypeScript/JavaScript projects.
//!
//! [`build_dependency_tree`] expands entry globs, resolves every import the
//! way Node.js and TypeScript do and records the reachable modules in a
//! [`DependencyTree`]. The [`query`] functions then run over the finished
//! tree: circular dependencies, reverse dependencies, warnings and unused
//! files.

pub mod config;
pub mod error;
pub mod graph;
pub mod options;
pub mod parser;
pub mod query;
pub mod resolver;
pub mod walker;

pub use error::{FileError, GraphError};
pub use graph::builder::{build_dependency_tree, build_with_parser};
pub use graph::edge::{Dependency, DependencyKind};
pub use graph::{AnalysisOutput, BuildOutput, DependencyTree};
pub use options::{ParseOptions, ProgressFn, ProgressPhase};
pub use resolver::is_builtin_module;

/// Build the tree for `patterns` and enumerate its cycles.
///
/// `skip_dynamic_in_cycles` leaves `import()` edges in the tree but does not
/// follow them when searching cycles.
pub fn analyze<S: AsRef<str>>(
    patterns: &[S],
    options: &ParseOptions,
    skip_dynamic_in_cycles: bool,
) -> Result<AnalysisOutput, GraphError> {
    let BuildOutput { entries, tree } = build_dependency_tree(patterns, options)?;
    let cycles = query::find_cycles(&tree, skip_dynamic_in_cycles);
    Ok(AnalysisOutput {
        entries,
        tree,
        cycles,
    })
}
