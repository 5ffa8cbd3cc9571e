use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rayon::Scope;

use crate::error::{FileError, GraphError};
use crate::options::{ParseOptions, ProgressPhase};
use crate::parser::{ExtractOptions, ModuleParser, TreeSitterParser};
use crate::resolver::{ModuleResolver, normalize_path};
use crate::walker::expand_entries;

use super::edge::{Dependency, RawDependency};
use super::node::NodeState;
use super::{BuildOutput, DependencyTree, shorten_path, shorten_tree};

/// Build the dependency tree reachable from `patterns` with the default
/// tree-sitter parser.
pub fn build_dependency_tree<S: AsRef<str>>(
    patterns: &[S],
    options: &ParseOptions,
) -> Result<BuildOutput, GraphError> {
    build_with_parser(patterns, options, &TreeSitterParser)
}

/// Build the dependency tree reachable from `patterns`, extracting
/// dependencies with `parser`.
///
/// Configuration errors (tsconfig, entry globs, worker pool) surface before
/// any file is read. After that nothing fails the build: unreadable or
/// unparseable files are logged and dropped, and every edge that pointed at
/// them is left unresolved.
pub fn build_with_parser<S: AsRef<str>>(
    patterns: &[S],
    options: &ParseOptions,
    parser: &dyn ModuleParser,
) -> Result<BuildOutput, GraphError> {
    let resolver = ModuleResolver::from_options(options)?;
    let files = expand_entries(patterns, &options.root)?;
    if files.is_empty() {
        tracing::info!("no entry files matched");
        return Ok(BuildOutput::default());
    }
    tracing::debug!(
        "building from {} entry file(s), tsconfig aliases {}",
        files.len(),
        if resolver.has_alias() { "on" } else { "off" }
    );

    let mut pool = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("depgraph-{i}"));
    if let Some(threads) = options.threads {
        pool = pool.num_threads(threads);
    }
    let pool = pool.build()?;

    let builder = TreeBuilder {
        options,
        resolver: &resolver,
        parser,
        extract: ExtractOptions {
            skip_dynamic_imports: options.skip_dynamic_imports,
            transform: options.transform,
        },
        nodes: DashMap::new(),
    };

    // Entry files are already paths on disk, never package requests.
    let ids: Vec<PathBuf> = files.iter().map(|file| normalize_path(file)).collect();

    // Every claimed file is its own task; none waits on another, so the
    // traversal depth never shows up on a worker's stack.
    pool.scope(|scope| {
        for id in &ids {
            builder.enqueue(scope, id);
        }
    });

    let (tree, failed) = builder.finish();

    let entries = ids
        .into_iter()
        .zip(files)
        .map(|(id, file)| if failed.contains(&id) { file } else { id });
    Ok(match &options.context {
        Some(context) => BuildOutput {
            entries: entries.map(|e| shorten_path(&e, context)).collect(),
            tree: shorten_tree(tree, context),
        },
        None => BuildOutput {
            entries: entries.collect(),
            tree,
        },
    })
}

/// Shared state of one traversal. Workers only ever touch `nodes`.
struct TreeBuilder<'a> {
    options: &'a ParseOptions,
    resolver: &'a ModuleResolver,
    parser: &'a dyn ModuleParser,
    extract: ExtractOptions,
    nodes: DashMap<PathBuf, NodeState>,
}

impl TreeBuilder<'_> {
    /// Spawn the analysis of `id` if this is the first time anyone reached it.
    fn enqueue<'s>(&'s self, scope: &Scope<'s>, id: &Path) {
        if self.claim(id) {
            let id = id.to_path_buf();
            scope.spawn(move |scope| self.analyze(scope, id));
        }
    }

    /// Atomically insert the first state for `id`. Returns `true` when the
    /// caller now owns the file and must analyze it.
    ///
    /// The shard lock only lives for the duration of this call; no worker
    /// holds it while resolving or parsing.
    fn claim(&self, id: &Path) -> bool {
        match self.nodes.entry(id.to_path_buf()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                if !self.options.is_included(id) {
                    tracing::debug!("skip {}", id.display());
                    slot.insert(NodeState::Ignored);
                    false
                } else if !self.options.is_source_like(id) {
                    slot.insert(NodeState::Analyzed(Vec::new()));
                    false
                } else {
                    slot.insert(NodeState::InProgress);
                    true
                }
            }
        }
    }

    /// Read and parse a claimed file, resolve its requests in source order
    /// and hand every newly claimed target to its own task.
    ///
    /// Edges record the target's identity as soon as it is resolved. A
    /// target that later fails is turned back into an unresolved edge by
    /// [`TreeBuilder::finish`].
    fn analyze<'s>(&'s self, scope: &Scope<'s>, id: PathBuf) {
        self.options.report(ProgressPhase::Start, &id);
        let parsed = self.parse(&id);
        self.options.report(ProgressPhase::End, &id);

        let raw = match parsed {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!("{err}");
                self.nodes.insert(id, NodeState::Failed);
                return;
            }
        };
        tracing::debug!("{}: {} dependencies", id.display(), raw.len());

        let context = id.parent().unwrap_or_else(|| Path::new(""));
        let deps: Vec<Dependency> = raw
            .into_iter()
            .map(|raw| {
                let target = self.resolver.resolve(context, &raw.request);
                match &target {
                    Some(target) => self.enqueue(scope, target),
                    None => {
                        tracing::debug!("unresolved {:?} from {}", raw.request, context.display())
                    }
                }
                Dependency::new(id.clone(), raw, target)
            })
            .collect();

        self.nodes.insert(id, NodeState::Analyzed(deps));
    }

    fn parse(&self, id: &Path) -> Result<Vec<RawDependency>, FileError> {
        let source = fs::read(id).map_err(|err| FileError::from_io(id.to_path_buf(), err))?;
        self.parser.parse_dependencies(id, &source, self.extract)
    }

    /// Turn the per-node states into the finished tree, together with the
    /// identities that failed.
    ///
    /// Failed files are dropped and edges pointing at them become
    /// unresolved.
    fn finish(self) -> (DependencyTree, HashSet<PathBuf>) {
        let failed: HashSet<PathBuf> = self
            .nodes
            .iter()
            .filter(|entry| entry.value().is_failed())
            .map(|entry| entry.key().clone())
            .collect();

        let mut analyzed = 0usize;
        let mut ignored = 0usize;
        let mut tree = DependencyTree::new();
        for (id, state) in self.nodes {
            match state {
                NodeState::Failed => {}
                NodeState::Ignored => {
                    ignored += 1;
                    tree.insert(id, None);
                }
                NodeState::Analyzed(mut deps) => {
                    analyzed += 1;
                    for dep in &mut deps {
                        if dep.id.as_ref().is_some_and(|target| failed.contains(target)) {
                            dep.id = None;
                        }
                    }
                    tree.insert(id, Some(deps));
                }
                NodeState::InProgress => {
                    // Every task has joined by now; a leftover claim would be a
                    // traversal bug. Keep the node as a leaf.
                    tracing::error!("{} still in progress after traversal", id.display());
                    tree.insert(id, Some(Vec::new()));
                }
            }
        }

        tracing::info!(
            "dependency tree: {analyzed} analyzed, {ignored} ignored, {} failed",
            failed.len()
        );
        (tree, failed)
    }
}
