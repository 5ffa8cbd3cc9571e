use std::collections::HashMap;
use std::path::{Path, PathBuf};

use petgraph::Directed;
use petgraph::graph::{Graph, NodeIndex};

use crate::graph::DependencyTree;
use crate::graph::edge::DependencyKind;

/// Import graph over the analyzed files of a tree. Ignored nodes and
/// unresolved edges are left out since they can never close a cycle.
fn module_graph(tree: &DependencyTree, skip_dynamic: bool) -> Graph<&Path, (), Directed> {
    let mut graph: Graph<&Path, (), Directed> = Graph::new();
    let mut index: HashMap<&Path, NodeIndex> = HashMap::new();

    // BTreeMap order, so node indices follow key order.
    for (id, deps) in tree {
        if deps.is_some() {
            index.insert(id.as_path(), graph.add_node(id.as_path()));
        }
    }

    for (id, deps) in tree {
        let (Some(deps), Some(&from)) = (deps, index.get(id.as_path())) else {
            continue;
        };
        for dep in deps {
            if skip_dynamic && dep.kind == DependencyKind::DynamicImport {
                continue;
            }
            if let Some(&to) = dep.id.as_deref().and_then(|target| index.get(target)) {
                graph.add_edge(from, to, ());
            }
        }
    }

    graph
}

/// Successors in edge insertion (source) order.
fn successors(graph: &Graph<&Path, (), Directed>, node: NodeIndex) -> Vec<NodeIndex> {
    // petgraph lists neighbors most recent first.
    let mut out: Vec<NodeIndex> = graph.neighbors(node).collect();
    out.reverse();
    out
}

/// Enumerate circular dependencies.
///
/// Every analyzed file is explored as a depth-first root in key order unless
/// an earlier probe already consumed it. A file is consumed the first time
/// the walk enters it, so no file is expanded twice across the whole run,
/// but a file can still close cycles for probes that reach it while it is on
/// their path. Each cycle is reported as the path suffix starting at the
/// repeated file; the closing edge back to the first element is implicit.
///
/// With `skip_dynamic`, `import()` edges are not followed.
pub fn find_cycles(tree: &DependencyTree, skip_dynamic: bool) -> Vec<Vec<PathBuf>> {
    let graph = module_graph(tree, skip_dynamic);
    let count = graph.node_count();

    let mut consumed = vec![false; count];
    // Position of a node on the current path, if it is on it.
    let mut on_path: Vec<Option<usize>> = vec![None; count];
    let mut path: Vec<NodeIndex> = Vec::new();
    let mut cycles = Vec::new();

    for root in graph.node_indices() {
        if consumed[root.index()] {
            continue;
        }

        // (node, successors, next successor to try)
        let mut stack: Vec<(NodeIndex, Vec<NodeIndex>, usize)> = Vec::new();
        consumed[root.index()] = true;
        on_path[root.index()] = Some(path.len());
        path.push(root);
        stack.push((root, successors(&graph, root), 0));

        while let Some((node, next, cursor)) = stack.last_mut() {
            let Some(&target) = next.get(*cursor) else {
                on_path[node.index()] = None;
                path.pop();
                stack.pop();
                continue;
            };
            *cursor += 1;

            if let Some(start) = on_path[target.index()] {
                cycles.push(path[start..].iter().map(|&n| graph[n].to_path_buf()).collect());
            } else if !consumed[target.index()] {
                consumed[target.index()] = true;
                on_path[target.index()] = Some(path.len());
                path.push(target);
                stack.push((target, successors(&graph, target), 0));
            }
        }
    }

    cycles
}
