use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::graph::DependencyTree;

/// Identity -> sorted, de-duplicated identities of the files that import it.
pub type Dependents = BTreeMap<PathBuf, Vec<PathBuf>>;

/// Reverse every resolved edge of `tree`.
///
/// Only edges with a resolved target count. A file importing the same
/// target twice is listed once.
pub fn find_dependents(tree: &DependencyTree) -> Dependents {
    let mut dependents = Dependents::new();
    for (issuer, deps) in tree {
        for dep in deps.iter().flatten() {
            if let Some(target) = &dep.id {
                dependents
                    .entry(target.clone())
                    .or_default()
                    .push(issuer.clone());
            }
        }
    }
    for issuers in dependents.values_mut() {
        issuers.sort();
        issuers.dedup();
    }
    dependents
}
