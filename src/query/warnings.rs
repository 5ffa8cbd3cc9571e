use std::path::Path;

use crate::graph::DependencyTree;
use crate::resolver::is_builtin_module;

use super::dependents::Dependents;

/// How many importers an ignored-file warning names before summarizing.
const MAX_NAMED_ISSUERS: usize = 2;

fn quote(path: &Path) -> String {
    format!("{:?}", path.to_string_lossy())
}

/// Diagnostics for every recoverable anomaly in a finished tree:
///
/// - `skip "<id>"` for each ignored file, naming up to two importers
/// - `miss "<request>" in "<issuer>"` for each unresolved edge
/// - one aggregate line for keys that are Node.js built-in modules
///
/// Sorted, so the output does not depend on traversal order.
pub fn find_warnings(tree: &DependencyTree, dependents: &Dependents) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut builtins = Vec::new();

    for (id, deps) in tree {
        if id.to_str().is_some_and(is_builtin_module) {
            builtins.push(quote(id));
        }

        let Some(deps) = deps else {
            let issuers = dependents.get(id).map(Vec::as_slice).unwrap_or_default();
            let mut line = format!("skip {}", quote(id));
            if !issuers.is_empty() {
                let named: Vec<String> = issuers
                    .iter()
                    .take(MAX_NAMED_ISSUERS)
                    .map(|p| quote(p))
                    .collect();
                line.push_str(&format!(", issuers: {}", named.join(", ")));
                if issuers.len() > MAX_NAMED_ISSUERS {
                    line.push_str(&format!(" (+{} more)", issuers.len() - MAX_NAMED_ISSUERS));
                }
            }
            warnings.push(line);
            continue;
        };

        for dep in deps.iter().filter(|d| d.id.is_none()) {
            warnings.push(format!(
                "miss {:?} in {}",
                dep.request,
                quote(&dep.issuer)
            ));
        }
    }

    if !builtins.is_empty() {
        warnings.push(format!("node {} is builtin module(s)", builtins.join(", ")));
    }

    warnings.sort();
    warnings
}
