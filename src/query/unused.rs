use std::path::{Path, PathBuf};

use crate::error::GraphError;
use crate::graph::{DependencyTree, shorten_path};
use crate::walker::expand_entries;

/// Files matched by `pattern` that never made it into `tree`.
///
/// Matches are expanded relative to `root` and shortened against `context`
/// the same way tree keys are, then compared by identity. Sorted.
pub fn find_unused_files(
    pattern: &str,
    root: &Path,
    context: Option<&Path>,
    tree: &DependencyTree,
) -> Result<Vec<PathBuf>, GraphError> {
    let mut unused: Vec<PathBuf> = expand_entries(&[pattern], root)?
        .into_iter()
        .map(|file| match context {
            Some(context) => shorten_path(&file, context),
            None => file,
        })
        .filter(|file| !tree.contains_key(file))
        .collect();
    unused.sort();
    Ok(unused)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_unused_files_are_sorted_and_shortened() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        for name in ["a.ts", "b.ts", "c.ts", "z.ts"] {
            fs::write(dir.path().join("src").join(name), "").unwrap();
        }
        let mut tree = DependencyTree::new();
        tree.insert(PathBuf::from("src/a.ts"), Some(vec![]));
        tree.insert(PathBuf::from("src/c.ts"), None);

        let unused = find_unused_files("src/**/*.ts", dir.path(), Some(dir.path()), &tree).unwrap();
        assert_eq!(unused, vec![PathBuf::from("src/b.ts"), PathBuf::from("src/z.ts")]);
    }

    #[test]
    fn test_unused_without_context_uses_absolute_paths() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.js"), "").unwrap();
        fs::write(dir.path().join("b.js"), "").unwrap();
        let mut tree = DependencyTree::new();
        tree.insert(dir.path().join("a.js"), Some(vec![]));

        let unused = find_unused_files("*.js", dir.path(), None, &tree).unwrap();
        assert_eq!(unused, vec![dir.path().join("b.js")]);
    }
}
