use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::GraphError;

/// Join a relative glob pattern onto `root`; absolute patterns pass through.
fn rooted_pattern(pattern: &str, root: &Path) -> String {
    if Path::new(pattern).is_absolute() {
        pattern.to_owned()
    } else {
        root.join(pattern).to_string_lossy().into_owned()
    }
}

/// Expand entry globs into the files they match.
///
/// Each pattern is expanded relative to `root`. Directories are dropped and
/// a file matched by several patterns is kept once, at its first position.
/// A pattern that matches nothing contributes nothing; a pattern that is not
/// valid glob syntax fails the whole expansion.
pub fn expand_entries<S: AsRef<str>>(
    patterns: &[S],
    root: &Path,
) -> Result<Vec<PathBuf>, GraphError> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        let full = rooted_pattern(pattern, root);
        let matches = glob::glob(&full).map_err(|source| GraphError::InvalidGlob {
            pattern: pattern.to_owned(),
            source,
        })?;

        let before = files.len();
        for entry in matches {
            match entry {
                Ok(path) if path.is_file() => {
                    if seen.insert(path.clone()) {
                        files.push(path);
                    }
                }
                Ok(_) => {}
                Err(err) => tracing::debug!("skipping unreadable glob match: {err}"),
            }
        }
        tracing::debug!("entry pattern {pattern:?} matched {} file(s)", files.len() - before);
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "").unwrap();
        path
    }

    #[test]
    fn test_expand_relative_patterns_against_root() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(dir.path(), "src/a.ts");
        let b = touch(dir.path(), "src/b.ts");
        touch(dir.path(), "src/c.js");

        let files = expand_entries(&["src/*.ts"], dir.path()).unwrap();
        assert_eq!(files, vec![a, b]);
    }

    #[test]
    fn test_expand_dedups_and_drops_directories() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(dir.path(), "src/a.ts");
        fs::create_dir_all(dir.path().join("src/dir.ts")).unwrap();

        let files = expand_entries(&["src/a.ts", "src/*.ts"], dir.path()).unwrap();
        assert_eq!(files, vec![a]);
    }

    #[test]
    fn test_expand_absolute_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(dir.path(), "x/index.js");
        let pattern = dir.path().join("x/*.js").to_string_lossy().into_owned();

        let files = expand_entries(&[pattern], Path::new("/unrelated")).unwrap();
        assert_eq!(files, vec![a]);
    }

    #[test]
    fn test_zero_matches_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let files = expand_entries(&["nothing/**/*.ts"], dir.path()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_invalid_pattern_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = expand_entries(&["src/***.ts"], dir.path()).unwrap_err();
        assert!(matches!(err, GraphError::InvalidGlob { .. }));
    }
}
