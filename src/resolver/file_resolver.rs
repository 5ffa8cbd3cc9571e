use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::builtins::is_builtin_module;
use super::normalize_path;

/// Folder searched in the context directory and each ancestor for packages.
const PACKAGE_DIR: &str = "node_modules";

/// Entry fields of a package manifest. Kept as raw JSON values so a
/// malformed field (`"main": 42`) falls through to file probing instead of
/// failing the whole manifest.
#[derive(Debug, Default, Deserialize)]
struct PackageManifest {
    module: Option<serde_json::Value>,
    main: Option<serde_json::Value>,
}

impl PackageManifest {
    fn read(path: &Path) -> Option<Self> {
        let contents = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(manifest) => Some(manifest),
            Err(err) => {
                tracing::debug!("ignoring unreadable manifest {}: {err}", path.display());
                None
            }
        }
    }

    /// The ESM-oriented `module` field, else `main`.
    fn entry(&self) -> Option<&str> {
        self.module
            .as_ref()
            .and_then(|v| v.as_str())
            .or_else(|| self.main.as_ref().and_then(|v| v.as_str()))
            .filter(|s| !s.is_empty())
    }
}

fn with_suffix(path: &Path, ext: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(ext);
    PathBuf::from(s)
}

/// Probe `request + ext` for every candidate extension, in order.
///
/// A candidate that is a file wins. A candidate that is a directory is probed
/// as `<candidate>/index` with the same extension list; if that finds nothing
/// the remaining extensions are still tried.
pub fn append_suffix(request: &Path, extensions: &[String]) -> Option<PathBuf> {
    for ext in extensions {
        let candidate = with_suffix(request, ext);
        let Ok(meta) = fs::metadata(&candidate) else {
            continue;
        };
        if meta.is_file() {
            return Some(candidate);
        }
        if meta.is_dir()
            && let Some(found) = append_suffix(&candidate.join("index"), extensions)
        {
            return Some(found);
        }
    }
    None
}

/// Split a package specifier into its package name and sub-path.
///
/// - `react` → (`react`, ``)
/// - `lodash/merge` → (`lodash`, `merge`)
/// - `@org/utils/helpers` → (`@org/utils`, `helpers`)
fn split_package_specifier(specifier: &str) -> (&str, &str) {
    let name_end = if specifier.starts_with('@') {
        specifier
            .match_indices('/')
            .nth(1)
            .map(|(i, _)| i)
            .unwrap_or(specifier.len())
    } else {
        specifier.find('/').unwrap_or(specifier.len())
    };
    let (name, rest) = specifier.split_at(name_end);
    (name, rest.trim_start_matches('/'))
}

/// Look a package specifier up in `<dir>/node_modules` for `context` and
/// every ancestor, nearest first.
fn resolve_package(context: &Path, request: &str, extensions: &[String]) -> Option<PathBuf> {
    let (name, subpath) = split_package_specifier(request);

    for dir in context.ancestors() {
        let lookup = dir.join(PACKAGE_DIR);
        if !lookup.is_dir() {
            continue;
        }

        if !subpath.is_empty() {
            if let Some(found) = append_suffix(&lookup.join(request), extensions) {
                return Some(found);
            }
            continue;
        }

        let pkg_dir = lookup.join(name);
        let manifest_path = pkg_dir.join("package.json");
        if manifest_path.is_file() {
            let entry = PackageManifest::read(&manifest_path)
                .and_then(|m| m.entry().map(str::to_owned));
            if let Some(entry) = entry
                && let Some(found) = append_suffix(&normalize_path(&pkg_dir.join(entry)), extensions)
            {
                return Some(found);
            }
        }

        if let Some(found) = append_suffix(&pkg_dir, extensions) {
            return Some(found);
        }
    }

    None
}

/// Resolve `request` from `context` without any alias configuration.
///
/// 1. Absolute requests are suffix-probed as is.
/// 2. Requests starting with `.` are joined to `context` and suffix-probed.
/// 3. Node.js built-ins resolve to their own name.
/// 4. Anything else is a package, looked up through ancestor `node_modules`.
///
/// A missing file is a normal outcome (`None`), never an error.
pub fn simple_resolve(context: &Path, request: &str, extensions: &[String]) -> Option<PathBuf> {
    if request.is_empty() {
        return None;
    }
    let as_path = Path::new(request);
    if as_path.is_absolute() {
        return append_suffix(&normalize_path(as_path), extensions);
    }
    if request.starts_with('.') {
        return append_suffix(&normalize_path(&context.join(request)), extensions);
    }
    if is_builtin_module(request) {
        return Some(PathBuf::from(request));
    }
    resolve_package(context, request, extensions)
}
