use std::fs;
use std::path::{Path, PathBuf};

use oxc_resolver::{ResolveOptions, Resolver, TsconfigOptions, TsconfigReferences};
use serde_json::Value;

use crate::error::GraphError;

/// Suffix probed after the caller's extensions so declaration-only targets
/// are still found (and then rejected by the caller).
const DECLARATION_EXT: &str = ".d.ts";

/// Drop `//` and `/* */` comments and trailing commas from a JSONC document,
/// leaving string literals untouched.
pub fn strip_jsonc(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for skipped in chars.by_ref() {
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    prev = skipped;
                }
            }
            ']' | '}' => {
                // A trailing comma sits between the last value and the closer.
                let trimmed = out.trim_end().len();
                if out[..trimmed].ends_with(',') {
                    out.truncate(trimmed - 1);
                }
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    out
}

fn invalid(path: &Path, reason: impl Into<String>) -> GraphError {
    GraphError::TsconfigInvalid {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Read and sanity-check a tsconfig before any traversal starts.
///
/// Checks the shape of the fields alias resolution depends on:
/// `compilerOptions` is an object, `baseUrl` a string, and `paths` maps each
/// pattern to an array of strings.
pub fn load_tsconfig(path: &Path) -> Result<Value, GraphError> {
    let raw = fs::read_to_string(path).map_err(|source| GraphError::TsconfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let config: Value =
        serde_json::from_str(&strip_jsonc(&raw)).map_err(|e| invalid(path, e.to_string()))?;

    let Some(root) = config.as_object() else {
        return Err(invalid(path, "top level is not an object"));
    };
    let Some(options) = root.get("compilerOptions") else {
        return Ok(config);
    };
    let Some(options) = options.as_object() else {
        return Err(invalid(path, "\"compilerOptions\" is not an object"));
    };

    if let Some(base_url) = options.get("baseUrl")
        && !base_url.is_string()
    {
        return Err(invalid(path, "\"baseUrl\" is not a string"));
    }

    if let Some(paths) = options.get("paths") {
        let Some(paths) = paths.as_object() else {
            return Err(invalid(path, "\"paths\" is not an object"));
        };
        for (pattern, targets) in paths {
            let well_formed = targets
                .as_array()
                .is_some_and(|list| list.iter().all(Value::is_string));
            if !well_formed {
                return Err(invalid(
                    path,
                    format!("\"paths\" entry {pattern:?} is not an array of strings"),
                ));
            }
        }
    }

    Ok(config)
}

/// `true` for TypeScript declaration files (`.d.ts`, `.d.mts`, `.d.cts`).
pub fn is_declaration_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    name.ends_with(".d.ts") || name.ends_with(".d.mts") || name.ends_with(".d.cts")
}

/// Strip the declaration suffix: `types/foo.d.ts` → `types/foo`.
pub fn declaration_base(path: &Path) -> Option<PathBuf> {
    let s = path.to_str()?;
    [".d.ts", ".d.mts", ".d.cts"]
        .iter()
        .find_map(|suffix| s.strip_suffix(suffix))
        .map(PathBuf::from)
}

/// Path-mapping resolution driven by a tsconfig (`baseUrl`, `paths`,
/// project references).
pub struct AliasResolver {
    resolver: Resolver,
    config_file: PathBuf,
}

impl std::fmt::Debug for AliasResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AliasResolver")
            .field("config_file", &self.config_file)
            .finish_non_exhaustive()
    }
}

impl AliasResolver {
    /// Validate `config_file` and build a resolver for it.
    ///
    /// `extensions` is the caller's ordered candidate list; the empty suffix
    /// is dropped (oxc always tries the request verbatim first) and `.d.ts`
    /// is appended last.
    pub fn load(config_file: &Path, extensions: &[String]) -> Result<Self, GraphError> {
        load_tsconfig(config_file)?;

        let mut exts: Vec<String> = extensions
            .iter()
            .filter(|e| !e.is_empty())
            .cloned()
            .collect();
        if !exts.iter().any(|e| e == DECLARATION_EXT) {
            exts.push(DECLARATION_EXT.to_owned());
        }

        let resolver = Resolver::new(ResolveOptions {
            extensions: exts,
            tsconfig: Some(TsconfigOptions {
                config_file: config_file.to_path_buf(),
                references: TsconfigReferences::Auto,
            }),
            main_fields: vec!["module".into(), "main".into()],
            condition_names: vec!["node".into(), "import".into(), "require".into()],
            builtin_modules: true,
            symlinks: false,
            ..ResolveOptions::default()
        });

        Ok(Self {
            resolver,
            config_file: config_file.to_path_buf(),
        })
    }

    /// Map `request` through the tsconfig. Built-ins and failures are `None`;
    /// the plain resolver handles those.
    pub fn resolve(&self, context: &Path, request: &str) -> Option<PathBuf> {
        match self.resolver.resolve(context, request) {
            Ok(resolution) => Some(resolution.into_path_buf()),
            Err(oxc_resolver::ResolveError::Builtin { .. }) => None,
            Err(err) => {
                tracing::trace!("alias miss for {request:?} in {}: {err}", context.display());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_jsonc_comments_and_trailing_commas() {
        let input = r#"{
            // line comment
            "compilerOptions": { /* block */ "baseUrl": ".", },
            "include": ["src/**/*", ],
            "url": "http://example.com/*not-a-comment*/"
        }"#;
        let value: Value = serde_json::from_str(&strip_jsonc(input)).unwrap();
        assert_eq!(value["compilerOptions"]["baseUrl"], ".");
        assert_eq!(value["include"][0], "src/**/*");
        assert_eq!(value["url"], "http://example.com/*not-a-comment*/");
    }

    #[test]
    fn test_strip_jsonc_keeps_escaped_quotes() {
        let input = r#"{"a": "x\"//y"}"#;
        let value: Value = serde_json::from_str(&strip_jsonc(input)).unwrap();
        assert_eq!(value["a"], "x\"//y");
    }

    #[test]
    fn test_load_tsconfig_rejects_bad_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tsconfig.json");

        fs::write(&path, r#"{"compilerOptions":{"paths":{"@/*":"src/*"}}}"#).unwrap();
        assert!(matches!(
            load_tsconfig(&path),
            Err(GraphError::TsconfigInvalid { .. })
        ));

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            load_tsconfig(&path),
            Err(GraphError::TsconfigInvalid { .. })
        ));

        fs::write(&path, r#"{"compilerOptions":{"paths":{"@/*":["src/*"]}}}"#).unwrap();
        assert!(load_tsconfig(&path).is_ok());
    }

    #[test]
    fn test_load_tsconfig_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_tsconfig(&dir.path().join("nope.json")),
            Err(GraphError::TsconfigRead { .. })
        ));
    }

    #[test]
    fn test_declaration_helpers() {
        assert!(is_declaration_file(Path::new("/a/foo.d.ts")));
        assert!(!is_declaration_file(Path::new("/a/foo.ts")));
        assert_eq!(
            declaration_base(Path::new("/a/foo.d.ts")),
            Some(PathBuf::from("/a/foo"))
        );
        assert_eq!(declaration_base(Path::new("/a/foo.ts")), None);
    }

    #[test]
    fn test_alias_resolves_paths_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("tsconfig.json");
        fs::write(
            &config,
            r#"{"compilerOptions":{"baseUrl":".","paths":{"@/*":["src/*"]}}}"#,
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/util.ts"), "").unwrap();

        let exts = vec!["".to_owned(), ".ts".to_owned(), ".js".to_owned()];
        let alias = AliasResolver::load(&config, &exts).unwrap();
        assert_eq!(
            alias.resolve(dir.path(), "@/util"),
            Some(dir.path().join("src/util.ts"))
        );
        assert_eq!(alias.resolve(dir.path(), "fs"), None);
    }
}
