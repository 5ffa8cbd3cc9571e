pub mod alias;
pub mod builtins;
pub mod file_resolver;

pub use alias::AliasResolver;
pub use builtins::is_builtin_module;
pub use file_resolver::{append_suffix, simple_resolve};

use std::path::{Component, Path, PathBuf};

use crate::error::GraphError;
use crate::options::ParseOptions;

/// Lexically normalize a path: `.` components are dropped and `..` pops the
/// previous normal component. The filesystem is never consulted, so symlinks
/// are kept as written.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Turns `(context directory, request)` into a module identity.
///
/// Holds only immutable configuration, so one instance is shared by every
/// worker of a build.
#[derive(Debug)]
pub struct ModuleResolver {
    extensions: Vec<String>,
    alias: Option<AliasResolver>,
}

impl ModuleResolver {
    /// A resolver without alias configuration.
    pub fn new(extensions: Vec<String>) -> Self {
        Self {
            extensions,
            alias: None,
        }
    }

    /// A resolver whose alias mode is driven by `tsconfig`. Fails if the
    /// tsconfig cannot be read or is malformed.
    pub fn with_tsconfig(extensions: Vec<String>, tsconfig: &Path) -> Result<Self, GraphError> {
        let alias = AliasResolver::load(tsconfig, &extensions)?;
        tracing::debug!("alias resolution via {}", tsconfig.display());
        Ok(Self {
            extensions,
            alias: Some(alias),
        })
    }

    /// Build the resolver described by `options`, picking up the explicit or
    /// implicit tsconfig.
    pub fn from_options(options: &ParseOptions) -> Result<Self, GraphError> {
        match options.effective_tsconfig()? {
            Some(tsconfig) => Self::with_tsconfig(options.extensions.clone(), &tsconfig),
            None => Ok(Self::new(options.extensions.clone())),
        }
    }

    pub fn has_alias(&self) -> bool {
        self.alias.is_some()
    }

    /// Resolve `request` as seen from the directory `context`.
    ///
    /// With alias mode a concrete non-declaration result wins. Otherwise the
    /// plain resolver decides; if it finds nothing and the alias produced a
    /// declaration file, the declaration's base name is tried instead.
    /// Declaration files themselves never satisfy an edge.
    pub fn resolve(&self, context: &Path, request: &str) -> Option<PathBuf> {
        let Some(alias) = &self.alias else {
            return simple_resolve(context, request, &self.extensions);
        };

        let aliased = alias.resolve(context, request);
        if let Some(found) = &aliased
            && !alias::is_declaration_file(found)
        {
            return Some(normalize_path(found));
        }

        if let Some(found) = simple_resolve(context, request, &self.extensions) {
            return Some(found);
        }

        let base = aliased.as_deref().and_then(alias::declaration_base)?;
        let base = base.to_str()?;
        simple_resolve(context, base, &self.extensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn exts() -> Vec<String> {
        ["", ".ts", ".tsx", ".js", ".json"]
            .iter()
            .map(|s| (*s).to_owned())
            .collect()
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
        assert_eq!(normalize_path(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize_path(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(normalize_path(Path::new("./x.ts")), PathBuf::from("x.ts"));
    }

    #[test]
    fn test_resolver_without_alias() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.ts"), "").unwrap();
        let resolver = ModuleResolver::new(exts());
        assert!(!resolver.has_alias());
        assert_eq!(
            resolver.resolve(dir.path(), "./a"),
            Some(dir.path().join("a.ts"))
        );
        assert_eq!(resolver.resolve(dir.path(), "@/a"), None);
    }

    #[test]
    fn test_alias_result_preferred() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("tsconfig.json");
        fs::write(
            &config,
            r#"{
                // comments are allowed
                "compilerOptions": { "baseUrl": ".", "paths": { "@/*": ["src/*"] } },
            }"#,
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/a.ts"), "").unwrap();

        let resolver = ModuleResolver::with_tsconfig(exts(), &config).unwrap();
        assert!(resolver.has_alias());
        assert_eq!(
            resolver.resolve(dir.path(), "@/a"),
            Some(dir.path().join("src/a.ts"))
        );
        // Relative requests still go through.
        assert_eq!(
            resolver.resolve(&dir.path().join("src"), "./a"),
            Some(dir.path().join("src/a.ts"))
        );
    }

    #[test]
    fn test_declaration_alias_falls_back_to_base_name() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("tsconfig.json");
        fs::write(
            &config,
            r#"{"compilerOptions":{"baseUrl":".","paths":{"api":["gen/api.d.ts"]}}}"#,
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("gen")).unwrap();
        fs::write(dir.path().join("gen/api.d.ts"), "").unwrap();
        fs::write(dir.path().join("gen/api.js"), "").unwrap();

        let resolver = ModuleResolver::with_tsconfig(exts(), &config).unwrap();
        assert_eq!(
            resolver.resolve(dir.path(), "api"),
            Some(dir.path().join("gen/api.js"))
        );
    }

    #[test]
    fn test_declaration_only_is_unresolved() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("tsconfig.json");
        fs::write(
            &config,
            r#"{"compilerOptions":{"baseUrl":".","paths":{"types":["gen/types.d.ts"]}}}"#,
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("gen")).unwrap();
        fs::write(dir.path().join("gen/types.d.ts"), "").unwrap();

        let resolver = ModuleResolver::with_tsconfig(exts(), &config).unwrap();
        assert_eq!(resolver.resolve(dir.path(), "types"), None);
    }

    #[test]
    fn test_malformed_tsconfig_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("tsconfig.json");
        fs::write(&config, r#"{"compilerOptions": []}"#).unwrap();
        assert!(matches!(
            ModuleResolver::with_tsconfig(exts(), &config),
            Err(GraphError::TsconfigInvalid { .. })
        ));
    }
}
