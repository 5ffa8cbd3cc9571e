use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How a module references another, fixed by the syntactic shape of the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyKind {
    /// `require('./module')`
    CommonJsRequire,
    /// `import { X } from './module'`, `import './module'`
    StaticImport,
    /// `import('./module')`
    DynamicImport,
    /// `export { X } from './module'`, `export * from './module'`
    StaticReExport,
}

/// A dependency as written in source, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDependency {
    /// The raw module specifier, e.g. `"react"` or `"./utils"`.
    pub request: String,
    pub kind: DependencyKind,
}

/// A resolved edge in the dependency tree.
///
/// Assembled only once the target's resolution is known, so an edge is never
/// observable in a half-initialised state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Identity of the importing module.
    pub issuer: PathBuf,
    /// The specifier exactly as written in source.
    pub request: String,
    pub kind: DependencyKind,
    /// Identity of the target, `None` when it could not be resolved.
    pub id: Option<PathBuf>,
}

impl Dependency {
    pub fn new(issuer: PathBuf, raw: RawDependency, id: Option<PathBuf>) -> Self {
        Self {
            issuer,
            request: raw.request,
            kind: raw.kind,
            id,
        }
    }
}
