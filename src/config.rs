use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::GraphError;

/// File name looked up in the root directory.
pub const CONFIG_FILE: &str = "depgraph.toml";

/// Configuration loaded from `depgraph.toml` at the project root.
///
/// Every key is optional and mirrors a command-line flag of the same name;
/// flags given on the command line win.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct DepGraphConfig {
    /// Directory used to shorten identities.
    pub context: Option<PathBuf>,
    /// Candidate extensions, in probe order.
    pub extensions: Option<Vec<String>>,
    /// Extensions of files that are parsed for dependencies.
    pub js: Option<Vec<String>>,
    /// Regex of identities to include.
    pub include: Option<String>,
    /// Regex of identities to exclude. An empty string excludes nothing.
    pub exclude: Option<String>,
    pub tsconfig: Option<PathBuf>,
    pub transform: Option<bool>,
    /// `"tree"` or `"circular"`.
    pub skip_dynamic_imports: Option<String>,
    pub threads: Option<usize>,
}

impl DepGraphConfig {
    /// Load `depgraph.toml` from `root`.
    ///
    /// A missing file yields the default (empty) configuration. A file that
    /// exists but cannot be read or parsed is an error.
    pub fn load(root: &Path) -> Result<Self, GraphError> {
        let config_path = root.join(CONFIG_FILE);
        if !config_path.is_file() {
            return Ok(Self::default());
        }
        Self::load_file(&config_path)
    }

    pub fn load_file(path: &Path) -> Result<Self, GraphError> {
        let contents = std::fs::read_to_string(path).map_err(|source| GraphError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str::<Self>(&contents).map_err(|source| GraphError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("loaded {}", path.display());
        Ok(config)
    }
}
