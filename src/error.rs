use std::path::PathBuf;

/// Fatal errors surfaced before traversal begins.
///
/// Anything that cannot vary per file (filter patterns, entry globs, the
/// tsconfig used for alias resolution) fails the whole run up front and is
/// never partially applied.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("invalid {which} pattern {pattern:?}: {source}")]
    InvalidFilter {
        which: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid entry glob {pattern:?}: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("specified tsconfig \"{}\" is not a file", path.display())]
    TsconfigMissing { path: PathBuf },

    #[error("failed to read tsconfig \"{}\": {source}", path.display())]
    TsconfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed tsconfig \"{}\": {reason}", path.display())]
    TsconfigInvalid { path: PathBuf, reason: String },

    #[error("failed to read config \"{}\": {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config \"{}\": {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Per-file failures. Recoverable: the file is treated as unresolved by
/// whoever imported it and contributes no entry of its own.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("failed to read \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("syntax error in \"{}\" at {line}:{column}", path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        column: usize,
    },
}

impl FileError {
    /// Classify an I/O error raised while reading `path`.
    pub fn from_io(path: PathBuf, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source: err },
        }
    }
}
