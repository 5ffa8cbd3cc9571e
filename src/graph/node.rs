use super::edge::Dependency;

/// Build-time state of one tree entry.
///
/// A key is inserted as `InProgress` by whichever task claims it first; that
/// insertion is what makes every later lookup for the same identity return
/// immediately instead of re-entering the file.
#[derive(Debug, Clone)]
pub enum NodeState {
    /// Claimed, extraction or child resolution still running.
    InProgress,
    /// Excluded by the include/exclude filters.
    Ignored,
    /// Fully analyzed. Empty for leaves (non-source assets, built-ins).
    Analyzed(Vec<Dependency>),
    /// Read or parse failed. Dropped from the finished tree.
    Failed,
}

impl NodeState {
    /// `true` when this entry will not appear in the finished tree.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}
