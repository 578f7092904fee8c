//! Operation kinds.

use serde::{Deserialize, Serialize};

/// Which remote operation a run performs.
///
/// The kind selects both the submission call and the checkpoint namespace,
/// so an import and a cleanup over identical bytes never share progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Create or overwrite redirects.
    Import,
    /// Remove redirects by key.
    Delete,
}

impl OperationKind {
    /// All kinds, in the order they run during a destructive sync.
    pub const ALL: [Self; 2] = [Self::Import, Self::Delete];
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Import => write!(f, "import"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

impl std::str::FromStr for OperationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "import" | "imports" => Ok(Self::Import),
            "delete" | "deletes" => Ok(Self::Delete),
            _ => Err(format!("Unknown operation kind: {s} (expected import or delete)")),
        }
    }
}
