//! Non-fatal findings collected during a run
//!
//! Spec/reference mismatches are reported here instead of aborting. Each
//! finding is logged as a warning when pushed; the CLI decides at the end
//! whether their presence fails the run.

use std::fmt;
use std::path::PathBuf;
use tracing::warn;

/// One spec/reference mismatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// An operation that no definition claimed and that is not allow-listed
    UnmatchedOperation { operation_id: String, path: String },
    /// A field whose `$ref` target is not in the index
    UnresolvedReference {
        definition: String,
        field: String,
        target: String,
    },
    /// A table-of-contents entry with no matching definition
    MissingDefinition {
        group: String,
        version: String,
        kind: String,
    },
    /// A subresource path whose owning resource is unknown
    UnknownSubresourceOwner { operation_id: String, key: String },
    /// An example fixture that exists but cannot be parsed
    InvalidExample { path: PathBuf, reason: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmatchedOperation { operation_id, path } => {
                write!(f, "No Definition found for {operation_id} [{path}]")
            }
            Self::UnresolvedReference {
                definition,
                field,
                target,
            } => write!(
                f,
                "Could not resolve reference {target} of field {field} in {definition}"
            ),
            Self::MissingDefinition {
                group,
                version,
                kind,
            } => write!(
                f,
                "Could not find definition for resource in TOC: {group} {version} {kind}"
            ),
            Self::UnknownSubresourceOwner { operation_id, key } => {
                write!(f, "Could not find resource {key} for operation {operation_id}")
            }
            Self::InvalidExample { path, reason } => {
                write!(f, "Could not read example {}: {reason}", path.display())
            }
        }
    }
}

/// Ordered collector of [`Diagnostic`]s
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        warn!("{diagnostic}");
        self.items.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<T: IntoIterator<Item = Diagnostic>>(&mut self, iter: T) {
        for diagnostic in iter {
            self.push(diagnostic);
        }
    }
}
