use std::path::PathBuf;

use thiserror::Error;

use crate::types::Artifact;

/// Failure to produce a dataset bundle. Always names the artifact that broke the load.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error("missing artifact {artifact}: {} does not exist", path.display())]
    MissingArtifact { artifact: Artifact, path: PathBuf },

    #[error("malformed artifact {artifact} ({}): {detail}", path.display())]
    MalformedArtifact {
        artifact: Artifact,
        path: PathBuf,
        detail: String,
    },
}

impl LoadError {
    pub fn artifact(&self) -> Artifact {
        match self {
            LoadError::MissingArtifact { artifact, .. }
            | LoadError::MalformedArtifact { artifact, .. } => *artifact,
        }
    }

    pub fn malformed(artifact: Artifact, path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        LoadError::MalformedArtifact {
            artifact,
            path: path.into(),
            detail: detail.into(),
        }
    }
}

/// A view-model builder was handed a shape it does not accept.
/// This is a programming error: the view logic and the data shape have drifted apart.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContractViolation {
    #[error("unknown column '{column}' (available: {available})")]
    UnknownColumn { column: String, available: String },

    #[error("column '{column}' row {row}: expected {expected}, found {found}")]
    WrongCellType {
        column: String,
        row: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("value out of domain: {0}")]
    OutOfDomain(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("View contract violated: {0}")]
    Contract(#[from] ContractViolation),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
