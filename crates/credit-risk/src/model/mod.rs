//! Loading and inference for the pre-trained gradient-boosted tree
//! classifier. Training happens elsewhere; this module only consumes
//! the exported artifact.

mod artifact;
mod ensemble;

pub use artifact::{ModelArtifact, TreeArtifact};
pub use ensemble::{sigmoid, GbdtClassifier, Tree};

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to read model artifact {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("model artifact declares no feature names")]
    MissingFeatureNames,
    #[error("model artifact contains no trees")]
    EmptyEnsemble,
    #[error("malformed tree {tree}: {reason}")]
    MalformedTree { tree: usize, reason: &'static str },
}
