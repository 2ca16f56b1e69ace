//! Serde types for the exported ensemble JSON.
//!
//! The artifact mirrors XGBoost's node-array layout: per-node parallel
//! arrays with a -1 child sentinel marking leaves. Leaf values share
//! the `split_conditions` array with internal-node thresholds.

use crate::model::ModelError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Feature columns in training order. The encoding schema is
    /// derived from these names; an artifact without them is rejected
    /// rather than falling back to an assumed column order.
    pub feature_names: Vec<String>,
    /// Margin-space offset added to the summed leaf values.
    #[serde(default)]
    pub base_score: f32,
    pub trees: Vec<TreeArtifact>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeArtifact {
    pub split_indices: Vec<u32>,
    /// Threshold for internal nodes, leaf value for leaves.
    pub split_conditions: Vec<f32>,
    pub left_children: Vec<i32>,
    pub right_children: Vec<i32>,
    pub default_left: Vec<bool>,
    /// Per-node cover recorded at training time. Kept for diagnostics;
    /// attribution uses covers recomputed from the background sample.
    #[serde(default)]
    pub sum_hessian: Vec<f32>,
}

impl ModelArtifact {
    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        let file = File::open(path).map_err(|source| ModelError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ModelError> {
        let artifact: ModelArtifact = serde_json::from_reader(reader)?;
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_artifact() {
        let raw = r#"{
            "feature_names": ["person_age", "loan_amnt"],
            "base_score": -0.5,
            "trees": [{
                "split_indices": [0, 0, 0],
                "split_conditions": [30.0, -0.2, 0.4],
                "left_children": [1, -1, -1],
                "right_children": [2, -1, -1],
                "default_left": [true, false, false],
                "sum_hessian": [100.0, 60.0, 40.0]
            }]
        }"#;

        let artifact = ModelArtifact::from_reader(raw.as_bytes()).expect("artifact parses");
        assert_eq!(artifact.feature_names.len(), 2);
        assert_eq!(artifact.base_score, -0.5);
        assert_eq!(artifact.trees.len(), 1);
    }

    #[test]
    fn base_score_defaults_to_zero() {
        let raw = r#"{
            "feature_names": ["person_age"],
            "trees": []
        }"#;

        let artifact = ModelArtifact::from_reader(raw.as_bytes()).expect("artifact parses");
        assert_eq!(artifact.base_score, 0.0);
    }

    #[test]
    fn rejects_invalid_json() {
        let result = ModelArtifact::from_reader("not json".as_bytes());
        assert!(matches!(result, Err(ModelError::Parse(_))));
    }
}
