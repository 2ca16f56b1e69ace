//! Validated in-memory ensemble and single-row inference.

use crate::model::{ModelArtifact, ModelError, TreeArtifact};
use std::path::Path;

/// One decision tree in node-array form.
///
/// Children always carry a larger index than their parent, so the
/// arrays are acyclic by construction once validated.
#[derive(Debug, Clone)]
pub struct Tree {
    split_indices: Vec<u32>,
    split_conditions: Vec<f32>,
    left_children: Vec<i32>,
    right_children: Vec<i32>,
    default_left: Vec<bool>,
}

impl Tree {
    fn from_artifact(index: usize, raw: TreeArtifact, n_features: usize) -> Result<Self, ModelError> {
        let malformed = |reason: &'static str| ModelError::MalformedTree {
            tree: index,
            reason,
        };

        let n_nodes = raw.split_conditions.len();
        if n_nodes == 0 {
            return Err(malformed("empty node arrays"));
        }
        if raw.split_indices.len() != n_nodes
            || raw.left_children.len() != n_nodes
            || raw.right_children.len() != n_nodes
            || raw.default_left.len() != n_nodes
        {
            return Err(malformed("node arrays disagree on length"));
        }

        for node in 0..n_nodes {
            let left = raw.left_children[node];
            let right = raw.right_children[node];
            if (left < 0) != (right < 0) {
                return Err(malformed("node has exactly one child"));
            }
            if left < 0 {
                continue;
            }
            let (left, right) = (left as usize, right as usize);
            if left >= n_nodes || right >= n_nodes || left <= node || right <= node {
                return Err(malformed("child index out of bounds or not after parent"));
            }
            if raw.split_indices[node] as usize >= n_features {
                return Err(malformed("split feature index exceeds feature count"));
            }
        }

        Ok(Self {
            split_indices: raw.split_indices,
            split_conditions: raw.split_conditions,
            left_children: raw.left_children,
            right_children: raw.right_children,
            default_left: raw.default_left,
        })
    }

    pub fn n_nodes(&self) -> usize {
        self.split_conditions.len()
    }

    pub fn is_leaf(&self, node: usize) -> bool {
        self.left_children[node] < 0
    }

    pub fn left_child(&self, node: usize) -> usize {
        self.left_children[node] as usize
    }

    pub fn right_child(&self, node: usize) -> usize {
        self.right_children[node] as usize
    }

    pub fn split_index(&self, node: usize) -> usize {
        self.split_indices[node] as usize
    }

    pub fn split_threshold(&self, node: usize) -> f32 {
        self.split_conditions[node]
    }

    pub fn leaf_value(&self, node: usize) -> f32 {
        self.split_conditions[node]
    }

    /// Which child a row descends to from an internal node. Missing
    /// values (NaN) follow the recorded default direction.
    pub fn descend(&self, node: usize, row: &[f32]) -> usize {
        let value = row
            .get(self.split_index(node))
            .copied()
            .unwrap_or(f32::NAN);
        let go_left = if value.is_nan() {
            self.default_left[node]
        } else {
            value < self.split_threshold(node)
        };
        if go_left {
            self.left_child(node)
        } else {
            self.right_child(node)
        }
    }

    /// Index of the leaf the row lands in.
    pub fn leaf_for(&self, row: &[f32]) -> usize {
        let mut node = 0;
        while !self.is_leaf(node) {
            node = self.descend(node, row);
        }
        node
    }
}

/// The loaded binary classifier. Immutable after construction and safe
/// to share across request handlers.
#[derive(Debug, Clone)]
pub struct GbdtClassifier {
    trees: Vec<Tree>,
    base_score: f32,
    feature_names: Vec<String>,
}

impl GbdtClassifier {
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        if artifact.feature_names.is_empty() {
            return Err(ModelError::MissingFeatureNames);
        }
        if artifact.trees.is_empty() {
            return Err(ModelError::EmptyEnsemble);
        }

        let n_features = artifact.feature_names.len();
        let trees = artifact
            .trees
            .into_iter()
            .enumerate()
            .map(|(index, raw)| Tree::from_artifact(index, raw, n_features))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            trees,
            base_score: artifact.base_score,
            feature_names: artifact.feature_names,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        Self::from_artifact(ModelArtifact::from_path(path)?)
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    pub fn base_score(&self) -> f32 {
        self.base_score
    }

    /// Raw additive score before the sigmoid link.
    pub fn predict_margin(&self, row: &[f32]) -> f64 {
        let mut margin = self.base_score as f64;
        for tree in &self.trees {
            margin += tree.leaf_value(tree.leaf_for(row)) as f64;
        }
        margin
    }

    /// Probability of the positive (default) class.
    pub fn predict_proba(&self, row: &[f32]) -> f64 {
        sigmoid(self.predict_margin(row))
    }

    /// Binary label at the conventional 0.5 cut.
    pub fn predict(&self, row: &[f32]) -> u8 {
        u8::from(self.predict_proba(row) >= 0.5)
    }
}

pub fn sigmoid(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}
