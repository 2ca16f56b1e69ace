//! Tree-structure-aware attribution against the synthesized background.
//!
//! Node weights are empirical: the background matrix is routed through
//! every tree once at construction and the per-node hit counts play the
//! role of covers in the TreeSHAP recursion. Contributions come out in
//! margin space; the service rescales them into probability space.

use crate::model::GbdtClassifier;
use crate::scoring::explain::path::PathState;
use crate::scoring::explain::ExplainError;

pub struct TreeExplainer {
    /// Background hit count per node, aligned with the model's trees.
    covers: Vec<Vec<f64>>,
    base_margin: f64,
    base_probability: f64,
}

impl TreeExplainer {
    pub fn new(model: &GbdtClassifier, background: &[Vec<f32>]) -> Result<Self, ExplainError> {
        if background.is_empty() {
            return Err(ExplainError::EmptyBackground);
        }

        let mut covers: Vec<Vec<f64>> = model
            .trees()
            .iter()
            .map(|tree| vec![0.0; tree.n_nodes()])
            .collect();

        let mut margin_sum = 0.0;
        let mut probability_sum = 0.0;
        for row in background {
            for (tree, cover) in model.trees().iter().zip(covers.iter_mut()) {
                let mut node = 0;
                cover[node] += 1.0;
                while !tree.is_leaf(node) {
                    node = tree.descend(node, row);
                    cover[node] += 1.0;
                }
            }
            let margin = model.predict_margin(row);
            margin_sum += margin;
            probability_sum += crate::model::sigmoid(margin);
        }

        let n = background.len() as f64;
        Ok(Self {
            covers,
            base_margin: margin_sum / n,
            base_probability: probability_sum / n,
        })
    }

    /// Expected margin over the background population.
    pub fn base_margin(&self) -> f64 {
        self.base_margin
    }

    /// Expected predicted probability over the background population.
    pub fn base_probability(&self) -> f64 {
        self.base_probability
    }

    /// Per-feature margin-space contributions for one encoded row.
    /// Satisfies sum(phi) == predict_margin(row) - base_margin up to
    /// floating-point error.
    pub fn shap_values(
        &self,
        model: &GbdtClassifier,
        row: &[f32],
    ) -> Result<Vec<f64>, ExplainError> {
        let mut phi = vec![0.0f64; model.n_features()];

        for (tree_index, tree) in model.trees().iter().enumerate() {
            let cover = &self.covers[tree_index];
            recurse(tree, cover, row, &mut phi, 0, PathState::new(), 1.0, 1.0, -1);
        }

        if phi.iter().any(|value| !value.is_finite()) {
            return Err(ExplainError::NonFinite);
        }
        Ok(phi)
    }
}

/// One step of the TreeSHAP recursion. `zero_fraction`/`one_fraction`
/// describe the split that led here; the path is extended on entry and
/// cloned for the two child descents.
#[allow(clippy::too_many_arguments)]
fn recurse(
    tree: &crate::model::Tree,
    cover: &[f64],
    row: &[f32],
    phi: &mut [f64],
    node: usize,
    mut path: PathState,
    zero_fraction: f64,
    one_fraction: f64,
    feature: i32,
) {
    path.extend(feature, zero_fraction, one_fraction);

    if tree.is_leaf(node) {
        let leaf_value = tree.leaf_value(node) as f64;
        // index 0 is the root sentinel with feature -1
        for i in 1..path.len() {
            let weight = path.unwound_sum(i);
            let delta = path.one_fraction(i) - path.zero_fraction(i);
            phi[path.feature(i) as usize] += weight * delta * leaf_value;
        }
        return;
    }

    let split = tree.split_index(node) as i32;
    let hot = tree.descend(node, row);
    let left = tree.left_child(node);
    let right = tree.right_child(node);
    let cold = if hot == left { right } else { left };

    let node_cover = cover[node];
    let (hot_zero, cold_zero) = if node_cover > 0.0 {
        (cover[hot] / node_cover, cover[cold] / node_cover)
    } else {
        // subtree unseen by the background carries no subset weight
        (0.0, 0.0)
    };

    let mut incoming_zero = 1.0;
    let mut incoming_one = 1.0;
    if let Some(previous) = path.position(split) {
        incoming_zero = path.zero_fraction(previous);
        incoming_one = path.one_fraction(previous);
        path.unwind(previous);
    }

    recurse(
        tree,
        cover,
        row,
        phi,
        hot,
        path.clone(),
        hot_zero * incoming_zero,
        incoming_one,
        split,
    );
    // cold branch: the sample never goes this way (one_fraction = 0)
    if cold_zero * incoming_zero > 0.0 {
        recurse(
            tree,
            cover,
            row,
            phi,
            cold,
            path,
            cold_zero * incoming_zero,
            0.0,
            split,
        );
    }
}
