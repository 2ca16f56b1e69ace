//! Model-agnostic fallback attribution.
//!
//! Zeroes each encoded column in turn against the input row and records
//! the probability delta, then rescales the deltas so the additivity
//! identity (baseline + sum == prediction) still holds. Much coarser
//! than the tree-aware method; callers see it flagged as degraded.

use crate::model::GbdtClassifier;
use crate::scoring::explain::ExplainError;

pub struct OcclusionAttribution {
    pub values: Vec<f64>,
    pub base_probability: f64,
    pub probability: f64,
}

pub fn occlude(model: &GbdtClassifier, row: &[f32]) -> Result<OcclusionAttribution, ExplainError> {
    let probability = model.predict_proba(row);
    if !probability.is_finite() {
        return Err(ExplainError::NonFinite);
    }

    let zero_row = vec![0.0f32; row.len()];
    let base_probability = model.predict_proba(&zero_row);

    let mut deltas = Vec::with_capacity(row.len());
    let mut masked = row.to_vec();
    for index in 0..row.len() {
        let original = masked[index];
        masked[index] = 0.0;
        deltas.push(probability - model.predict_proba(&masked));
        masked[index] = original;
    }

    let raw_total: f64 = deltas.iter().sum();
    if raw_total.abs() < 1e-12 {
        // every single-column occlusion was a no-op; report a flat
        // attribution anchored at the realized probability
        return Ok(OcclusionAttribution {
            values: vec![0.0; row.len()],
            base_probability: probability,
            probability,
        });
    }

    let scale = (probability - base_probability) / raw_total;
    let values: Vec<f64> = deltas.into_iter().map(|delta| delta * scale).collect();
    if values.iter().any(|value| !value.is_finite()) {
        return Err(ExplainError::NonFinite);
    }

    Ok(OcclusionAttribution {
        values,
        base_probability,
        probability,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelArtifact, TreeArtifact};
    use approx::assert_relative_eq;

    fn model() -> GbdtClassifier {
        let stump = |feature: u32, threshold: f32, lo: f32, hi: f32| TreeArtifact {
            split_indices: vec![feature, 0, 0],
            split_conditions: vec![threshold, lo, hi],
            left_children: vec![1, -1, -1],
            right_children: vec![2, -1, -1],
            default_left: vec![true, false, false],
            sum_hessian: vec![],
        };
        GbdtClassifier::from_artifact(ModelArtifact {
            feature_names: vec!["f0".to_string(), "f1".to_string()],
            base_score: 0.1,
            trees: vec![stump(0, 0.5, -0.8, 0.9), stump(1, 2.0, 0.4, -0.3)],
        })
        .expect("model builds")
    }

    #[test]
    fn additivity_holds_after_rescaling() {
        let model = model();
        let row = vec![0.9f32, 3.0];
        let attribution = occlude(&model, &row).expect("occlusion computes");

        let total: f64 = attribution.values.iter().sum();
        assert_relative_eq!(
            attribution.base_probability + total,
            attribution.probability,
            epsilon = 1e-9
        );
    }

    #[test]
    fn insensitive_row_yields_flat_attribution() {
        let model = model();
        // zeroing either column of the all-zero row changes nothing
        let row = vec![0.0f32, 0.0];
        let attribution = occlude(&model, &row).expect("occlusion computes");
        assert!(attribution.values.iter().all(|v| *v == 0.0));
        assert_relative_eq!(attribution.base_probability, attribution.probability);
    }
}
