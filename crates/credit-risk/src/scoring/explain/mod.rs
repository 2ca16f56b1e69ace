//! Per-prediction feature attribution.
//!
//! The primary path is tree-structure-aware attribution against the
//! synthesized background; when it is unavailable or fails, a
//! model-agnostic occlusion fallback runs instead, and its results are
//! marked as such.

mod occlusion;
mod path;
mod tree;

pub use occlusion::{occlude, OcclusionAttribution};
pub use tree::TreeExplainer;

use crate::model::GbdtClassifier;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ExplainError {
    #[error("background sample is empty")]
    EmptyBackground,
    #[error("attribution produced a non-finite value")]
    NonFinite,
}

/// How an attribution was computed. `Occlusion` is the degraded mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionMethod {
    Tree,
    Occlusion,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureContribution {
    pub feature: String,
    pub value: f64,
}

/// Signed per-feature contributions in probability space, sorted by
/// descending absolute magnitude. `base_value + Σ value` reproduces
/// `prediction_probability` up to floating-point error.
#[derive(Debug, Clone, Serialize)]
pub struct Attribution {
    pub method: AttributionMethod,
    pub base_value: f64,
    pub prediction_probability: f64,
    pub contributions: Vec<FeatureContribution>,
}

impl Attribution {
    /// Convert margin-space SHAP values into a probability-space
    /// attribution. The linear rescaling preserves relative feature
    /// importance while making the contributions sum to the realized
    /// probability minus the baseline.
    pub(crate) fn from_margin_shap(
        model: &GbdtClassifier,
        explainer: &TreeExplainer,
        row: &[f32],
        phi: Vec<f64>,
    ) -> Self {
        let margin = model.predict_margin(row);
        let probability = crate::model::sigmoid(margin);
        let base_probability = explainer.base_probability();

        let denominator = margin - explainer.base_margin();
        let scale = if denominator.abs() > 1e-12 {
            (probability - base_probability) / denominator
        } else {
            0.0
        };
        let base_value = if scale == 0.0 {
            probability
        } else {
            base_probability
        };

        let contributions = ranked(
            model.feature_names(),
            phi.into_iter().map(|value| value * scale),
        );

        Self {
            method: AttributionMethod::Tree,
            base_value,
            prediction_probability: probability,
            contributions,
        }
    }

    pub(crate) fn from_occlusion(model: &GbdtClassifier, result: OcclusionAttribution) -> Self {
        Self {
            method: AttributionMethod::Occlusion,
            base_value: result.base_probability,
            prediction_probability: result.probability,
            contributions: ranked(model.feature_names(), result.values.into_iter()),
        }
    }

    /// The strongest `limit` contributions.
    pub fn top(&self, limit: usize) -> &[FeatureContribution] {
        &self.contributions[..self.contributions.len().min(limit)]
    }
}

fn ranked(
    feature_names: &[String],
    values: impl Iterator<Item = f64>,
) -> Vec<FeatureContribution> {
    let mut contributions: Vec<FeatureContribution> = feature_names
        .iter()
        .zip(values)
        .map(|(feature, value)| FeatureContribution {
            feature: feature.clone(),
            value,
        })
        .collect();
    contributions.sort_by(|a, b| {
        b.value
            .abs()
            .partial_cmp(&a.value.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    contributions
}
