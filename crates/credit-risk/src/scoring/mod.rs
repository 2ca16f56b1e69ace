//! Request-facing scoring pipeline: encode a raw applicant record,
//! predict default probability, band it into a risk tier, and attach a
//! per-feature attribution when one can be computed.

pub mod background;
pub mod explain;
pub mod record;
pub mod risk;
pub mod schema;

pub use background::{BackgroundSampler, BACKGROUND_ROWS, BACKGROUND_SEED};
pub use explain::{Attribution, AttributionMethod, ExplainError, FeatureContribution};
pub use record::ApplicantRecord;
pub use risk::RiskTier;
pub use schema::{FeatureSchema, SchemaError};

use crate::model::GbdtClassifier;
use tracing::warn;

/// Base prediction for one record.
#[derive(Debug, Clone, Copy)]
pub struct Scorecard {
    pub probability: f64,
    pub prediction: u8,
    pub tier: RiskTier,
}

/// Full per-request result. Attribution is optional: when both
/// attribution paths fail the base prediction is still returned.
#[derive(Debug, Clone)]
pub struct RiskAssessment {
    pub scorecard: Scorecard,
    pub attribution: Option<Attribution>,
}

/// Immutable scoring pipeline built once at startup and shared by
/// request handlers. All methods take `&self`; concurrent reads are
/// safe.
pub struct ScoringService {
    model: GbdtClassifier,
    schema: FeatureSchema,
    explainer: Option<explain::TreeExplainer>,
}

impl ScoringService {
    pub fn new(model: GbdtClassifier) -> Result<Self, SchemaError> {
        let schema = FeatureSchema::from_feature_names(model.feature_names())?;
        let background = BackgroundSampler::new(&schema).sample_matrix(BACKGROUND_ROWS);

        let explainer = match explain::TreeExplainer::new(&model, &background) {
            Ok(explainer) => Some(explainer),
            Err(err) => {
                warn!(%err, "tree attribution unavailable, occlusion fallback will be used");
                None
            }
        };

        Ok(Self {
            model,
            schema,
            explainer,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn encode(&self, record: &ApplicantRecord) -> Vec<f32> {
        self.schema.encode(record)
    }

    pub fn score(&self, record: &ApplicantRecord) -> Scorecard {
        let row = self.schema.encode(record);
        let probability = self.model.predict_proba(&row);
        Scorecard {
            probability,
            prediction: self.model.predict(&row),
            tier: RiskTier::from_probability(probability),
        }
    }

    /// Attribution for one record: tree-aware first, occlusion as the
    /// degraded fallback, `None` when both fail.
    pub fn explain(&self, record: &ApplicantRecord) -> Option<Attribution> {
        let row = self.schema.encode(record);

        if let Some(explainer) = &self.explainer {
            match explainer.shap_values(&self.model, &row) {
                Ok(phi) => {
                    return Some(Attribution::from_margin_shap(
                        &self.model,
                        explainer,
                        &row,
                        phi,
                    ))
                }
                Err(err) => {
                    warn!(%err, "tree attribution failed, falling back to occlusion");
                }
            }
        }

        match explain::occlude(&self.model, &row) {
            Ok(result) => Some(Attribution::from_occlusion(&self.model, result)),
            Err(err) => {
                warn!(%err, "occlusion attribution failed, omitting attribution");
                None
            }
        }
    }

    pub fn assess(&self, record: &ApplicantRecord) -> RiskAssessment {
        RiskAssessment {
            scorecard: self.score(record),
            attribution: self.explain(record),
        }
    }
}
