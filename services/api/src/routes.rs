use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use credit_risk::error::AppError;
use credit_risk::scoring::{ApplicantRecord, Attribution, AttributionMethod, RiskAssessment};
use serde::Serialize;
use serde_json::json;

/// Cap on attribution records returned per prediction.
const MAX_CONTRIBUTIONS: usize = 20;

#[derive(Debug, Serialize)]
pub(crate) struct PredictResponse {
    pub(crate) probability: f64,
    pub(crate) prediction: u8,
    pub(crate) risk_label: &'static str,
    pub(crate) risk_color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) attribution: Option<AttributionView>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttributionView {
    pub(crate) method: AttributionMethod,
    pub(crate) base_value: f64,
    pub(crate) prediction_probability: f64,
    pub(crate) contributions: Vec<ContributionView>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ContributionView {
    pub(crate) feature: String,
    pub(crate) value: f64,
}

impl From<RiskAssessment> for PredictResponse {
    fn from(assessment: RiskAssessment) -> Self {
        Self {
            probability: assessment.scorecard.probability,
            prediction: assessment.scorecard.prediction,
            risk_label: assessment.scorecard.tier.label(),
            risk_color: assessment.scorecard.tier.color(),
            attribution: assessment.attribution.map(AttributionView::from),
        }
    }
}

impl From<Attribution> for AttributionView {
    fn from(attribution: Attribution) -> Self {
        let contributions = attribution
            .top(MAX_CONTRIBUTIONS)
            .iter()
            .map(|c| ContributionView {
                feature: c.feature.clone(),
                value: c.value,
            })
            .collect();
        Self {
            method: attribution.method,
            base_value: attribution.base_value,
            prediction_probability: attribution.prediction_probability,
            contributions,
        }
    }
}

pub(crate) fn router() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/defaults", get(defaults_endpoint))
        .route("/api/predict", post(predict_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Read-only ideal-defaults record for pre-populating a consumer UI.
pub(crate) async fn defaults_endpoint(
    Extension(state): Extension<AppState>,
) -> Result<Json<ApplicantRecord>, AppError> {
    if state.service.is_none() {
        return Err(AppError::ModelUnavailable);
    }
    Ok(Json(ApplicantRecord::ideal_defaults()))
}

pub(crate) async fn predict_endpoint(
    Extension(state): Extension<AppState>,
    Json(record): Json<ApplicantRecord>,
) -> Result<Json<PredictResponse>, AppError> {
    let service = state.service.as_ref().ok_or(AppError::ModelUnavailable)?;
    let assessment = service.assess(&record);
    Ok(Json(PredictResponse::from(assessment)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::response::IntoResponse;
    use credit_risk::model::{GbdtClassifier, ModelArtifact, TreeArtifact};
    use credit_risk::scoring::ScoringService;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn fixture_artifact() -> ModelArtifact {
        let stump = |feature: u32, threshold: f32, lo: f32, hi: f32| TreeArtifact {
            split_indices: vec![feature, 0, 0],
            split_conditions: vec![threshold, lo, hi],
            left_children: vec![1, -1, -1],
            right_children: vec![2, -1, -1],
            default_left: vec![true, false, false],
            sum_hessian: vec![],
        };
        ModelArtifact {
            feature_names: vec![
                "person_age".to_string(),
                "loan_int_rate".to_string(),
                "loan_percent_income".to_string(),
                "loan_grade_D".to_string(),
                "cb_person_default_on_file_Y".to_string(),
            ],
            base_score: -0.6,
            trees: vec![
                stump(1, 13.0, -0.8, 0.9),
                stump(2, 0.3, -0.5, 0.8),
                stump(3, 0.5, -0.2, 0.7),
            ],
        }
    }

    fn state_with_model(loaded: bool) -> AppState {
        let service = loaded.then(|| {
            let model =
                GbdtClassifier::from_artifact(fixture_artifact()).expect("fixture model builds");
            Arc::new(ScoringService::new(model).expect("service builds"))
        });
        let handle = PrometheusBuilder::new()
            .build_recorder()
            .handle();
        AppState {
            service,
            readiness: Arc::new(AtomicBool::new(true)),
            metrics: Arc::new(handle),
        }
    }

    #[tokio::test]
    async fn predict_endpoint_returns_scorecard_and_attribution() {
        let record = ApplicantRecord {
            loan_int_rate: 19.0,
            loan_percent_income: 0.55,
            loan_grade: "D".to_string(),
            ..ApplicantRecord::ideal_defaults()
        };

        let Json(body) = predict_endpoint(Extension(state_with_model(true)), Json(record))
            .await
            .expect("prediction succeeds");

        assert!(body.probability >= 0.5);
        assert_eq!(body.prediction, 1);
        assert_eq!(body.risk_label, "High Risk");
        assert_eq!(body.risk_color, "#c62828");

        let attribution = body.attribution.expect("attribution attached");
        assert_eq!(attribution.method, AttributionMethod::Tree);
        assert!(attribution.contributions.len() <= MAX_CONTRIBUTIONS);
        let total: f64 = attribution.contributions.iter().map(|c| c.value).sum();
        assert!((attribution.base_value + total - body.probability).abs() < 1e-6);
    }

    #[tokio::test]
    async fn predict_endpoint_reports_model_unavailable() {
        let result = predict_endpoint(
            Extension(state_with_model(false)),
            Json(ApplicantRecord::ideal_defaults()),
        )
        .await;

        let err = result.err().expect("prediction rejected");
        assert!(matches!(err, AppError::ModelUnavailable));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn defaults_endpoint_returns_ideal_record() {
        let Json(defaults) = defaults_endpoint(Extension(state_with_model(true)))
            .await
            .expect("defaults available");
        assert_eq!(defaults, ApplicantRecord::ideal_defaults());
        assert_eq!(defaults.loan_grade, "A");
    }

    #[tokio::test]
    async fn malformed_payload_is_a_client_error() {
        let app = router().layer(Extension(state_with_model(true)));
        let request = Request::builder()
            .method("POST")
            .uri("/api/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .expect("request builds");

        let response = app.oneshot(request).await.expect("router responds");
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn healthcheck_is_static_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body, json!({ "status": "ok" }));
    }
}
