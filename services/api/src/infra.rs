use credit_risk::error::AppError;
use credit_risk::model::GbdtClassifier;
use credit_risk::scoring::ScoringService;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    /// `None` when the model artifact failed to load at startup; every
    /// scoring request is then answered with a model-unavailable error.
    pub(crate) service: Option<Arc<ScoringService>>,
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn load_service(path: &Path) -> Result<ScoringService, AppError> {
    let model = GbdtClassifier::from_path(path)?;
    Ok(ScoringService::new(model)?)
}
