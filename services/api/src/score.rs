use crate::infra::load_service;
use clap::Args;
use credit_risk::config::AppConfig;
use credit_risk::error::AppError;
use credit_risk::scoring::{ApplicantRecord, RiskAssessment};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON file containing an applicant record (defaults to the ideal defaults)
    #[arg(long)]
    pub(crate) input: Option<PathBuf>,
    /// Override the configured model artifact path
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
    /// Number of attribution rows to print
    #[arg(long, default_value_t = 10)]
    pub(crate) top: usize,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let model_path = args.model.unwrap_or(config.model.path);
    let service = load_service(&model_path)?;

    let record = match args.input {
        Some(path) => {
            let file = File::open(path)?;
            serde_json::from_reader(BufReader::new(file)).map_err(AppError::Input)?
        }
        None => ApplicantRecord::ideal_defaults(),
    };

    let assessment = service.assess(&record);
    render_assessment(&assessment, args.top);
    Ok(())
}

fn render_assessment(assessment: &RiskAssessment, top: usize) {
    let scorecard = &assessment.scorecard;
    println!(
        "Default probability: {:.4} -> prediction {} ({})",
        scorecard.probability,
        scorecard.prediction,
        scorecard.tier.label()
    );

    match &assessment.attribution {
        Some(attribution) => {
            println!(
                "Attribution ({:?}) | baseline {:.4} -> predicted {:.4}",
                attribution.method, attribution.base_value, attribution.prediction_probability
            );
            for contribution in attribution.top(top) {
                println!("  {:<34} {:>+10.6}", contribution.feature, contribution.value);
            }
        }
        None => println!("Attribution unavailable for this prediction"),
    }
}
