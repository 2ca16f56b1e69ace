//! Synthetic background population for interventional attribution.
//!
//! Each numeric attribute is drawn from a normal distribution centered
//! on the ideal default and clipped to a plausible range; categoricals
//! are drawn uniformly. The seed is fixed so the background (and
//! therefore attribution output) is reproducible across runs. This is
//! a heuristic population, not the training distribution.

use crate::scoring::record::{ApplicantRecord, CategoricalField, NumericField};
use crate::scoring::schema::FeatureSchema;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

pub const BACKGROUND_ROWS: usize = 200;
pub const BACKGROUND_SEED: u64 = 42;

/// Standard deviation and clip range per numeric attribute, centered
/// on the ideal default.
const fn spread(field: NumericField) -> (f64, f64, f64) {
    match field {
        NumericField::Age => (8.0, 18.0, 90.0),
        NumericField::Income => (30_000.0, 10_000.0, 300_000.0),
        NumericField::EmploymentLength => (3.0, 0.0, 40.0),
        NumericField::LoanAmount => (8_000.0, 500.0, 100_000.0),
        NumericField::InterestRate => (5.0, 1.0, 40.0),
        NumericField::LoanToIncome => (0.08, 0.0, 1.0),
        NumericField::CreditHistoryLength => (5.0, 0.0, 40.0),
    }
}

pub struct BackgroundSampler<'a> {
    schema: &'a FeatureSchema,
}

impl<'a> BackgroundSampler<'a> {
    pub fn new(schema: &'a FeatureSchema) -> Self {
        Self { schema }
    }

    /// Draw `n` raw records from the heuristic population.
    pub fn sample_records(&self, n: usize) -> Vec<ApplicantRecord> {
        let mut rng = StdRng::seed_from_u64(BACKGROUND_SEED);
        let defaults = ApplicantRecord::ideal_defaults();
        (0..n).map(|_| sample_record(&mut rng, &defaults)).collect()
    }

    /// Draw `n` records and encode them into the model's feature layout.
    pub fn sample_matrix(&self, n: usize) -> Vec<Vec<f32>> {
        self.sample_records(n)
            .iter()
            .map(|record| self.schema.encode(record))
            .collect()
    }
}

fn sample_record(rng: &mut StdRng, defaults: &ApplicantRecord) -> ApplicantRecord {
    let mut record = defaults.clone();

    record.person_age = sample_numeric(rng, defaults, NumericField::Age);
    record.person_income = sample_numeric(rng, defaults, NumericField::Income);
    record.person_emp_length = sample_numeric(rng, defaults, NumericField::EmploymentLength);
    record.loan_amnt = sample_numeric(rng, defaults, NumericField::LoanAmount);
    record.loan_int_rate = sample_numeric(rng, defaults, NumericField::InterestRate);
    record.loan_percent_income = sample_numeric(rng, defaults, NumericField::LoanToIncome);
    record.cb_person_cred_hist_length =
        sample_numeric(rng, defaults, NumericField::CreditHistoryLength);

    for field in CategoricalField::ordered() {
        let options = field.options();
        let choice = options[rng.gen_range(0..options.len())];
        field.set_value(&mut record, choice);
    }

    record
}

fn sample_numeric(rng: &mut StdRng, defaults: &ApplicantRecord, field: NumericField) -> f64 {
    let (sd, min, max) = spread(field);
    let mean = field.value_of(defaults);
    let normal = Normal::new(mean, sd).expect("finite spread constants");
    normal.sample(rng).clamp(min, max)
}
