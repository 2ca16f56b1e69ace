use serde::{Deserialize, Serialize};

/// Flat applicant/loan record as submitted by callers. Missing numeric
/// fields default to 0, missing categorical fields to the empty string
/// (which encodes as the baseline category).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    #[serde(default)]
    pub person_age: f64,
    #[serde(default)]
    pub person_income: f64,
    #[serde(default)]
    pub person_emp_length: f64,
    #[serde(default)]
    pub loan_amnt: f64,
    #[serde(default)]
    pub loan_int_rate: f64,
    #[serde(default)]
    pub loan_percent_income: f64,
    #[serde(default)]
    pub cb_person_cred_hist_length: f64,
    #[serde(default)]
    pub person_home_ownership: String,
    #[serde(default)]
    pub loan_intent: String,
    #[serde(default)]
    pub loan_grade: String,
    #[serde(default)]
    pub cb_person_default_on_file: String,
}

impl ApplicantRecord {
    /// Low-risk defaults used to pre-populate consumer UIs and as the
    /// center of the background sampling distribution.
    pub fn ideal_defaults() -> Self {
        Self {
            person_age: 35.0,
            person_income: 85_000.0,
            person_emp_length: 8.0,
            loan_amnt: 10_000.0,
            loan_int_rate: 11.0,
            loan_percent_income: 0.15,
            cb_person_cred_hist_length: 10.0,
            person_home_ownership: "OWN".to_string(),
            loan_intent: "DEBTCONSOLIDATION".to_string(),
            loan_grade: "A".to_string(),
            cb_person_default_on_file: "N".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericField {
    Age,
    Income,
    EmploymentLength,
    LoanAmount,
    InterestRate,
    LoanToIncome,
    CreditHistoryLength,
}

impl NumericField {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Age,
            Self::Income,
            Self::EmploymentLength,
            Self::LoanAmount,
            Self::InterestRate,
            Self::LoanToIncome,
            Self::CreditHistoryLength,
        ]
    }

    /// Column name in the trained feature layout.
    pub const fn column(self) -> &'static str {
        match self {
            Self::Age => "person_age",
            Self::Income => "person_income",
            Self::EmploymentLength => "person_emp_length",
            Self::LoanAmount => "loan_amnt",
            Self::InterestRate => "loan_int_rate",
            Self::LoanToIncome => "loan_percent_income",
            Self::CreditHistoryLength => "cb_person_cred_hist_length",
        }
    }

    pub fn value_of(self, record: &ApplicantRecord) -> f64 {
        match self {
            Self::Age => record.person_age,
            Self::Income => record.person_income,
            Self::EmploymentLength => record.person_emp_length,
            Self::LoanAmount => record.loan_amnt,
            Self::InterestRate => record.loan_int_rate,
            Self::LoanToIncome => record.loan_percent_income,
            Self::CreditHistoryLength => record.cb_person_cred_hist_length,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoricalField {
    HomeOwnership,
    LoanIntent,
    LoanGrade,
    PriorDefault,
}

impl CategoricalField {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::HomeOwnership,
            Self::LoanIntent,
            Self::LoanGrade,
            Self::PriorDefault,
        ]
    }

    /// Indicator-column prefix in the trained feature layout. Columns
    /// are named `<prefix>_<CATEGORY>`.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::HomeOwnership => "person_home_ownership",
            Self::LoanIntent => "loan_intent",
            Self::LoanGrade => "loan_grade",
            Self::PriorDefault => "cb_person_default_on_file",
        }
    }

    /// Full category set, including the drop-first baseline that has
    /// no indicator column of its own.
    pub const fn options(self) -> &'static [&'static str] {
        match self {
            Self::HomeOwnership => &["OWN", "MORTGAGE", "RENT", "OTHER"],
            Self::LoanIntent => &[
                "DEBTCONSOLIDATION",
                "HOMEIMPROVEMENT",
                "EDUCATION",
                "MEDICAL",
                "PERSONAL",
                "VENTURE",
            ],
            Self::LoanGrade => &["A", "B", "C", "D", "E", "F", "G"],
            Self::PriorDefault => &["N", "Y"],
        }
    }

    pub fn value_of(self, record: &ApplicantRecord) -> &str {
        match self {
            Self::HomeOwnership => &record.person_home_ownership,
            Self::LoanIntent => &record.loan_intent,
            Self::LoanGrade => &record.loan_grade,
            Self::PriorDefault => &record.cb_person_default_on_file,
        }
    }

    pub fn set_value(self, record: &mut ApplicantRecord, value: &str) {
        let slot = match self {
            Self::HomeOwnership => &mut record.person_home_ownership,
            Self::LoanIntent => &mut record.loan_intent,
            Self::LoanGrade => &mut record.loan_grade,
            Self::PriorDefault => &mut record.cb_person_default_on_file,
        };
        *slot = value.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let record: ApplicantRecord =
            serde_json::from_str(r#"{"person_age": 42, "loan_grade": "C"}"#)
                .expect("partial payload accepted");
        assert_eq!(record.person_age, 42.0);
        assert_eq!(record.person_income, 0.0);
        assert_eq!(record.loan_grade, "C");
        assert!(record.loan_intent.is_empty());
    }

    #[test]
    fn ideal_defaults_cover_every_categorical_option_set() {
        let defaults = ApplicantRecord::ideal_defaults();
        for field in CategoricalField::ordered() {
            let value = field.value_of(&defaults);
            assert!(
                field.options().contains(&value),
                "default '{value}' missing from {:?} options",
                field
            );
        }
    }
}
