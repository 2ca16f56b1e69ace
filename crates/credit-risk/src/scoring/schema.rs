//! Feature-vector assembly in the exact column order the model was
//! trained with.
//!
//! The schema is derived entirely from the artifact's declared feature
//! names. A column that matches neither a known numeric attribute nor
//! a known categorical prefix is rejected at load time; guessing a
//! frozen column order risks silently misaligned predictions.

use crate::scoring::record::{ApplicantRecord, CategoricalField, NumericField};

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("model declares an empty feature list")]
    Empty,
    #[error("unrecognized feature column '{0}'")]
    UnknownColumn(String),
}

#[derive(Debug, Clone)]
struct IndicatorColumn {
    index: usize,
    /// Uppercased category suffix, e.g. `RENT` in `person_home_ownership_RENT`.
    suffix: String,
}

#[derive(Debug, Clone)]
struct IndicatorGroup {
    field: CategoricalField,
    columns: Vec<IndicatorColumn>,
}

/// Ordered feature layout introspected from the loaded model.
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    columns: Vec<String>,
    numeric: Vec<(usize, NumericField)>,
    groups: Vec<IndicatorGroup>,
}

impl FeatureSchema {
    pub fn from_feature_names(names: &[String]) -> Result<Self, SchemaError> {
        if names.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut numeric = Vec::new();
        let mut groups: Vec<IndicatorGroup> = CategoricalField::ordered()
            .into_iter()
            .map(|field| IndicatorGroup {
                field,
                columns: Vec::new(),
            })
            .collect();

        'columns: for (index, name) in names.iter().enumerate() {
            for field in NumericField::ordered() {
                if name == field.column() {
                    numeric.push((index, field));
                    continue 'columns;
                }
            }
            for group in &mut groups {
                let prefix = group.field.prefix();
                if let Some(rest) = name.strip_prefix(prefix) {
                    if let Some(suffix) = rest.strip_prefix('_') {
                        group.columns.push(IndicatorColumn {
                            index,
                            suffix: suffix.to_uppercase(),
                        });
                        continue 'columns;
                    }
                }
            }
            return Err(SchemaError::UnknownColumn(name.clone()));
        }

        Ok(Self {
            columns: names.to_vec(),
            numeric,
            groups,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Build the single-row feature vector for a record.
    ///
    /// Numeric attributes are copied through; each categorical group
    /// sets at most one indicator to 1.0 (uppercased suffix match), and
    /// an unknown category leaves the whole group at the all-zero
    /// baseline encoding.
    pub fn encode(&self, record: &ApplicantRecord) -> Vec<f32> {
        let mut row = vec![0.0f32; self.columns.len()];

        for (index, field) in &self.numeric {
            row[*index] = field.value_of(record) as f32;
        }

        for group in &self.groups {
            let raw = group.field.value_of(record).trim().to_uppercase();
            if raw.is_empty() {
                continue;
            }
            for column in &group.columns {
                if column.suffix == raw {
                    row[column.index] = 1.0;
                    break;
                }
            }
        }

        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trained_columns() -> Vec<String> {
        [
            "person_age",
            "person_income",
            "loan_int_rate",
            "person_home_ownership_MORTGAGE",
            "person_home_ownership_OWN",
            "person_home_ownership_RENT",
            "loan_grade_B",
            "loan_grade_C",
            "cb_person_default_on_file_Y",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn vector_matches_declared_column_order() {
        let schema = FeatureSchema::from_feature_names(&trained_columns()).expect("schema builds");
        let row = schema.encode(&ApplicantRecord::ideal_defaults());
        assert_eq!(row.len(), schema.columns().len());
        assert_eq!(schema.columns(), trained_columns().as_slice());
    }

    #[test]
    fn at_most_one_indicator_per_group() {
        let schema = FeatureSchema::from_feature_names(&trained_columns()).expect("schema builds");
        let mut record = ApplicantRecord::ideal_defaults();
        record.person_home_ownership = "rent".to_string(); // lowercase on purpose
        let row = schema.encode(&record);

        let ownership: f32 = row[3] + row[4] + row[5];
        assert_eq!(ownership, 1.0);
        assert_eq!(row[5], 1.0, "RENT indicator set");
    }

    #[test]
    fn unknown_category_encodes_as_baseline() {
        let schema = FeatureSchema::from_feature_names(&trained_columns()).expect("schema builds");
        let mut record = ApplicantRecord::ideal_defaults();
        record.person_home_ownership = "HOUSEBOAT".to_string();
        let row = schema.encode(&record);
        assert_eq!(row[3] + row[4] + row[5], 0.0);
    }

    #[test]
    fn drop_first_baseline_stays_zero() {
        let schema = FeatureSchema::from_feature_names(&trained_columns()).expect("schema builds");
        // grade A and no prior default are the dropped baseline levels
        let row = schema.encode(&ApplicantRecord::ideal_defaults());
        assert_eq!(row[6], 0.0);
        assert_eq!(row[7], 0.0);
        assert_eq!(row[8], 0.0);
    }

    #[test]
    fn numeric_fields_copied_through() {
        let schema = FeatureSchema::from_feature_names(&trained_columns()).expect("schema builds");
        let defaults = ApplicantRecord::ideal_defaults();
        let row = schema.encode(&defaults);
        assert_eq!(row[0], 35.0);
        assert_eq!(row[1], 85_000.0);
        assert_eq!(row[2], 11.0);
    }

    #[test]
    fn unrecognized_column_is_rejected() {
        let mut columns = trained_columns();
        columns.push("zodiac_sign".to_string());
        let result = FeatureSchema::from_feature_names(&columns);
        assert!(matches!(result, Err(SchemaError::UnknownColumn(name)) if name == "zodiac_sign"));
    }

    #[test]
    fn empty_feature_list_is_rejected() {
        assert!(matches!(
            FeatureSchema::from_feature_names(&[]),
            Err(SchemaError::Empty)
        ));
    }
}
