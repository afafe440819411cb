//! Test outcome - the structured result handed back to the front end

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::core::kind::TestKind;
use crate::core::outlier::Screening;
use crate::core::product::ProductLine;

/// Overall classification of a computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Enough valid specimens; a final value is reported
    Accepted,
    /// Too few specimens survived the outlier rule
    RepeatTest,
    /// No specimen reading was filled in
    FieldsEmpty,
    /// The formula produced a physically meaningless result
    OutOfRange,
    /// The inputs could not be computed at all
    Rejected,
    /// No formula exists for the requisite
    NotImplemented,
}

impl Verdict {
    /// True when a final value is available
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accepted => write!(f, "accepted"),
            Verdict::RepeatTest => write!(f, "repeat_test"),
            Verdict::FieldsEmpty => write!(f, "fields_empty"),
            Verdict::OutOfRange => write!(f, "out_of_range"),
            Verdict::Rejected => write!(f, "rejected"),
            Verdict::NotImplemented => write!(f, "not_implemented"),
        }
    }
}

/// Classification of one specimen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecimenStatus {
    /// Counted toward the final mean
    Valid,
    /// Discarded by the outlier rule
    Excluded,
    /// Left blank on the form
    Unfilled,
}

impl fmt::Display for SpecimenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecimenStatus::Valid => write!(f, "valid"),
            SpecimenStatus::Excluded => write!(f, "excluded"),
            SpecimenStatus::Unfilled => write!(f, "unfilled"),
        }
    }
}

/// Derived quantity for one specimen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecimenResult {
    /// Specimen label ("CP 1", "CP 2", ...)
    pub label: String,

    /// Derived value (absent when unfilled)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    /// Deviation from the batch mean, in the unit of the rule applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deviation: Option<f64>,

    /// Valid / excluded / unfilled
    pub status: SpecimenStatus,
}

impl SpecimenResult {
    /// A specimen that takes part in no outlier rule
    pub fn plain(index: usize, value: Option<f64>) -> Self {
        Self {
            label: specimen_label(index),
            value,
            deviation: None,
            status: if value.is_some() {
                SpecimenStatus::Valid
            } else {
                SpecimenStatus::Unfilled
            },
        }
    }
}

/// "CP n" label for the specimen at a zero-based index
pub fn specimen_label(index: usize) -> String {
    format!("CP {}", index + 1)
}

/// Named intermediate quantity shown alongside the result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedValue {
    pub name: String,
    pub value: f64,
    pub unit: String,
}

/// Input faults: the computation cannot be carried out with these readings
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InputFault {
    #[error("{field} must not be zero")]
    ZeroDenominator { field: &'static str },

    #[error("{field} must be greater than zero (got {value})")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} is required")]
    Unset { field: &'static str },

    #[error("gross mass ({gross} g) is below the tare ({tare} g)")]
    GrossBelowTare { gross: f64, tare: f64 },

    #[error("{field} is not a finite number")]
    NotFinite { field: String },

    #[error("result is not a finite number ({quantity}); check the readings for extreme values")]
    NonFiniteResult { quantity: String },
}

/// Aggregate result of one computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    /// Formula applied (absent for unresolved requisites)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<TestKind>,

    /// Product line the limits were read for
    pub product: ProductLine,

    /// Overall classification
    pub verdict: Verdict,

    /// Human-readable explanation of the verdict
    pub reason: String,

    /// Unit of the specimen values and final result
    pub unit: String,

    /// Per-specimen results
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub specimens: Vec<SpecimenResult>,

    /// Mean of the filled specimens before exclusion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,

    /// Number of specimens counted toward the final value
    pub valid_count: usize,

    /// Minimum number of valid specimens required
    pub minimum: usize,

    /// Final result (only when accepted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_value: Option<f64>,

    /// Intermediate quantities
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub derived: Vec<DerivedValue>,

    /// Advisory notes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl TestOutcome {
    /// Start an outcome for a test; the verdict defaults to accepted
    pub fn new(test: TestKind, product: ProductLine) -> Self {
        Self {
            test: Some(test),
            product,
            verdict: Verdict::Accepted,
            reason: String::new(),
            unit: test.unit().to_string(),
            specimens: Vec::new(),
            mean: None,
            valid_count: 0,
            minimum: 0,
            final_value: None,
            derived: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Outcome for a single-value test (retention, density)
    pub fn single(test: TestKind, product: ProductLine, value: f64) -> Self {
        let mut outcome = Self::new(test, product);
        outcome.valid_count = 1;
        outcome.minimum = 1;
        outcome.final_value = Some(value);
        outcome.reason = format!("{} = {:.2} {}", test.title(), value, test.unit());
        outcome
    }

    /// Outcome built from an outlier screening
    pub fn from_screening(test: TestKind, product: ProductLine, screening: Screening) -> Self {
        let mut outcome = Self::new(test, product);
        outcome.verdict = screening.verdict;
        outcome.reason = screening.reason;
        outcome.specimens = screening.specimens;
        outcome.mean = screening.mean;
        outcome.valid_count = screening.valid_count;
        outcome.minimum = screening.minimum;
        outcome.final_value = screening.final_mean;
        outcome
    }

    /// Outcome for readings that could not be computed
    pub fn rejected(test: TestKind, product: ProductLine, fault: &InputFault) -> Self {
        let mut outcome = Self::new(test, product);
        outcome.verdict = Verdict::Rejected;
        outcome.reason = fault.to_string();
        outcome
    }

    /// Outcome for a requisite with no formula behind it
    pub fn not_implemented(product: ProductLine, requisite: &str) -> Self {
        Self {
            test: None,
            product,
            verdict: Verdict::NotImplemented,
            reason: format!("no calculator is available yet for '{}'", requisite),
            unit: String::new(),
            specimens: Vec::new(),
            mean: None,
            valid_count: 0,
            minimum: 0,
            final_value: None,
            derived: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Record an intermediate quantity
    pub fn derive(&mut self, name: impl Into<String>, value: f64, unit: impl Into<String>) {
        self.derived.push(DerivedValue {
            name: name.into(),
            value,
            unit: unit.into(),
        });
    }

    /// Add an advisory note
    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    /// First computed quantity that is NaN or infinite
    pub fn non_finite(&self) -> Option<String> {
        let bad = |v: Option<f64>| v.is_some_and(|v| !v.is_finite());
        if bad(self.final_value) {
            return Some("final value".to_string());
        }
        if bad(self.mean) {
            return Some("mean".to_string());
        }
        if let Some(s) = self
            .specimens
            .iter()
            .find(|s| bad(s.value) || bad(s.deviation))
        {
            return Some(s.label.clone());
        }
        self.derived
            .iter()
            .find(|d| !d.value.is_finite())
            .map(|d| d.name.clone())
    }

    /// Specimens discarded by the outlier rule
    pub fn excluded(&self) -> impl Iterator<Item = &SpecimenResult> {
        self.specimens
            .iter()
            .filter(|s| s.status == SpecimenStatus::Excluded)
    }
}
