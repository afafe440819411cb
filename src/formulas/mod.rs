//! Test formulas
//!
//! One module per [`TestKind`]. Each formula declares the named fields it
//! reads, builds itself from a [`Readings`] map and computes a
//! [`TestOutcome`] against the threshold table. Input faults are detected
//! before any arithmetic and come back as [`InputFault`]s, which
//! [`evaluate`] turns into rejected outcomes.

pub mod adhesion;
pub mod capillarity;
pub mod compressive;
pub mod density;
pub mod dimensional;
pub mod flexural;
pub mod mass;
pub mod permeability;
pub mod retention;
pub mod shrinkage;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

use crate::core::kind::TestKind;
use crate::core::limits::ThresholdTable;
use crate::core::outcome::{InputFault, TestOutcome};
use crate::core::product::ProductLine;
use crate::core::resolver::{resolve, Resolution};

pub use adhesion::{AutomaticAdhesion, ManualAdhesion};
pub use capillarity::Capillarity;
pub use compressive::{CylindricalCompressive, PrismaticCompressive};
pub use density::FreshDensity;
pub use dimensional::DimensionalVariation;
pub use flexural::Flexural;
pub use mass::MassVariation;
pub use permeability::Permeability;
pub use retention::{WaterRetentionPaste, WaterRetentionRatio};
pub use shrinkage::Shrinkage;

/// Single-specimen field names, in form order
pub(crate) const CP: [&str; 13] = [
    "cp1", "cp2", "cp3", "cp4", "cp5", "cp6", "cp7", "cp8", "cp9", "cp10", "cp11", "cp12", "cp13",
];

/// Initial/final reading pairs of three specimens
pub(crate) const CP_INITIAL: [&str; 3] = ["cp1_initial", "cp2_initial", "cp3_initial"];
pub(crate) const CP_FINAL: [&str; 3] = ["cp1_final", "cp2_final", "cp3_final"];

/// Common interface of every test formula
pub trait Formula: Sized {
    /// The test this formula computes
    const KIND: TestKind;

    /// Named input fields, in form order
    fn fields() -> Vec<FieldSpec>;

    /// Build the formula inputs from a readings map
    fn from_readings(readings: &Readings) -> Self;

    /// Apply the formula for a product line
    fn compute(
        &self,
        product: ProductLine,
        limits: &ThresholdTable,
    ) -> Result<TestOutcome, InputFault>;
}

/// One named numeric input of a formula
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: String,
    pub unit: &'static str,
}

impl FieldSpec {
    pub fn new(name: &'static str, label: impl Into<String>, unit: &'static str) -> Self {
        Self {
            name,
            label: label.into(),
            unit,
        }
    }

    /// One field per specimen: `cp1` .. `cpN`
    pub fn specimens(count: usize, unit: &'static str) -> Vec<Self> {
        CP.iter()
            .take(count)
            .enumerate()
            .map(|(i, name)| Self::new(*name, format!("CP {}", i + 1), unit))
            .collect()
    }

    /// Initial/final pairs for three specimens
    pub fn pairs(initial: &str, last: &str, unit: &'static str) -> Vec<Self> {
        CP_INITIAL
            .iter()
            .zip(CP_FINAL.iter())
            .enumerate()
            .flat_map(|(i, (ini, fin))| {
                [
                    Self::new(*ini, format!("CP {} {}", i + 1, initial), unit),
                    Self::new(*fin, format!("CP {} {}", i + 1, last), unit),
                ]
            })
            .collect()
    }
}

/// Errors in a readings map or a `name=value` pair
#[derive(Debug, Error, Diagnostic, PartialEq)]
pub enum ReadingsError {
    #[error("expected name=value, got '{0}'")]
    #[diagnostic(code(mortarlab::readings::malformed))]
    Malformed(String),

    #[error("invalid number for '{field}': '{value}'")]
    #[diagnostic(
        code(mortarlab::readings::number),
        help("use '.' or ',' as the decimal separator")
    )]
    InvalidNumber { field: String, value: String },

    #[error("unknown field '{field}' for {test} (valid: {valid})")]
    #[diagnostic(
        code(mortarlab::readings::field),
        help("run `mortarlab fields <PRODUCT> <TEST>` to list the inputs of a test")
    )]
    UnknownField {
        field: String,
        test: TestKind,
        valid: String,
    },
}

/// Named numeric readings entered for one test
///
/// Fields that were never entered read as zero, the unfilled sentinel of the
/// laboratory forms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Readings(BTreeMap<String, f64>);

impl Readings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a field, zero when absent
    pub fn get(&self, name: &str) -> f64 {
        self.0.get(name).copied().unwrap_or(0.0)
    }

    /// Value of a field if it was entered at all
    pub fn get_opt(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    /// Builder-style [`Readings::set`]
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set(name, value);
        self
    }

    /// Layer another map on top of this one
    pub fn extend(&mut self, other: Readings) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Parse a `name=value` pair; a decimal comma is accepted
    pub fn parse_pair(pair: &str) -> Result<(String, f64), ReadingsError> {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| ReadingsError::Malformed(pair.to_string()))?;
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return Err(ReadingsError::Malformed(pair.to_string()));
        }
        let number = parse_number(value).ok_or_else(|| ReadingsError::InvalidNumber {
            field: name.clone(),
            value: value.trim().to_string(),
        })?;
        Ok((name, number))
    }

    /// Reject names the test does not read
    pub fn check_fields(&self, kind: TestKind) -> Result<(), ReadingsError> {
        let known = fields(kind);
        for name in self.0.keys() {
            if !known.iter().any(|f| f.name == name.as_str()) {
                return Err(ReadingsError::UnknownField {
                    field: name.clone(),
                    test: kind,
                    valid: known
                        .iter()
                        .map(|f| f.name)
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
        }
        Ok(())
    }

    /// First field holding NaN or an infinity
    fn non_finite(&self) -> Option<&str> {
        self.0
            .iter()
            .find(|(_, v)| !v.is_finite())
            .map(|(k, _)| k.as_str())
    }
}

impl FromIterator<(String, f64)> for Readings {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Parse a number typed on a Brazilian lab form (`"1,25"` or `"1.25"`)
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>()
        .ok()
        .or_else(|| text.replace(',', ".").parse::<f64>().ok())
}

/// Input schema of a test kind
pub fn fields(kind: TestKind) -> Vec<FieldSpec> {
    match kind {
        TestKind::WaterRetentionRatio => WaterRetentionRatio::fields(),
        TestKind::WaterRetentionPaste => WaterRetentionPaste::fields(),
        TestKind::FreshDensity => FreshDensity::fields(),
        TestKind::Flexural => Flexural::fields(),
        TestKind::PrismaticCompressive => PrismaticCompressive::fields(),
        TestKind::CylindricalCompressive => CylindricalCompressive::fields(),
        TestKind::DimensionalVariation => DimensionalVariation::fields(),
        TestKind::MassVariation => MassVariation::fields(),
        TestKind::Capillarity => Capillarity::fields(),
        TestKind::AutomaticAdhesion => AutomaticAdhesion::fields(),
        TestKind::ManualAdhesion => ManualAdhesion::fields(),
        TestKind::Permeability => Permeability::fields(),
        TestKind::Shrinkage => Shrinkage::fields(),
    }
}

fn run<F: Formula>(
    product: ProductLine,
    readings: &Readings,
    limits: &ThresholdTable,
) -> TestOutcome {
    match F::from_readings(readings).compute(product, limits) {
        Ok(outcome) => match outcome.non_finite() {
            None => outcome,
            Some(quantity) => {
                let fault = InputFault::NonFiniteResult { quantity };
                debug!(test = %F::KIND, %fault, "computation overflowed");
                TestOutcome::rejected(F::KIND, product, &fault)
            }
        },
        Err(fault) => {
            debug!(test = %F::KIND, %fault, "computation rejected");
            TestOutcome::rejected(F::KIND, product, &fault)
        }
    }
}

/// Compute a test for a product line
///
/// Unknown field names are an error of the caller; every other problem with
/// the readings ends up in the returned outcome.
pub fn evaluate(
    product: ProductLine,
    kind: TestKind,
    readings: &Readings,
    limits: &ThresholdTable,
) -> Result<TestOutcome, ReadingsError> {
    readings.check_fields(kind)?;

    if let Some(field) = readings.non_finite() {
        let fault = InputFault::NotFinite {
            field: field.to_string(),
        };
        return Ok(TestOutcome::rejected(kind, product, &fault));
    }

    let outcome = match kind {
        TestKind::WaterRetentionRatio => run::<WaterRetentionRatio>(product, readings, limits),
        TestKind::WaterRetentionPaste => run::<WaterRetentionPaste>(product, readings, limits),
        TestKind::FreshDensity => run::<FreshDensity>(product, readings, limits),
        TestKind::Flexural => run::<Flexural>(product, readings, limits),
        TestKind::PrismaticCompressive => run::<PrismaticCompressive>(product, readings, limits),
        TestKind::CylindricalCompressive => {
            run::<CylindricalCompressive>(product, readings, limits)
        }
        TestKind::DimensionalVariation => run::<DimensionalVariation>(product, readings, limits),
        TestKind::MassVariation => run::<MassVariation>(product, readings, limits),
        TestKind::Capillarity => run::<Capillarity>(product, readings, limits),
        TestKind::AutomaticAdhesion => run::<AutomaticAdhesion>(product, readings, limits),
        TestKind::ManualAdhesion => run::<ManualAdhesion>(product, readings, limits),
        TestKind::Permeability => run::<Permeability>(product, readings, limits),
        TestKind::Shrinkage => run::<Shrinkage>(product, readings, limits),
    };
    Ok(outcome)
}

/// Resolve a requisite name and compute it
pub fn evaluate_requisite(
    product: ProductLine,
    requisite: &str,
    readings: &Readings,
    limits: &ThresholdTable,
) -> Result<TestOutcome, ReadingsError> {
    match resolve(product, requisite) {
        Resolution::Formula(kind) => evaluate(product, kind, readings, limits),
        Resolution::NotImplemented => Ok(TestOutcome::not_implemented(product, requisite)),
    }
}

/// Specimen values of `cp1..cpN` with the zero sentinel mapped to `None`
pub(crate) fn specimen_values(readings: &Readings, count: usize) -> Vec<Option<f64>> {
    CP.iter()
        .take(count)
        .map(|name| crate::core::outlier::filled(readings.get(name)))
        .collect()
}

/// Initial/final pairs of three specimens
pub(crate) fn reading_pairs(readings: &Readings) -> [(f64, f64); 3] {
    [0, 1, 2].map(|i| (readings.get(CP_INITIAL[i]), readings.get(CP_FINAL[i])))
}

/// Reject negative specimen readings; zero stays the unfilled sentinel
pub(crate) fn check_not_negative(values: &[Option<f64>]) -> Result<(), InputFault> {
    for (name, value) in CP.iter().zip(values) {
        if let Some(v) = value {
            if *v < 0.0 {
                return Err(InputFault::NotPositive {
                    field: *name,
                    value: *v,
                });
            }
        }
    }
    Ok(())
}

/// Reject negative masses or lengths in initial/final pairs
pub(crate) fn check_pairs_not_negative(
    pairs: &[(f64, f64); 3],
    first: [&'static str; 3],
    second: [&'static str; 3],
) -> Result<(), InputFault> {
    for (i, &(a, b)) in pairs.iter().enumerate() {
        for (field, value) in [(first[i], a), (second[i], b)] {
            if value < 0.0 {
                return Err(InputFault::NotPositive { field, value });
            }
        }
    }
    Ok(())
}

/// Accepted interval note for percentage rules
pub(crate) fn interval_note(outcome: &mut TestOutcome, low: f64, high: f64) {
    let unit = outcome.unit.clone();
    outcome.note(format!("accepted interval: {:.2} to {:.2} {}", low, high, unit));
}
