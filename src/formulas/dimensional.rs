//! Dimensional variation (ABNT NBR 15261)
//!
//! Each specimen contributes `(final - initial) / L * 1000` mm/m, where `L`
//! is the product's reference length. A specimen with both comparator
//! readings at zero was not measured.

use super::{reading_pairs, FieldSpec, Formula, Readings};
use crate::core::kind::TestKind;
use crate::core::limits::{LimitKey, ThresholdTable};
use crate::core::outcome::{InputFault, TestOutcome};
use crate::core::outlier::{screen, DeviationRule};
use crate::core::product::ProductLine;

pub const MINIMUM: usize = 2;

/// Shift between the initial and post-exclusion means worth reporting (mm/m)
const MEAN_SHIFT_NOTE: f64 = 0.001;

#[derive(Debug, Clone, PartialEq)]
pub struct DimensionalVariation {
    /// Comparator readings (initial, final) in mm
    pub readings: [(f64, f64); 3],
}

impl DimensionalVariation {
    /// Variation of each specimen in mm/m
    pub fn variations(&self, reference_length: f64) -> Vec<Option<f64>> {
        self.readings
            .iter()
            .map(|&(initial, last)| {
                if initial == 0.0 && last == 0.0 {
                    None
                } else {
                    Some((last - initial) / reference_length * 1000.0)
                }
            })
            .collect()
    }
}

impl Formula for DimensionalVariation {
    const KIND: TestKind = TestKind::DimensionalVariation;

    fn fields() -> Vec<FieldSpec> {
        FieldSpec::pairs("initial", "final (28 days)", "mm")
    }

    fn from_readings(readings: &Readings) -> Self {
        Self {
            readings: reading_pairs(readings),
        }
    }

    fn compute(
        &self,
        product: ProductLine,
        limits: &ThresholdTable,
    ) -> Result<TestOutcome, InputFault> {
        let length = limits.get_limit(product, LimitKey::ReferenceLength);
        let limit = limits.get_limit(product, LimitKey::DimensionalMaxDeviation);

        let values = self.variations(length);
        let screening = screen(&values, DeviationRule::Absolute { limit }, MINIMUM);
        let mut outcome = TestOutcome::from_screening(Self::KIND, product, screening);
        outcome.derive("reference length", length, "mm");

        if let (Some(initial), Some(last)) = (outcome.mean, outcome.final_value) {
            if (last - initial).abs() > MEAN_SHIFT_NOTE {
                outcome.note(format!(
                    "mean after excluding outliers is {:.2} mm/m (initial mean {:.2} mm/m)",
                    last, initial
                ));
            }
        }
        Ok(outcome)
    }
}
