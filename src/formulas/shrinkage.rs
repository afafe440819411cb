//! Shrinkage in percent of the initial length

use super::{
    check_pairs_not_negative, interval_note, reading_pairs, FieldSpec, Formula, Readings,
    CP_FINAL, CP_INITIAL,
};
use crate::core::kind::TestKind;
use crate::core::limits::{LimitKey, ThresholdTable};
use crate::core::outcome::{InputFault, TestOutcome};
use crate::core::outlier::{screen, DeviationRule};
use crate::core::product::ProductLine;

pub const MINIMUM: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct Shrinkage {
    /// Length readings (initial, final)
    pub readings: [(f64, f64); 3],
}

impl Formula for Shrinkage {
    const KIND: TestKind = TestKind::Shrinkage;

    fn fields() -> Vec<FieldSpec> {
        FieldSpec::pairs("initial", "final", "mm")
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
        check_pairs_not_negative(&self.readings, CP_INITIAL, CP_FINAL)?;
        let values: Vec<Option<f64>> = self
            .readings
            .iter()
            .map(|&(initial, last)| (initial > 0.0).then(|| (last - initial) / initial * 100.0))
            .collect();

        let limit_pct = limits.get_limit(product, LimitKey::ShrinkageDeviationPct);
        let rule = DeviationRule::Percentage { limit_pct };
        let screening = screen(&values, rule, MINIMUM);
        let bounds = screening.mean.map(|m| rule.bounds(m));

        let mut outcome = TestOutcome::from_screening(Self::KIND, product, screening);
        if let Some((low, high)) = bounds {
            interval_note(&mut outcome, low, high);
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::outcome::{SpecimenStatus, Verdict};

    #[test]
    fn test_shrinkage_negative_mean() {
        let table = ThresholdTable::builtin().unwrap();
        // -0.10 %, -0.11 %, -0.20 %: mean about -0.1367, band -0.164 to -0.109
        let formula = Shrinkage {
            readings: [(100.0, 99.90), (100.0, 99.89), (100.0, 99.80)],
        };
        let outcome = formula.compute(ProductLine::Basecoat, &table).unwrap();
        assert_eq!(outcome.specimens[0].status, SpecimenStatus::Excluded);
        assert_eq!(outcome.specimens[1].status, SpecimenStatus::Valid);
        assert_eq!(outcome.specimens[2].status, SpecimenStatus::Excluded);
        assert_eq!(outcome.verdict, Verdict::RepeatTest);
    }

    #[test]
    fn test_shrinkage_accepted() {
        let table = ThresholdTable::builtin().unwrap();
        let formula = Shrinkage {
            readings: [(200.0, 199.8), (200.0, 199.8), (0.0, 0.0)],
        };
        let outcome = formula.compute(ProductLine::Rejunte, &table).unwrap();
        assert!(outcome.verdict.is_accepted());
        assert_eq!(outcome.specimens[2].status, SpecimenStatus::Unfilled);
        assert!((outcome.final_value.unwrap() - -0.1).abs() < 1e-9);
    }

    #[test]
    fn test_shrinkage_negative_length_is_fault() {
        let table = ThresholdTable::builtin().unwrap();
        let formula = Shrinkage {
            readings: [(200.0, 199.8), (-200.0, 199.8), (0.0, 0.0)],
        };
        assert_eq!(
            formula.compute(ProductLine::Basecoat, &table),
            Err(InputFault::NotPositive {
                field: "cp2_initial",
                value: -200.0
            })
        );
    }

    #[test]
    fn test_shrinkage_all_empty() {
        let table = ThresholdTable::builtin().unwrap();
        let outcome = Shrinkage::from_readings(&Readings::new())
            .compute(ProductLine::Basecoat, &table)
            .unwrap();
        assert_eq!(outcome.verdict, Verdict::FieldsEmpty);
    }
}
