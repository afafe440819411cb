//! Mass variation (ABNT NBR 15261)

use super::{check_pairs_not_negative, reading_pairs, FieldSpec, Formula, Readings, CP_FINAL, CP_INITIAL};
use crate::core::kind::TestKind;
use crate::core::limits::ThresholdTable;
use crate::core::outcome::{InputFault, SpecimenResult, TestOutcome, Verdict};
use crate::core::outlier::mean;
use crate::core::product::ProductLine;

#[derive(Debug, Clone, PartialEq)]
pub struct MassVariation {
    /// Masses (initial, final) in g
    pub readings: [(f64, f64); 3],
}

impl MassVariation {
    /// Variation of each specimen in percent; zero when the initial mass is unset
    pub fn variations(&self) -> [f64; 3] {
        self.readings.map(|(initial, last)| {
            if initial > 0.0 {
                (last - initial) / initial * 100.0
            } else {
                0.0
            }
        })
    }
}

impl Formula for MassVariation {
    const KIND: TestKind = TestKind::MassVariation;

    fn fields() -> Vec<FieldSpec> {
        FieldSpec::pairs("initial", "final", "g")
    }

    fn from_readings(readings: &Readings) -> Self {
        Self {
            readings: reading_pairs(readings),
        }
    }

    fn compute(
        &self,
        product: ProductLine,
        _limits: &ThresholdTable,
    ) -> Result<TestOutcome, InputFault> {
        check_pairs_not_negative(&self.readings, CP_INITIAL, CP_FINAL)?;
        let mut outcome = TestOutcome::new(Self::KIND, product);

        if self
            .readings
            .iter()
            .all(|&(initial, last)| initial == 0.0 && last == 0.0)
        {
            outcome.verdict = Verdict::FieldsEmpty;
            outcome.reason = "no specimen readings were filled in".to_string();
            outcome.specimens = (0..3).map(|i| SpecimenResult::plain(i, None)).collect();
            return Ok(outcome);
        }

        let values = self.variations();
        // plain mean of all three, unset specimens included as 0 %
        let average = mean(&values).unwrap_or(0.0);

        outcome.specimens = self
            .readings
            .iter()
            .zip(values)
            .enumerate()
            .map(|(i, (&(initial, _), value))| {
                SpecimenResult::plain(i, (initial > 0.0).then_some(value))
            })
            .collect();

        let unset = self.readings.iter().filter(|(initial, _)| *initial <= 0.0).count();
        if unset > 0 {
            outcome.note(format!(
                "{} specimen(s) without initial mass counted as 0 % in the mean",
                unset
            ));
        }

        outcome.mean = Some(average);
        outcome.valid_count = 3 - unset;
        outcome.minimum = 1;
        outcome.final_value = Some(average);
        outcome.reason = format!("mean of 3 specimens: {:.2} %", average);
        Ok(outcome)
    }
}
