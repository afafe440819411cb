//! Permeability at 48 h (ABNT NBR 16648, annex C)
//!
//! Water taken up by each specimen is corrected by the moisture the witness
//! specimen lost to the room over the same period.

use super::{reading_pairs, FieldSpec, Formula, Readings, CP_INITIAL};
use crate::core::kind::TestKind;
use crate::core::limits::ThresholdTable;
use crate::core::outcome::{InputFault, SpecimenResult, TestOutcome};
use crate::core::outlier::mean;
use crate::core::product::ProductLine;

/// Specimen volume on the laboratory form (cm³)
pub const DEFAULT_VOLUME: f64 = 400.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Permeability {
    /// Specimen volume (cm³)
    pub volume: f64,
    /// Masses (initial, final) in g
    pub readings: [(f64, f64); 3],
    /// Witness masses (initial, final) in g
    pub witness: (f64, f64),
}

impl Permeability {
    /// Moisture lost by the witness; a gain is not corrected for
    pub fn witness_loss(&self) -> f64 {
        (self.witness.0 - self.witness.1).max(0.0)
    }
}

impl Formula for Permeability {
    const KIND: TestKind = TestKind::Permeability;

    fn fields() -> Vec<FieldSpec> {
        let mut fields = vec![FieldSpec::new("volume", "Specimen volume", "cm³")];
        fields.extend(FieldSpec::pairs("initial", "final", "g"));
        fields.push(FieldSpec::new("witness_initial", "Witness initial", "g"));
        fields.push(FieldSpec::new("witness_final", "Witness final", "g"));
        fields
    }

    fn from_readings(readings: &Readings) -> Self {
        Self {
            volume: readings.get_opt("volume").unwrap_or(DEFAULT_VOLUME),
            readings: reading_pairs(readings),
            witness: (
                readings.get("witness_initial"),
                readings.get("witness_final"),
            ),
        }
    }

    fn compute(
        &self,
        product: ProductLine,
        _limits: &ThresholdTable,
    ) -> Result<TestOutcome, InputFault> {
        if self.volume <= 0.0 {
            return Err(InputFault::NotPositive {
                field: "volume",
                value: self.volume,
            });
        }
        for (name, (initial, _)) in CP_INITIAL.iter().zip(self.readings.iter()) {
            if *initial == 0.0 {
                return Err(InputFault::Unset { field: *name });
            }
        }
        if self.witness.0 == 0.0 {
            return Err(InputFault::Unset {
                field: "witness_initial",
            });
        }

        let correction = self.witness_loss();
        let values: Vec<f64> = self
            .readings
            .iter()
            .map(|(initial, last)| ((last - initial) + correction) / self.volume)
            .collect();
        let average = mean(&values).unwrap_or(0.0);

        let mut outcome = TestOutcome::new(Self::KIND, product);
        outcome.specimens = values
            .iter()
            .enumerate()
            .map(|(i, v)| SpecimenResult::plain(i, Some(*v)))
            .collect();
        outcome.mean = Some(average);
        outcome.valid_count = values.len();
        outcome.minimum = values.len();
        outcome.final_value = Some(average);
        outcome.reason = format!("mean of {} specimens: {:.4} mL/cm³", values.len(), average);
        outcome.derive("witness correction", correction, "g");
        if correction > 0.0 {
            outcome.note(format!(
                "witness lost {:.2} g; added to each specimen's water uptake",
                correction
            ));
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permeability_scenario() {
        let table = ThresholdTable::builtin().unwrap();
        let formula = Permeability {
            volume: 400.0,
            readings: [(100.0, 102.0), (100.0, 102.0), (100.0, 102.0)],
            witness: (100.0, 99.0),
        };
        let outcome = formula.compute(ProductLine::Rejunte, &table).unwrap();
        assert!((outcome.specimens[0].value.unwrap() - 0.0075).abs() < 1e-12);
        assert!((outcome.final_value.unwrap() - 0.0075).abs() < 1e-12);
        assert_eq!(outcome.notes.len(), 1);
    }

    #[test]
    fn test_witness_gain_is_ignored() {
        let formula = Permeability {
            volume: 400.0,
            readings: [(100.0, 102.0); 3],
            witness: (100.0, 101.0),
        };
        assert_eq!(formula.witness_loss(), 0.0);
    }

    #[test]
    fn test_permeability_faults() {
        let table = ThresholdTable::builtin().unwrap();
        let mut formula = Permeability {
            volume: 0.0,
            readings: [(100.0, 102.0); 3],
            witness: (100.0, 99.0),
        };
        assert!(matches!(
            formula.compute(ProductLine::Basecoat, &table),
            Err(InputFault::NotPositive { field: "volume", .. })
        ));

        formula.volume = 400.0;
        formula.readings[1] = (0.0, 102.0);
        assert_eq!(
            formula.compute(ProductLine::Basecoat, &table),
            Err(InputFault::Unset {
                field: "cp2_initial"
            })
        );

        formula.readings[1] = (100.0, 102.0);
        formula.witness = (0.0, 99.0);
        assert_eq!(
            formula.compute(ProductLine::Basecoat, &table),
            Err(InputFault::Unset {
                field: "witness_initial"
            })
        );
    }

    #[test]
    fn test_permeability_default_volume() {
        let formula = Permeability::from_readings(&Readings::new());
        assert_eq!(formula.volume, DEFAULT_VOLUME);
    }
}
