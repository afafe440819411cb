//! Capillary water absorption (ABNT NBR 15259)

use super::{check_pairs_not_negative, interval_note, FieldSpec, Formula, Readings};
use crate::core::kind::TestKind;
use crate::core::limits::{LimitKey, ThresholdTable};
use crate::core::outcome::{InputFault, TestOutcome};
use crate::core::outlier::{screen, DeviationRule};
use crate::core::product::ProductLine;

pub const MINIMUM: usize = 2;

const M10: [&str; 3] = ["cp1_m10", "cp2_m10", "cp3_m10"];
const M90: [&str; 3] = ["cp1_m90", "cp2_m90", "cp3_m90"];

#[derive(Debug, Clone, PartialEq)]
pub struct Capillarity {
    /// Contact area of each specimen (cm²)
    pub area: f64,
    /// Masses at 10 and 90 minutes (g)
    pub readings: [(f64, f64); 3],
}

impl Capillarity {
    /// `(√90 - √10) · area / 100`
    pub fn factor(&self) -> f64 {
        (90f64.sqrt() - 10f64.sqrt()) * self.area / 100.0
    }
}

impl Formula for Capillarity {
    const KIND: TestKind = TestKind::Capillarity;

    fn fields() -> Vec<FieldSpec> {
        let mut fields = vec![FieldSpec::new("area", "Area", "cm²")];
        for i in 0..3 {
            fields.push(FieldSpec::new(M10[i], format!("CP {} at 10 min", i + 1), "g"));
            fields.push(FieldSpec::new(M90[i], format!("CP {} at 90 min", i + 1), "g"));
        }
        fields
    }

    fn from_readings(readings: &Readings) -> Self {
        Self {
            // the laboratory form starts at 16 cm²
            area: readings.get_opt("area").unwrap_or(16.0),
            readings: [0, 1, 2].map(|i| (readings.get(M10[i]), readings.get(M90[i]))),
        }
    }

    fn compute(
        &self,
        product: ProductLine,
        limits: &ThresholdTable,
    ) -> Result<TestOutcome, InputFault> {
        if self.area <= 0.0 {
            return Err(InputFault::NotPositive {
                field: "area",
                value: self.area,
            });
        }

        check_pairs_not_negative(&self.readings, M10, M90)?;

        let factor = self.factor();
        let values: Vec<Option<f64>> = self
            .readings
            .iter()
            .map(|&(m10, m90)| (m10 > 0.0).then(|| (m90 - m10) / factor))
            .collect();

        let limit_pct = limits.get_limit(product, LimitKey::CapillarityDeviationPct);
        let rule = DeviationRule::Percentage { limit_pct };
        let screening = screen(&values, rule, MINIMUM);
        let bounds = screening.mean.map(|m| rule.bounds(m));

        let mut outcome = TestOutcome::from_screening(Self::KIND, product, screening);
        outcome.derive("factor", factor, "dm²·min½");
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
    fn test_capillarity_coefficient() {
        let table = ThresholdTable::builtin().unwrap();
        let formula = Capillarity {
            area: 16.0,
            readings: [(500.0, 502.0), (500.0, 502.1), (500.0, 501.9)],
        };
        let factor = formula.factor();
        assert!((factor - (90f64.sqrt() - 10f64.sqrt()) * 0.16).abs() < 1e-12);

        let outcome = formula.compute(ProductLine::Revestimento, &table).unwrap();
        assert!(outcome.verdict.is_accepted());
        assert_eq!(outcome.valid_count, 3);
        assert!((outcome.final_value.unwrap() - 2.0 / factor).abs() < 1e-6);
    }

    #[test]
    fn test_capillarity_outlier_and_unfilled() {
        let table = ThresholdTable::builtin().unwrap();
        // coefficients proportional to 2, 2, 3: mean 7/3, band 1.87 to 2.8
        let formula = Capillarity {
            area: 16.0,
            readings: [(100.0, 102.0), (100.0, 102.0), (100.0, 103.0)],
        };
        let outcome = formula.compute(ProductLine::Revestimento, &table).unwrap();
        assert_eq!(outcome.specimens[2].status, SpecimenStatus::Excluded);
        assert_eq!(outcome.valid_count, 2);

        let partial = Capillarity {
            area: 16.0,
            readings: [(100.0, 102.0), (0.0, 0.0), (0.0, 0.0)],
        };
        let outcome = partial.compute(ProductLine::Basecoat, &table).unwrap();
        assert_eq!(outcome.specimens[1].status, SpecimenStatus::Unfilled);
        assert_eq!(outcome.verdict, Verdict::RepeatTest);
    }

    #[test]
    fn test_capillarity_default_area() {
        let formula = Capillarity::from_readings(&Readings::new());
        assert_eq!(formula.area, 16.0);
    }

    #[test]
    fn test_capillarity_negative_mass_is_fault() {
        let table = ThresholdTable::builtin().unwrap();
        let formula = Capillarity {
            area: 16.0,
            readings: [(400.0, 402.0), (400.0, 402.0), (-400.0, 402.0)],
        };
        assert_eq!(
            formula.compute(ProductLine::Revestimento, &table),
            Err(InputFault::NotPositive {
                field: "cp3_m10",
                value: -400.0
            })
        );
    }

    #[test]
    fn test_capillarity_bad_area() {
        let table = ThresholdTable::builtin().unwrap();
        let formula = Capillarity::from_readings(&Readings::new().with("area", 0.0));
        assert!(matches!(
            formula.compute(ProductLine::Rejunte, &table),
            Err(InputFault::NotPositive { field: "area", .. })
        ));
    }
}
