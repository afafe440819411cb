//! Tensile bond strength, "potencial de aderência" (ABNT NBR 15258)
//!
//! Thirteen pull-off discs per panel. The automatic rig reports MPa; the
//! manual dynamometer reports kN, converted over the disc area. Both are
//! then screened with the same percentage rule and minimum.

use std::f64::consts::PI;

use super::{
    check_not_negative, interval_note, specimen_values, FieldSpec, Formula, Readings, CP,
};
use crate::core::kind::TestKind;
use crate::core::limits::{LimitKey, ThresholdTable};
use crate::core::outcome::{InputFault, TestOutcome};
use crate::core::outlier::{screen, DeviationRule};
use crate::core::product::ProductLine;

pub const SPECIMENS: usize = 13;

/// Disc diameter on the manual form (mm)
pub const DEFAULT_DIAMETER: f64 = 50.0;

fn classify(
    kind: TestKind,
    product: ProductLine,
    limits: &ThresholdTable,
    values: &[Option<f64>],
) -> TestOutcome {
    let limit_pct = limits.get_limit(product, LimitKey::AdhesionDeviationPct);
    let minimum = limits.get_count(product, LimitKey::AdhesionMinSpecimens);
    let rule = DeviationRule::Percentage { limit_pct };

    let screening = screen(values, rule, minimum);
    let bounds = screening.mean.map(|m| rule.bounds(m));
    let mut outcome = TestOutcome::from_screening(kind, product, screening);
    if let Some((low, high)) = bounds {
        interval_note(&mut outcome, low, high);
    }
    outcome
}

#[derive(Debug, Clone, PartialEq)]
pub struct AutomaticAdhesion {
    /// Bond strength per disc (MPa)
    pub values: Vec<Option<f64>>,
}

impl Formula for AutomaticAdhesion {
    const KIND: TestKind = TestKind::AutomaticAdhesion;

    fn fields() -> Vec<FieldSpec> {
        FieldSpec::specimens(SPECIMENS, "MPa")
    }

    fn from_readings(readings: &Readings) -> Self {
        Self {
            values: specimen_values(readings, SPECIMENS),
        }
    }

    fn compute(
        &self,
        product: ProductLine,
        limits: &ThresholdTable,
    ) -> Result<TestOutcome, InputFault> {
        check_not_negative(&self.values)?;
        Ok(classify(Self::KIND, product, limits, &self.values))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManualAdhesion {
    /// Disc diameter (mm)
    pub diameter: f64,
    /// Failure load per disc (kN)
    pub loads: Vec<Option<f64>>,
}

impl ManualAdhesion {
    /// Disc area in mm²
    pub fn area(&self) -> f64 {
        PI * (self.diameter / 2.0).powi(2)
    }

    /// Loads converted to MPa (N/mm²)
    pub fn stresses(&self) -> Vec<Option<f64>> {
        let area = self.area();
        self.loads
            .iter()
            .map(|load| load.map(|kn| kn * 1000.0 / area))
            .collect()
    }
}

impl Formula for ManualAdhesion {
    const KIND: TestKind = TestKind::ManualAdhesion;

    fn fields() -> Vec<FieldSpec> {
        let mut fields = vec![FieldSpec::new("diameter", "Disc diameter", "mm")];
        fields.extend(
            CP.iter()
                .enumerate()
                .map(|(i, name)| FieldSpec::new(*name, format!("CP {}", i + 1), "kN")),
        );
        fields
    }

    fn from_readings(readings: &Readings) -> Self {
        Self {
            diameter: readings.get_opt("diameter").unwrap_or(DEFAULT_DIAMETER),
            loads: specimen_values(readings, SPECIMENS),
        }
    }

    fn compute(
        &self,
        product: ProductLine,
        limits: &ThresholdTable,
    ) -> Result<TestOutcome, InputFault> {
        if self.diameter <= 0.0 {
            return Err(InputFault::NotPositive {
                field: "diameter",
                value: self.diameter,
            });
        }
        check_not_negative(&self.loads)?;

        let mut outcome = classify(Self::KIND, product, limits, &self.stresses());
        outcome.derive("disc area", self.area(), "mm²");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::outcome::Verdict;

    fn table() -> ThresholdTable {
        ThresholdTable::builtin().unwrap()
    }

    fn padded(values: &[f64]) -> Vec<Option<f64>> {
        let mut out: Vec<Option<f64>> = values.iter().map(|v| Some(*v)).collect();
        out.resize(SPECIMENS, None);
        out
    }

    #[test]
    fn test_manual_conversion() {
        let formula = ManualAdhesion {
            diameter: 50.0,
            loads: padded(&[2.0]),
        };
        assert!((formula.area() - 1963.495).abs() < 1e-3);
        let mpa = formula.stresses()[0].unwrap();
        assert!((mpa - 1.0186).abs() < 1e-4);
    }

    #[test]
    fn test_manual_matches_automatic() {
        let loads = [1.9, 2.0, 2.1, 2.2, 1.8, 2.05, 3.5, 0.9];
        let manual = ManualAdhesion {
            diameter: 50.0,
            loads: padded(&loads),
        };
        let automatic = AutomaticAdhesion {
            values: manual.stresses(),
        };

        let m = manual.compute(ProductLine::Revestimento, &table()).unwrap();
        let a = automatic.compute(ProductLine::Revestimento, &table()).unwrap();

        assert_eq!(m.verdict, a.verdict);
        assert_eq!(m.valid_count, a.valid_count);
        let statuses = |o: &TestOutcome| o.specimens.iter().map(|s| s.status).collect::<Vec<_>>();
        assert_eq!(statuses(&m), statuses(&a));
        assert_eq!(m.final_value, a.final_value);
    }

    #[test]
    fn test_automatic_minimum_from_table() {
        // six equal readings meet the default minimum of 6
        let six = AutomaticAdhesion {
            values: padded(&[0.5; 6]),
        };
        let outcome = six.compute(ProductLine::Basecoat, &table()).unwrap();
        assert!(outcome.verdict.is_accepted());
        assert!((outcome.final_value.unwrap() - 0.5).abs() < 1e-12);

        let five = AutomaticAdhesion {
            values: padded(&[0.5; 5]),
        };
        let outcome = five.compute(ProductLine::Basecoat, &table()).unwrap();
        assert_eq!(outcome.verdict, Verdict::RepeatTest);
        assert_eq!(outcome.minimum, 6);
    }

    #[test]
    fn test_manual_bad_diameter() {
        let formula = ManualAdhesion {
            diameter: 0.0,
            loads: padded(&[2.0]),
        };
        assert!(matches!(
            formula.compute(ProductLine::Revestimento, &table()),
            Err(InputFault::NotPositive { field: "diameter", .. })
        ));
    }

    #[test]
    fn test_manual_default_diameter() {
        let formula = ManualAdhesion::from_readings(&Readings::new().with("cp1", 2.0));
        assert_eq!(formula.diameter, DEFAULT_DIAMETER);
        assert_eq!(formula.loads.len(), SPECIMENS);
    }
}
