//! Fresh-state density (ABNT NBR 13278)

use super::{FieldSpec, Formula, Readings};
use crate::core::kind::TestKind;
use crate::core::limits::ThresholdTable;
use crate::core::outcome::{InputFault, TestOutcome};
use crate::core::product::ProductLine;

#[derive(Debug, Clone, PartialEq)]
pub struct FreshDensity {
    /// Cup tare (g)
    pub tare: f64,
    /// Cup + sample (g)
    pub gross_mass: f64,
    /// Cup volume (cm³)
    pub volume: f64,
    /// Theoretical density for the entrained-air content (g/cm³), zero if absent
    pub theoretical_density: f64,
}

impl Formula for FreshDensity {
    const KIND: TestKind = TestKind::FreshDensity;

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("tare", "Cup tare", "g"),
            FieldSpec::new("gross_mass", "Cup + sample", "g"),
            FieldSpec::new("volume", "Cup volume", "cm³"),
            FieldSpec::new("theoretical_density", "Theoretical density (optional)", "g/cm³"),
        ]
    }

    fn from_readings(readings: &Readings) -> Self {
        Self {
            tare: readings.get("tare"),
            gross_mass: readings.get("gross_mass"),
            volume: readings.get("volume"),
            theoretical_density: readings.get("theoretical_density"),
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
        if self.gross_mass < self.tare {
            return Err(InputFault::GrossBelowTare {
                gross: self.gross_mass,
                tare: self.tare,
            });
        }
        if self.theoretical_density < 0.0 {
            return Err(InputFault::NotPositive {
                field: "theoretical_density",
                value: self.theoretical_density,
            });
        }

        let net_mass = self.gross_mass - self.tare;
        let g_cm3 = net_mass / self.volume;
        let kg_m3 = g_cm3 * 1000.0;

        let mut outcome = TestOutcome::single(Self::KIND, product, kg_m3);
        outcome.derive("net mass", net_mass, "g");
        outcome.derive("density", g_cm3, "g/cm³");

        if self.theoretical_density > 0.0 {
            let dt = self.theoretical_density;
            let air = (dt - g_cm3) / dt * 100.0;
            outcome.derive("entrained air", air, "%");
        }

        Ok(outcome)
    }
}
