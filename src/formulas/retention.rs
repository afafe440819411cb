//! Water retention (ABNT NBR 13277)

use tracing::warn;

use super::{FieldSpec, Formula, Readings};
use crate::core::kind::TestKind;
use crate::core::limits::ThresholdTable;
use crate::core::outcome::{InputFault, TestOutcome, Verdict};
use crate::core::product::ProductLine;

/// Retention from the flow readings: `Ra = RR / RT * 100`
#[derive(Debug, Clone, PartialEq)]
pub struct WaterRetentionRatio {
    pub rr: f64,
    pub rt: f64,
}

impl Formula for WaterRetentionRatio {
    const KIND: TestKind = TestKind::WaterRetentionRatio;

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("rr", "RR", "mm"),
            FieldSpec::new("rt", "RT", "mm"),
        ]
    }

    fn from_readings(readings: &Readings) -> Self {
        Self {
            rr: readings.get("rr"),
            rt: readings.get("rt"),
        }
    }

    fn compute(
        &self,
        product: ProductLine,
        _limits: &ThresholdTable,
    ) -> Result<TestOutcome, InputFault> {
        if self.rt == 0.0 {
            return Err(InputFault::ZeroDenominator { field: "rt" });
        }
        let ra = self.rr / self.rt * 100.0;
        Ok(retention_outcome(Self::KIND, product, ra))
    }
}

/// Retention from the paste mass and the water/powder ratio
#[derive(Debug, Clone, PartialEq)]
pub struct WaterRetentionPaste {
    /// Container tare (g)
    pub tare: f64,
    /// Container + mortar before suction (g)
    pub initial_mass: f64,
    /// Container + mortar after suction (g)
    pub final_mass: f64,
    /// Mixing water (mL per kg of powder)
    pub water_ratio: f64,
}

impl WaterRetentionPaste {
    /// Share of water in the fresh paste
    pub fn water_factor(&self) -> f64 {
        self.water_ratio / (1000.0 + self.water_ratio)
    }
}

impl Formula for WaterRetentionPaste {
    const KIND: TestKind = TestKind::WaterRetentionPaste;

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("tare", "Tare", "g"),
            FieldSpec::new("initial_mass", "Mortar + tare, initial", "g"),
            FieldSpec::new("final_mass", "Mortar + tare, final", "g"),
            FieldSpec::new("water_ratio", "Water", "mL/kg"),
        ]
    }

    fn from_readings(readings: &Readings) -> Self {
        Self {
            tare: readings.get("tare"),
            initial_mass: readings.get("initial_mass"),
            final_mass: readings.get("final_mass"),
            water_ratio: readings.get("water_ratio"),
        }
    }

    fn compute(
        &self,
        product: ProductLine,
        _limits: &ThresholdTable,
    ) -> Result<TestOutcome, InputFault> {
        if self.initial_mass == 0.0 {
            return Err(InputFault::Unset {
                field: "initial_mass",
            });
        }
        if self.water_ratio == 0.0 {
            return Err(InputFault::Unset {
                field: "water_ratio",
            });
        }
        // -1000 mL/kg would zero the factor's denominator
        if self.water_ratio < 0.0 {
            return Err(InputFault::NotPositive {
                field: "water_ratio",
                value: self.water_ratio,
            });
        }

        let paste_mass = self.initial_mass - self.tare;
        let water_factor = self.water_factor();
        let total_water = paste_mass * water_factor;
        let water_lost = self.initial_mass - self.final_mass;

        let ra = if total_water > 0.0 {
            (1.0 - water_lost / total_water) * 100.0
        } else {
            0.0
        };

        let mut outcome = retention_outcome(Self::KIND, product, ra);
        outcome.derive("paste mass", paste_mass, "g");
        outcome.derive("water factor", water_factor, "");
        outcome.derive("total water", total_water, "g");
        outcome.derive("water lost", water_lost, "g");
        if total_water <= 0.0 {
            outcome.note("paste holds no water (tare >= initial mass): Ra taken as 0");
        }
        Ok(outcome)
    }
}

fn retention_outcome(kind: TestKind, product: ProductLine, ra: f64) -> TestOutcome {
    if ra < 0.0 {
        let mut outcome = TestOutcome::new(kind, product);
        outcome.verdict = Verdict::OutOfRange;
        outcome.reason = format!("invalid result: Ra = {:.2} %", ra);
        outcome.derive("Ra", ra, "%");
        outcome.note(
            "water lost exceeds the water in the sample; check the mL/kg ratio and the masses",
        );
        return outcome;
    }

    let mut outcome = TestOutcome::single(kind, product, ra);
    if ra >= 100.0 {
        warn!(ra, "water retention at or above 100 %");
        outcome.note("Ra at or above 100 %: the sample gained mass?");
    }
    outcome
}
