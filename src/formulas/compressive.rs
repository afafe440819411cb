//! Compressive strength
//!
//! Prism halves (4x4x16, ABNT NBR 13279) use the absolute deviation rule;
//! 5x10 cylinders (ABNT NBR 7215) use the percentage rule.

use super::{check_not_negative, interval_note, specimen_values, FieldSpec, Formula, Readings};
use crate::core::kind::TestKind;
use crate::core::limits::{LimitKey, ThresholdTable};
use crate::core::outcome::{InputFault, TestOutcome};
use crate::core::outlier::{screen, DeviationRule};
use crate::core::product::ProductLine;

/// Both geometries take up to six specimens
pub const SPECIMENS: usize = 6;

pub const PRISMATIC_MINIMUM: usize = 4;
pub const CYLINDRICAL_MINIMUM: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct PrismaticCompressive {
    pub values: Vec<Option<f64>>,
}

impl Formula for PrismaticCompressive {
    const KIND: TestKind = TestKind::PrismaticCompressive;

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
        let limit = limits.get_limit(product, LimitKey::CompressiveMaxDeviation);
        let screening = screen(
            &self.values,
            DeviationRule::Absolute { limit },
            PRISMATIC_MINIMUM,
        );
        Ok(TestOutcome::from_screening(Self::KIND, product, screening))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CylindricalCompressive {
    pub values: Vec<Option<f64>>,
}

impl Formula for CylindricalCompressive {
    const KIND: TestKind = TestKind::CylindricalCompressive;

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
        let limit_pct = limits.get_limit(product, LimitKey::CylindricalDeviationPct);
        let rule = DeviationRule::Percentage { limit_pct };
        let screening = screen(&self.values, rule, CYLINDRICAL_MINIMUM);
        let bounds = screening.mean.map(|m| rule.bounds(m));

        let mut outcome = TestOutcome::from_screening(Self::KIND, product, screening);
        if let Some((low, high)) = bounds {
            interval_note(&mut outcome, low, high);
        }
        Ok(outcome)
    }
}
