//! Flexural strength of 4x4x16 prisms (ABNT NBR 13279)

use super::{check_not_negative, specimen_values, FieldSpec, Formula, Readings};
use crate::core::kind::TestKind;
use crate::core::limits::{LimitKey, ThresholdTable};
use crate::core::outcome::{InputFault, TestOutcome};
use crate::core::outlier::{screen, DeviationRule};
use crate::core::product::ProductLine;

/// Prisms per batch
pub const SPECIMENS: usize = 3;

/// Valid prisms required for a result
pub const MINIMUM: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct Flexural {
    /// Failure stress per prism (MPa), `None` when not entered
    pub values: Vec<Option<f64>>,
}

impl Formula for Flexural {
    const KIND: TestKind = TestKind::Flexural;

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
        let limit = limits.get_limit(product, LimitKey::FlexuralMaxDeviation);
        let screening = screen(&self.values, DeviationRule::Absolute { limit }, MINIMUM);
        Ok(TestOutcome::from_screening(Self::KIND, product, screening))
    }
}
