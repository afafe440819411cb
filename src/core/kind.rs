//! Test kinds - the closed set of formula behaviours

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A laboratory test with its own input schema, formula and acceptance rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestKind {
    /// Water retention from the RR/RT readings
    WaterRetentionRatio,
    /// Water retention from paste mass and the water/powder ratio
    WaterRetentionPaste,
    /// Fresh-state density with optional entrained air
    FreshDensity,
    /// Flexural strength of 4x4x16 prisms
    Flexural,
    /// Compressive strength of 4x4x16 prism halves
    PrismaticCompressive,
    /// Compressive strength of 5x10 cylinders
    CylindricalCompressive,
    /// Dimensional variation (expansion / shrinkage in mm/m)
    DimensionalVariation,
    /// Mass variation
    MassVariation,
    /// Capillary water absorption coefficient
    Capillarity,
    /// Tensile bond strength read directly in MPa
    AutomaticAdhesion,
    /// Tensile bond strength from loads in kN
    ManualAdhesion,
    /// 48h permeability with witness correction
    Permeability,
    /// Shrinkage in percent of the initial length
    Shrinkage,
}

impl TestKind {
    /// Command-line slug
    pub fn as_str(&self) -> &'static str {
        match self {
            TestKind::WaterRetentionRatio => "water-retention-ratio",
            TestKind::WaterRetentionPaste => "water-retention-paste",
            TestKind::FreshDensity => "fresh-density",
            TestKind::Flexural => "flexural",
            TestKind::PrismaticCompressive => "prismatic-compressive",
            TestKind::CylindricalCompressive => "cylindrical-compressive",
            TestKind::DimensionalVariation => "dimensional-variation",
            TestKind::MassVariation => "mass-variation",
            TestKind::Capillarity => "capillarity",
            TestKind::AutomaticAdhesion => "automatic-adhesion",
            TestKind::ManualAdhesion => "manual-adhesion",
            TestKind::Permeability => "permeability",
            TestKind::Shrinkage => "shrinkage",
        }
    }

    /// Human-readable title
    pub fn title(&self) -> &'static str {
        match self {
            TestKind::WaterRetentionRatio => "Water retention (RR/RT)",
            TestKind::WaterRetentionPaste => "Water retention (paste / water factor)",
            TestKind::FreshDensity => "Fresh-state density",
            TestKind::Flexural => "Flexural strength 4x4x16",
            TestKind::PrismaticCompressive => "Compressive strength 4x4x16",
            TestKind::CylindricalCompressive => "Compressive strength 5x10",
            TestKind::DimensionalVariation => "Dimensional variation",
            TestKind::MassVariation => "Mass variation",
            TestKind::Capillarity => "Capillarity",
            TestKind::AutomaticAdhesion => "Adhesion potential (automatic)",
            TestKind::ManualAdhesion => "Adhesion potential (manual, kN)",
            TestKind::Permeability => "Permeability 48h",
            TestKind::Shrinkage => "Shrinkage",
        }
    }

    /// Governing standard
    pub fn standard(&self) -> &'static str {
        match self {
            TestKind::WaterRetentionRatio | TestKind::WaterRetentionPaste => "ABNT NBR 13277",
            TestKind::FreshDensity => "ABNT NBR 13278",
            TestKind::Flexural | TestKind::PrismaticCompressive => "ABNT NBR 13279:2005",
            TestKind::CylindricalCompressive => "ABNT NBR 7215",
            TestKind::DimensionalVariation | TestKind::MassVariation => "ABNT NBR 15261",
            TestKind::Capillarity => "ABNT NBR 15259",
            TestKind::AutomaticAdhesion | TestKind::ManualAdhesion => "ABNT NBR 15258",
            TestKind::Permeability => "ABNT NBR 16648 annex C",
            TestKind::Shrinkage => "based on ABNT NBR 15261",
        }
    }

    /// Unit of the final result
    pub fn unit(&self) -> &'static str {
        match self {
            TestKind::WaterRetentionRatio
            | TestKind::WaterRetentionPaste
            | TestKind::MassVariation
            | TestKind::Shrinkage => "%",
            TestKind::FreshDensity => "kg/m³",
            TestKind::Flexural
            | TestKind::PrismaticCompressive
            | TestKind::CylindricalCompressive
            | TestKind::AutomaticAdhesion
            | TestKind::ManualAdhesion => "MPa",
            TestKind::DimensionalVariation => "mm/m",
            TestKind::Capillarity => "g/dm²·min½",
            TestKind::Permeability => "mL/cm³",
        }
    }

    /// Get all test kinds
    pub fn all() -> &'static [TestKind] {
        &[
            TestKind::WaterRetentionRatio,
            TestKind::WaterRetentionPaste,
            TestKind::FreshDensity,
            TestKind::Flexural,
            TestKind::PrismaticCompressive,
            TestKind::CylindricalCompressive,
            TestKind::DimensionalVariation,
            TestKind::MassVariation,
            TestKind::Capillarity,
            TestKind::AutomaticAdhesion,
            TestKind::ManualAdhesion,
            TestKind::Permeability,
            TestKind::Shrinkage,
        ]
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TestKind {
    type Err = TestKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        TestKind::all()
            .iter()
            .find(|k| k.as_str() == wanted)
            .copied()
            .ok_or_else(|| TestKindParseError::Unknown(s.to_string()))
    }
}

/// Errors that can occur when parsing a test kind slug
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TestKindParseError {
    #[error("unknown test kind: '{0}'")]
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_kinds_parse() {
        for kind in TestKind::all() {
            assert_eq!(kind.as_str().parse::<TestKind>().unwrap(), *kind);
        }
    }

    #[test]
    fn test_kind_parse_accepts_snake_case() {
        assert_eq!(
            "manual_adhesion".parse::<TestKind>().unwrap(),
            TestKind::ManualAdhesion
        );
    }

    #[test]
    fn test_kind_serialization_matches_slug() {
        for kind in TestKind::all() {
            let json = serde_json::to_string(kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_kind_parse_unknown() {
        assert!(matches!(
            "tensile".parse::<TestKind>(),
            Err(TestKindParseError::Unknown(_))
        ));
    }
}
