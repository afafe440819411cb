//! Requisite resolver
//!
//! Maps a free-text requisite name to the formula that computes it. Catalog
//! entries carry their [`TestKind`] already; this path exists for names typed
//! at the boundary (command line, imported sheets).
//!
//! Keyword order matters and must be kept: "COMPRESSÃO" names are checked
//! before "RETENÇÃO", "ADERÊNCIA ... Manual" before the automatic fallback, and
//! so on. The first matching rule wins.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::trace;
use unicode_normalization::UnicodeNormalization;

use crate::core::kind::TestKind;
use crate::core::product::ProductLine;

static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("Invalid regex pattern"));

/// Outcome of resolving a requisite name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "resolution", content = "test")]
pub enum Resolution {
    /// A formula computes this requisite
    Formula(TestKind),
    /// Known requisite, no calculator yet
    NotImplemented,
}

impl Resolution {
    /// The resolved test kind, if any
    pub fn kind(&self) -> Option<TestKind> {
        match self {
            Resolution::Formula(kind) => Some(*kind),
            Resolution::NotImplemented => None,
        }
    }
}

/// Strip accents and lowercase, keeping ASCII only
fn fold(text: &str) -> String {
    text.nfkd()
        .filter(|c| c.is_ascii())
        .collect::<String>()
        .to_lowercase()
}

/// Normalise text for keyword matching
///
/// `"FLEXÃO 4x4x16 (MPa)"` becomes `"flexao 4x4x16 mpa"`.
pub fn normalize(text: &str) -> String {
    NON_ALNUM
        .replace_all(&fold(text), " ")
        .trim()
        .to_string()
}

/// Page-id slug of a requisite name
///
/// `"RETENÇÃO DE ÁGUA (%)"` becomes `"retencao-de-agua"`.
pub fn slugify(text: &str) -> String {
    NON_ALNUM
        .replace_all(&fold(text), "-")
        .trim_matches('-')
        .to_string()
}

/// Resolve a requisite name for a product line
pub fn resolve(product: ProductLine, requisite: &str) -> Resolution {
    let n = normalize(requisite);
    trace!(requisite, normalized = %n, "resolving requisite");

    let kind = if n.contains("flexao") {
        TestKind::Flexural
    } else if n.contains("compressao") {
        if n.contains("5x10") || n.contains("7215") || product == ProductLine::Graute {
            TestKind::CylindricalCompressive
        } else {
            TestKind::PrismaticCompressive
        }
    } else if n.contains("retencao") {
        if product == ProductLine::Basecoat {
            TestKind::WaterRetentionPaste
        } else {
            TestKind::WaterRetentionRatio
        }
    } else if n.contains("densidade") && n.contains("fresco") {
        TestKind::FreshDensity
    } else if n.contains("capilaridade") {
        TestKind::Capillarity
    } else if n.contains("aderencia") {
        if n.contains("manual") {
            TestKind::ManualAdhesion
        } else {
            TestKind::AutomaticAdhesion
        }
    } else if n.contains("retracao") {
        TestKind::Shrinkage
    } else if n.contains("permeabilidade") {
        TestKind::Permeability
    } else if n.contains("dimensional") {
        TestKind::DimensionalVariation
    } else if n.contains("massa") && n.contains("variacao") {
        TestKind::MassVariation
    } else {
        return Resolution::NotImplemented;
    };

    Resolution::Formula(kind)
}
