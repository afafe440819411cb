//! Requisite catalog
//!
//! Ordered list of the standardized tests each product line is checked
//! against. Every entry is bound to its [`TestKind`] when the catalog is
//! authored; the order drives "next test" navigation.

use serde::Serialize;

use crate::core::kind::TestKind;
use crate::core::product::ProductLine;
use crate::core::resolver::slugify;

/// A named standardized test bound to a formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Requisite {
    /// Name as printed on the laboratory sheet
    pub name: &'static str,

    /// Formula computing this requisite for the owning product line
    pub kind: TestKind,
}

impl Requisite {
    const fn new(name: &'static str, kind: TestKind) -> Self {
        Self { name, kind }
    }

    /// Page id of this requisite within a product line
    pub fn page_id(&self, product: ProductLine) -> String {
        page_id(product, self.name)
    }
}

pub const REQ_RETENCAO: &str = "RETENÇÃO DE ÁGUA (%) - ABNT NBR 13277";
pub const REQ_DENSIDADE: &str = "DENSIDADE NO ESTADO FRESCO (kg/m³) - ABNT NBR 13278";
pub const REQ_FLEXAO: &str = "FLEXÃO 4x4x16 (MPa) - ABNT NBR 13279:2005";
pub const REQ_COMPRESSAO_PRISMA: &str = "COMPRESSÃO 4x4x16 (MPa) - ABNT NBR 13279:2005";
pub const REQ_COMPRESSAO_CILINDRICA: &str = "COMPRESSÃO 5x10 (MPa) - ABNT NBR 7215";
pub const REQ_VAR_DIM: &str = "VARIAÇÃO DIMENSIONAL (mm/m) - ABNT NBR 15261";
pub const REQ_VAR_MASSA: &str = "VARIAÇÃO DE MASSA (%) - ABNT NBR 15261";
pub const REQ_CAPILARIDADE: &str = "CAPILARIDADE (g/dm²·min^0,5) - ABNT NBR 15259";
pub const REQ_ADERENCIA_AUTO: &str = "POTENCIAL DE ADERÊNCIA (MPa) - ABNT NBR 15258 - Automática";
pub const REQ_ADERENCIA_MANUAL: &str = "POTENCIAL DE ADERÊNCIA (MPa) - ABNT NBR 15258 - Manual";
pub const REQ_PERMEABILIDADE: &str = "PERMEABILIDADE 48h (mL/cm³) - ABNT NBR 16648 anexo C";
pub const REQ_RETRACAO: &str = "RETRAÇÃO (%) - Baseado na ABNT NBR 15261";

const BASECOAT: &[Requisite] = &[
    Requisite::new(REQ_RETENCAO, TestKind::WaterRetentionPaste),
    Requisite::new(REQ_DENSIDADE, TestKind::FreshDensity),
    Requisite::new(REQ_FLEXAO, TestKind::Flexural),
    Requisite::new(REQ_COMPRESSAO_PRISMA, TestKind::PrismaticCompressive),
    Requisite::new(REQ_VAR_DIM, TestKind::DimensionalVariation),
    Requisite::new(REQ_VAR_MASSA, TestKind::MassVariation),
    Requisite::new(REQ_CAPILARIDADE, TestKind::Capillarity),
    Requisite::new(REQ_ADERENCIA_AUTO, TestKind::AutomaticAdhesion),
    Requisite::new(REQ_PERMEABILIDADE, TestKind::Permeability),
    Requisite::new(REQ_RETRACAO, TestKind::Shrinkage),
];

// Density, expansion and cylinder compression only
const GRAUTE: &[Requisite] = &[
    Requisite::new(REQ_DENSIDADE, TestKind::FreshDensity),
    Requisite::new(REQ_COMPRESSAO_CILINDRICA, TestKind::CylindricalCompressive),
    Requisite::new(REQ_VAR_DIM, TestKind::DimensionalVariation),
    Requisite::new(REQ_VAR_MASSA, TestKind::MassVariation),
];

const REJUNTE: &[Requisite] = &[
    Requisite::new(REQ_RETENCAO, TestKind::WaterRetentionRatio),
    Requisite::new(REQ_DENSIDADE, TestKind::FreshDensity),
    Requisite::new(REQ_COMPRESSAO_CILINDRICA, TestKind::CylindricalCompressive),
    Requisite::new(REQ_VAR_DIM, TestKind::DimensionalVariation),
    Requisite::new(REQ_CAPILARIDADE, TestKind::Capillarity),
    Requisite::new(REQ_PERMEABILIDADE, TestKind::Permeability),
    Requisite::new(REQ_RETRACAO, TestKind::Shrinkage),
];

const REVESTIMENTO: &[Requisite] = &[
    Requisite::new(REQ_RETENCAO, TestKind::WaterRetentionRatio),
    Requisite::new(REQ_DENSIDADE, TestKind::FreshDensity),
    Requisite::new(REQ_FLEXAO, TestKind::Flexural),
    Requisite::new(REQ_COMPRESSAO_PRISMA, TestKind::PrismaticCompressive),
    Requisite::new(REQ_ADERENCIA_MANUAL, TestKind::ManualAdhesion),
    Requisite::new(REQ_ADERENCIA_AUTO, TestKind::AutomaticAdhesion),
    Requisite::new(REQ_CAPILARIDADE, TestKind::Capillarity),
    Requisite::new(REQ_VAR_DIM, TestKind::DimensionalVariation),
];

/// Ordered requisites of a product line
pub fn requisites(product: ProductLine) -> &'static [Requisite] {
    match product {
        ProductLine::Basecoat => BASECOAT,
        ProductLine::Graute => GRAUTE,
        ProductLine::Rejunte => REJUNTE,
        ProductLine::Revestimento => REVESTIMENTO,
    }
}

/// Find a catalog entry by exact name, page-id slug or test kind slug
pub fn find(product: ProductLine, query: &str) -> Option<&'static Requisite> {
    let slug = slugify(query);
    requisites(product)
        .iter()
        .find(|r| r.name == query || slugify(r.name) == slug || r.kind.as_str() == slug)
}

/// The requisite after `current` in the product's sequence
///
/// Returns `None` at the end of the list or when `current` is not in it.
pub fn next_requisite(product: ProductLine, current: &str) -> Option<&'static Requisite> {
    let list = requisites(product);
    let current = find(product, current)?;
    let idx = list.iter().position(|r| r == current)?;
    list.get(idx + 1)
}

/// Page id of a requisite: `<Product>::<slug>`
pub fn page_id(product: ProductLine, requisite: &str) -> String {
    format!("{}::{}", product, slugify(requisite))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resolver::{resolve, Resolution};

    #[test]
    fn test_catalog_sizes() {
        assert_eq!(requisites(ProductLine::Basecoat).len(), 10);
        assert_eq!(requisites(ProductLine::Graute).len(), 4);
        assert_eq!(requisites(ProductLine::Rejunte).len(), 7);
        assert_eq!(requisites(ProductLine::Revestimento).len(), 8);
    }

    #[test]
    fn test_resolver_agrees_with_catalog() {
        for product in ProductLine::all() {
            for req in requisites(*product) {
                assert_eq!(
                    resolve(*product, req.name),
                    Resolution::Formula(req.kind),
                    "{} / {}",
                    product,
                    req.name
                );
            }
        }
    }

    #[test]
    fn test_next_requisite_sequence() {
        let next = next_requisite(ProductLine::Graute, REQ_DENSIDADE).unwrap();
        assert_eq!(next.name, REQ_COMPRESSAO_CILINDRICA);

        let next = next_requisite(ProductLine::Graute, REQ_VAR_DIM).unwrap();
        assert_eq!(next.kind, TestKind::MassVariation);
    }

    #[test]
    fn test_next_requisite_at_end_is_none() {
        assert!(next_requisite(ProductLine::Graute, REQ_VAR_MASSA).is_none());
        assert!(next_requisite(ProductLine::Revestimento, REQ_VAR_DIM).is_none());
    }

    #[test]
    fn test_next_requisite_unknown_is_none() {
        assert!(next_requisite(ProductLine::Graute, REQ_FLEXAO).is_none());
        assert!(next_requisite(ProductLine::Basecoat, "nothing like this").is_none());
    }

    #[test]
    fn test_find_by_kind_slug_and_page_slug() {
        let by_kind = find(ProductLine::Revestimento, "manual-adhesion").unwrap();
        assert_eq!(by_kind.name, REQ_ADERENCIA_MANUAL);

        let by_slug = find(ProductLine::Basecoat, "flexao-4x4x16-mpa-abnt-nbr-13279-2005").unwrap();
        assert_eq!(by_slug.kind, TestKind::Flexural);
    }

    #[test]
    fn test_page_id() {
        assert_eq!(
            page_id(ProductLine::Basecoat, REQ_RETENCAO),
            "Basecoat::retencao-de-agua-abnt-nbr-13277"
        );
    }
}
