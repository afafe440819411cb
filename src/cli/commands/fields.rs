//! `mortarlab fields` - input schema of a test

use miette::Result;
use serde::Serialize;

use crate::cli::helpers::{resolve_test, Context};
use crate::cli::render::Listing;
use crate::cli::GlobalOpts;
use crate::core::kind::TestKind;
use crate::core::product::ProductLine;
use crate::core::resolver::Resolution;
use crate::formulas::{self, FieldSpec};

#[derive(clap::Args, Debug)]
pub struct FieldsArgs {
    /// Product line
    pub product: ProductLine,

    /// Test kind slug (e.g. `flexural`) or requisite name
    pub test: String,
}

fn cells(field: &FieldSpec) -> Vec<String> {
    vec![
        field.name.to_string(),
        field.label.clone(),
        field.unit.to_string(),
    ]
}

/// Resolve TEST to a formula, failing for requisites without one
pub(crate) fn require_kind(product: ProductLine, test: &str) -> Result<TestKind> {
    match resolve_test(product, test) {
        Resolution::Formula(kind) => Ok(kind),
        Resolution::NotImplemented => Err(miette::miette!(
            code = "mortarlab::fields::unknown",
            help = "use a test slug such as `flexural` or `manual-adhesion`, or a requisite from `mortarlab reqs`",
            "no calculator for '{}' on {}",
            test,
            product
        )),
    }
}

pub fn run(args: FieldsArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::load(global)?;
    let kind = require_kind(args.product, &args.test)?;
    let fields = formulas::fields(kind);

    Listing {
        headers: &["Field", "Label", "Unit"],
        rows: &fields,
        cells,
    }
    .print(ctx.format)
}
