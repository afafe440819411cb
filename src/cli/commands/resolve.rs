//! `mortarlab resolve` - show which formula computes a requisite name

use miette::Result;
use serde::Serialize;

use crate::cli::helpers::{resolve_test, Context};
use crate::cli::render::Listing;
use crate::cli::GlobalOpts;
use crate::core::catalog;
use crate::core::kind::TestKind;
use crate::core::product::ProductLine;
use crate::core::resolver::normalize;

#[derive(clap::Args, Debug)]
pub struct ResolveArgs {
    /// Product line the requisite belongs to
    pub product: ProductLine,

    /// Requisite name as printed on the laboratory sheet
    pub text: String,
}

#[derive(Debug, Serialize)]
struct ResolveRow {
    product: ProductLine,
    requisite: String,
    normalized: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    test: Option<TestKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_id: Option<String>,
}

fn cells(row: &ResolveRow) -> Vec<String> {
    vec![
        row.requisite.clone(),
        row.test
            .map(|t| t.to_string())
            .unwrap_or_else(|| "not-implemented".to_string()),
        row.test.map(|t| t.title().to_string()).unwrap_or_default(),
        row.page_id.clone().unwrap_or_default(),
    ]
}

pub fn run(args: ResolveArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::load(global)?;
    let resolution = resolve_test(args.product, &args.text);
    let page_id = catalog::find(args.product, &args.text).map(|r| r.page_id(args.product));

    let row = ResolveRow {
        product: args.product,
        normalized: normalize(&args.text),
        requisite: args.text,
        test: resolution.kind(),
        page_id,
    };

    Listing {
        headers: &["Requisite", "Test", "Title", "Page id"],
        rows: std::slice::from_ref(&row),
        cells,
    }
    .print(ctx.format)
}
