//! `mortarlab products` - list the product lines

use miette::Result;
use serde::Serialize;

use crate::cli::helpers::Context;
use crate::cli::render::Listing;
use crate::cli::GlobalOpts;
use crate::core::catalog;
use crate::core::product::ProductLine;

#[derive(clap::Args, Debug)]
pub struct ProductsArgs {}

#[derive(Debug, Serialize)]
struct ProductRow {
    product: ProductLine,
    name: &'static str,
    requisites: usize,
    default: bool,
}

fn cells(row: &ProductRow) -> Vec<String> {
    vec![
        row.product.as_str().to_lowercase(),
        row.name.to_string(),
        row.requisites.to_string(),
        if row.default { "*".to_string() } else { String::new() },
    ]
}

pub fn run(_args: ProductsArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::load(global)?;
    let rows: Vec<ProductRow> = ProductLine::all()
        .iter()
        .map(|product| ProductRow {
            product: *product,
            name: product.as_str(),
            requisites: catalog::requisites(*product).len(),
            default: ctx.config.product == Some(*product),
        })
        .collect();

    Listing {
        headers: &["Key", "Name", "Requisites", "Default"],
        rows: &rows,
        cells,
    }
    .print(ctx.format)
}
