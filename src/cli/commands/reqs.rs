//! `mortarlab reqs` - requisites of a product line in test sequence

use miette::Result;
use serde::Serialize;

use crate::cli::helpers::{truncate_str, Context};
use crate::cli::render::Listing;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::catalog::{self, Requisite};
use crate::core::kind::TestKind;
use crate::core::product::ProductLine;

#[derive(clap::Args, Debug)]
pub struct ReqsArgs {
    /// Product line (default: configured product)
    pub product: Option<ProductLine>,

    /// Print only the requisite that follows this one (nothing at the end)
    #[arg(long, value_name = "REQUISITE")]
    pub after: Option<String>,
}

#[derive(Debug, Serialize)]
struct RequisiteRow {
    position: usize,
    name: &'static str,
    test: TestKind,
    page_id: String,
}

impl RequisiteRow {
    fn new(product: ProductLine, position: usize, requisite: &'static Requisite) -> Self {
        Self {
            position,
            name: requisite.name,
            test: requisite.kind,
            page_id: requisite.page_id(product),
        }
    }
}

fn cells(row: &RequisiteRow) -> Vec<String> {
    vec![
        row.position.to_string(),
        row.name.to_string(),
        row.test.to_string(),
        row.page_id.clone(),
    ]
}

fn auto_cells(row: &RequisiteRow) -> Vec<String> {
    let mut cells = cells(row);
    cells[1] = truncate_str(row.name, 48);
    cells
}

pub fn run(args: ReqsArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::load(global)?;
    let product = ctx.product(args.product)?;
    let list = catalog::requisites(product);

    let rows: Vec<RequisiteRow> = match &args.after {
        Some(current) => {
            if catalog::find(product, current).is_none() {
                return Err(miette::miette!(
                    code = "mortarlab::reqs::unknown",
                    help = "run `mortarlab reqs` to list the requisites of the product",
                    "'{}' is not a requisite of {}",
                    current,
                    product
                ));
            }
            catalog::next_requisite(product, current)
                .and_then(|next| {
                    list.iter()
                        .position(|r| r == next)
                        .map(|idx| RequisiteRow::new(product, idx + 1, next))
                })
                .into_iter()
                .collect()
        }
        None => list
            .iter()
            .enumerate()
            .map(|(idx, r)| RequisiteRow::new(product, idx + 1, r))
            .collect(),
    };

    if rows.is_empty() && matches!(ctx.format, OutputFormat::Auto | OutputFormat::Tsv) {
        if !global.quiet {
            eprintln!("{} is the last requisite of {}", args.after.unwrap_or_default(), product);
        }
        return Ok(());
    }

    Listing {
        headers: &["#", "Requisite", "Test", "Page id"],
        rows: &rows,
        cells: if ctx.format == OutputFormat::Auto {
            auto_cells
        } else {
            cells
        },
    }
    .print(ctx.format)
}
