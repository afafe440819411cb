//! `mortarlab limits` - effective outlier limits

use miette::Result;
use serde::Serialize;

use crate::cli::helpers::Context;
use crate::cli::render::Listing;
use crate::cli::GlobalOpts;
use crate::core::limits::{LimitKey, ThresholdTable};
use crate::core::product::ProductLine;

#[derive(clap::Args, Debug)]
pub struct LimitsArgs {
    /// Product line (default: configured product, or every product)
    pub product: Option<ProductLine>,
}

#[derive(Debug, Serialize)]
struct LimitRow {
    key: LimitKey,
    value: f64,
    unit: &'static str,
    #[serde(rename = "override")]
    is_override: bool,
}

fn cells(row: &LimitRow) -> Vec<String> {
    vec![
        row.key.to_string(),
        format_limit(row.value),
        row.unit.to_string(),
        if row.is_override { "product" } else { "default" }.to_string(),
    ]
}

/// One key across every product line; `*` marks a product override
#[derive(Debug, Serialize)]
struct MatrixRow {
    key: LimitKey,
    unit: &'static str,
    default: f64,
    basecoat: f64,
    graute: f64,
    rejunte: f64,
    revestimento: f64,
    #[serde(skip)]
    marks: [bool; 4],
}

fn matrix_cells(row: &MatrixRow) -> Vec<String> {
    let values = [row.basecoat, row.graute, row.rejunte, row.revestimento];
    let mut cells = vec![
        row.key.to_string(),
        row.unit.to_string(),
        format_limit(row.default),
    ];
    cells.extend(values.iter().zip(row.marks).map(|(value, mark)| {
        if mark {
            format!("{}*", format_limit(*value))
        } else {
            format_limit(*value)
        }
    }));
    cells
}

fn format_limit(value: f64) -> String {
    format!("{}", value)
}

fn matrix(table: &ThresholdTable) -> Vec<MatrixRow> {
    let defaults = table.default_set();
    LimitKey::all()
        .iter()
        .map(|key| {
            let value = |p| table.get_limit(p, *key);
            MatrixRow {
                key: *key,
                unit: key.unit(),
                default: defaults.get(key).copied().unwrap_or_default(),
                basecoat: value(ProductLine::Basecoat),
                graute: value(ProductLine::Graute),
                rejunte: value(ProductLine::Rejunte),
                revestimento: value(ProductLine::Revestimento),
                marks: [
                    ProductLine::Basecoat,
                    ProductLine::Graute,
                    ProductLine::Rejunte,
                    ProductLine::Revestimento,
                ]
                .map(|p| table.is_override(p, *key)),
            }
        })
        .collect()
}

pub fn run(args: LimitsArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::load(global)?;

    match args.product.or(ctx.config.product) {
        Some(product) => {
            let rows: Vec<LimitRow> = ctx
                .table
                .effective(product)
                .into_iter()
                .map(|(key, value)| LimitRow {
                    key,
                    value,
                    unit: key.unit(),
                    is_override: ctx.table.is_override(product, key),
                })
                .collect();
            Listing {
                headers: &["Limit", "Value", "Unit", "Source"],
                rows: &rows,
                cells,
            }
            .print(ctx.format)
        }
        None => {
            let rows = matrix(&ctx.table);
            Listing {
                headers: &[
                    "Limit",
                    "Unit",
                    "Default",
                    "Basecoat",
                    "Graute",
                    "Rejunte",
                    "Revestimento",
                ],
                rows: &rows,
                cells: matrix_cells,
            }
            .print(ctx.format)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_marks_overrides() {
        let table = ThresholdTable::builtin().unwrap();
        let rows = matrix(&table);
        let reference = rows
            .iter()
            .find(|r| r.key == LimitKey::ReferenceLength)
            .unwrap();
        assert_eq!(reference.default, 250.0);
        assert_eq!(reference.graute, 130.43);
        let cells = matrix_cells(reference);
        assert_eq!(cells[4], "130.43*");
        assert_eq!(cells[2], "250");
    }
}
