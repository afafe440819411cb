//! `mortarlab calc` - compute a test from its readings
//!
//! Readings are layered: the `--input` file first, then each `--set`, then
//! the interactive prompts (which offer the earlier values as defaults).

use miette::{miette, Result};
use std::path::PathBuf;
use tracing::debug;

use crate::cli::helpers::{resolve_test, Context};
use crate::cli::render::render_outcome;
use crate::cli::wizard::ReadingsWizard;
use crate::cli::GlobalOpts;
use crate::core::outcome::{TestOutcome, Verdict};
use crate::core::product::ProductLine;
use crate::core::resolver::Resolution;
use crate::formulas::{self, Readings, ReadingsError};
use crate::yaml;

#[derive(clap::Args, Debug)]
pub struct CalcArgs {
    /// Product line whose limits apply
    pub product: ProductLine,

    /// Test kind slug (e.g. `flexural`) or requisite name
    pub test: String,

    /// Set a reading (repeatable), e.g. `--set cp1=5.2`
    #[arg(long, short = 's', value_name = "NAME=VALUE", value_parser = parse_reading)]
    pub set: Vec<(String, f64)>,

    /// YAML or JSON file mapping field names to values
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Prompt for every field
    #[arg(long)]
    pub interactive: bool,
}

fn parse_reading(pair: &str) -> Result<(String, f64), ReadingsError> {
    Readings::parse_pair(pair)
}

/// Read a readings file; field names are case-insensitive
fn load_readings(path: &std::path::Path) -> Result<Readings> {
    let file: Readings = yaml::load(path)?;
    Ok(file
        .iter()
        .map(|(name, value)| (name.to_lowercase(), value))
        .collect())
}

pub fn run(args: CalcArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::load(global)?;
    let product = args.product;

    let kind = match resolve_test(product, &args.test) {
        Resolution::Formula(kind) => kind,
        Resolution::NotImplemented => {
            let outcome = TestOutcome::not_implemented(product, &args.test);
            print!("{}", render_outcome(&outcome, ctx.format, global.quiet)?);
            return Ok(());
        }
    };

    let mut readings = Readings::new();
    if let Some(path) = &args.input {
        readings.extend(load_readings(path)?);
    }
    readings.extend(args.set.into_iter().collect());
    if args.interactive {
        readings = ReadingsWizard::new().run(kind, &readings)?;
    }
    debug!(%product, test = %kind, fields = readings.iter().count(), "evaluating");

    let outcome = formulas::evaluate(product, kind, &readings, &ctx.table)?;
    print!("{}", render_outcome(&outcome, ctx.format, global.quiet)?);

    if outcome.verdict == Verdict::Rejected {
        return Err(miette!(
            code = "mortarlab::calc::input",
            help = format!("run `mortarlab fields {} {}` to see the expected inputs", product.as_str().to_lowercase(), kind),
            "cannot compute {}: {}",
            kind,
            outcome.reason
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reading() {
        assert_eq!(parse_reading("CP1=5,2").unwrap(), ("cp1".to_string(), 5.2));
        assert!(parse_reading("cp1").is_err());
    }

    #[test]
    fn test_load_readings_lowercases_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readings.yaml");
        std::fs::write(&path, "RR: 80\nrt: 100\n").unwrap();
        let readings = load_readings(&path).unwrap();
        assert_eq!(readings.get("rr"), 80.0);
        assert_eq!(readings.get("rt"), 100.0);
    }
}
