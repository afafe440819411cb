//! Output rendering for listings and test outcomes
//!
//! Listings go through [`Listing`]: serialized for yaml/json, a padded table
//! for auto, tab-separated rows for tsv and a markdown table for md.

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::helpers::{escape_tsv, format_value, precision};
use crate::cli::OutputFormat;
use crate::core::outcome::{SpecimenStatus, TestOutcome, Verdict};

/// Rows of a listing command with their column layout
pub struct Listing<'a, T: Serialize> {
    pub headers: &'a [&'a str],
    pub rows: &'a [T],
    pub cells: fn(&T) -> Vec<String>,
}

impl<T: Serialize> Listing<'_, T> {
    /// Render the listing in the requested format
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => to_json(&self.rows),
            OutputFormat::Yaml => to_yaml(&self.rows),
            OutputFormat::Tsv => {
                let mut out = self.headers.join("\t");
                out.push('\n');
                for row in self.rows {
                    let cells: Vec<String> = (self.cells)(row).iter().map(|c| escape_tsv(c)).collect();
                    out.push_str(&cells.join("\t"));
                    out.push('\n');
                }
                Ok(out)
            }
            OutputFormat::Auto | OutputFormat::Md => {
                let mut builder = Builder::default();
                builder.push_record(self.headers.iter().map(|h| h.to_string()));
                for row in self.rows {
                    let cells = (self.cells)(row);
                    let cells: Vec<String> = if format == OutputFormat::Md {
                        cells.into_iter().map(|c| c.replace('|', "\\|")).collect()
                    } else {
                        cells
                    };
                    builder.push_record(cells);
                }
                let mut table = builder.build();
                if format == OutputFormat::Md {
                    table.with(Style::markdown());
                } else {
                    table.with(Style::blank());
                }
                Ok(format!("{}\n", table))
            }
        }
    }

    pub fn print(&self, format: OutputFormat) -> Result<()> {
        print!("{}", self.render(format)?);
        Ok(())
    }
}

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut out = serde_json::to_string_pretty(value).into_diagnostic()?;
    out.push('\n');
    Ok(out)
}

pub fn to_yaml<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_yml::to_string(value).into_diagnostic()
}

/// Colour a verdict for the terminal
fn styled_verdict(verdict: Verdict) -> String {
    let text = verdict.to_string();
    match verdict {
        Verdict::Accepted => style(text).green().bold().to_string(),
        Verdict::RepeatTest | Verdict::FieldsEmpty => style(text).yellow().bold().to_string(),
        Verdict::OutOfRange | Verdict::Rejected => style(text).red().bold().to_string(),
        Verdict::NotImplemented => style(text).dim().to_string(),
    }
}

fn styled_status(status: SpecimenStatus) -> String {
    let text = status.to_string();
    match status {
        SpecimenStatus::Valid => style(text).green().to_string(),
        SpecimenStatus::Excluded => style(text).red().to_string(),
        SpecimenStatus::Unfilled => style(text).dim().to_string(),
    }
}

/// Render a test outcome
///
/// With `quiet` the auto format prints only the final value, or the verdict
/// when there is none.
pub fn render_outcome(outcome: &TestOutcome, format: OutputFormat, quiet: bool) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(outcome),
        OutputFormat::Yaml => to_yaml(outcome),
        OutputFormat::Tsv => Ok(outcome_tsv(outcome)),
        OutputFormat::Md => Ok(outcome_md(outcome)),
        OutputFormat::Auto if quiet => {
            let decimals = precision(outcome.test);
            Ok(match outcome.final_value {
                Some(value) => format!("{:.*}\n", decimals, value),
                None => format!("{}\n", outcome.verdict),
            })
        }
        OutputFormat::Auto => Ok(outcome_auto(outcome)),
    }
}

fn title(outcome: &TestOutcome) -> String {
    match outcome.test {
        Some(test) => format!("{} ({}) - {}", test.title(), test.standard(), outcome.product),
        None => format!("Requisite without calculator - {}", outcome.product),
    }
}

fn specimen_rows(outcome: &TestOutcome) -> Vec<Vec<String>> {
    let decimals = precision(outcome.test);
    outcome
        .specimens
        .iter()
        .map(|s| {
            vec![
                s.label.clone(),
                format_value(s.value, decimals),
                format_value(s.deviation, decimals),
                s.status.to_string(),
            ]
        })
        .collect()
}

fn outcome_auto(outcome: &TestOutcome) -> String {
    let decimals = precision(outcome.test);
    let mut out = format!("{}\n", style(title(outcome)).bold());

    if !outcome.specimens.is_empty() {
        let mut builder = Builder::default();
        builder.push_record([
            "Specimen".to_string(),
            format!("Value ({})", outcome.unit),
            "Deviation".to_string(),
            "Status".to_string(),
        ]);
        for (row, specimen) in specimen_rows(outcome).into_iter().zip(&outcome.specimens) {
            let mut row = row;
            row[3] = styled_status(specimen.status);
            builder.push_record(row);
        }
        let mut table = builder.build();
        table.with(Style::rounded());
        out.push_str(&format!("{}\n", table));
    }

    if let Some(mean) = outcome.mean {
        out.push_str(&format!("Mean:     {:.*} {}\n", decimals, mean, outcome.unit));
    }
    if outcome.minimum > 0 {
        out.push_str(&format!(
            "Valid:    {} (minimum {})\n",
            outcome.valid_count, outcome.minimum
        ));
    }
    for derived in &outcome.derived {
        out.push_str(&format!(
            "{}: {:.4} {}\n",
            style(&derived.name).cyan(),
            derived.value,
            derived.unit
        ));
    }
    if let Some(value) = outcome.final_value {
        out.push_str(&format!(
            "Result:   {} {}\n",
            style(format!("{:.*}", decimals, value)).bold(),
            outcome.unit
        ));
    }
    out.push_str(&format!(
        "Verdict:  {} - {}\n",
        styled_verdict(outcome.verdict),
        outcome.reason
    ));
    for note in &outcome.notes {
        out.push_str(&format!("{} {}\n", style("note:").yellow(), note));
    }
    out
}

fn outcome_tsv(outcome: &TestOutcome) -> String {
    let decimals = precision(outcome.test);
    let headers = [
        "test", "product", "verdict", "final", "unit", "valid", "minimum", "reason",
    ];
    let row = [
        outcome.test.map(|t| t.to_string()).unwrap_or_default(),
        outcome.product.to_string(),
        outcome.verdict.to_string(),
        outcome
            .final_value
            .map(|v| format!("{:.*}", decimals, v))
            .unwrap_or_default(),
        outcome.unit.clone(),
        outcome.valid_count.to_string(),
        outcome.minimum.to_string(),
        escape_tsv(&outcome.reason),
    ];
    format!("{}\n{}\n", headers.join("\t"), row.join("\t"))
}

fn outcome_md(outcome: &TestOutcome) -> String {
    let decimals = precision(outcome.test);
    let mut out = format!("## {}\n\n", title(outcome));

    if !outcome.specimens.is_empty() {
        let mut builder = Builder::default();
        builder.push_record([
            "Specimen".to_string(),
            format!("Value ({})", outcome.unit),
            "Deviation".to_string(),
            "Status".to_string(),
        ]);
        for row in specimen_rows(outcome) {
            builder.push_record(row);
        }
        out.push_str(&builder.build().with(Style::markdown()).to_string());
        out.push_str("\n\n");
    }

    let mut summary = Builder::default();
    summary.push_record(["Metric", "Value"]);
    summary.push_record(["Verdict".to_string(), outcome.verdict.to_string()]);
    summary.push_record([
        "Final".to_string(),
        format!(
            "{} {}",
            format_value(outcome.final_value, decimals),
            outcome.unit
        ),
    ]);
    summary.push_record([
        "Valid specimens".to_string(),
        format!("{} / {}", outcome.valid_count, outcome.minimum),
    ]);
    for derived in &outcome.derived {
        summary.push_record([
            derived.name.clone(),
            format!("{:.4} {}", derived.value, derived.unit),
        ]);
    }
    out.push_str(&summary.build().with(Style::markdown()).to_string());
    out.push_str(&format!("\n\n{}\n", outcome.reason.replace('|', "\\|")));

    for note in &outcome.notes {
        out.push_str(&format!("\n> {}\n", note));
    }
    out
}
