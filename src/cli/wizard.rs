//! Interactive readings entry
//!
//! Prompts for each input field of a test in schema order. Blank answers are
//! left out of the readings, so they read as the unfilled zero sentinel.

use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use miette::{IntoDiagnostic, Result};

use crate::core::kind::TestKind;
use crate::formulas::{self, parse_number, FieldSpec, Readings};

/// Prompt-driven collector of readings
pub struct ReadingsWizard {
    theme: ColorfulTheme,
}

impl Default for ReadingsWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadingsWizard {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    /// Ask for every field of `kind`; values already in `prefill` are offered as defaults
    pub fn run(&self, kind: TestKind, prefill: &Readings) -> Result<Readings> {
        eprintln!();
        eprintln!(
            "{} {} ({})",
            style("◆").cyan(),
            style(kind.title()).bold(),
            kind.standard()
        );
        eprintln!("{}", style("─".repeat(50)).dim());
        eprintln!("{}", style("Leave a field blank if the specimen was not tested.").dim());

        let mut readings = Readings::new();
        for field in formulas::fields(kind) {
            if let Some(value) = self.prompt(&field, prefill.get_opt(field.name))? {
                readings.set(field.name, value);
            }
        }
        Ok(readings)
    }

    fn prompt(&self, field: &FieldSpec, default: Option<f64>) -> Result<Option<f64>> {
        let prompt = format!("{} ({})", field.label, field.unit);
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(&prompt)
            .allow_empty(true)
            .validate_with(|text: &String| -> Result<(), String> {
                if text.trim().is_empty() || parse_number(text).is_some() {
                    Ok(())
                } else {
                    Err(format!("'{}' is not a number", text.trim()))
                }
            });
        if let Some(value) = default {
            input = input.default(value.to_string());
        }
        let text = input.interact_text().into_diagnostic()?;
        Ok(parse_number(&text))
    }
}
