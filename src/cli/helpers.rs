//! Shared helper functions for CLI commands

use miette::{miette, Result};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::catalog;
use crate::core::config::Config;
use crate::core::kind::TestKind;
use crate::core::limits::ThresholdTable;
use crate::core::product::ProductLine;
use crate::core::resolver::{resolve, Resolution};

/// Configuration and thresholds every command runs against
pub struct Context {
    pub config: Config,
    pub table: ThresholdTable,
    pub format: OutputFormat,
}

impl Context {
    /// Load the layered configuration and build the threshold table
    pub fn load(global: &GlobalOpts) -> Result<Self> {
        let config = Config::load(global.config.as_deref())?;
        let table = config
            .thresholds()
            .map_err(crate::core::config::ConfigError::from)?;
        let format = effective_format(global.format, &config);
        Ok(Self {
            config,
            table,
            format,
        })
    }

    /// The product given on the command line, or the configured default
    pub fn product(&self, arg: Option<ProductLine>) -> Result<ProductLine> {
        arg.or(self.config.product).ok_or_else(|| {
            miette!(
                code = "mortarlab::cli::product",
                help = "pass a product line or set `product:` in .mortarlab.yaml",
                "no product line given"
            )
        })
    }
}

/// An explicit `--format` wins; otherwise the configured default applies
pub fn effective_format(requested: OutputFormat, config: &Config) -> OutputFormat {
    if requested != OutputFormat::Auto {
        return requested;
    }
    config
        .default_format
        .as_deref()
        .and_then(OutputFormat::from_name)
        .unwrap_or(OutputFormat::Auto)
}

/// Map a TEST argument to a formula
///
/// Accepts a test kind slug (`flexural`), a catalog page-id slug, or any
/// requisite text the resolver understands.
pub fn resolve_test(product: ProductLine, text: &str) -> Resolution {
    if let Ok(kind) = text.parse::<TestKind>() {
        return Resolution::Formula(kind);
    }
    if let Some(requisite) = catalog::find(product, text) {
        return Resolution::Formula(requisite.kind);
    }
    resolve(product, text)
}

/// Decimal places used when displaying values of a test
pub fn precision(test: Option<TestKind>) -> usize {
    match test {
        Some(TestKind::Permeability) => 4,
        Some(TestKind::FreshDensity) => 3,
        _ => 2,
    }
}

/// Format an optional number, `-` when absent
pub fn format_value(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.*}", decimals, v))
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a value for one TSV cell
pub fn escape_tsv(s: &str) -> String {
    s.replace(['\t', '\n'], " ")
}
