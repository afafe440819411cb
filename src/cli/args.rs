//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    calc::CalcArgs, completions::CompletionsArgs, fields::FieldsArgs, limits::LimitsArgs,
    products::ProductsArgs, reqs::ReqsArgs, resolve::ResolveArgs,
};

#[derive(Parser)]
#[command(name = "mortarlab")]
#[command(author, version, about = "Mortar laboratory test calculator")]
#[command(long_about = "Computes laboratory test results for construction mortars \
(Basecoat, Graute, Rejunte, Revestimento), screening specimens against the \
per-product outlier limits of the ABNT standards.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Extra configuration file, layered over the global and project configs
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the product lines
    Products(ProductsArgs),

    /// List the requisites of a product line in sequence
    Reqs(ReqsArgs),

    /// Show which formula computes a requisite name
    Resolve(ResolveArgs),

    /// Show the effective outlier limits
    Limits(LimitsArgs),

    /// Show the input fields of a test
    Fields(FieldsArgs),

    /// Compute a test from its readings
    Calc(CalcArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable tables and summaries
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// JSON format (for programming)
    Json,
    /// Tab-separated values (for piping)
    Tsv,
    /// Markdown tables
    Md,
}

impl OutputFormat {
    /// Parse a format name from configuration
    pub fn from_name(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name.trim(), true).ok()
    }
}
