//! Product lines - the four mortar families a laboratory run belongs to

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Product line under test
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductLine {
    /// Basecoat render for insulation systems
    Basecoat,
    /// Structural grout
    Graute,
    /// Tile grout
    Rejunte,
    /// Coating / tile adhesive mortar
    Revestimento,
}

impl ProductLine {
    /// Display name as printed on the laboratory sheets
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductLine::Basecoat => "Basecoat",
            ProductLine::Graute => "Graute",
            ProductLine::Rejunte => "Rejunte",
            ProductLine::Revestimento => "Revestimento",
        }
    }

    /// Get all product lines in catalog order
    pub fn all() -> &'static [ProductLine] {
        &[
            ProductLine::Basecoat,
            ProductLine::Graute,
            ProductLine::Rejunte,
            ProductLine::Revestimento,
        ]
    }
}

impl fmt::Display for ProductLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProductLine {
    type Err = ProductParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basecoat" => Ok(ProductLine::Basecoat),
            "graute" | "grout" => Ok(ProductLine::Graute),
            "rejunte" => Ok(ProductLine::Rejunte),
            "revestimento" => Ok(ProductLine::Revestimento),
            _ => Err(ProductParseError::Unknown(s.to_string())),
        }
    }
}

/// Errors that can occur when parsing a product line
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProductParseError {
    #[error("unknown product line: '{0}' (valid: basecoat, graute, rejunte, revestimento)")]
    Unknown(String),
}
