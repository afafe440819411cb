//! Core module - product lines, thresholds, outlier screening and routing

pub mod catalog;
pub mod config;
pub mod kind;
pub mod limits;
pub mod outcome;
pub mod outlier;
pub mod product;
pub mod resolver;

pub use catalog::{next_requisite, page_id, requisites, Requisite};
pub use config::{Config, ConfigError};
pub use kind::{TestKind, TestKindParseError};
pub use limits::{LimitError, LimitKey, LimitOverrides, LimitSet, ThresholdTable};
pub use outcome::{InputFault, SpecimenResult, SpecimenStatus, TestOutcome, Verdict};
pub use outlier::{screen, DeviationRule, Screening};
pub use product::{ProductLine, ProductParseError};
pub use resolver::{resolve, Resolution};
