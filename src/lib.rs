//! mortarlab: laboratory calculations for construction mortars
//!
//! Computes the standardized ABNT test results for the Basecoat, Graute,
//! Rejunte and Revestimento product lines, with the outlier-exclusion rules
//! each test prescribes.

pub mod cli;
pub mod core;
pub mod formulas;
pub mod logging;
pub mod yaml;
