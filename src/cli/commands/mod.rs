//! CLI command implementations

pub mod calc;
pub mod completions;
pub mod fields;
pub mod limits;
pub mod products;
pub mod reqs;
pub mod resolve;
