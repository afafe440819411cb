//! Loading user-authored YAML / JSON documents with located diagnostics

pub mod diagnostics;

pub use diagnostics::{YamlError, YamlSyntaxError};

use serde::de::DeserializeOwned;
use std::path::Path;

/// Parse a YAML document, pointing errors into the source
pub fn parse<T: DeserializeOwned>(source: &str, filename: &str) -> Result<T, YamlError> {
    serde_yml::from_str(source)
        .map_err(|e| YamlSyntaxError::from_serde_error(&e, source, filename).into())
}

/// Read and parse a file; `.json` files go through serde_json, anything else is YAML
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T, YamlError> {
    let source = std::fs::read_to_string(path).map_err(|source| YamlError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let filename = path.display().to_string();

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&source)
            .map_err(|e| YamlSyntaxError::from_json_error(&e, &source, &filename).into())
    } else {
        parse(&source, &filename)
    }
}
