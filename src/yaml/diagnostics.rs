//! Diagnostics for user-authored YAML and JSON files

use miette::{Diagnostic, NamedSource, SourceSpan};
use std::path::PathBuf;
use thiserror::Error;

/// Syntax or shape error with source location
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(mortarlab::yaml::syntax))]
pub struct YamlSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    /// The underlying error message
    message: String,
}

impl YamlSyntaxError {
    /// Create a syntax error from a serde_yml error
    pub fn from_serde_error(err: &serde_yml::Error, source: &str, filename: &str) -> Self {
        let (line, column) = err
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((1, 1));
        Self::at(err.to_string(), source, filename, line, column)
    }

    /// Create a syntax error from a serde_json error
    pub fn from_json_error(err: &serde_json::Error, source: &str, filename: &str) -> Self {
        Self::at(
            err.to_string(),
            source,
            filename,
            err.line().max(1),
            err.column().max(1),
        )
    }

    fn at(message: String, source: &str, filename: &str, line: usize, column: usize) -> Self {
        let offset = line_col_to_offset(source, line, column);
        let help = generate_help(&message);

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1)),
            help,
            message,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors loading a YAML or JSON file
#[derive(Debug, Error, Diagnostic)]
pub enum YamlError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error("cannot read {}: {source}", path.display())]
    #[diagnostic(code(mortarlab::io))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convert line/column to byte offset
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    let mut current_line = 1;

    for (i, ch) in source.char_indices() {
        if current_line == line {
            let line_start = i;
            let mut col = 1;
            for (j, c) in source[line_start..].char_indices() {
                if col == column {
                    return line_start + j;
                }
                if c == '\n' {
                    break;
                }
                col += 1;
            }
            return line_start + column.saturating_sub(1);
        }
        if ch == '\n' {
            current_line += 1;
        }
        offset = i;
    }

    offset
}

/// Suggest a fix from the parser message
fn generate_help(message: &str) -> Option<String> {
    let msg_lower = message.to_lowercase();

    if msg_lower.contains("tab") {
        return Some(
            "YAML requires spaces for indentation, not tabs. Replace tabs with spaces.".to_string(),
        );
    }

    if msg_lower.contains("duplicate key") || msg_lower.contains("duplicate field") {
        return Some("Each key can only appear once. Remove or rename the duplicate key.".to_string());
    }

    if msg_lower.contains("unknown variant") && msg_lower.contains("basecoat") {
        return Some("Product lines are: basecoat, graute, rejunte, revestimento".to_string());
    }

    if msg_lower.contains("unknown variant") {
        return Some("Run `mortarlab limits` to list the valid limit keys".to_string());
    }

    if msg_lower.contains("unknown field") {
        return Some("Valid top-level keys are: product, default_format, limits".to_string());
    }

    if msg_lower.contains("invalid type") {
        return Some("Readings and limits must be plain numbers (use '.' as decimal separator)".to_string());
    }

    if msg_lower.contains("expected block end") {
        return Some("Check your indentation - it may be inconsistent.".to_string());
    }

    if msg_lower.contains("mapping values are not allowed") {
        return Some("You may be missing a space after ':' or have incorrect indentation.".to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_to_offset() {
        let source = "line1\nline2\nline3";
        assert_eq!(line_col_to_offset(source, 1, 1), 0);
        assert_eq!(line_col_to_offset(source, 2, 1), 6);
        assert_eq!(line_col_to_offset(source, 3, 3), 14);
    }

    #[test]
    fn test_help_generation() {
        assert!(generate_help("found tab character").is_some());
        assert!(generate_help("duplicate key").is_some());
        assert!(generate_help("unknown variant `foo`, expected one of `basecoat`, `graute`")
            .unwrap()
            .contains("revestimento"));
        assert!(generate_help("some random error").is_none());
    }

    #[test]
    fn test_json_error_location() {
        let source = "{\n  \"cp1\": oops\n}";
        let err = serde_json::from_str::<serde_json::Value>(source).unwrap_err();
        let diag = YamlSyntaxError::from_json_error(&err, source, "readings.json");
        assert!(!diag.message().is_empty());
    }
}
