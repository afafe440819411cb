//! Configuration management with layered hierarchy
//!
//! Lowest to highest priority: built-in defaults, the global user config
//! (`<config dir>/mortarlab/config.yaml`), the project-local
//! `.mortarlab.yaml`, an explicit `--config` file, then environment
//! variables.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::core::limits::{LimitError, LimitOverrides, ThresholdTable};
use crate::core::product::{ProductLine, ProductParseError};
use crate::yaml::{self, YamlError};

/// Project-local config file name
pub const LOCAL_CONFIG: &str = ".mortarlab.yaml";

/// Environment variable overriding the default product line
pub const ENV_PRODUCT: &str = "MORTARLAB_PRODUCT";

/// Environment variable overriding the default output format
pub const ENV_FORMAT: &str = "MORTARLAB_FORMAT";

/// mortarlab configuration with layered hierarchy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Product line used when a command omits it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductLine>,

    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_format: Option<String>,

    /// Threshold overrides layered over the built-in table
    #[serde(skip_serializing_if = "LimitOverrides::is_empty")]
    pub limits: LimitOverrides,
}

/// Errors while assembling the configuration
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    File(#[from] YamlError),

    #[error("MORTARLAB_PRODUCT: {0}")]
    #[diagnostic(code(mortarlab::config::env))]
    Env(#[from] ProductParseError),

    #[error("invalid threshold table: {0}")]
    #[diagnostic(
        code(mortarlab::config::limits),
        help("limits must be finite and non-negative; reference_length must be positive and adhesion_min_specimens a whole number >= 1")
    )]
    Limits(#[from] LimitError),
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::load_from(Self::global_config_path().as_deref(), &cwd, explicit)
    }

    /// Load with explicit locations for the global config and working directory
    pub fn load_from(
        global: Option<&Path>,
        cwd: &Path,
        explicit: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        // 1. Built-in defaults
        let mut config = Config::default();

        // 2. Global user config
        if let Some(path) = global.filter(|p| p.exists()) {
            debug!(path = %path.display(), "loading global config");
            config.merge(yaml::load(path)?);
        }

        // 3. Project-local config
        let local = cwd.join(LOCAL_CONFIG);
        if local.exists() {
            debug!(path = %local.display(), "loading project config");
            config.merge(yaml::load(&local)?);
        }

        // 4. Explicit --config (must exist)
        if let Some(path) = explicit {
            debug!(path = %path.display(), "loading explicit config");
            config.merge(yaml::load(path)?);
        }

        // 5. Environment variables
        if let Ok(product) = std::env::var(ENV_PRODUCT) {
            if !product.trim().is_empty() {
                config.product = Some(product.parse()?);
            }
        }
        if let Ok(format) = std::env::var(ENV_FORMAT) {
            if !format.trim().is_empty() {
                config.default_format = Some(format);
            }
        }

        Ok(config)
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "mortarlab")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.product.is_some() {
            self.product = other.product;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        self.limits.merge(other.limits);
    }

    /// The effective threshold table: built-in values with the overrides on top
    pub fn thresholds(&self) -> Result<ThresholdTable, LimitError> {
        let table = ThresholdTable::builtin()?;
        if self.limits.is_empty() {
            Ok(table)
        } else {
            table.with_overrides(&self.limits)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::limits::LimitKey;
    use std::fs;

    #[test]
    fn test_defaults_when_nothing_exists() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(None, dir.path(), None).unwrap();
        assert!(config.limits.is_empty());
        assert_eq!(config.thresholds().unwrap(), ThresholdTable::builtin().unwrap());
    }

    #[test]
    fn test_layering_priority() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.yaml");
        fs::write(
            &global,
            "product: graute\ndefault_format: json\nlimits:\n  default:\n    adhesion_min_specimens: 8\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(LOCAL_CONFIG),
            "product: rejunte\nlimits:\n  graute:\n    reference_length: 125.0\n",
        )
        .unwrap();
        let explicit = dir.path().join("explicit.yaml");
        fs::write(&explicit, "default_format: md\n").unwrap();

        let config = Config::load_from(Some(&global), dir.path(), Some(&explicit)).unwrap();
        assert_eq!(config.default_format.as_deref(), Some("md"));
        assert_eq!(
            config.limits.default.get(&LimitKey::AdhesionMinSpecimens),
            Some(&8.0)
        );

        let table = config.thresholds().unwrap();
        assert_eq!(table.get_limit(ProductLine::Graute, LimitKey::ReferenceLength), 125.0);
        assert_eq!(table.get_count(ProductLine::Basecoat, LimitKey::AdhesionMinSpecimens), 8);
    }

    #[test]
    fn test_unknown_product_in_limits_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("bad.yaml");
        fs::write(&explicit, "limits:\n  concreto:\n    reference_length: 100\n").unwrap();
        let err = Config::load_from(None, dir.path(), Some(&explicit)).unwrap_err();
        assert!(matches!(err, ConfigError::File(YamlError::Syntax(_))));
    }

    #[test]
    fn test_unknown_limit_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("bad.yaml");
        fs::write(&explicit, "limits:\n  default:\n    flexao_var_max: 0.4\n").unwrap();
        assert!(Config::load_from(None, dir.path(), Some(&explicit)).is_err());
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.yaml");
        let err = Config::load_from(None, dir.path(), Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::File(YamlError::Io { .. })));
    }

    #[test]
    fn test_invalid_limit_value_is_integrity_fault() {
        let mut config = Config::default();
        config
            .limits
            .default
            .insert(LimitKey::ReferenceLength, -1.0);
        assert!(config.thresholds().is_err());
    }
}
