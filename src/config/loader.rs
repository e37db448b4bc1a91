//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::types::{PayrollConfig, PayrollConfigFile};

/// Loads and provides access to payroll configuration.
///
/// A configuration file is a partial [`PayrollConfigFile`]: every field is
/// optional and layered over [`PayrollConfig::default`].
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/payroll.yaml")?;
/// println!("Rounding: {:?}", loader.config().shift_hours.rounding_mode);
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: PayrollConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified YAML file.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - The file is missing ([`EngineError::ConfigNotFound`])
    /// - The file is not valid YAML or has unknown fields
    ///   ([`EngineError::ConfigParseError`])
    /// - The file names an unknown profile ([`EngineError::UnknownProfile`])
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        let loader = Self::from_yaml_str(&content, &path_str)?;
        debug!(path = %path_str, "Loaded payroll configuration");
        Ok(loader)
    }

    /// Parses configuration from YAML text. `origin` names the source in
    /// error messages.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::config::{ConfigLoader, RoundingMode};
    ///
    /// let yaml = "profile: extended_break\ntotals_label: Sum\n";
    /// let loader = ConfigLoader::from_yaml_str(yaml, "inline").unwrap();
    /// assert_eq!(loader.config().shift_hours.rounding_mode, RoundingMode::NearestHalf);
    /// assert_eq!(loader.config().totals_label, "Sum");
    /// ```
    pub fn from_yaml_str(content: &str, origin: &str) -> EngineResult<Self> {
        let file: PayrollConfigFile = if content.trim().is_empty() {
            PayrollConfigFile::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| EngineError::ConfigParseError {
                path: origin.to_string(),
                message: e.to_string(),
            })?
        };
        Self::resolve(file)
    }

    /// Resolves partial settings against the defaults.
    pub fn resolve(file: PayrollConfigFile) -> EngineResult<Self> {
        let config = file.apply_to(PayrollConfig::default())?;
        Ok(Self { config })
    }

    /// Returns the resolved configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> PayrollConfig {
        self.config
    }
}
