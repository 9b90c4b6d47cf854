// View configuration for display reduction
//
// Settings can come from a TOML file, from command-line flags, or both;
// flags win.

use crate::error::{ProfileError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Initial selector state for a display
///
/// Every field is optional in a TOML file; missing ones take their
/// [`Default`] value.
///
/// # Example
/// ```
/// use circuit_profiler::config::ViewConfig;
///
/// let config = ViewConfig::from_toml_str("metric = \"time\"\nquantile = 75.0\n").unwrap();
/// assert_eq!(config.metric.as_deref(), Some("time"));
/// assert!(config.hierarchy);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
    /// Metric colouring the nodes and driving the threshold
    ///
    /// Default: the first metric of the profile, in sorted order
    pub metric: Option<String>,

    /// Percentage of the metric's range a node must reach to stay visible
    ///
    /// - 0 (default): every measured node is shown
    /// - 100: only the nodes at the top of the range
    pub quantile: f64,

    /// Worker indices whose measurements are considered; `None` means all
    pub workers: Option<Vec<usize>>,

    /// Group nodes under region nodes for their clusters
    ///
    /// Default: true
    pub hierarchy: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            metric: None,
            quantile: 0.0,
            workers: None,
            hierarchy: true,
        }
    }
}

impl ViewConfig {
    /// Like the default, with no cluster regions
    pub fn flat() -> Self {
        Self {
            hierarchy: false,
            ..Self::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.quantile) {
            return Err(ProfileError::Config(format!(
                "quantile must be in [0, 100], got {}",
                self.quantile
            )));
        }
        if let Some(metric) = &self.metric {
            if metric.is_empty() {
                return Err(ProfileError::Config("metric must not be empty".to_string()));
            }
        }
        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ViewConfig = toml::from_str(content)
            .map_err(|e| ProfileError::Config(format!("invalid view configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a view configuration file
    ///
    /// # Errors
    /// Returns error if the file can't be read, isn't valid TOML, has
    /// unknown keys, or fails [`validate`](Self::validate).
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.as_ref().display(), ?config, "Loaded view configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ViewConfig::default();
        assert!(config.metric.is_none());
        assert_eq!(config.quantile, 0.0);
        assert!(config.workers.is_none());
        assert!(config.hierarchy);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_flat_config() {
        let config = ViewConfig::flat();
        assert!(!config.hierarchy);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_quantile() {
        let mut config = ViewConfig::default();
        config.quantile = 100.5;
        assert!(config.validate().is_err());
        config.quantile = -0.1;
        assert!(config.validate().is_err());
        config.quantile = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_metric_rejected() {
        let config = ViewConfig {
            metric: Some(String::new()),
            ..ViewConfig::default()
        };
        assert!(matches!(config.validate(), Err(ProfileError::Config(_))));
    }

    #[test]
    fn test_parse_full_document() {
        let config = ViewConfig::from_toml_str(
            r#"
            metric = "invocations"
            quantile = 30.0
            workers = [0, 2]
            hierarchy = false
            "#,
        )
        .unwrap();
        assert_eq!(config.workers, Some(vec![0, 2]));
        assert!(!config.hierarchy);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(ViewConfig::from_toml_str("colour = \"red\"\n").is_err());
    }

    #[test]
    fn test_out_of_range_quantile_in_file() {
        assert!(ViewConfig::from_toml_str("quantile = 250.0\n").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "quantile = 12.5").unwrap();
        let config = ViewConfig::from_toml(file.path()).unwrap();
        assert_eq!(config.quantile, 12.5);
        assert!(config.hierarchy);
    }

    #[test]
    fn test_missing_file() {
        let err = ViewConfig::from_toml("/nonexistent/view.toml").unwrap_err();
        assert!(matches!(err, ProfileError::Io(_)));
    }
}
