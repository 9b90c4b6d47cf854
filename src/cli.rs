//! CLI argument parsing for circuit-profiler

use crate::config::ViewConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the reduced graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Element list for graph renderers (default)
    Json,
    /// Human-readable summary and listing
    Text,
}

#[derive(Parser, Debug)]
#[command(name = "circuit-profiler")]
#[command(version)]
#[command(about = "Reduce a dataflow circuit profile to a displayable graph", long_about = None)]
pub struct Cli {
    /// Profile dump (JSON with worker_profiles and graph)
    #[arg(value_name = "PROFILE")]
    pub profile: PathBuf,

    /// View configuration file (TOML); flags override its values
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Metric used for colouring and thresholding
    #[arg(short = 'm', long = "metric", value_name = "NAME")]
    pub metric: Option<String>,

    /// Hide nodes below this percentage of the metric's range (0-100)
    #[arg(short = 'q', long = "quantile", value_name = "P")]
    pub quantile: Option<f64>,

    /// Only consider these workers (e.g., --workers 0,2,3)
    #[arg(short = 'w', long = "workers", value_name = "LIST", value_delimiter = ',')]
    pub workers: Option<Vec<usize>>,

    /// Do not group nodes into cluster regions
    #[arg(long = "flat")]
    pub flat: bool,

    /// Output format (json or text)
    #[arg(long = "format", value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long = "pretty")]
    pub pretty: bool,

    /// Print the metrics found in the profile and exit
    #[arg(long = "list-metrics")]
    pub list_metrics: bool,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Overlay the command-line flags on a base configuration
    pub fn apply_to(&self, mut config: ViewConfig) -> ViewConfig {
        if let Some(metric) = &self.metric {
            config.metric = Some(metric.clone());
        }
        if let Some(quantile) = self.quantile {
            config.quantile = quantile;
        }
        if let Some(workers) = &self.workers {
            config.workers = Some(workers.clone());
        }
        if self.flat {
            config.hierarchy = false;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_requires_profile() {
        assert!(Cli::try_parse_from(["circuit-profiler"]).is_err());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["circuit-profiler", "profile.json"]);
        assert_eq!(cli.profile, PathBuf::from("profile.json"));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.metric.is_none());
        assert!(cli.quantile.is_none());
        assert!(!cli.flat);
        assert!(!cli.list_metrics);
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_workers_list() {
        let cli = Cli::parse_from(["circuit-profiler", "p.json", "--workers", "0,2,3"]);
        assert_eq!(cli.workers, Some(vec![0, 2, 3]));
    }

    #[test]
    fn test_cli_rejects_bad_worker() {
        assert!(Cli::try_parse_from(["circuit-profiler", "p.json", "--workers", "0,x"]).is_err());
    }

    #[test]
    fn test_cli_text_format() {
        let cli = Cli::parse_from(["circuit-profiler", "p.json", "--format", "text"]);
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "circuit-profiler",
            "p.json",
            "-m",
            "time",
            "-q",
            "40",
            "--flat",
        ]);
        let base = ViewConfig {
            metric: Some("invocations".to_string()),
            quantile: 10.0,
            workers: Some(vec![1]),
            hierarchy: true,
        };
        let config = cli.apply_to(base);
        assert_eq!(config.metric.as_deref(), Some("time"));
        assert_eq!(config.quantile, 40.0);
        // Not given on the command line: kept from the file
        assert_eq!(config.workers, Some(vec![1]));
        assert!(!config.hierarchy);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let cli = Cli::parse_from(["circuit-profiler", "p.json"]);
        assert_eq!(cli.apply_to(ViewConfig::flat()), ViewConfig::flat());
    }
}
