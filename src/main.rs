use anyhow::{Context, Result};
use circuit_profiler::{
    cli::{Cli, OutputFormat},
    config::ViewConfig,
    display::DisplayGraph,
    json_output::JsonElements,
    profile::CircuitProfile,
    selection::CircuitSelector,
    text_output,
};
use clap::Parser;
use std::fs;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_profile(args: &Cli) -> Result<CircuitProfile> {
    let content = fs::read_to_string(&args.profile)
        .with_context(|| format!("Failed to read profile: {}", args.profile.display()))?;
    CircuitProfile::from_json_str(&content)
        .with_context(|| format!("Failed to load profile: {}", args.profile.display()))
}

fn load_config(args: &Cli) -> Result<ViewConfig> {
    let base = match &args.config {
        Some(path) => ViewConfig::from_toml(path)
            .with_context(|| format!("Failed to load view configuration: {}", path.display()))?,
        None => ViewConfig::default(),
    };
    let config = args.apply_to(base);
    config.validate().context("Invalid command-line options")?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let profile = load_profile(&args)?;

    if args.list_metrics {
        for metric in profile.metrics() {
            println!("{metric}");
        }
        return Ok(());
    }

    let config = load_config(&args)?;
    let selector = CircuitSelector::with_config(&profile, &config)?;
    let display = DisplayGraph::from_profile(&profile, &selector.selection())?;

    match args.format {
        OutputFormat::Json => {
            println!("{}", JsonElements::from_graph(&display).to_json(args.pretty)?);
        }
        OutputFormat::Text => {
            print!("{}", text_output::to_text(&display));
        }
    }

    Ok(())
}
