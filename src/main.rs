use std::{error::Error, process::ExitCode};

use sunspot_analysis::{AnalysisConfig, AnalysisError, AnalysisReport, load_csv};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: sunspot-report <data.csv> [config.json] [--json]";

fn run(args: &[String]) -> Result<(), Box<dyn Error>> {
    let json = args.iter().any(|a| a == "--json");
    let mut positional = args.iter().filter(|a| !a.starts_with("--"));

    let Some(data) = positional.next() else {
        return Err(AnalysisError::InvalidConfig(USAGE.to_string()).into());
    };
    let config = match positional.next() {
        Some(path) => AnalysisConfig::from_json_file(path)?,
        None => AnalysisConfig::default(),
    };

    let series = load_csv(data, &config)?;
    let report = AnalysisReport::build(&series, &config);
    println!("{report}");

    if json {
        let panels = serde_json::to_string_pretty(&report.panels())?;
        println!("{panels}");
    }
    Ok(())
}

fn main() -> ExitCode {
    // RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
