//! floodrisk-runner: score a mortgage portfolio for flood risk.
//!
//! Usage:
//!   floodrisk-runner --seed 12345 --map risk.html
//!   floodrisk-runner --config portfolio.json --strategy equity_based
//!   floodrisk-runner --gazetteer places.json --flood-zones ./data --interactive

use anyhow::Result;
use floodrisk_core::{
    config::{GeocoderConfig, PipelineConfig},
    flood_zones::FloodZoneLayer,
    loss::LossStrategy,
    map::MapDocument,
    pipeline::EnrichmentPipeline,
    portfolio::Portfolio,
    record_source::ConsolePrompt,
    summary::PortfolioSummary,
};
use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut config = match arg_value(&args, "--config") {
        Some(path) => PipelineConfig::load(Path::new(path))?,
        None => PipelineConfig::default(),
    };
    apply_overrides(&mut config, &args)?;
    let json_output = args.iter().any(|a| a == "--json");
    let events_path = arg_value(&args, "--events").map(PathBuf::from);

    let mut portfolio = config.portfolio()?;
    if config.prompt_for_record {
        let stdin = io::stdin();
        let mut prompt = ConsolePrompt::new(stdin.lock(), prompt_output(json_output));
        let added = portfolio.extend_from(&mut prompt, config.property_type)?;
        log::info!("console: {added} record(s) added");
    }

    let geocoder = config.geocoder.build()?;
    let mut pipeline = EnrichmentPipeline::from_config(&config, geocoder);

    if !json_output {
        println!("Mortgage flood risk - floodrisk-runner");
        println!("  seed:      {}", pipeline.seed());
        println!("  records:   {}", portfolio.len());
        println!("  strategy:  {}", pipeline.loss_strategy().as_str());
        println!();
    }

    let report = pipeline.enrich(&mut portfolio)?;

    if let Some(path) = &events_path {
        std::fs::write(path, report.events_jsonl()?)
            .map_err(|e| anyhow::anyhow!("Cannot write {}: {e}", path.display()))?;
    }

    let overlay = config.flood_zones.as_deref().and_then(FloodZoneLayer::load_overlay);
    if let Some(layer) = &overlay {
        log::info!(
            "flood zones: {} features loaded from {}",
            layer.len(),
            layer.source.display()
        );
        if config.map_output.is_none() && !json_output {
            println!("Flood zones: {} features ({})", layer.len(), layer.source.display());
        }
    }

    if let Some(map_path) = &config.map_output {
        MapDocument::build(&portfolio, overlay.as_ref())?.write_to(map_path)?;
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&portfolio)?);
    } else {
        print_assessment(&portfolio);
        println!();
        print!("{}", PortfolioSummary::from_portfolio(&portfolio));
        if report.loss_failures > 0 {
            println!("  loss failures:  {}", report.loss_failures);
        }
    }

    Ok(())
}

fn apply_overrides(config: &mut PipelineConfig, args: &[String]) -> Result<()> {
    if let Some(seed) = arg_value(args, "--seed") {
        config.seed = Some(
            seed.parse()
                .map_err(|_| anyhow::anyhow!("--seed expects an unsigned integer, got {seed:?}"))?,
        );
    }
    if let Some(strategy) = arg_value(args, "--strategy") {
        config.loss_strategy = strategy.parse::<LossStrategy>()?;
    }
    if let Some(path) = arg_value(args, "--gazetteer") {
        config.geocoder = GeocoderConfig::Gazetteer { path: path.into() };
    }
    if args.iter().any(|a| a == "--offline") {
        config.geocoder = GeocoderConfig::Disabled;
    }
    if let Some(path) = arg_value(args, "--flood-zones") {
        config.flood_zones = Some(path.into());
    }
    if let Some(path) = arg_value(args, "--map") {
        config.map_output = Some(path.into());
    }
    if args.iter().any(|a| a == "--interactive") {
        config.prompt_for_record = true;
    }
    Ok(())
}

/// Prompts go to stderr when stdout carries JSON.
fn prompt_output(json_output: bool) -> Box<dyn Write> {
    if json_output {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    }
}

fn print_assessment(portfolio: &Portfolio) {
    for record in portfolio.iter() {
        let label = record.loan_risk.map_or("n/a", |r| r.as_str());
        match record.loss_given_default {
            Some(lgd) => println!("Address: {}, Loan Risk: {label}, LGD: {lgd:.2}", record.address),
            None => println!("Address: {}, Loan Risk: {label}, LGD: n/a", record.address),
        }
    }
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
