use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Arg, ArgMatches, Command};
use event_pipeline::{
    ConfigDocument, SpecifyEvents, SpecifyEventsConfig, TransformEvents, TransformEventsConfig,
    TransformRegistry,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .short('c')
        .required(true)
        .value_parser(clap::value_parser!(PathBuf))
        .help("Configuration file (.json, .yaml or .yml)")
}

fn cli() -> Command {
    Command::new("eventprep")
        .about("Event table reconciliation for fMRI model specification")
        .subcommand_required(true)
        .subcommand(
            Command::new("specify")
                .about("Build per-run condition bunches")
                .arg(config_arg())
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Write the bunches as JSON to this file instead of stdout"),
                ),
        )
        .subcommand(
            Command::new("transform")
                .about("Write transformed, resampled event files for a BIDS project")
                .arg(config_arg()),
        )
        .subcommand(Command::new("list-transforms").about("Show the built-in transforms"))
}

fn config_path(matches: &ArgMatches) -> anyhow::Result<&PathBuf> {
    matches
        .get_one::<PathBuf>("config")
        .context("--config is required")
}

fn specify(matches: &ArgMatches) -> anyhow::Result<()> {
    let path = config_path(matches)?;
    let config = SpecifyEventsConfig::from_path(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;

    let output = SpecifyEvents::new(config)?.run()?;
    tracing::debug!("str_info: {}", output.str_info);

    let json = serde_json::to_string_pretty(&output.subject_info)?;
    match matches.get_one::<PathBuf>("output") {
        Some(out) => {
            fs::write(out, json).with_context(|| format!("Failed to write {}", out.display()))?;
            tracing::info!("Wrote {} bunch(es) to {}", output.subject_info.len(), out.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn transform(matches: &ArgMatches) -> anyhow::Result<()> {
    let path = config_path(matches)?;
    let config = TransformEventsConfig::from_path(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;

    let report = TransformEvents::new(config)?.run()?;
    for file in &report.written {
        println!("{}", file.display());
    }
    for failure in &report.failures {
        tracing::error!("{}: {}", failure.run, failure.error);
    }
    if !report.is_complete() {
        bail!("{} run(s) failed", report.failures.len());
    }
    Ok(())
}

fn list_transforms() -> anyhow::Result<()> {
    let registry = TransformRegistry::with_builtins();
    for name in registry.transform_types() {
        let schema = registry.parameter_schema(name).unwrap_or_default();
        println!("{}\t{}", name, schema);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "event_cli=info,event_pipeline=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let matches = cli().get_matches();
    match matches.subcommand() {
        Some(("specify", sub)) => specify(sub),
        Some(("transform", sub)) => transform(sub),
        Some(("list-transforms", _)) => list_transforms(),
        _ => bail!("no command given"),
    }
}
