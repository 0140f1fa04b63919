use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, anyhow, bail};
use clap::Parser;

use pdfqa::Settings;
use pdfqa::cli::commands::{ask, index, init, search, status};
use pdfqa::cli::{Cli, Commands};
use pdfqa::logging;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_settings(config: Option<&PathBuf>) -> anyhow::Result<Settings> {
    let settings = match config {
        Some(path) => {
            if !path.exists() {
                bail!("configuration file not found: {}", path.display());
            }
            Settings::load_from(path)
        }
        None => Settings::load(),
    };
    settings
        .map_err(|e| anyhow!("{e}"))
        .context("failed to load configuration")
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    // Init only writes defaults; it must work even with a broken config
    let command = match cli.command {
        Commands::Init { force } => {
            logging::init();
            return init::run_init(force);
        }
        command => command,
    };

    let mut settings = load_settings(cli.config.as_ref())?;
    if let Some(working_dir) = cli.working_dir {
        settings.working_dir = std::path::absolute(&working_dir)
            .with_context(|| format!("invalid working directory {}", working_dir.display()))?;
    }

    logging::init_with_config(&settings.logging);

    match command {
        Commands::Init { .. } => Ok(ExitCode::SUCCESS),
        Commands::Index {
            paths,
            chunk_size,
            chunk_overlap,
            no_progress,
        } => {
            if let Some(size) = chunk_size {
                settings.chunking.chunk_size = size;
            }
            if let Some(overlap) = chunk_overlap {
                settings.chunking.chunk_overlap = overlap;
            }
            validate(&settings)?;
            index::run(&paths, &settings, !no_progress)
        }
        Commands::Ask {
            questions,
            file,
            top_k,
            parallel,
            json,
        } => {
            validate(&settings)?;
            ask::run(
                ask::AskOptions {
                    questions,
                    file,
                    top_k,
                    parallel,
                    json,
                },
                &settings,
            )
        }
        Commands::Search { query, top_k, json } => search::run(&query, top_k, json, &settings),
        Commands::Status { json } => status::run(json, &settings),
        Commands::Config => init::run_config(&settings),
    }
}

fn validate(settings: &Settings) -> anyhow::Result<()> {
    settings
        .validate()
        .map_err(|e| anyhow!("invalid configuration: {e}"))
}
