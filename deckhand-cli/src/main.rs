//! Deckhand CLI - PaaS control plane client
//!
//! Parses the global flags, loads the configuration and hands the command
//! line over to the command registry.

use anyhow::Result;
use clap::{Parser, Subcommand};
use deckhand_core::{Client, Config, GitGuesser, Io, Registry};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Deckhand - manage apps, teams and services on a PaaS control plane
#[derive(Parser)]
#[command(name = "deckhand")]
#[command(author, version, about, long_about = None)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Path to config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Control plane URL (overrides config)
    #[arg(long, global = true, env = "DECKHAND_TARGET")]
    target: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "DECKHAND_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Invocation>,
}

#[derive(Subcommand)]
pub enum Invocation {
    /// Any registered command followed by its own flags and arguments
    #[command(external_subcommand)]
    Run(Vec<String>),
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) if path.exists() => {
            let mut config = Config::load_from_file(path)?;
            config.apply_env_overrides();
            config
        }
        Some(_) => {
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
        None => Config::load()?,
    };

    if let Some(target) = &cli.target {
        config.set_target(target)?;
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    init_logging(&config.logging.level);
    debug!("Using target {}", config.target_url());

    let guesser = Rc::new(GitGuesser::new(config.guess.remote.clone()));
    let registry = Registry::standard(guesser, cli.config.clone());

    let argv = match cli.command {
        Some(Invocation::Run(argv)) => argv,
        None => Vec::new(),
    };
    let Some((name, args)) = argv.split_first() else {
        print!("{}", registry.usage("deckhand"));
        return Ok(());
    };

    if name == "help" {
        match args.first() {
            Some(topic) => print!("{}", registry.help(topic)?),
            None => print!("{}", registry.usage("deckhand")),
        }
        return Ok(());
    }

    let client = Client::from_config(&config)?;

    let mut stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    registry.invoke(
        name,
        args,
        Io {
            stdin: &mut stdin,
            stdout: &mut stdout,
        },
        &client,
    )?;
    stdout.flush()?;

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
