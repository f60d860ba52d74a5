//! `target` and `version`: the only commands that never reach the server

use crate::client::Client;
use crate::command::{Command, CommandError, Context, Info};
use crate::config::{Config, ConfigError};
use std::path::PathBuf;
use tracing::info;

pub struct Target {
    config_path: Option<PathBuf>,
}

impl Target {
    /// Without a path, the default config file is used
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self { config_path }
    }

    fn path(&self) -> Result<PathBuf, ConfigError> {
        self.config_path
            .clone()
            .or_else(Config::default_config_path)
            .ok_or_else(|| ConfigError::ValidationError("Could not determine config path".to_string()))
    }
}

impl Command for Target {
    fn info(&self) -> Info {
        Info {
            name: "target",
            usage: "target [target]",
            desc: "Retrieve current target (server address) or set a new one.\n\nThe target is the server to which all operations will be directed to.",
            min_args: 0,
        }
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let Some(url) = ctx.args.first().cloned() else {
            writeln!(ctx.stdout, "Current target is {}", client.target())?;
            return Ok(());
        };

        let path = self.path()?;
        // File contents only; env overrides are never persisted
        let mut config = if path.exists() {
            Config::load_from_file(&path)?
        } else {
            Config::default()
        };
        config.set_target(&url)?;
        config.save_to_file(&path)?;
        info!("Saved target to {}", path.display());

        writeln!(ctx.stdout, "New target is {}", config.target_url())?;
        Ok(())
    }
}

pub struct Version;

impl Command for Version {
    fn info(&self) -> Info {
        Info {
            name: "version",
            usage: "version",
            desc: "display the current version",
            min_args: 0,
        }
    }

    fn run(&self, ctx: &mut Context<'_>, _client: &Client) -> Result<(), CommandError> {
        writeln!(ctx.stdout, "deckhand version {}", env!("CARGO_PKG_VERSION"))?;
        Ok(())
    }
}
