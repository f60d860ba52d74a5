//! Command contract and dispatch.
//!
//! Every command describes itself with [`Info`], declares its flags as clap
//! [`Arg`]s and runs against a [`Context`] holding its parsed arguments and
//! I/O streams. The [`Registry`] maps names to commands and is built once at
//! startup.

use crate::client::{Client, ClientError};
use crate::config::ConfigError;
use crate::guess::AppGuesser;
use crate::model::JsonMessage;
use clap::{Arg, ArgAction, ArgMatches};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;
use thiserror::Error;
use tracing::debug;

/// Id of the clap positional that collects plain arguments
const ARGS: &str = "args";

pub const APP_FLAG: &str = "app";
pub const ASSUME_YES_FLAG: &str = "assume-yes";

/// Shown when no app name was given and none could be guessed
pub const GUESS_FAILED: &str =
    "deckhand wasn't able to guess the name of the app.\n\nUse the --app flag to specify it.";

#[derive(Debug, Error)]
pub enum CommandError {
    /// Bad or missing arguments, reported before any request is made
    #[error("{0}")]
    Argument(String),

    #[error("\"{0}\" is not a deckhand command. See \"deckhand help\".")]
    UnknownCommand(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Static description of a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Info {
    pub name: &'static str,
    pub usage: &'static str,
    pub desc: &'static str,
    pub min_args: usize,
}

pub trait Command {
    fn info(&self) -> Info;

    /// Flags accepted on top of the positional arguments
    fn flags(&self) -> Vec<Arg> {
        Vec::new()
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError>;
}

/// Streams a command reads from and writes to
pub struct Io<'a> {
    pub stdin: &'a mut dyn BufRead,
    pub stdout: &'a mut dyn Write,
}

/// Everything a running command sees
pub struct Context<'a> {
    pub args: Vec<String>,
    pub matches: ArgMatches,
    /// Directory used to guess the app name
    pub cwd: PathBuf,
    pub stdin: &'a mut dyn BufRead,
    pub stdout: &'a mut dyn Write,
}

impl<'a> Context<'a> {
    pub fn new(args: Vec<String>, matches: ArgMatches, io: Io<'a>) -> Self {
        Self {
            args,
            matches,
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            stdin: io.stdin,
            stdout: io.stdout,
        }
    }

    /// Value of a string flag; empty values count as unset
    pub fn flag_str(&self, id: &str) -> Option<&str> {
        self.matches
            .try_get_one::<String>(id)
            .ok()
            .flatten()
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn flag_bool(&self, id: &str) -> bool {
        self.matches
            .try_get_one::<bool>(id)
            .ok()
            .flatten()
            .copied()
            .unwrap_or(false)
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }
}

/// clap definition for one command.
///
/// Negative numbers pass as positionals; any other value starting with `-`
/// needs a `--` in front of it.
pub fn command_line(command: &dyn Command) -> clap::Command {
    let info = command.info();
    clap::Command::new(info.name)
        .about(info.desc)
        .override_usage(info.usage)
        .disable_version_flag(true)
        .args(command.flags())
        .arg(
            Arg::new(ARGS)
                .action(ArgAction::Append)
                .num_args(1..)
                .allow_negative_numbers(true)
                .value_name("ARGS")
                .hide(true),
        )
}

/// Parse `argv` (without the command name) against the command's flags
pub fn parse_args(command: &dyn Command, argv: &[String]) -> Result<(Vec<String>, ArgMatches), clap::Error> {
    let name = command.info().name.to_string();
    let matches = command_line(command)
        .try_get_matches_from(std::iter::once(name).chain(argv.iter().cloned()))?;
    let args = matches
        .get_many::<String>(ARGS)
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    Ok((args, matches))
}

/// Parse, check the positional count and run a single command
pub fn execute(
    command: &dyn Command,
    argv: &[String],
    mut io: Io<'_>,
    client: &Client,
) -> Result<(), CommandError> {
    let info = command.info();
    let (args, matches) = match parse_args(command, argv) {
        Ok(parsed) => parsed,
        Err(err) if err.kind() == clap::error::ErrorKind::DisplayHelp => {
            write!(io.stdout, "{}", err.render())?;
            return Ok(());
        }
        Err(err) => return Err(CommandError::Argument(err.render().to_string())),
    };

    if args.len() < info.min_args {
        return Err(CommandError::Argument(format!(
            "Not enough arguments to call {}.\n\nUsage: {}",
            info.name, info.usage
        )));
    }

    debug!("Running {} with {} argument(s)", info.name, args.len());
    let mut ctx = Context::new(args, matches, io);
    command.run(&mut ctx, client)
}

/// Name → command mapping
#[derive(Default)]
pub struct Registry {
    commands: BTreeMap<&'static str, Box<dyn Command>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All built-in commands
    pub fn standard(guesser: Rc<dyn AppGuesser>, config_path: Option<PathBuf>) -> Self {
        let mut registry = Self::new();
        crate::commands::register_all(&mut registry, guesser, config_path);
        registry
    }

    pub fn register(&mut self, command: impl Command + 'static) {
        self.commands.insert(command.info().name, Box::new(command));
    }

    pub fn resolve(&self, name: &str) -> Result<&dyn Command, CommandError> {
        self.commands
            .get(name)
            .map(|command| command.as_ref())
            .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.keys().copied()
    }

    /// Overview of every registered command
    pub fn usage(&self, program: &str) -> String {
        let width = self.names().map(str::len).max().unwrap_or(0);
        let mut out = format!(
            "Usage: {} <command> [args]\n\nAvailable commands:\n",
            program
        );
        for command in self.commands.values() {
            let info = command.info();
            out.push_str(&format!("  {:<width$}  {}\n", info.name, info.desc, width = width));
        }
        out.push_str(&format!(
            "\nUse \"{} help <command>\" for more information about a command.\n",
            program
        ));
        out
    }

    /// Long help of one command
    pub fn help(&self, name: &str) -> Result<String, CommandError> {
        let command = self.resolve(name)?;
        let info = command.info();
        let mut cmd = command_line(command);
        let mut out = format!("{}\n\n", info.desc);
        out.push_str(&cmd.render_help().to_string());
        if info.min_args > 0 {
            out.push_str(&format!("\nMinimum # of arguments: {}\n", info.min_args));
        }
        Ok(out)
    }

    pub fn invoke(
        &self,
        name: &str,
        argv: &[String],
        io: Io<'_>,
        client: &Client,
    ) -> Result<(), CommandError> {
        let command = self.resolve(name)?;
        execute(command, argv, io, client)
    }
}

/// Resolves the app a command acts on
#[derive(Clone)]
pub struct AppTarget {
    guesser: Rc<dyn AppGuesser>,
}

impl AppTarget {
    pub fn new(guesser: Rc<dyn AppGuesser>) -> Self {
        Self { guesser }
    }

    /// `-a/--app` flag
    pub fn flag() -> Arg {
        Arg::new(APP_FLAG)
            .short('a')
            .long("app")
            .value_name("APP")
            .help("The name of the app.")
    }

    /// The `--app` flag, else a guess from the working directory
    pub fn resolve(&self, ctx: &Context<'_>) -> Result<String, CommandError> {
        match ctx.flag_str(APP_FLAG) {
            Some(name) => Ok(name.to_string()),
            None => self.guess(ctx),
        }
    }

    /// Like [`AppTarget::resolve`], but a first positional argument wins
    /// over guessing. Only for commands with no other positionals.
    pub fn resolve_with_positional(&self, ctx: &Context<'_>) -> Result<String, CommandError> {
        if let Some(name) = ctx.flag_str(APP_FLAG) {
            return Ok(name.to_string());
        }
        match ctx.arg(0).filter(|name| !name.is_empty()) {
            Some(name) => Ok(name.to_string()),
            None => self.guess(ctx),
        }
    }

    fn guess(&self, ctx: &Context<'_>) -> Result<String, CommandError> {
        match self.guesser.guess_name(&ctx.cwd) {
            Ok(name) if !name.is_empty() => {
                debug!("Guessed app name {}", name);
                Ok(name)
            }
            Ok(_) => Err(CommandError::Argument(GUESS_FAILED.to_string())),
            Err(err) => {
                debug!("Could not guess app name: {}", err);
                Err(CommandError::Argument(GUESS_FAILED.to_string()))
            }
        }
    }
}

/// `-y/--assume-yes` flag
pub fn assume_yes_flag() -> Arg {
    Arg::new(ASSUME_YES_FLAG)
        .short('y')
        .long("assume-yes")
        .action(ArgAction::SetTrue)
        .help("Don't ask for confirmation.")
}

/// Ask a yes/no question on stdout and read one answer from stdin.
///
/// Only `y` and `yes` confirm; EOF counts as no.
pub fn confirm(ctx: &mut Context<'_>, question: &str) -> Result<bool, CommandError> {
    write!(ctx.stdout, "{} (y/n) ", question)?;
    ctx.stdout.flush()?;

    let mut line = String::new();
    ctx.stdin.read_line(&mut line)?;
    let answer = line.split_whitespace().next().unwrap_or("").to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Like [`confirm`], skipped when `--assume-yes` is set. Prints `Abort.`
/// when the user declines.
pub fn confirm_unless_assumed(ctx: &mut Context<'_>, question: &str) -> Result<bool, CommandError> {
    if ctx.flag_bool(ASSUME_YES_FLAG) {
        return Ok(true);
    }
    if confirm(ctx, question)? {
        return Ok(true);
    }
    writeln!(ctx.stdout, "Abort.")?;
    Ok(false)
}

/// Copy a streamed progress response to `out`.
///
/// The body is a sequence of concatenated [`JsonMessage`] objects; the first
/// one carrying an error stops the stream.
pub fn write_json_stream(body: &[u8], out: &mut dyn Write) -> Result<(), CommandError> {
    let stream = serde_json::Deserializer::from_slice(body).into_iter::<JsonMessage>();
    for message in stream {
        let message = message.map_err(ClientError::from)?;
        if !message.error.is_empty() {
            return Err(ClientError::Remote(message.error).into());
        }
        out.write_all(message.message.as_bytes())?;
    }
    out.flush()?;
    Ok(())
}
