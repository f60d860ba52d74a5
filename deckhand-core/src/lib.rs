//! # Deckhand Core
//!
//! Core library for Deckhand - a command-line client for a
//! platform-as-a-service control plane.
//!
//! This crate provides:
//! - Configuration management
//! - HTTP request pipeline with a pluggable transport
//! - Decoded control plane entities
//! - Bordered text tables
//! - App name guessing from git remotes
//! - Command contract, registry and the built-in commands

pub mod client;
pub mod command;
pub mod commands;
pub mod config;
pub mod guess;
pub mod model;
pub mod table;

#[cfg(test)]
mod testing;

pub use client::{Body, Client, ClientError, HttpTransport, Method, Request, Response, Transport};
pub use command::{AppTarget, Command, CommandError, Context, Info, Io, Registry};
pub use config::{Config, ConfigError};
pub use guess::{AppGuesser, GitGuesser, GuessError};
pub use model::*;
pub use table::Table;
