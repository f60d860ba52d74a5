//! Environment variables of an app. The app is always the first argument.

use super::app_path;
use crate::client::{Client, Method, Request};
use crate::command::{Command, CommandError, Context, Info};

/// Send the variables after the app name as a space separated body and
/// return the server's answer untouched
fn request_env(method: Method, args: &[String], client: &Client) -> Result<Vec<u8>, CommandError> {
    let (app, vars) = args
        .split_first()
        .ok_or_else(|| CommandError::Argument("Missing app name.".to_string()))?;
    let request = Request::new(method, app_path(app, "/env")).raw_body(vars.join(" "));
    Ok(client.send(&request)?.body)
}

pub struct EnvGet;

impl Command for EnvGet {
    fn info(&self) -> Info {
        Info {
            name: "env-get",
            usage: "env-get <appname> [ENVIRONMENT_VARIABLE1] [ENVIRONMENT_VARIABLE2] ...",
            desc: "retrieve environment variables for an app.",
            min_args: 1,
        }
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let body = request_env(Method::Get, &ctx.args, client)?;
        ctx.stdout.write_all(&body)?;
        Ok(())
    }
}

pub struct EnvSet;

impl Command for EnvSet {
    fn info(&self) -> Info {
        Info {
            name: "env-set",
            usage: "env-set <appname> <NAME=value> [NAME=value] ...",
            desc: "set environment variables for an app.",
            min_args: 2,
        }
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let body = request_env(Method::Post, &ctx.args, client)?;
        ctx.stdout.write_all(&body)?;
        Ok(())
    }
}

pub struct EnvUnset;

impl Command for EnvUnset {
    fn info(&self) -> Info {
        Info {
            name: "env-unset",
            usage: "env-unset <appname> <ENVIRONMENT_VARIABLE1> [ENVIRONMENT_VARIABLE2]",
            desc: "unset environment variables for an app.",
            min_args: 2,
        }
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let body = request_env(Method::Delete, &ctx.args, client)?;
        ctx.stdout.write_all(&body)?;
        Ok(())
    }
}
