//! CNAME management

use super::app_path;
use crate::client::{Client, Request};
use crate::command::{
    assume_yes_flag, confirm_unless_assumed, AppTarget, Command, CommandError, Context, Info,
};
use clap::Arg;
use serde::Serialize;

#[derive(Serialize)]
struct CnameBody<'a> {
    cname: &'a [String],
}

pub struct CnameAdd {
    app: AppTarget,
}

impl CnameAdd {
    pub fn new(app: AppTarget) -> Self {
        Self { app }
    }
}

impl Command for CnameAdd {
    fn info(&self) -> Info {
        Info {
            name: "cname-add",
            usage: "cname-add <cname> [<cname> ...] [--app appname]",
            desc: "adds a cname for your app.\n\nIf you don't provide the app name, deckhand will try to guess it.",
            min_args: 1,
        }
    }

    fn flags(&self) -> Vec<Arg> {
        vec![AppTarget::flag()]
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let app = self.app.resolve(ctx)?;
        let request = Request::post(app_path(&app, "/cname")).json_body(&CnameBody {
            cname: &ctx.args,
        })?;

        client.send(&request)?;
        writeln!(ctx.stdout, "cname successfully defined.")?;
        Ok(())
    }
}

/// Removes the given CNAMEs, or all of them when none are named
pub struct CnameRemove {
    app: AppTarget,
}

impl CnameRemove {
    pub fn new(app: AppTarget) -> Self {
        Self { app }
    }
}

impl Command for CnameRemove {
    fn info(&self) -> Info {
        Info {
            name: "cname-remove",
            usage: "cname-remove [<cname> ...] [--app appname] [--assume-yes]",
            desc: "removes cnames of your app.\n\nWithout arguments every cname is removed. If you don't provide the app name, deckhand will try to guess it.",
            min_args: 0,
        }
    }

    fn flags(&self) -> Vec<Arg> {
        vec![AppTarget::flag(), assume_yes_flag()]
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let app = self.app.resolve(ctx)?;

        let question = if ctx.args.is_empty() {
            format!("Are you sure you want to remove all cnames from app \"{}\"?", app)
        } else {
            format!(
                "Are you sure you want to remove {} from app \"{}\"?",
                ctx.args.join(", "),
                app
            )
        };
        if !confirm_unless_assumed(ctx, &question)? {
            return Ok(());
        }

        let mut request = Request::delete(app_path(&app, "/cname"));
        if !ctx.args.is_empty() {
            request = request.json_body(&CnameBody { cname: &ctx.args })?;
        }

        client.send(&request)?;
        writeln!(ctx.stdout, "cname successfully undefined.")?;
        Ok(())
    }
}
