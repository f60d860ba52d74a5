//! Scaling units up and down

use super::app_path;
use crate::client::{Client, Request};
use crate::command::{write_json_stream, AppTarget, Command, CommandError, Context, Info};
use clap::Arg;

pub struct UnitAdd {
    app: AppTarget,
}

impl UnitAdd {
    pub fn new(app: AppTarget) -> Self {
        Self { app }
    }
}

impl Command for UnitAdd {
    fn info(&self) -> Info {
        Info {
            name: "unit-add",
            usage: "unit-add <# of units> [--app appname]",
            desc: "add new units to an app.\n\nIf you don't provide the app name, deckhand will try to guess it.",
            min_args: 1,
        }
    }

    fn flags(&self) -> Vec<Arg> {
        vec![AppTarget::flag()]
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let app = self.app.resolve(ctx)?;
        let request = Request::put(app_path(&app, "/units")).raw_body(ctx.args[0].as_bytes());

        let response = client.send(&request)?;
        write_json_stream(&response.body, ctx.stdout)
    }
}

pub struct UnitRemove {
    app: AppTarget,
}

impl UnitRemove {
    pub fn new(app: AppTarget) -> Self {
        Self { app }
    }
}

impl Command for UnitRemove {
    fn info(&self) -> Info {
        Info {
            name: "unit-remove",
            usage: "unit-remove <# of units> [--app appname]",
            desc: "remove units from an app.\n\nIf you don't provide the app name, deckhand will try to guess it.",
            min_args: 1,
        }
    }

    fn flags(&self) -> Vec<Arg> {
        vec![AppTarget::flag()]
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let app = self.app.resolve(ctx)?;
        let request = Request::delete(app_path(&app, "/units")).raw_body(ctx.args[0].as_bytes());

        client.send(&request)?;
        writeln!(ctx.stdout, "Units successfully removed!")?;
        Ok(())
    }
}
