//! `app-swap`: exchange the routes of two apps

use crate::client::{Client, ClientError, Request};
use crate::command::{confirm, Command, CommandError, Context, Info};
use tracing::debug;

/// Status the server uses to refuse swapping apps that differ
const PRECONDITION_FAILED: u16 = 412;

pub struct AppSwap;

fn swap_request(app1: &str, app2: &str, force: bool) -> Request {
    Request::put("/swap")
        .query("app1", app1)
        .query("app2", app2)
        .query("force", force.to_string())
}

impl Command for AppSwap {
    fn info(&self) -> Info {
        Info {
            name: "app-swap",
            usage: "app-swap <app1-name> <app2-name>",
            desc: "Swap routes between two apps.",
            min_args: 2,
        }
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let app1 = ctx.args[0].clone();
        let app2 = ctx.args[1].clone();

        match client.send(&swap_request(&app1, &app2, false)) {
            Ok(_) => {}
            Err(ClientError::Server { status, message }) if status == PRECONDITION_FAILED => {
                debug!("Swap of {} and {} refused: {}", app1, app2, message);
                writeln!(ctx.stdout, "WARNING: {}", message)?;
                if !confirm(ctx, "Swap anyway?")? {
                    writeln!(ctx.stdout, "Abort.")?;
                    return Ok(());
                }
                client.send(&swap_request(&app1, &app2, true))?;
            }
            Err(err) => return Err(err.into()),
        }

        writeln!(ctx.stdout, "Apps successfully swapped!")?;
        Ok(())
    }
}
