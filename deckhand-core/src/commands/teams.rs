//! Team management

use crate::client::{Client, Request};
use crate::command::{assume_yes_flag, confirm_unless_assumed, Command, CommandError, Context, Info};
use crate::model::Team;
use clap::Arg;
use serde::Serialize;

#[derive(Serialize)]
struct NewTeam<'a> {
    name: &'a str,
}

pub struct TeamCreate;

impl Command for TeamCreate {
    fn info(&self) -> Info {
        Info {
            name: "team-create",
            usage: "team-create <teamname>",
            desc: "creates a new team.",
            min_args: 1,
        }
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let team = ctx.args[0].clone();
        client.send(&Request::post("/teams").json_body(&NewTeam { name: &team })?)?;
        writeln!(ctx.stdout, "Team \"{}\" successfully created!", team)?;
        Ok(())
    }
}

pub struct TeamRemove;

impl Command for TeamRemove {
    fn info(&self) -> Info {
        Info {
            name: "team-remove",
            usage: "team-remove <team-name> [--assume-yes]",
            desc: "removes a team.",
            min_args: 1,
        }
    }

    fn flags(&self) -> Vec<Arg> {
        vec![assume_yes_flag()]
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let team = ctx.args[0].clone();
        let question = format!("Are you sure you want to remove team \"{}\"?", team);
        if !confirm_unless_assumed(ctx, &question)? {
            return Ok(());
        }

        client.send(&Request::delete(format!("/teams/{}", team)))?;
        writeln!(ctx.stdout, "Team \"{}\" successfully removed!", team)?;
        Ok(())
    }
}

pub struct TeamList;

impl Command for TeamList {
    fn info(&self) -> Info {
        Info {
            name: "team-list",
            usage: "team-list",
            desc: "List all teams that you are member.",
            min_args: 0,
        }
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let response = client.send(&Request::get("/teams"))?;
        if response.is_empty() {
            return Ok(());
        }
        let teams: Vec<Team> = response.json()?;

        writeln!(ctx.stdout, "Teams:\n")?;
        for team in &teams {
            writeln!(ctx.stdout, "  - {}", team.name)?;
        }
        Ok(())
    }
}

pub struct TeamUserAdd;

impl Command for TeamUserAdd {
    fn info(&self) -> Info {
        Info {
            name: "team-user-add",
            usage: "team-user-add <teamname> <useremail>",
            desc: "adds a user to a team.",
            min_args: 2,
        }
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let (team, user) = (ctx.args[0].clone(), ctx.args[1].clone());
        client.send(&Request::put(format!("/teams/{}/{}", team, user)))?;
        writeln!(ctx.stdout, "User \"{}\" was added to the \"{}\" team", user, team)?;
        Ok(())
    }
}

pub struct TeamUserRemove;

impl Command for TeamUserRemove {
    fn info(&self) -> Info {
        Info {
            name: "team-user-remove",
            usage: "team-user-remove <teamname> <useremail>",
            desc: "removes a user from a team.",
            min_args: 2,
        }
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let (team, user) = (ctx.args[0].clone(), ctx.args[1].clone());
        client.send(&Request::delete(format!("/teams/{}/{}", team, user)))?;
        writeln!(ctx.stdout, "User \"{}\" was removed from the \"{}\" team", user, team)?;
        Ok(())
    }
}
