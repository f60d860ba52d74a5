//! App lifecycle commands: create, remove, list, info, team access,
//! restart/start/stop and team ownership.

use super::app_path;
use crate::client::{Client, Request};
use crate::command::{
    assume_yes_flag, confirm_unless_assumed, write_json_stream, AppTarget, Command, CommandError,
    Context, Info,
};
use crate::model::{App, AppCreated, NewApp, PlanRef, ServiceInstances};
use crate::table::Table;
use clap::Arg;
use tracing::debug;

const PLAN_FLAG: &str = "plan";
const TEAM_FLAG: &str = "team";

pub struct AppCreate;

impl Command for AppCreate {
    fn info(&self) -> Info {
        Info {
            name: "app-create",
            usage: "app-create <appname> <platform> [--plan/-p plan_name] [--team/-t team_owner]",
            desc: "create a new app.",
            min_args: 2,
        }
    }

    fn flags(&self) -> Vec<Arg> {
        vec![
            Arg::new(PLAN_FLAG)
                .short('p')
                .long("plan")
                .value_name("PLAN")
                .default_value("")
                .hide_default_value(true)
                .help("The plan used to create the app"),
            Arg::new(TEAM_FLAG)
                .short('t')
                .long("team")
                .value_name("TEAM")
                .default_value("")
                .hide_default_value(true)
                .help("Team owner app"),
        ]
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let name = ctx.args[0].clone();
        let platform = ctx.args[1].clone();

        let request = Request::post("/apps").json_body(&NewApp {
            name: &name,
            platform: &platform,
            team_owner: ctx.flag_str(TEAM_FLAG).unwrap_or(""),
            plan: PlanRef {
                name: ctx.flag_str(PLAN_FLAG).unwrap_or(""),
            },
        })?;
        let created: AppCreated = client.send_json(&request)?;

        writeln!(ctx.stdout, "App \"{}\" has been created!", name)?;
        writeln!(
            ctx.stdout,
            "Use app-info to check the status of the app and its units."
        )?;
        if !created.repository_url.is_empty() {
            writeln!(
                ctx.stdout,
                "Your repository for \"{}\" project is \"{}\"",
                name, created.repository_url
            )?;
        }
        Ok(())
    }
}

pub struct AppRemove {
    app: AppTarget,
}

impl AppRemove {
    pub fn new(app: AppTarget) -> Self {
        Self { app }
    }
}

impl Command for AppRemove {
    fn info(&self) -> Info {
        Info {
            name: "app-remove",
            usage: "app-remove [--app appname] [--assume-yes]",
            desc: "removes an app.\n\nIf you don't provide the app name, deckhand will try to guess it.",
            min_args: 0,
        }
    }

    fn flags(&self) -> Vec<Arg> {
        vec![AppTarget::flag(), assume_yes_flag()]
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let app = self.app.resolve(ctx).map_err(|_| {
            CommandError::Argument(
                "Please use the -a/--app flag to specify which app you want to remove."
                    .to_string(),
            )
        })?;

        let question = format!("Are you sure you want to remove app \"{}\"?", app);
        if !confirm_unless_assumed(ctx, &question)? {
            return Ok(());
        }

        client.send(&Request::delete(app_path(&app, "")))?;
        writeln!(ctx.stdout, "App \"{}\" successfully removed!", app)?;
        Ok(())
    }
}

pub struct AppList;

impl Command for AppList {
    fn info(&self) -> Info {
        Info {
            name: "app-list",
            usage: "app-list",
            desc: "list all your apps.",
            min_args: 0,
        }
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let response = client.send(&Request::get("/apps"))?;
        if response.is_empty() {
            return Ok(());
        }
        let apps: Vec<App> = response.json()?;

        let mut table =
            Table::with_headers(["Application", "Units State Summary", "Address", "Ready?"])
                .line_separated();
        for app in &apps {
            table.add_row([
                app.name.clone(),
                app.units_summary(),
                app.addresses().join("\n"),
                yes_no(app.ready).to_string(),
            ]);
        }
        table.sort();

        write!(ctx.stdout, "{}", table)?;
        Ok(())
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

pub struct AppInfo {
    app: AppTarget,
}

impl AppInfo {
    pub fn new(app: AppTarget) -> Self {
        Self { app }
    }
}

impl Command for AppInfo {
    fn info(&self) -> Info {
        Info {
            name: "app-info",
            usage: "app-info [appname] [--app appname]",
            desc: "show information about your app.\n\nIf you don't provide the app name, deckhand will try to guess it.",
            min_args: 0,
        }
    }

    fn flags(&self) -> Vec<Arg> {
        vec![AppTarget::flag()]
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let name = self.app.resolve_with_positional(ctx)?;
        let app: App = client.send_json(&Request::get(app_path(&name, "")))?;

        let services_request = Request::get("/services/instances").query("app", name.as_str());
        let services = match client.send_json::<Vec<ServiceInstances>>(&services_request) {
            Ok(services) => services,
            Err(err) => {
                debug!("Ignoring service instances of {}: {}", name, err);
                Vec::new()
            }
        };

        write!(ctx.stdout, "{}", render_app_info(&app, &services))?;
        Ok(())
    }
}

fn render_app_info(app: &App, services: &[ServiceInstances]) -> String {
    let mut out = format!(
        "Application: {}\nRepository: {}\nPlatform: {}\nTeams: {}\nAddress: {}\nOwner: {}\nTeam owner: {}\nDeploys: {}\n",
        app.name,
        app.repository,
        app.platform,
        app.teams.join(", "),
        app.addresses().join(", "),
        app.owner,
        app.team_owner,
        app.deploys,
    );

    let mut units = Table::with_headers(["Unit", "State"]);
    for unit in app.named_units() {
        units.add_row([unit.name.as_str(), unit.status.as_str()]);
    }
    if !units.is_empty() {
        out.push_str(&format!("Units: {}\n", units.rows()));
        out.push_str(&units.render());
    }

    let mut instances = Table::with_headers(["Service", "Instance"]);
    for service in services.iter().filter(|s| !s.instances.is_empty()) {
        instances.add_row([service.service.clone(), service.instances.join(", ")]);
    }
    if !instances.is_empty() {
        out.push_str(&format!("\nService instances: {}\n", instances.rows()));
        out.push_str(&instances.render());
    }

    if let Some(plan) = app.plan() {
        let mut table =
            Table::with_headers(["Name", "Memory", "Swap", "Cpu Share", "Router", "Default"]);
        table.add_row(plan.row());
        out.push_str("\nApp Plan:\n");
        out.push_str(&table.render());
    }

    out.push('\n');
    out
}

pub struct AppGrant {
    app: AppTarget,
}

impl AppGrant {
    pub fn new(app: AppTarget) -> Self {
        Self { app }
    }
}

impl Command for AppGrant {
    fn info(&self) -> Info {
        Info {
            name: "app-grant",
            usage: "app-grant <teamname> [--app appname]",
            desc: "grants access to an app to a team.\n\nIf you don't provide the app name, deckhand will try to guess it.",
            min_args: 1,
        }
    }

    fn flags(&self) -> Vec<Arg> {
        vec![AppTarget::flag()]
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let app = self.app.resolve(ctx)?;
        let team = ctx.args[0].clone();

        client.send(&Request::put(app_path(&app, &format!("/teams/{}", team))))?;
        writeln!(ctx.stdout, "Team \"{}\" was added to the \"{}\" app", team, app)?;
        Ok(())
    }
}

pub struct AppRevoke {
    app: AppTarget,
}

impl AppRevoke {
    pub fn new(app: AppTarget) -> Self {
        Self { app }
    }
}

impl Command for AppRevoke {
    fn info(&self) -> Info {
        Info {
            name: "app-revoke",
            usage: "app-revoke <teamname> [--app appname]",
            desc: "revokes access to an app from a team.\n\nIf you don't provide the app name, deckhand will try to guess it.",
            min_args: 1,
        }
    }

    fn flags(&self) -> Vec<Arg> {
        vec![AppTarget::flag()]
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let app = self.app.resolve(ctx)?;
        let team = ctx.args[0].clone();

        client.send(&Request::delete(app_path(&app, &format!("/teams/{}", team))))?;
        writeln!(ctx.stdout, "Team \"{}\" was removed from the \"{}\" app", team, app)?;
        Ok(())
    }
}

pub struct AppRestart {
    app: AppTarget,
}

impl AppRestart {
    pub fn new(app: AppTarget) -> Self {
        Self { app }
    }
}

impl Command for AppRestart {
    fn info(&self) -> Info {
        Info {
            name: "app-restart",
            usage: "app-restart [--app appname]",
            desc: "restarts an app.\n\nIf you don't provide the app name, deckhand will try to guess it.",
            min_args: 0,
        }
    }

    fn flags(&self) -> Vec<Arg> {
        vec![AppTarget::flag()]
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let app = self.app.resolve_with_positional(ctx)?;
        let response = client.send(&Request::post(app_path(&app, "/restart")))?;
        write_json_stream(&response.body, ctx.stdout)
    }
}

pub struct AppStart {
    app: AppTarget,
}

impl AppStart {
    pub fn new(app: AppTarget) -> Self {
        Self { app }
    }
}

impl Command for AppStart {
    fn info(&self) -> Info {
        Info {
            name: "app-start",
            usage: "app-start [--app appname]",
            desc: "starts an app.\n\nIf you don't provide the app name, deckhand will try to guess it.",
            min_args: 0,
        }
    }

    fn flags(&self) -> Vec<Arg> {
        vec![AppTarget::flag()]
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let app = self.app.resolve_with_positional(ctx)?;
        let response = client.send(&Request::post(app_path(&app, "/start")))?;
        ctx.stdout.write_all(&response.body)?;
        Ok(())
    }
}

pub struct AppStop {
    app: AppTarget,
}

impl AppStop {
    pub fn new(app: AppTarget) -> Self {
        Self { app }
    }
}

impl Command for AppStop {
    fn info(&self) -> Info {
        Info {
            name: "app-stop",
            usage: "app-stop [--app appname]",
            desc: "stops an app.\n\nIf you don't provide the app name, deckhand will try to guess it.",
            min_args: 0,
        }
    }

    fn flags(&self) -> Vec<Arg> {
        vec![AppTarget::flag()]
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let app = self.app.resolve_with_positional(ctx)?;
        let response = client.send(&Request::post(app_path(&app, "/stop")))?;
        ctx.stdout.write_all(&response.body)?;
        Ok(())
    }
}

pub struct SetTeamOwner {
    app: AppTarget,
}

impl SetTeamOwner {
    pub fn new(app: AppTarget) -> Self {
        Self { app }
    }
}

impl Command for SetTeamOwner {
    fn info(&self) -> Info {
        Info {
            name: "app-set-team-owner",
            usage: "app-set-team-owner <new-team-owner> [--app appname]",
            desc: "set app's owner team.",
            min_args: 1,
        }
    }

    fn flags(&self) -> Vec<Arg> {
        vec![AppTarget::flag()]
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let app = self.app.resolve(ctx)?;
        let request = Request::post(app_path(&app, "/team-owner")).raw_body(ctx.args[0].as_bytes());

        client.send(&request)?;
        writeln!(ctx.stdout, "app's owner team successfully changed.")?;
        Ok(())
    }
}
