//! Service instances and their bindings to apps

use crate::client::{Client, Request};
use crate::command::{
    assume_yes_flag, confirm_unless_assumed, AppTarget, Command, CommandError, Context, Info,
};
use crate::model::{ServiceInstance, ServiceInstances};
use crate::table::Table;
use clap::Arg;
use serde::Serialize;
use std::collections::BTreeMap;

pub struct ServiceList;

impl Command for ServiceList {
    fn info(&self) -> Info {
        Info {
            name: "service-list",
            usage: "service-list",
            desc: "Get all available services, and user's instances for this services",
            min_args: 0,
        }
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let response = client.send(&Request::get("/services/instances"))?;
        let services: Vec<ServiceInstances> = if response.is_empty() {
            Vec::new()
        } else {
            response.json()?
        };

        let mut table = Table::with_headers(["Services", "Instances"]);
        for service in &services {
            table.add_row([service.service.clone(), service.instances.join(", ")]);
        }
        table.sort();
        write!(ctx.stdout, "{}", table)?;
        Ok(())
    }
}

#[derive(Serialize)]
struct NewInstance<'a> {
    name: &'a str,
    service_name: &'a str,
}

pub struct ServiceAdd;

impl Command for ServiceAdd {
    fn info(&self) -> Info {
        Info {
            name: "service-add",
            usage: "service-add <servicename> <serviceinstancename>",
            desc: "Create a service instance to one or more apps make use of.",
            min_args: 2,
        }
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let request = Request::post("/services/instances").json_body(&NewInstance {
            name: &ctx.args[1],
            service_name: &ctx.args[0],
        })?;
        client.send(&request)?;
        writeln!(ctx.stdout, "Service successfully added.")?;
        Ok(())
    }
}

pub struct ServiceRemove;

impl Command for ServiceRemove {
    fn info(&self) -> Info {
        Info {
            name: "service-remove",
            usage: "service-remove <serviceinstancename> [--assume-yes]",
            desc: "Removes a service instance",
            min_args: 1,
        }
    }

    fn flags(&self) -> Vec<Arg> {
        vec![assume_yes_flag()]
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let instance = ctx.args[0].clone();
        let question = format!("Are you sure you want to remove service \"{}\"?", instance);
        if !confirm_unless_assumed(ctx, &question)? {
            return Ok(());
        }

        client.send(&Request::delete(format!("/services/instances/{}", instance)))?;
        writeln!(ctx.stdout, "Service \"{}\" successfully removed!", instance)?;
        Ok(())
    }
}

pub struct ServiceInfo;

impl Command for ServiceInfo {
    fn info(&self) -> Info {
        Info {
            name: "service-info",
            usage: "service-info <service>",
            desc: "List all instances of a service",
            min_args: 1,
        }
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let service = ctx.args[0].clone();
        let response = client.send(&Request::get(format!("/services/{}", service)))?;
        let instances: Vec<ServiceInstance> = if response.is_empty() {
            Vec::new()
        } else {
            response.json()?
        };

        writeln!(ctx.stdout, "Info for \"{}\"", service)?;
        if instances.is_empty() {
            return Ok(());
        }
        let mut table = Table::with_headers(["Instances", "Apps"]);
        for instance in &instances {
            table.add_row([instance.name.clone(), instance.apps.join(", ")]);
        }
        write!(ctx.stdout, "{}", table)?;
        Ok(())
    }
}

pub struct ServiceStatus;

impl Command for ServiceStatus {
    fn info(&self) -> Info {
        Info {
            name: "service-status",
            usage: "service-status <serviceinstancename>",
            desc: "Check status of a given service instance.",
            min_args: 1,
        }
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let path = format!("/services/instances/{}/status", ctx.args[0]);
        let response = client.send(&Request::get(path))?;
        ctx.stdout.write_all(&response.body)?;
        writeln!(ctx.stdout)?;
        Ok(())
    }
}

pub struct ServiceDoc;

impl Command for ServiceDoc {
    fn info(&self) -> Info {
        Info {
            name: "service-doc",
            usage: "service-doc <servicename>",
            desc: "Show documentation of a service",
            min_args: 1,
        }
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let path = format!("/services/{}/doc", ctx.args[0]);
        let response = client.send(&Request::get(path))?;
        ctx.stdout.write_all(&response.body)?;
        Ok(())
    }
}

pub struct Bind {
    app: AppTarget,
}

impl Bind {
    pub fn new(app: AppTarget) -> Self {
        Self { app }
    }
}

impl Command for Bind {
    fn info(&self) -> Info {
        Info {
            name: "bind",
            usage: "bind <instancename> [--app appname]",
            desc: "bind a service instance to an app\n\nIf you don't provide the app name, deckhand will try to guess it.",
            min_args: 1,
        }
    }

    fn flags(&self) -> Vec<Arg> {
        vec![AppTarget::flag()]
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let app = self.app.resolve(ctx)?;
        let instance = ctx.args[0].clone();
        let response = client.send(&Request::put(format!("/services/instances/{}/{}", instance, app)))?;

        let variables: BTreeMap<String, serde_json::Value> = if response.is_empty() {
            BTreeMap::new()
        } else {
            response.json()?
        };

        write!(ctx.stdout, "{}", bind_message(&instance, &app, variables.keys()))?;
        Ok(())
    }
}

/// Confirmation listing the variables the binding exported, in key order
fn bind_message<'a>(instance: &str, app: &str, variables: impl Iterator<Item = &'a String>) -> String {
    let mut out = format!("Instance \"{}\" is now bound to the app \"{}\".\n", instance, app);
    let names: Vec<&String> = variables.collect();
    if names.is_empty() {
        return out;
    }

    out.push_str("\nThe following environment variables are now available for use in your app:\n\n");
    for name in names {
        out.push_str(&format!("- {}\n", name));
    }
    out.push_str(
        "\nFor more details, please check the documentation for the service, using service-doc command.\n",
    );
    out
}

pub struct Unbind {
    app: AppTarget,
}

impl Unbind {
    pub fn new(app: AppTarget) -> Self {
        Self { app }
    }
}

impl Command for Unbind {
    fn info(&self) -> Info {
        Info {
            name: "unbind",
            usage: "unbind <instancename> [--app appname]",
            desc: "unbind a service instance from an app\n\nIf you don't provide the app name, deckhand will try to guess it.",
            min_args: 1,
        }
    }

    fn flags(&self) -> Vec<Arg> {
        vec![AppTarget::flag()]
    }

    fn run(&self, ctx: &mut Context<'_>, client: &Client) -> Result<(), CommandError> {
        let app = self.app.resolve(ctx)?;
        let instance = ctx.args[0].clone();

        client.send(&Request::delete(format!("/services/instances/{}/{}", instance, app)))?;
        writeln!(
            ctx.stdout,
            "Instance \"{}\" is not bound to the app \"{}\" anymore.",
            instance, app
        )?;
        Ok(())
    }
}
