//! Built-in commands

pub mod apps;
pub mod cname;
pub mod env;
pub mod services;
pub mod swap;
pub mod target;
pub mod teams;
pub mod units;

use crate::command::{AppTarget, Registry};
use crate::guess::AppGuesser;
use std::path::PathBuf;
use std::rc::Rc;

/// Register every built-in command
pub fn register_all(registry: &mut Registry, guesser: Rc<dyn AppGuesser>, config_path: Option<PathBuf>) {
    let app = AppTarget::new(guesser);

    registry.register(apps::AppCreate);
    registry.register(apps::AppRemove::new(app.clone()));
    registry.register(apps::AppList);
    registry.register(apps::AppInfo::new(app.clone()));
    registry.register(apps::AppGrant::new(app.clone()));
    registry.register(apps::AppRevoke::new(app.clone()));
    registry.register(apps::AppRestart::new(app.clone()));
    registry.register(apps::AppStart::new(app.clone()));
    registry.register(apps::AppStop::new(app.clone()));
    registry.register(apps::SetTeamOwner::new(app.clone()));

    registry.register(swap::AppSwap);

    registry.register(cname::CnameAdd::new(app.clone()));
    registry.register(cname::CnameRemove::new(app.clone()));

    registry.register(units::UnitAdd::new(app.clone()));
    registry.register(units::UnitRemove::new(app.clone()));

    registry.register(env::EnvGet);
    registry.register(env::EnvSet);
    registry.register(env::EnvUnset);

    registry.register(teams::TeamCreate);
    registry.register(teams::TeamRemove);
    registry.register(teams::TeamList);
    registry.register(teams::TeamUserAdd);
    registry.register(teams::TeamUserRemove);

    registry.register(services::ServiceList);
    registry.register(services::ServiceAdd);
    registry.register(services::ServiceRemove);
    registry.register(services::ServiceInfo);
    registry.register(services::ServiceStatus);
    registry.register(services::ServiceDoc);
    registry.register(services::Bind::new(app.clone()));
    registry.register(services::Unbind::new(app));

    registry.register(target::Target::new(config_path));
    registry.register(target::Version);
}

/// `/apps/{name}` plus an optional suffix
pub(crate) fn app_path(app: &str, suffix: &str) -> String {
    format!("/apps/{}{}", app, suffix)
}
