//! Entities exchanged with the control plane.
//!
//! Every field is optional on the wire: missing keys and `null`s decode to
//! the field's default. The server is not consistent about key casing, so
//! the casings it actually emits are accepted as aliases.

use serde::{Deserialize, Deserializer, Serialize};

/// Unit statuses that count as serving traffic
const AVAILABLE_STATUSES: [&str; 2] = ["started", "unreachable"];

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A running instance of an app
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Unit {
    #[serde(alias = "Name", deserialize_with = "nullable")]
    pub name: String,
    #[serde(alias = "Ip", deserialize_with = "nullable")]
    pub ip: String,
    #[serde(alias = "Status", deserialize_with = "nullable")]
    pub status: String,
}

impl Unit {
    pub fn available(&self) -> bool {
        AVAILABLE_STATUSES.contains(&self.status.as_str())
    }
}

/// Resource allocation profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Plan {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    /// Memory limit in bytes
    #[serde(deserialize_with = "nullable")]
    pub memory: i64,
    /// Swap limit in bytes
    #[serde(deserialize_with = "nullable")]
    pub swap: i64,
    #[serde(rename = "cpushare", deserialize_with = "nullable")]
    pub cpu_share: i64,
    #[serde(deserialize_with = "nullable")]
    pub router: String,
    #[serde(rename = "default", deserialize_with = "nullable")]
    pub is_default: bool,
}

impl Plan {
    /// Table row: Name, Memory, Swap, Cpu Share, Router, Default
    pub fn row(&self) -> [String; 6] {
        [
            self.name.clone(),
            format_megabytes(self.memory),
            format_megabytes(self.swap),
            self.cpu_share.to_string(),
            self.router.clone(),
            self.is_default.to_string(),
        ]
    }
}

fn format_megabytes(bytes: i64) -> String {
    format!("{} MB", bytes / 1024 / 1024)
}

/// An application as returned by `GET /apps` and `GET /apps/{name}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct App {
    #[serde(alias = "Name", deserialize_with = "nullable")]
    pub name: String,
    #[serde(alias = "Platform", deserialize_with = "nullable")]
    pub platform: String,
    #[serde(alias = "Repository", deserialize_with = "nullable")]
    pub repository: String,
    #[serde(alias = "Teams", deserialize_with = "nullable")]
    pub teams: Vec<String>,
    #[serde(alias = "Ip", deserialize_with = "nullable")]
    pub ip: String,
    #[serde(alias = "CName", alias = "Cname", deserialize_with = "nullable")]
    pub cname: Vec<String>,
    #[serde(alias = "Owner", deserialize_with = "nullable")]
    pub owner: String,
    #[serde(
        rename = "teamowner",
        alias = "teamOwner",
        alias = "TeamOwner",
        deserialize_with = "nullable"
    )]
    pub team_owner: String,
    #[serde(alias = "Deploys", deserialize_with = "nullable")]
    pub deploys: u64,
    #[serde(alias = "Units", deserialize_with = "nullable")]
    pub units: Vec<Unit>,
    #[serde(alias = "Plan", deserialize_with = "nullable")]
    pub plan: Option<Plan>,
    #[serde(alias = "Ready", deserialize_with = "nullable")]
    pub ready: bool,
}

impl App {
    /// CNAMEs first, then the platform-assigned address; blanks skipped
    pub fn addresses(&self) -> Vec<&str> {
        self.cname
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.ip.as_str()))
            .filter(|addr| !addr.is_empty())
            .collect()
    }

    /// Units with a name; unnamed entries are placeholders
    pub fn named_units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(|u| !u.name.is_empty())
    }

    /// `(available, total)` over named units
    pub fn unit_counts(&self) -> (usize, usize) {
        self.named_units().fold((0, 0), |(available, total), unit| {
            (available + usize::from(unit.available()), total + 1)
        })
    }

    pub fn units_summary(&self) -> String {
        let (available, total) = self.unit_counts();
        format!("{} of {} units in-service", available, total)
    }

    /// Plan if the server sent a named one
    pub fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref().filter(|p| !p.name.is_empty())
    }
}

/// Instances of one service, as listed by `GET /services/instances`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceInstances {
    #[serde(alias = "Service", deserialize_with = "nullable")]
    pub service: String,
    #[serde(alias = "Instances", deserialize_with = "nullable")]
    pub instances: Vec<String>,
}

/// One instance of a service and the apps bound to it
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceInstance {
    #[serde(alias = "Name", deserialize_with = "nullable")]
    pub name: String,
    #[serde(alias = "Apps", deserialize_with = "nullable")]
    pub apps: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Team {
    #[serde(alias = "Name", deserialize_with = "nullable")]
    pub name: String,
}

/// Response to `POST /apps`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppCreated {
    #[serde(deserialize_with = "nullable")]
    pub status: String,
    #[serde(deserialize_with = "nullable")]
    pub repository_url: String,
}

/// One element of a streamed progress response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonMessage {
    #[serde(rename = "Message", alias = "message", deserialize_with = "nullable")]
    pub message: String,
    #[serde(rename = "Error", alias = "error", deserialize_with = "nullable")]
    pub error: String,
}

/// Body of `POST /apps`
#[derive(Debug, Clone, Serialize)]
pub struct NewApp<'a> {
    pub name: &'a str,
    pub platform: &'a str,
    #[serde(rename = "teamOwner")]
    pub team_owner: &'a str,
    pub plan: PlanRef<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanRef<'a> {
    pub name: &'a str,
}
