//! Resource records returned by the control plane.
//!
//! These are intentionally shallow: the CLI renders them, it does not reason
//! about them. Open-ended platform metadata stays out until a command needs it.

use serde::{Deserialize, Serialize};

/// A hosted application (the unit tags and environments attach to).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub uuid: String,
    pub name: String,

    /// Platform-side hosting identifier (e.g. "devcloud:acme").
    pub hosting_id: String,
}

/// One environment of an application (dev/stage/prod, plus CD environments).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub uuid: String,

    /// Human label ("Production"), distinct from the short name ("prod").
    pub label: String,
    pub name: String,

    pub domains: Vec<String>,

    /// Deployed VCS branch or tag.
    pub vcs_path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcs_url: Option<String>,

    pub flags: EnvironmentFlags,
}

/// Mode flags the presentation layer decorates rows with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentFlags {
    #[serde(default)]
    pub livedev: bool,

    #[serde(default)]
    pub production_mode: bool,
}

/// A database attached to an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    pub name: String,
}

/// An application tag. Creating or deleting one is asynchronous on the
/// platform side and yields a notification handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub color: String,
}
