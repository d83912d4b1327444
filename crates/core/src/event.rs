//! Change notification data structures

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One change event reported by the orchestration platform
///
/// Field names on the wire follow the Docker events API so templates can
/// address them the same way (`{{ Type }}`, `{{ Actor.ID }}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Resource category (container, service, network, ...)
    #[serde(rename = "Type", default)]
    pub kind: String,

    /// What happened to the resource (create, destroy, update, ...)
    #[serde(rename = "Action", default)]
    pub action: String,

    /// The resource the event is about
    #[serde(rename = "Actor", default)]
    pub actor: Actor,

    /// "local" or "swarm"
    #[serde(default)]
    pub scope: String,

    /// Unix seconds
    #[serde(default)]
    pub time: i64,

    /// Unix nanoseconds
    #[serde(rename = "timeNano", default)]
    pub time_nano: i64,

    /// Legacy copy of the action, container events only
    #[serde(default)]
    pub status: String,

    /// Legacy copy of the actor ID, container events only
    #[serde(default)]
    pub id: String,

    /// Legacy image name, container events only
    #[serde(default)]
    pub from: String,
}

/// Resource that emitted a notification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Resource ID
    #[serde(rename = "ID", default)]
    pub id: String,

    /// Labels and other key/value details attached by the daemon
    #[serde(rename = "Attributes", default)]
    pub attributes: BTreeMap<String, String>,
}

impl Notification {
    /// Build a notification with just a category and action
    pub fn new(kind: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            action: action.into(),
            ..Self::default()
        }
    }

    /// Populate `status`, `id` and `from` the way the daemon does for
    /// container events; other kinds leave them empty
    pub fn fill_legacy_fields(&mut self) {
        if self.kind != "container" {
            return;
        }
        if self.status.is_empty() {
            self.status = self.action.clone();
        }
        if self.id.is_empty() {
            self.id = self.actor.id.clone();
        }
        if self.from.is_empty() {
            if let Some(image) = self.actor.attributes.get("image") {
                self.from = image.clone();
            }
        }
    }

    /// Short "<kind>-<action>" label used in log lines
    pub fn describe(&self) -> String {
        format!("{}-{}", self.kind, self.action)
    }

    /// True for the synthetic startup notification
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
