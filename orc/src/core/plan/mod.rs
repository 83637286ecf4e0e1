//! Planners: pure functions from pre-fetched input to an ordered [`Plan`].
//!
//! Planners never look at the filesystem or a store. Existence, current paths
//! and the timestamp all arrive as input fields, so identical input always
//! yields byte-identical effects. That is what lets a dry run be diffed
//! against a real run.
//!
//! Every planner here flattens in the same order: file effects, then persist,
//! then git, then tmux. Within a group, effects keep the order the planner
//! pushed them in.

pub mod grove;
pub mod launch;
pub mod mission;
pub mod operation;

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::core::effect::{Effect, FileEffect, GitEffect, PersistEffect, TmuxEffect};
use crate::core::ids::grove_dir_name;

pub use grove::{CreateGroveInput, OpenGroveInput, RepoSource, plan_create_grove, plan_open_grove};
pub use launch::{LaunchGrove, LaunchInput, plan_launch};
pub use mission::{
    CreateMissionInput, plan_create_mission, plan_delete_mission, plan_set_pinned,
    plan_status_change,
};
pub use operation::{CreateOperationInput, plan_complete_operation, plan_create_operation};

/// Effects grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub file: Vec<FileEffect>,
    pub persist: Vec<PersistEffect>,
    pub git: Vec<GitEffect>,
    pub tmux: Vec<TmuxEffect>,
}

impl Plan {
    /// All effects in execution order: file, persist, git, tmux.
    pub fn effects(&self) -> Vec<Effect> {
        let mut out = Vec::with_capacity(self.len());
        out.extend(self.file.iter().cloned().map(Effect::File));
        out.extend(self.persist.iter().cloned().map(Effect::Persist));
        out.extend(self.git.iter().cloned().map(Effect::Git));
        out.extend(self.tmux.iter().cloned().map(Effect::Tmux));
        out
    }

    pub fn len(&self) -> usize {
        self.file.len() + self.persist.len() + self.git.len() + self.tmux.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bundle the plan as one effect: `None` when empty, else `Composite`.
    pub fn into_effect(self) -> Effect {
        if self.is_empty() {
            return Effect::None;
        }
        Effect::Composite {
            effects: self.effects(),
        }
    }
}

/// A plan that creates an entity, together with the id it assigns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Planned {
    pub id: String,
    pub plan: Plan,
}

/// Directory layout of one mission under the workspaces root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionLayout {
    pub mission_dir: PathBuf,
    pub groves_dir: PathBuf,
}

impl MissionLayout {
    pub fn new(workspaces_root: &Path, mission_id: &str) -> Self {
        let mission_dir = workspaces_root.join(mission_id);
        Self {
            groves_dir: mission_dir.join("groves"),
            mission_dir,
        }
    }

    /// `{groves_dir}/{mission_id}-{grove_name}`.
    pub fn grove_dir(&self, mission_id: &str, grove_name: &str) -> PathBuf {
        self.groves_dir.join(grove_dir_name(mission_id, grove_name))
    }
}

/// Directory holding a grove's own metadata.
pub fn grove_config_dir(grove_dir: &Path) -> PathBuf {
    grove_dir.join(".orc")
}

pub fn grove_config_path(grove_dir: &Path) -> PathBuf {
    grove_config_dir(grove_dir).join("config.json")
}

/// RFC 3339 with whole seconds and a `Z` suffix.
pub(crate) fn timestamp(now: DateTime<Utc>) -> Value {
    Value::String(now.to_rfc3339_opts(SecondsFormat::Secs, true))
}

pub(crate) fn path_value(path: &Path) -> Value {
    Value::String(path.to_string_lossy().into_owned())
}
