//! Shared deterministic types for orc core logic.
//!
//! These are the snapshots the shell fetches before asking a guard or a
//! planner. They double as the shape of persisted rows, so the `data` payloads
//! planners emit deserialize back into these records.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which side of the ORC/IMP split an actor is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorKind {
    /// ORC, the single coordinating actor.
    Coordinator,
    /// An IMP confined to one grove.
    Subordinate,
}

/// The acting agent, resolved once by the shell and passed explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub kind: ActorKind,
    /// Full agent identifier, e.g. `ORC` or `IMP-GROVE-003`.
    pub id: String,
}

impl Actor {
    /// Identifier ORC runs under.
    pub const COORDINATOR_ID: &'static str = "ORC";

    pub fn coordinator() -> Self {
        Self {
            kind: ActorKind::Coordinator,
            id: Self::COORDINATOR_ID.to_string(),
        }
    }

    pub fn subordinate(id: impl Into<String>) -> Self {
        Self {
            kind: ActorKind::Subordinate,
            id: id.into(),
        }
    }

    pub fn is_coordinator(&self) -> bool {
        self.kind == ActorKind::Coordinator
    }
}

/// Lifecycle of a mission.
///
/// `Active` and `Paused` convert freely. `Complete` and `Archived` are only
/// left again through an explicit transition after unpinning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionStatus {
    Active,
    Paused,
    Complete,
    Archived,
}

impl MissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Complete => "complete",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            "complete" => Ok(Self::Complete),
            "archived" => Ok(Self::Archived),
            other => Err(format!("unknown mission status '{other}'")),
        }
    }
}

/// Status an operation must hold before it can be completed.
pub const OPERATION_READY: &str = "ready";
/// Status written when an operation completes.
pub const OPERATION_COMPLETE: &str = "complete";

/// Persisted mission row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: MissionStatus,
    #[serde(default)]
    pub pinned: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Persisted grove row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroveRecord {
    pub id: String,
    pub mission_id: String,
    pub name: String,
    /// Workspace location currently on record (absent until materialized).
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub repos: Vec<String>,
}

/// Persisted operation row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub id: String,
    pub grove_id: String,
    pub title: String,
    /// Raw status string as stored (`ready`, `draft`, `complete`, ...).
    pub status: String,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Rows that hang off a mission and block a plain delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DependentCounts {
    pub shipments: u32,
    pub workbenches: u32,
}
