//! Mission record planners: create, status change, pin, delete.
//!
//! These only touch persisted state, so their plans hold persist effects
//! alone.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{Plan, Planned, timestamp};
use crate::core::effect::PersistEffect;
use crate::core::ids::{IdKind, generate_id};
use crate::core::transition::{apply_status_transition, initial_status};
use crate::core::types::MissionStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMissionInput {
    /// Highest mission number currently on record.
    pub current_max: u32,
    pub title: String,
    pub description: Option<String>,
    pub now: DateTime<Utc>,
}

/// `None` when the mission id space is exhausted.
pub fn plan_create_mission(input: &CreateMissionInput) -> Option<Planned> {
    let id = generate_id(IdKind::Mission, input.current_max)?;
    let data = BTreeMap::from([
        ("id".to_string(), Value::String(id.clone())),
        ("title".to_string(), Value::String(input.title.clone())),
        (
            "description".to_string(),
            input
                .description
                .clone()
                .map_or(Value::Null, Value::String),
        ),
        (
            "status".to_string(),
            Value::String(initial_status().as_str().to_string()),
        ),
        ("pinned".to_string(), Value::Bool(false)),
        ("created_at".to_string(), timestamp(input.now)),
        ("completed_at".to_string(), Value::Null),
    ]);

    let mut plan = Plan::default();
    plan.persist.push(PersistEffect::create("missions", data));
    Some(Planned { id, plan })
}

/// Persist a status change with its derived `completed_at`.
///
/// `completed_at` is always written so leaving `complete` clears it.
pub fn plan_status_change(
    mission_id: &str,
    new_status: MissionStatus,
    now: DateTime<Utc>,
) -> Plan {
    let transition = apply_status_transition(new_status, now);
    let data = BTreeMap::from([
        (
            "status".to_string(),
            Value::String(transition.status.as_str().to_string()),
        ),
        (
            "completed_at".to_string(),
            transition.completed_at.map_or(Value::Null, timestamp),
        ),
    ]);

    let mut plan = Plan::default();
    plan.persist
        .push(PersistEffect::update_by_id("missions", mission_id, data));
    plan
}

pub fn plan_set_pinned(mission_id: &str, pinned: bool) -> Plan {
    let data = BTreeMap::from([("pinned".to_string(), Value::Bool(pinned))]);
    let mut plan = Plan::default();
    plan.persist
        .push(PersistEffect::update_by_id("missions", mission_id, data));
    plan
}

/// Delete a mission row and its grove rows. Forced deletes also remove the
/// shipments and workbenches first. Workspaces on disk are left alone.
pub fn plan_delete_mission(mission_id: &str, force: bool) -> Plan {
    let mut plan = Plan::default();
    if force {
        plan.persist
            .push(PersistEffect::delete_where("shipments", "mission_id", mission_id));
        plan.persist
            .push(PersistEffect::delete_where("workbenches", "mission_id", mission_id));
    }
    plan.persist
        .push(PersistEffect::delete_where("groves", "mission_id", mission_id));
    plan.persist
        .push(PersistEffect::delete_where("missions", "id", mission_id));
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::effect::PersistOp;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, 17, 5, 0).unwrap()
    }

    #[test]
    fn create_assigns_next_id_and_active_status() {
        let Planned { id, plan } = plan_create_mission(&CreateMissionInput {
            current_max: 6,
            title: "Ship auth".to_string(),
            description: None,
            now: now(),
        })
        .expect("id available");
        assert_eq!(id, "MISSION-007");
        assert_eq!(plan.len(), 1);
        let create = &plan.persist[0];
        assert_eq!(create.op, PersistOp::Create);
        assert_eq!(create.data["id"], "MISSION-007");
        assert_eq!(create.data["status"], "active");
        assert_eq!(create.data["pinned"], false);
        assert_eq!(create.data["created_at"], "2026-02-01T17:05:00Z");
        assert!(create.data["description"].is_null());
    }

    #[test]
    fn completing_writes_completed_at() {
        let plan = plan_status_change("MISSION-002", MissionStatus::Complete, now());
        let update = &plan.persist[0];
        assert_eq!(update.filters["id"], "MISSION-002");
        assert_eq!(update.data["status"], "complete");
        assert_eq!(update.data["completed_at"], "2026-02-01T17:05:00Z");
    }

    #[test]
    fn pausing_clears_completed_at() {
        let plan = plan_status_change("MISSION-002", MissionStatus::Paused, now());
        assert_eq!(plan.persist[0].data["status"], "paused");
        assert!(plan.persist[0].data["completed_at"].is_null());
    }

    #[test]
    fn pin_updates_only_the_flag() {
        let plan = plan_set_pinned("MISSION-002", true);
        assert_eq!(plan.persist[0].data.len(), 1);
        assert_eq!(plan.persist[0].data["pinned"], true);
    }

    #[test]
    fn forced_delete_removes_dependents_first() {
        let forced = plan_delete_mission("MISSION-003", true);
        let tables: Vec<&str> = forced
            .persist
            .iter()
            .map(|effect| effect.entity.as_str())
            .collect();
        assert_eq!(tables, vec!["shipments", "workbenches", "groves", "missions"]);

        let plain = plan_delete_mission("MISSION-003", false);
        assert_eq!(plain.persist.len(), 2);
        assert!(plain.persist.iter().all(|effect| effect.op == PersistOp::Delete));
    }
}
