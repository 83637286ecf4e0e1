//! Operation planners.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{Plan, Planned, timestamp};
use crate::core::effect::PersistEffect;
use crate::core::ids::{IdKind, generate_id};
use crate::core::types::{OPERATION_COMPLETE, OPERATION_READY};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOperationInput {
    /// Highest operation number currently on record.
    pub current_max: u32,
    pub grove_id: String,
    pub title: String,
}

/// New operations are filed `ready`. `None` when the operation id space is
/// exhausted.
pub fn plan_create_operation(input: &CreateOperationInput) -> Option<Planned> {
    let id = generate_id(IdKind::Operation, input.current_max)?;
    let data = BTreeMap::from([
        ("id".to_string(), Value::String(id.clone())),
        ("grove_id".to_string(), Value::String(input.grove_id.clone())),
        ("title".to_string(), Value::String(input.title.clone())),
        ("status".to_string(), Value::from(OPERATION_READY)),
        ("completed_at".to_string(), Value::Null),
    ]);
    let mut plan = Plan::default();
    plan.persist.push(PersistEffect::create("operations", data));
    Some(Planned { id, plan })
}

pub fn plan_complete_operation(operation_id: &str, now: DateTime<Utc>) -> Plan {
    let data = BTreeMap::from([
        ("status".to_string(), Value::from(OPERATION_COMPLETE)),
        ("completed_at".to_string(), timestamp(now)),
    ]);
    let mut plan = Plan::default();
    plan.persist
        .push(PersistEffect::update_by_id("operations", operation_id, data));
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn create_files_ready_operation_under_grove() {
        let Planned { id, plan } = plan_create_operation(&CreateOperationInput {
            current_max: 0,
            grove_id: "GROVE-003".to_string(),
            title: "Wire login form".to_string(),
        })
        .expect("id available");
        assert_eq!(id, "OP-001");
        let data = &plan.persist[0].data;
        assert_eq!(data["grove_id"], "GROVE-003");
        assert_eq!(data["status"], "ready");
    }

    #[test]
    fn complete_stamps_status_and_time() {
        let now = Utc.with_ymd_and_hms(2026, 4, 9, 10, 0, 0).unwrap();
        let plan = plan_complete_operation("OP-001", now);
        let update = &plan.persist[0];
        assert_eq!(update.filters["id"], "OP-001");
        assert_eq!(update.data["status"], "complete");
        assert_eq!(update.data["completed_at"], "2026-04-09T10:00:00Z");
    }
}
