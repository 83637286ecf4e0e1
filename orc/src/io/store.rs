//! Snapshot store: the read side the shell gathers guard and planner facts
//! from.
//!
//! [`MemoryStore`] keeps every table as ordered JSON rows, the same shape
//! `persist` effects carry, so a [`crate::io::executor::MemoryExecutor`] can
//! apply plans to it and typed reads see the result.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result, anyhow, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::core::effect::{PersistEffect, PersistOp};
use crate::core::ids::{IdKind, max_number};
use crate::core::types::{DependentCounts, GroveRecord, MissionRecord, OperationRecord};

pub const MISSIONS: &str = "missions";
pub const GROVES: &str = "groves";
pub const OPERATIONS: &str = "operations";
pub const SHIPMENTS: &str = "shipments";
pub const WORKBENCHES: &str = "workbenches";

/// Table holding entities of `kind`.
pub fn table_for(kind: IdKind) -> &'static str {
    match kind {
        IdKind::Mission => MISSIONS,
        IdKind::Grove => GROVES,
        IdKind::Operation => OPERATIONS,
        IdKind::Shipment => SHIPMENTS,
        IdKind::Workbench => WORKBENCHES,
    }
}

/// Read access to persisted state.
pub trait MissionStore {
    fn mission(&self, id: &str) -> Result<Option<MissionRecord>>;
    fn grove(&self, id: &str) -> Result<Option<GroveRecord>>;
    /// Groves of a mission, in insertion order.
    fn groves_for_mission(&self, mission_id: &str) -> Result<Vec<GroveRecord>>;
    fn operation(&self, id: &str) -> Result<Option<OperationRecord>>;
    fn dependent_counts(&self, mission_id: &str) -> Result<DependentCounts>;
    /// Highest id number on record for `kind`, `0` when none.
    fn max_number(&self, kind: IdKind) -> Result<u32>;
}

type Row = Map<String, Value>;

/// In-process store. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<BTreeMap<String, Vec<Row>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, Vec<Row>>>> {
        self.tables
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }

    /// Append a serializable record to `entity`.
    pub fn insert<T: Serialize>(&self, entity: &str, record: &T) -> Result<()> {
        let row = match serde_json::to_value(record).context("serialize row")? {
            Value::Object(row) => row,
            other => bail!("{entity} row must be an object, got {other}"),
        };
        self.lock()?.entry(entity.to_string()).or_default().push(row);
        Ok(())
    }

    /// Raw rows of `entity`, in insertion order.
    pub fn rows(&self, entity: &str) -> Result<Vec<Row>> {
        Ok(self.lock()?.get(entity).cloned().unwrap_or_default())
    }

    /// Apply one persist effect. Returns the number of rows touched.
    ///
    /// An update that matches no row is an error; a delete that matches none
    /// is not.
    pub fn apply(&self, effect: &PersistEffect) -> Result<usize> {
        let mut tables = self.lock()?;
        let rows = tables.entry(effect.entity.clone()).or_default();
        match effect.op {
            PersistOp::Create => {
                rows.push(effect.data.clone().into_iter().collect());
                Ok(1)
            }
            PersistOp::Update => {
                let mut touched = 0;
                for row in rows.iter_mut().filter(|row| matches(row, &effect.filters)) {
                    row.extend(effect.data.clone());
                    touched += 1;
                }
                if touched == 0 {
                    bail!(
                        "no {} row matches {}",
                        effect.entity,
                        render_filters(&effect.filters)
                    );
                }
                Ok(touched)
            }
            PersistOp::Delete => {
                let before = rows.len();
                rows.retain(|row| !matches(row, &effect.filters));
                Ok(before - rows.len())
            }
        }
    }

    fn find<T: DeserializeOwned>(&self, entity: &str, field: &str, value: &str) -> Result<Vec<T>> {
        let tables = self.lock()?;
        let Some(rows) = tables.get(entity) else {
            return Ok(Vec::new());
        };
        rows.iter()
            .filter(|row| row.get(field).and_then(Value::as_str) == Some(value))
            .map(|row| {
                serde_json::from_value(Value::Object(row.clone()))
                    .with_context(|| format!("decode {entity} row where {field} = {value}"))
            })
            .collect()
    }

    fn find_by_id<T: DeserializeOwned>(&self, entity: &str, id: &str) -> Result<Option<T>> {
        Ok(self.find(entity, "id", id)?.into_iter().next())
    }

    fn count_where(&self, entity: &str, field: &str, value: &str) -> Result<u32> {
        let tables = self.lock()?;
        let count = tables.get(entity).map_or(0, |rows| {
            rows.iter()
                .filter(|row| row.get(field).and_then(Value::as_str) == Some(value))
                .count()
        });
        u32::try_from(count).with_context(|| format!("{entity} count overflow"))
    }
}

impl MissionStore for MemoryStore {
    fn mission(&self, id: &str) -> Result<Option<MissionRecord>> {
        self.find_by_id(MISSIONS, id)
    }

    fn grove(&self, id: &str) -> Result<Option<GroveRecord>> {
        self.find_by_id(GROVES, id)
    }

    fn groves_for_mission(&self, mission_id: &str) -> Result<Vec<GroveRecord>> {
        self.find(GROVES, "mission_id", mission_id)
    }

    fn operation(&self, id: &str) -> Result<Option<OperationRecord>> {
        self.find_by_id(OPERATIONS, id)
    }

    fn dependent_counts(&self, mission_id: &str) -> Result<DependentCounts> {
        Ok(DependentCounts {
            shipments: self.count_where(SHIPMENTS, "mission_id", mission_id)?,
            workbenches: self.count_where(WORKBENCHES, "mission_id", mission_id)?,
        })
    }

    fn max_number(&self, kind: IdKind) -> Result<u32> {
        let tables = self.lock()?;
        let Some(rows) = tables.get(table_for(kind)) else {
            return Ok(0);
        };
        Ok(max_number(
            kind,
            rows.iter()
                .filter_map(|row| row.get("id").and_then(Value::as_str)),
        ))
    }
}

fn matches(row: &Row, filters: &BTreeMap<String, Value>) -> bool {
    filters
        .iter()
        .all(|(field, expected)| row.get(field) == Some(expected))
}

fn render_filters(filters: &BTreeMap<String, Value>) -> String {
    serde_json::to_string(filters).unwrap_or_else(|_| format!("{filters:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::MissionStatus;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn mission(id: &str) -> MissionRecord {
        MissionRecord {
            id: id.to_string(),
            title: format!("{id} title"),
            description: None,
            status: MissionStatus::Active,
            pinned: false,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            completed_at: None,
        }
    }

    fn data(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn inserted_records_read_back_typed() {
        let store = MemoryStore::new();
        store.insert(MISSIONS, &mission("MISSION-002")).expect("insert");
        assert_eq!(
            store.mission("MISSION-002").expect("read"),
            Some(mission("MISSION-002"))
        );
        assert_eq!(store.mission("MISSION-009").expect("read"), None);
    }

    #[test]
    fn clones_share_tables() {
        let store = MemoryStore::new();
        let view = store.clone();
        store.insert(MISSIONS, &mission("MISSION-001")).expect("insert");
        assert!(view.mission("MISSION-001").expect("read").is_some());
    }

    #[test]
    fn max_number_ignores_malformed_ids() {
        let store = MemoryStore::new();
        for id in ["MISSION-004", "MISSION-x", "MISSION-012"] {
            store.insert(MISSIONS, &mission(id)).expect("insert");
        }
        assert_eq!(store.max_number(IdKind::Mission).expect("max"), 12);
        assert_eq!(store.max_number(IdKind::Grove).expect("max"), 0);
    }

    #[test]
    fn update_merges_into_matching_rows() {
        let store = MemoryStore::new();
        store.insert(MISSIONS, &mission("MISSION-001")).expect("insert");
        let touched = store
            .apply(&PersistEffect::update_by_id(
                MISSIONS,
                "MISSION-001",
                data(&[("pinned", json!(true))]),
            ))
            .expect("update");
        assert_eq!(touched, 1);
        let record = store.mission("MISSION-001").expect("read").expect("exists");
        assert!(record.pinned);
        assert_eq!(record.title, "MISSION-001 title");
    }

    #[test]
    fn update_without_match_fails() {
        let store = MemoryStore::new();
        let err = store
            .apply(&PersistEffect::update_by_id(MISSIONS, "MISSION-404", BTreeMap::new()))
            .expect_err("no row");
        assert!(err.to_string().contains("MISSION-404"));
    }

    #[test]
    fn delete_where_counts_dependents_away() {
        let store = MemoryStore::new();
        for (id, mission_id) in [("SHIP-001", "MISSION-001"), ("SHIP-002", "MISSION-002")] {
            store
                .insert(SHIPMENTS, &json!({"id": id, "mission_id": mission_id}))
                .expect("insert");
        }
        store
            .insert(WORKBENCHES, &json!({"id": "BENCH-001", "mission_id": "MISSION-001"}))
            .expect("insert");
        assert_eq!(
            store.dependent_counts("MISSION-001").expect("counts"),
            DependentCounts {
                shipments: 1,
                workbenches: 1
            }
        );

        let removed = store
            .apply(&PersistEffect::delete_where(SHIPMENTS, "mission_id", "MISSION-001"))
            .expect("delete");
        assert_eq!(removed, 1);
        assert_eq!(store.dependent_counts("MISSION-001").expect("counts").shipments, 0);
        assert_eq!(store.dependent_counts("MISSION-002").expect("counts").shipments, 1);
    }

    #[test]
    fn non_object_rows_are_rejected() {
        let store = MemoryStore::new();
        assert!(store.insert(MISSIONS, &json!(["not", "a", "row"])).is_err());
    }
}
