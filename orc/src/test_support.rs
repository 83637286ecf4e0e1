//! Test-only fixtures: deterministic actors, seeded stores and wired
//! [`Services`].

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use tempfile::TempDir;

use crate::core::types::{Actor, GroveRecord, MissionRecord, MissionStatus, OperationRecord};
use crate::io::config::OrcConfig;
use crate::io::executor::{DryRunExecutor, MemoryExecutor};
use crate::io::store::{GROVES, MISSIONS, MemoryStore, OPERATIONS, SHIPMENTS, WORKBENCHES};
use crate::shell::{FixedClock, Services};

/// The instant every fixture clock returns.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53)
        .single()
        .expect("valid fixture time")
}

/// An IMP confined to `GROVE-001`.
pub fn imp() -> Actor {
    Actor::subordinate("IMP-GROVE-001")
}

/// Config rooted at `/w` (workspaces) and `/src` (repos).
pub fn test_config() -> OrcConfig {
    config_rooted_at(Path::new("/w"), Path::new("/src"))
}

pub fn config_rooted_at(workspaces: &Path, repos: &Path) -> OrcConfig {
    let mut config = OrcConfig::default();
    config.paths.workspaces = workspaces.to_path_buf();
    config.paths.repos = repos.to_path_buf();
    config
}

/// Services over a fresh [`MemoryStore`], applying plans with a
/// [`MemoryExecutor`]. The returned store shares state with the services.
pub fn memory_services() -> (Services, MemoryStore) {
    memory_services_with(test_config())
}

pub fn memory_services_with(config: OrcConfig) -> (Services, MemoryStore) {
    let store = MemoryStore::new();
    let services = Services::new(
        config,
        Box::new(store.clone()),
        Box::new(MemoryExecutor::new(store.clone())),
        Box::new(FixedClock(fixed_now())),
    );
    (services, store)
}

/// Memory services whose workspaces root is a fresh temp dir, so launch
/// sees real workspace existence. Keep the `TempDir` alive for the test.
pub fn temp_services() -> (Services, MemoryStore, TempDir) {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = config_rooted_at(&temp.path().join("missions"), &temp.path().join("src"));
    let (services, store) = memory_services_with(config);
    (services, store, temp)
}

/// Services that only render effects. The returned executor shares the
/// rendered lines.
pub fn dry_run_services(store: MemoryStore) -> (Services, DryRunExecutor) {
    let executor = DryRunExecutor::new();
    let services = Services::new(
        test_config(),
        Box::new(store),
        Box::new(executor.clone()),
        Box::new(FixedClock(fixed_now())),
    );
    (services, executor)
}

pub fn mission(id: &str, pinned: bool) -> MissionRecord {
    MissionRecord {
        id: id.to_string(),
        title: format!("{id} title"),
        description: None,
        status: MissionStatus::Active,
        pinned,
        created_at: fixed_now(),
        completed_at: None,
    }
}

/// Insert an active mission.
pub fn seed_mission(store: &MemoryStore, id: &str, pinned: bool) {
    store
        .insert(MISSIONS, &mission(id, pinned))
        .expect("seed mission");
}

/// Insert a grove with no recorded path.
pub fn seed_grove(store: &MemoryStore, id: &str, mission_id: &str, name: &str) {
    let grove = GroveRecord {
        id: id.to_string(),
        mission_id: mission_id.to_string(),
        name: name.to_string(),
        path: None,
        repos: vec!["api".to_string()],
    };
    store.insert(GROVES, &grove).expect("seed grove");
}

pub fn seed_operation(store: &MemoryStore, id: &str, grove_id: &str, status: &str) {
    let operation = OperationRecord {
        id: id.to_string(),
        grove_id: grove_id.to_string(),
        title: format!("{id} title"),
        status: status.to_string(),
        completed_at: None,
    };
    store.insert(OPERATIONS, &operation).expect("seed operation");
}

/// Insert `shipments` shipment rows and `workbenches` workbench rows for a
/// mission.
pub fn seed_dependents(store: &MemoryStore, mission_id: &str, shipments: u32, workbenches: u32) {
    for n in 1..=shipments {
        store
            .insert(SHIPMENTS, &json!({"id": format!("SHIP-{n:03}"), "mission_id": mission_id}))
            .expect("seed shipment");
    }
    for n in 1..=workbenches {
        store
            .insert(
                WORKBENCHES,
                &json!({"id": format!("BENCH-{n:03}"), "mission_id": mission_id}),
            )
            .expect("seed workbench");
    }
}
