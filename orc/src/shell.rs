//! Imperative shell: the commands ORC and IMPs invoke.
//!
//! Every command follows the same steps: fetch facts from the store, build a
//! guard context, ask the guard, plan with the fetched snapshots, then hand
//! the plan to the executor. A denial surfaces as a [`Denial`] inside the
//! returned `anyhow::Error`, so callers can `downcast_ref::<Denial>()`.

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use crate::core::guard::grove::{can_create_grove, can_create_operation, can_open_grove};
use crate::core::guard::mission::{
    can_archive_mission, can_complete_mission, can_create_mission, can_delete_mission,
    can_launch_mission, can_pause_mission, can_pin_mission, can_start_mission, can_unpin_mission,
};
use crate::core::guard::operation::can_complete_operation;
use crate::core::guard::{
    DeleteContext, Denial, GuardContext, GuardResult, PinContext, StateContext, StatusContext,
};
use crate::core::ids::{IdKind, session_name};
use crate::core::plan::{
    CreateGroveInput, CreateMissionInput, CreateOperationInput, LaunchGrove, LaunchInput,
    MissionLayout, OpenGroveInput, Plan, Planned, RepoSource, plan_complete_operation,
    plan_create_grove, plan_create_mission, plan_create_operation, plan_delete_mission,
    plan_launch, plan_open_grove, plan_set_pinned, plan_status_change,
};
use crate::core::types::{Actor, GroveRecord, MissionRecord, MissionStatus, OperationRecord};
use crate::io::config::OrcConfig;
use crate::io::executor::{Executor, execute_plan};
use crate::io::store::MissionStore;

/// Source of "now" for timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Collaborators a command needs, built once per process.
pub struct Services {
    pub config: OrcConfig,
    pub store: Box<dyn MissionStore>,
    pub executor: Box<dyn Executor>,
    pub clock: Box<dyn Clock>,
}

impl Services {
    pub fn new(
        config: OrcConfig,
        store: Box<dyn MissionStore>,
        executor: Box<dyn Executor>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            config,
            store,
            executor,
            clock,
        }
    }

    fn run(&self, entity_id: String, plan: &Plan) -> Result<CommandOutcome> {
        let report = execute_plan(self.executor.as_ref(), plan)?;
        info!(entity = %entity_id, applied = report.applied(), "command applied");
        Ok(CommandOutcome {
            entity_id,
            applied: report.applied(),
        })
    }

    fn mission(&self, id: &str) -> Result<MissionRecord> {
        self.store
            .mission(id)?
            .ok_or_else(|| not_found("mission", id))
    }

    fn grove(&self, id: &str) -> Result<GroveRecord> {
        self.store.grove(id)?.ok_or_else(|| not_found("grove", id))
    }

    fn operation(&self, id: &str) -> Result<OperationRecord> {
        self.store
            .operation(id)?
            .ok_or_else(|| not_found("operation", id))
    }
}

/// What a successful command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Entity created or changed.
    pub entity_id: String,
    /// Leaf effects the executor applied.
    pub applied: usize,
}

fn not_found(noun: &'static str, id: &str) -> anyhow::Error {
    Denial::NotFound {
        noun,
        id: id.to_string(),
    }
    .into()
}

fn ids_exhausted(kind: IdKind) -> anyhow::Error {
    anyhow!("no {kind} ids left to assign")
}

fn check(result: GuardResult) -> Result<()> {
    if let GuardResult::Deny(denial) = result {
        warn!(%denial, "guard denied");
        return Err(denial.into());
    }
    Ok(())
}

fn actor_context(actor: &Actor, entity_id: &str) -> GuardContext {
    GuardContext {
        actor: actor.clone(),
        entity_id: entity_id.to_string(),
    }
}

#[instrument(skip_all, fields(agent = %actor.id))]
pub fn create_mission(
    services: &Services,
    actor: &Actor,
    title: &str,
    description: Option<&str>,
) -> Result<CommandOutcome> {
    check(can_create_mission(&actor_context(actor, "")))?;
    let Planned { id, plan } = plan_create_mission(&CreateMissionInput {
        current_max: services.store.max_number(IdKind::Mission)?,
        title: title.to_string(),
        description: description.map(str::to_string),
        now: services.clock.now(),
    })
    .ok_or_else(|| ids_exhausted(IdKind::Mission))?;
    services.run(id, &plan)
}

#[instrument(skip_all, fields(agent = %actor.id, mission = mission_id))]
pub fn start_mission(
    services: &Services,
    actor: &Actor,
    mission_id: &str,
) -> Result<CommandOutcome> {
    check(can_start_mission(&actor_context(actor, mission_id)))?;
    set_status(services, mission_id, MissionStatus::Active)
}

#[instrument(skip_all, fields(agent = %actor.id, mission = mission_id))]
pub fn pause_mission(
    services: &Services,
    actor: &Actor,
    mission_id: &str,
) -> Result<CommandOutcome> {
    check(can_pause_mission(&actor_context(actor, mission_id)))?;
    set_status(services, mission_id, MissionStatus::Paused)
}

#[instrument(skip_all, fields(agent = %actor.id, mission = mission_id))]
pub fn complete_mission(
    services: &Services,
    actor: &Actor,
    mission_id: &str,
) -> Result<CommandOutcome> {
    let mission = services.mission(mission_id)?;
    check(can_complete_mission(&StateContext {
        entity_id: mission.id,
        is_pinned: mission.pinned,
    }))?;
    set_status(services, mission_id, MissionStatus::Complete)
}

#[instrument(skip_all, fields(agent = %actor.id, mission = mission_id))]
pub fn archive_mission(
    services: &Services,
    actor: &Actor,
    mission_id: &str,
) -> Result<CommandOutcome> {
    let mission = services.mission(mission_id)?;
    check(can_archive_mission(&StateContext {
        entity_id: mission.id,
        is_pinned: mission.pinned,
    }))?;
    set_status(services, mission_id, MissionStatus::Archived)
}

fn set_status(
    services: &Services,
    mission_id: &str,
    status: MissionStatus,
) -> Result<CommandOutcome> {
    let mission = services.mission(mission_id)?;
    let plan = plan_status_change(&mission.id, status, services.clock.now());
    services.run(mission.id, &plan)
}

#[instrument(skip_all, fields(agent = %actor.id, mission = mission_id))]
pub fn pin_mission(
    services: &Services,
    actor: &Actor,
    mission_id: &str,
) -> Result<CommandOutcome> {
    set_pinned(services, mission_id, true)
}

#[instrument(skip_all, fields(agent = %actor.id, mission = mission_id))]
pub fn unpin_mission(
    services: &Services,
    actor: &Actor,
    mission_id: &str,
) -> Result<CommandOutcome> {
    set_pinned(services, mission_id, false)
}

fn set_pinned(services: &Services, mission_id: &str, pinned: bool) -> Result<CommandOutcome> {
    let ctx = PinContext {
        entity_id: mission_id.to_string(),
        exists: services.store.mission(mission_id)?.is_some(),
    };
    let verdict = if pinned {
        can_pin_mission(&ctx)
    } else {
        can_unpin_mission(&ctx)
    };
    check(verdict)?;
    services.run(mission_id.to_string(), &plan_set_pinned(mission_id, pinned))
}

/// Delete a mission's records. Without `force`, any shipment or workbench
/// blocks the delete.
#[instrument(skip_all, fields(agent = %actor.id, mission = mission_id, force))]
pub fn delete_mission(
    services: &Services,
    actor: &Actor,
    mission_id: &str,
    force: bool,
) -> Result<CommandOutcome> {
    let mission = services.mission(mission_id)?;
    let counts = services.store.dependent_counts(&mission.id)?;
    check(can_delete_mission(&DeleteContext {
        entity_id: mission.id.clone(),
        shipment_count: counts.shipments,
        workbench_count: counts.workbenches,
        force,
    }))?;
    services.run(mission.id.clone(), &plan_delete_mission(&mission.id, force))
}

/// Materialize the mission workspace, and optionally its tmux session.
#[instrument(skip_all, fields(agent = %actor.id, mission = mission_id, create_session))]
pub fn launch_mission(
    services: &Services,
    actor: &Actor,
    mission_id: &str,
    create_session: bool,
) -> Result<CommandOutcome> {
    check(can_launch_mission(&actor_context(actor, mission_id)))?;
    let mission = services.mission(mission_id)?;
    let workspaces_root = services.config.paths.workspaces.clone();
    let layout = MissionLayout::new(&workspaces_root, &mission.id);

    let groves = services
        .store
        .groves_for_mission(&mission.id)?
        .into_iter()
        .map(|grove| LaunchGrove {
            workspace_exists: layout.grove_dir(&mission.id, &grove.name).exists(),
            id: grove.id,
            name: grove.name,
            repos: grove.repos,
            current_path: grove.path,
        })
        .collect();

    let plan = plan_launch(&LaunchInput {
        mission_id: mission.id.clone(),
        workspaces_root,
        groves,
        create_session,
        session_prefix: services.config.tmux.session_prefix.clone(),
        now: services.clock.now(),
    });
    services.run(mission.id, &plan)
}

/// Create a grove with one worktree per named repo under the configured
/// repos root.
#[instrument(skip_all, fields(agent = %actor.id, mission = mission_id, grove = name))]
pub fn create_grove(
    services: &Services,
    actor: &Actor,
    mission_id: &str,
    name: &str,
    repos: &[String],
) -> Result<CommandOutcome> {
    check(can_create_grove(&actor_context(actor, mission_id)))?;
    let mission = services.mission(mission_id)?;
    let repos = repos
        .iter()
        .map(|repo| RepoSource {
            name: repo.clone(),
            path: services.config.paths.repos.join(repo),
        })
        .collect();

    let Planned { id, plan } = plan_create_grove(&CreateGroveInput {
        current_max: services.store.max_number(IdKind::Grove)?,
        mission_id: mission.id,
        name: name.to_string(),
        workspaces_root: services.config.paths.workspaces.clone(),
        repos,
        now: services.clock.now(),
    })
    .ok_or_else(|| ids_exhausted(IdKind::Grove))?;
    services.run(id, &plan)
}

/// Open a grove as a three-pane window in its mission's session.
#[instrument(skip_all, fields(agent = %actor.id, grove = grove_id))]
pub fn open_grove(services: &Services, actor: &Actor, grove_id: &str) -> Result<CommandOutcome> {
    let grove = services.store.grove(grove_id)?;
    check(can_open_grove(&PinContext {
        entity_id: grove_id.to_string(),
        exists: grove.is_some(),
    }))?;
    let grove = grove.ok_or_else(|| not_found("grove", grove_id))?;
    let grove_path: PathBuf = match grove.path {
        Some(path) => path,
        None => MissionLayout::new(&services.config.paths.workspaces, &grove.mission_id)
            .grove_dir(&grove.mission_id, &grove.name),
    };

    let tmux = &services.config.tmux;
    let plan = plan_open_grove(&OpenGroveInput {
        session: session_name(&tmux.session_prefix, &grove.mission_id),
        grove_name: grove.name,
        grove_path,
        editor_command: tmux.editor.clone(),
        bootstrap_command: tmux.bootstrap_command.clone(),
    });
    services.run(grove.id, &plan)
}

#[instrument(skip_all, fields(agent = %actor.id, grove = grove_id))]
pub fn create_operation(
    services: &Services,
    actor: &Actor,
    grove_id: &str,
    title: &str,
) -> Result<CommandOutcome> {
    check(can_create_operation(&actor_context(actor, grove_id)))?;
    let grove = services.grove(grove_id)?;
    let Planned { id, plan } = plan_create_operation(&CreateOperationInput {
        current_max: services.store.max_number(IdKind::Operation)?,
        grove_id: grove.id,
        title: title.to_string(),
    })
    .ok_or_else(|| ids_exhausted(IdKind::Operation))?;
    services.run(id, &plan)
}

#[instrument(skip_all, fields(agent = %actor.id, operation = operation_id))]
pub fn complete_operation(
    services: &Services,
    actor: &Actor,
    operation_id: &str,
) -> Result<CommandOutcome> {
    let operation = services.operation(operation_id)?;
    check(can_complete_operation(&StatusContext {
        entity_id: operation.id.clone(),
        status: operation.status,
    }))?;
    let plan = plan_complete_operation(&operation.id, services.clock.now());
    services.run(operation.id, &plan)
}
