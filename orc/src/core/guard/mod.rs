//! Guard engine: pure Allow/Deny verdicts for requested state changes.
//!
//! Guards are total: they never fail structurally, never block and never
//! touch I/O. A denial is a normal return value carrying a structured
//! [`Denial`]; its `Display` output is the final sentence shown to the user.
//! The shell turns a denial into an error only at its boundary.
//!
//! Each family (mission, grove, operation) takes one small context record
//! built fresh by the caller from freshly fetched state.

pub mod grove;
pub mod mission;
pub mod operation;

use thiserror::Error;

use crate::core::types::Actor;

/// Why a guard refused. Parameters stay structured; `Display` renders them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Denial {
    /// Lifecycle control reserved for ORC was requested by an IMP.
    #[error(
        "IMPs cannot {verb} {noun}s - only ORC can {verb} {noun}s (agent: {agent_id})"
    )]
    CoordinatorOnly {
        verb: &'static str,
        noun: &'static str,
        agent_id: String,
    },

    /// The entity is pinned and must be unpinned first.
    #[error("cannot {verb} pinned {noun} {id}. Unpin first: orc {noun} unpin {id}")]
    Pinned {
        verb: &'static str,
        noun: &'static str,
        id: String,
    },

    /// Dependents exist and the caller did not force the delete.
    #[error(
        "{noun} {id} has {shipments} shipment(s) and {workbenches} workbench(es). \
         Use --force to delete anyway"
    )]
    HasDependents {
        noun: &'static str,
        id: String,
        shipments: u32,
        workbenches: u32,
    },

    #[error("{noun} {id} not found")]
    NotFound { noun: &'static str, id: String },

    /// The entity is not in the one status the operation accepts.
    #[error("cannot {verb} {noun} {id}: status is '{status}', must be '{required}'")]
    WrongStatus {
        verb: &'static str,
        noun: &'static str,
        id: String,
        status: String,
        required: &'static str,
    },
}

/// Verdict of a guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardResult {
    Allow,
    Deny(Denial),
}

impl GuardResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// User-presentable reason; empty exactly when allowed.
    pub fn reason(&self) -> String {
        match self {
            Self::Allow => String::new(),
            Self::Deny(denial) => denial.to_string(),
        }
    }

    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Self::Allow => None,
            Self::Deny(denial) => Some(denial),
        }
    }

    /// Keep the first denial; otherwise defer to `next`.
    pub fn and(self, next: impl FnOnce() -> GuardResult) -> GuardResult {
        match self {
            Self::Allow => next(),
            denied => denied,
        }
    }

    pub fn into_result(self) -> Result<(), Denial> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(denial) => Err(denial),
        }
    }
}

/// Combine verdicts left to right; the first denial wins.
pub fn all(results: impl IntoIterator<Item = GuardResult>) -> GuardResult {
    results
        .into_iter()
        .find(|result| !result.is_allowed())
        .unwrap_or(GuardResult::Allow)
}

/// Facts for actor-gated guards (create/start/launch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardContext {
    pub actor: Actor,
    /// Entity the request targets; empty when creating a new top-level entity.
    pub entity_id: String,
}

/// Facts for pin-gated guards (complete/archive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateContext {
    pub entity_id: String,
    pub is_pinned: bool,
}

/// Facts for delete guards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteContext {
    pub entity_id: String,
    pub shipment_count: u32,
    pub workbench_count: u32,
    pub force: bool,
}

/// Facts for existence-gated guards (pin/unpin/open).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinContext {
    pub entity_id: String,
    pub exists: bool,
}

/// Facts for status-gated guards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusContext {
    pub entity_id: String,
    pub status: String,
}

pub(crate) fn coordinator_only(
    ctx: &GuardContext,
    verb: &'static str,
    noun: &'static str,
) -> GuardResult {
    if ctx.actor.is_coordinator() {
        return GuardResult::Allow;
    }
    GuardResult::Deny(Denial::CoordinatorOnly {
        verb,
        noun,
        agent_id: ctx.actor.id.clone(),
    })
}

pub(crate) fn not_pinned(
    ctx: &StateContext,
    verb: &'static str,
    noun: &'static str,
) -> GuardResult {
    if !ctx.is_pinned {
        return GuardResult::Allow;
    }
    GuardResult::Deny(Denial::Pinned {
        verb,
        noun,
        id: ctx.entity_id.clone(),
    })
}

pub(crate) fn exists(ctx: &PinContext, noun: &'static str) -> GuardResult {
    if ctx.exists {
        return GuardResult::Allow;
    }
    GuardResult::Deny(Denial::NotFound {
        noun,
        id: ctx.entity_id.clone(),
    })
}
