//! Resolved invocation context: who is acting, and where.
//!
//! Computed once per command from the process environment (or an injected
//! lookup in tests) and passed down explicitly. Nothing below the shell reads
//! the environment again.

use anyhow::{Result, bail};
use tracing::debug;

use crate::core::types::Actor;

pub const AGENT_ID_VAR: &str = "ORC_AGENT_ID";
pub const MISSION_ID_VAR: &str = "ORC_MISSION_ID";
pub const GROVE_ID_VAR: &str = "ORC_GROVE_ID";

/// Prefix every IMP agent id starts with.
const IMP_PREFIX: &str = "IMP-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContext {
    pub actor: Actor,
    /// Mission the agent works under, if known.
    pub mission_id: Option<String>,
    /// Grove an IMP is confined to, if known.
    pub grove_id: Option<String>,
}

impl ResolvedContext {
    /// ORC with no mission or grove scope.
    pub fn coordinator() -> Self {
        Self {
            actor: Actor::coordinator(),
            mission_id: None,
            grove_id: None,
        }
    }
}

/// Map an agent id to an actor: `ORC` is the coordinator, `IMP-…` a
/// subordinate. Anything else is rejected.
pub fn parse_actor(agent_id: &str) -> Result<Actor> {
    let agent_id = agent_id.trim();
    if agent_id == Actor::COORDINATOR_ID {
        return Ok(Actor::coordinator());
    }
    match agent_id.strip_prefix(IMP_PREFIX) {
        Some(rest) if !rest.is_empty() => Ok(Actor::subordinate(agent_id)),
        _ => bail!("unrecognized agent id '{agent_id}' (expected ORC or IMP-<grove>)"),
    }
}

/// Resolve context through `lookup`. An explicit agent id overrides the
/// `ORC_AGENT_ID` variable; with neither set the actor is ORC.
pub fn resolve_context_from(
    explicit_agent: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedContext> {
    let non_empty = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

    let agent_id = explicit_agent
        .map(str::to_string)
        .or_else(|| non_empty(AGENT_ID_VAR));
    let actor = match agent_id.as_deref() {
        Some(id) => parse_actor(id)?,
        None => Actor::coordinator(),
    };
    let resolved = ResolvedContext {
        actor,
        mission_id: non_empty(MISSION_ID_VAR),
        grove_id: non_empty(GROVE_ID_VAR),
    };
    debug!(
        agent = %resolved.actor.id,
        mission = ?resolved.mission_id,
        grove = ?resolved.grove_id,
        "context resolved"
    );
    Ok(resolved)
}

/// Resolve context from the process environment.
pub fn resolve_context(explicit_agent: Option<&str>) -> Result<ResolvedContext> {
    resolve_context_from(explicit_agent, |var| std::env::var(var).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ActorKind;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |var: &str| map.get(var).cloned()
    }

    #[test]
    fn unset_agent_is_coordinator() {
        let ctx = resolve_context_from(None, env(&[])).expect("resolve");
        assert_eq!(ctx, ResolvedContext::coordinator());
    }

    #[test]
    fn imp_from_environment_carries_scope() {
        let ctx = resolve_context_from(
            None,
            env(&[
                (AGENT_ID_VAR, "IMP-GROVE-003"),
                (MISSION_ID_VAR, "MISSION-001"),
                (GROVE_ID_VAR, "GROVE-003"),
            ]),
        )
        .expect("resolve");
        assert_eq!(ctx.actor.kind, ActorKind::Subordinate);
        assert_eq!(ctx.actor.id, "IMP-GROVE-003");
        assert_eq!(ctx.mission_id.as_deref(), Some("MISSION-001"));
        assert_eq!(ctx.grove_id.as_deref(), Some("GROVE-003"));
    }

    #[test]
    fn explicit_agent_overrides_environment() {
        let ctx = resolve_context_from(Some("ORC"), env(&[(AGENT_ID_VAR, "IMP-GROVE-003")]))
            .expect("resolve");
        assert!(ctx.actor.is_coordinator());
    }

    #[test]
    fn blank_variables_count_as_unset() {
        let ctx = resolve_context_from(None, env(&[(AGENT_ID_VAR, "  "), (GROVE_ID_VAR, "")]))
            .expect("resolve");
        assert!(ctx.actor.is_coordinator());
        assert_eq!(ctx.grove_id, None);
    }

    #[test]
    fn unknown_agent_ids_are_rejected() {
        for id in ["imp-grove-1", "IMP-", "BOT-7", "orc"] {
            let err = parse_actor(id).expect_err(id);
            assert!(err.to_string().contains("unrecognized agent id"), "{id}");
        }
    }
}
