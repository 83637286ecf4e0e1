//! Mission guards.

use super::{
    DeleteContext, Denial, GuardContext, GuardResult, PinContext, StateContext, coordinator_only,
    exists, not_pinned,
};

const NOUN: &str = "mission";

pub fn can_create_mission(ctx: &GuardContext) -> GuardResult {
    coordinator_only(ctx, "create", NOUN)
}

pub fn can_start_mission(ctx: &GuardContext) -> GuardResult {
    coordinator_only(ctx, "start", NOUN)
}

pub fn can_pause_mission(ctx: &GuardContext) -> GuardResult {
    coordinator_only(ctx, "pause", NOUN)
}

pub fn can_launch_mission(ctx: &GuardContext) -> GuardResult {
    coordinator_only(ctx, "launch", NOUN)
}

/// Pinned missions cannot be completed; every other fact is irrelevant.
pub fn can_complete_mission(ctx: &StateContext) -> GuardResult {
    not_pinned(ctx, "complete", NOUN)
}

pub fn can_archive_mission(ctx: &StateContext) -> GuardResult {
    not_pinned(ctx, "archive", NOUN)
}

/// Allowed when forced, or when no shipments and no workbenches remain.
pub fn can_delete_mission(ctx: &DeleteContext) -> GuardResult {
    if ctx.force || (ctx.shipment_count == 0 && ctx.workbench_count == 0) {
        return GuardResult::Allow;
    }
    GuardResult::Deny(Denial::HasDependents {
        noun: NOUN,
        id: ctx.entity_id.clone(),
        shipments: ctx.shipment_count,
        workbenches: ctx.workbench_count,
    })
}

/// Pinning an already pinned mission is an allowed no-op.
pub fn can_pin_mission(ctx: &PinContext) -> GuardResult {
    exists(ctx, NOUN)
}

pub fn can_unpin_mission(ctx: &PinContext) -> GuardResult {
    exists(ctx, NOUN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Actor;

    fn imp() -> GuardContext {
        GuardContext {
            actor: Actor::subordinate("IMP-GROVE-007"),
            entity_id: "MISSION-001".to_string(),
        }
    }

    fn orc() -> GuardContext {
        GuardContext {
            actor: Actor::coordinator(),
            entity_id: "MISSION-001".to_string(),
        }
    }

    #[test]
    fn lifecycle_control_is_reserved_for_orc() {
        let guards: [fn(&GuardContext) -> GuardResult; 4] = [
            can_create_mission,
            can_start_mission,
            can_pause_mission,
            can_launch_mission,
        ];
        for guard in guards {
            assert_eq!(guard(&orc()), GuardResult::Allow);
            let denied = guard(&imp());
            assert!(!denied.is_allowed());
            assert!(denied.reason().contains("IMP-GROVE-007"));
        }
    }

    #[test]
    fn imp_create_reason_is_exact() {
        assert_eq!(
            can_create_mission(&imp()).reason(),
            "IMPs cannot create missions - only ORC can create missions (agent: IMP-GROVE-007)"
        );
        assert_eq!(
            can_launch_mission(&imp()).reason(),
            "IMPs cannot launch missions - only ORC can launch missions (agent: IMP-GROVE-007)"
        );
    }

    #[test]
    fn complete_and_archive_depend_only_on_pin() {
        for pinned in [false, true] {
            let ctx = StateContext {
                entity_id: "MISSION-003".to_string(),
                is_pinned: pinned,
            };
            assert_eq!(can_complete_mission(&ctx).is_allowed(), !pinned);
            assert_eq!(can_archive_mission(&ctx).is_allowed(), !pinned);
        }
    }

    /// The reason names the mission and the exact unpin command.
    #[test]
    fn pinned_reason_embeds_id_twice() {
        let ctx = StateContext {
            entity_id: "MISSION-003".to_string(),
            is_pinned: true,
        };
        let reason = can_complete_mission(&ctx).reason();
        assert_eq!(
            reason,
            "cannot complete pinned mission MISSION-003. Unpin first: orc mission unpin MISSION-003"
        );
        assert_eq!(reason.matches("MISSION-003").count(), 2);
        assert!(can_archive_mission(&ctx).reason().starts_with("cannot archive"));
    }

    #[test]
    fn delete_truth_table() {
        for shipments in [0, 1, 3] {
            for workbenches in [0, 2] {
                for force in [false, true] {
                    let ctx = DeleteContext {
                        entity_id: "MISSION-005".to_string(),
                        shipment_count: shipments,
                        workbench_count: workbenches,
                        force,
                    };
                    let expected = force || (shipments == 0 && workbenches == 0);
                    assert_eq!(
                        can_delete_mission(&ctx).is_allowed(),
                        expected,
                        "shipments={shipments} workbenches={workbenches} force={force}"
                    );
                }
            }
        }
    }

    /// Both counts are named even when one of them is zero.
    #[test]
    fn delete_reason_lists_both_counts() {
        let ctx = DeleteContext {
            entity_id: "MISSION-005".to_string(),
            shipment_count: 2,
            workbench_count: 0,
            force: false,
        };
        let result = can_delete_mission(&ctx);
        assert_eq!(
            result.denial(),
            Some(&Denial::HasDependents {
                noun: "mission",
                id: "MISSION-005".to_string(),
                shipments: 2,
                workbenches: 0,
            })
        );
        assert_eq!(
            result.reason(),
            "mission MISSION-005 has 2 shipment(s) and 0 workbench(es). \
             Use --force to delete anyway"
        );
    }

    #[test]
    fn pin_and_unpin_require_existence_only() {
        let present = PinContext {
            entity_id: "MISSION-009".to_string(),
            exists: true,
        };
        let missing = PinContext {
            exists: false,
            ..present.clone()
        };
        // Calling twice mirrors pinning an already pinned mission.
        assert!(can_pin_mission(&present).is_allowed());
        assert!(can_pin_mission(&present).is_allowed());
        assert!(can_unpin_mission(&present).is_allowed());
        assert!(can_unpin_mission(&present).is_allowed());
        assert_eq!(
            can_pin_mission(&missing).reason(),
            "mission MISSION-009 not found"
        );
        assert!(!can_unpin_mission(&missing).is_allowed());
    }
}
