//! Grove guards, including the grove-scoped operation-creation guard.

use super::{GuardContext, GuardResult, PinContext, coordinator_only, exists};

/// `ctx.entity_id` is the mission the grove will belong to.
pub fn can_create_grove(ctx: &GuardContext) -> GuardResult {
    coordinator_only(ctx, "create", "grove")
}

pub fn can_open_grove(ctx: &PinContext) -> GuardResult {
    exists(ctx, "grove")
}

/// `ctx.entity_id` is the grove the operation is filed under.
pub fn can_create_operation(ctx: &GuardContext) -> GuardResult {
    coordinator_only(ctx, "create", "operation")
}
