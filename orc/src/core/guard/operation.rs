//! Operation guards.

use super::{Denial, GuardResult, StatusContext};
use crate::core::types::OPERATION_READY;

/// Only an operation whose status is exactly `ready` can be completed.
pub fn can_complete_operation(ctx: &StatusContext) -> GuardResult {
    if ctx.status == OPERATION_READY {
        return GuardResult::Allow;
    }
    GuardResult::Deny(Denial::WrongStatus {
        verb: "complete",
        noun: "operation",
        id: ctx.entity_id.clone(),
        status: ctx.status.clone(),
        required: OPERATION_READY,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(status: &str) -> StatusContext {
        StatusContext {
            entity_id: "OP-014".to_string(),
            status: status.to_string(),
        }
    }

    #[test]
    fn ready_operations_can_complete() {
        assert!(can_complete_operation(&ctx("ready")).is_allowed());
    }

    /// Near misses (case, whitespace) are not `ready`.
    #[test]
    fn anything_but_exact_ready_is_denied() {
        for status in ["draft", "complete", "Ready", " ready", ""] {
            assert!(!can_complete_operation(&ctx(status)).is_allowed(), "{status:?}");
        }
    }

    #[test]
    fn reason_embeds_current_status() {
        assert_eq!(
            can_complete_operation(&ctx("draft")).reason(),
            "cannot complete operation OP-014: status is 'draft', must be 'ready'"
        );
    }
}
