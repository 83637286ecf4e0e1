//! Mission orchestration core for ORC and its IMPs.
//!
//! This crate decides whether ORC (the coordinator) or an IMP (a subordinate
//! agent confined to a grove) may change mission, grove and operation state,
//! and turns approved intent into an ordered list of effects. The architecture
//! enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic guards, status transitions, planners and
//!   naming rules. No I/O, no logging, fully testable in isolation.
//! - **[`io`]**: Config, resolved context, the store and executor seams.
//!   Isolated to enable in-memory doubles in tests.
//!
//! The [`shell`] module coordinates the two: it gathers facts, asks a guard,
//! plans, and hands the plan to an executor.

pub mod core;
pub mod io;
pub mod logging;
pub mod shell;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
