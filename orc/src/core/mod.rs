//! Deterministic, pure logic shared by the orc shell.
//!
//! Core modules must be free of I/O side effects. They operate on caller-built
//! snapshots and return values (verdicts, transitions, plans) suitable for
//! tests, dry runs and diffing.

pub mod effect;
pub mod guard;
pub mod ids;
pub mod plan;
pub mod transition;
pub mod types;
