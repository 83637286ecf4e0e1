//! Imperative edges of orc: config, resolved context, the store and the
//! executors that perform planned effects.

pub mod config;
pub mod context;
pub mod executor;
pub mod store;
