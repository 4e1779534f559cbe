//! Filter module - user constraints and the predicate engine

mod engine;
mod spec;

pub use engine::apply;
pub use spec::{FilterSpec, TriState};
