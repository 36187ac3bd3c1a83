//! The Range-RAPTOR workers and their state.

pub mod frequency;
pub mod heuristics;
pub mod mc;
pub mod pareto;
pub mod path_builder;
pub mod std_state;
pub mod std_worker;

pub use pareto::ParetoSet;
