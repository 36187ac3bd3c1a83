//! The multi-criteria (pareto) Range-RAPTOR worker.

mod arrival;
mod state;
mod worker;

pub use arrival::{ArrivalKind, ArrivalRef, McArrival};
pub use state::{DestinationArrival, McWorkerState};
pub use worker::McRangeRaptorWorker;
