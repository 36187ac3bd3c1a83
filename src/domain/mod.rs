//! Domain types for the transit routing engine.
//!
//! This module contains the core value types shared by the request layer and
//! the search algorithm: instants in seconds since midnight, street legs
//! (access, egress and transfer) and reconstructed journey paths. Types that
//! enforce invariants do so at construction time, so code that receives them
//! can trust their validity.

mod leg;
mod path;
mod time;

pub use leg::{AccessEgressLeg, TransferLeg};
pub use path::{Path, PathError, PathLeg};
pub use time::{Time, UNREACHED, hm, hms, time_to_string};
