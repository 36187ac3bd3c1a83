//! Range-RAPTOR public transit routing engine.
//!
//! Computes the journeys reachable from a set of access points to a set of
//! egress points within a departure-time window, by running a round-based
//! RAPTOR search repeatedly across departure minutes and reusing arrival
//! times between iterations.

pub mod api;
pub mod domain;
pub mod raptor;
pub mod service;
pub mod transit;
pub mod util;
