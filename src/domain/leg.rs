//! Street legs: access, egress and transfer.
//!
//! These are the pre-computed walking (or other street-mode) connections the
//! transit search consumes. Access legs seed the search at transit stops,
//! egress legs connect stops to the destination, and transfer legs connect
//! pairs of nearby stops between rides.

use serde::{Deserialize, Serialize};

/// A street leg from the origin to a transit stop, or from a transit stop to
/// the destination.
///
/// The stop index is the engine-internal contiguous stop number. The cost is
/// the leg's contribution to the generalised cost used by the multi-criteria
/// search; single-criterion searches ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEgressLeg {
    pub stop: usize,
    pub duration_seconds: i32,
    pub cost: i32,
}

impl AccessEgressLeg {
    /// A leg with the given duration and zero generalised cost.
    pub fn new(stop: usize, duration_seconds: i32) -> Self {
        Self {
            stop,
            duration_seconds,
            cost: 0,
        }
    }

    /// A leg with an explicit generalised cost.
    pub fn with_cost(stop: usize, duration_seconds: i32, cost: i32) -> Self {
        Self {
            stop,
            duration_seconds,
            cost,
        }
    }
}

/// One endpoint of a walking connection between two transit stops.
///
/// Transfers are stored as adjacency per source stop, so a leg only carries
/// the far endpoint: for `transfers_from(s)` the `stop` field is the target,
/// for `transfers_to(s)` it is the source. Zero-length self-transfers are
/// implicit and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferLeg {
    pub stop: usize,
    pub duration_seconds: i32,
    pub cost: i32,
}

impl TransferLeg {
    pub fn new(stop: usize, duration_seconds: i32, cost: i32) -> Self {
        Self {
            stop,
            duration_seconds,
            cost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_leg_constructors() {
        let leg = AccessEgressLeg::new(4, 120);
        assert_eq!(leg.stop, 4);
        assert_eq!(leg.duration_seconds, 120);
        assert_eq!(leg.cost, 0);

        let leg = AccessEgressLeg::with_cost(4, 120, 480);
        assert_eq!(leg.cost, 480);
    }

    #[test]
    fn transfer_leg_holds_far_endpoint() {
        let leg = TransferLeg::new(7, 90, 360);
        assert_eq!(leg.stop, 7);
        assert_eq!(leg.duration_seconds, 90);
        assert_eq!(leg.cost, 360);
    }
}
