//! Reconstructed journey paths.
//!
//! A `Path` is the result of walking the search's back-links from a
//! destination arrival: an access leg, alternating transit and transfer
//! legs, and an egress leg. Paths are freshly allocated by the search and
//! hold no references into worker state.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::time::{Time, time_to_string};

/// Path construction failures.
///
/// These indicate a bug in path reconstruction rather than bad user input;
/// validating at construction keeps that bug from propagating silently.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Path does not start with an access leg and end with an egress leg
    #[error("path must start with an access leg and end with an egress leg")]
    MalformedEnds,

    /// Path contains no transit leg
    #[error("path must contain at least one transit leg")]
    NoTransit,

    /// A leg ends before it starts
    #[error("leg {0} ends before it starts")]
    NegativeLegDuration(usize),

    /// A leg starts before the previous leg has ended
    #[error("leg {0} starts before the previous leg ends")]
    TimeTravel(usize),

    /// Adjacent legs do not meet at the same stop
    #[error("legs {0} and {1} do not meet at the same stop")]
    DisconnectedLegs(usize, usize),

    /// A transfer leg is not followed by a transit leg
    #[error("transfer leg {0} must be followed by a transit leg")]
    DanglingTransfer(usize),
}

/// One leg of a journey.
///
/// `from_time`/`to_time` are clock times; for transit legs they are the
/// board (departure) and alight (arrival) times, so waiting at a stop shows
/// up as a gap between one leg's end and the next leg's start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathLeg {
    Access {
        to_stop: usize,
        from_time: Time,
        to_time: Time,
    },
    Transit {
        pattern: usize,
        trip: usize,
        from_stop: usize,
        to_stop: usize,
        from_time: Time,
        to_time: Time,
    },
    Transfer {
        from_stop: usize,
        to_stop: usize,
        from_time: Time,
        to_time: Time,
    },
    Egress {
        from_stop: usize,
        from_time: Time,
        to_time: Time,
    },
}

impl PathLeg {
    pub fn from_time(&self) -> Time {
        match *self {
            PathLeg::Access { from_time, .. }
            | PathLeg::Transit { from_time, .. }
            | PathLeg::Transfer { from_time, .. }
            | PathLeg::Egress { from_time, .. } => from_time,
        }
    }

    pub fn to_time(&self) -> Time {
        match *self {
            PathLeg::Access { to_time, .. }
            | PathLeg::Transit { to_time, .. }
            | PathLeg::Transfer { to_time, .. }
            | PathLeg::Egress { to_time, .. } => to_time,
        }
    }

    pub fn duration_seconds(&self) -> i32 {
        self.to_time() - self.from_time()
    }

    /// The stop this leg starts at, if it starts at a transit stop.
    pub fn origin_stop(&self) -> Option<usize> {
        match *self {
            PathLeg::Access { .. } => None,
            PathLeg::Transit { from_stop, .. }
            | PathLeg::Transfer { from_stop, .. }
            | PathLeg::Egress { from_stop, .. } => Some(from_stop),
        }
    }

    /// The stop this leg ends at, if it ends at a transit stop.
    pub fn destination_stop(&self) -> Option<usize> {
        match *self {
            PathLeg::Access { to_stop, .. }
            | PathLeg::Transit { to_stop, .. }
            | PathLeg::Transfer { to_stop, .. } => Some(to_stop),
            PathLeg::Egress { .. } => None,
        }
    }

    pub fn is_transit(&self) -> bool {
        matches!(self, PathLeg::Transit { .. })
    }
}

/// A complete journey from origin to destination.
///
/// # Invariants
///
/// - starts with an access leg, ends with an egress leg, and rides transit
///   at least once
/// - every leg's end is at or after its start, and no leg starts before the
///   previous one ends
/// - adjacent legs meet at the same stop
/// - a transfer is always followed by a transit leg (two walks never meet)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    legs: Vec<PathLeg>,
    cost: i32,
}

impl Path {
    /// Construct a path, validating the leg chain.
    pub fn new(legs: Vec<PathLeg>, cost: i32) -> Result<Self, PathError> {
        if !matches!(legs.first(), Some(PathLeg::Access { .. }))
            || !matches!(legs.last(), Some(PathLeg::Egress { .. }))
        {
            return Err(PathError::MalformedEnds);
        }
        if !legs.iter().any(PathLeg::is_transit) {
            return Err(PathError::NoTransit);
        }

        for (i, leg) in legs.iter().enumerate() {
            if leg.to_time() < leg.from_time() {
                return Err(PathError::NegativeLegDuration(i));
            }
            if i > 0 {
                let prev = &legs[i - 1];
                if leg.from_time() < prev.to_time() {
                    return Err(PathError::TimeTravel(i));
                }
                if prev.destination_stop() != leg.origin_stop() {
                    return Err(PathError::DisconnectedLegs(i - 1, i));
                }
            }
            if matches!(leg, PathLeg::Transfer { .. })
                && !matches!(legs.get(i + 1), Some(PathLeg::Transit { .. }))
            {
                return Err(PathError::DanglingTransfer(i));
            }
        }

        Ok(Self { legs, cost })
    }

    pub fn legs(&self) -> &[PathLeg] {
        &self.legs
    }

    /// Departure time from the origin.
    pub fn departure_time(&self) -> Time {
        self.legs[0].from_time()
    }

    /// Arrival time at the destination.
    pub fn arrival_time(&self) -> Time {
        self.legs[self.legs.len() - 1].to_time()
    }

    /// Total elapsed time including initial and final walks and all waits.
    pub fn duration_seconds(&self) -> i32 {
        self.arrival_time() - self.departure_time()
    }

    /// Number of transit rides.
    pub fn num_transits(&self) -> usize {
        self.legs.iter().filter(|l| l.is_transit()).count()
    }

    /// Number of changes between transit rides.
    pub fn num_transfers(&self) -> usize {
        self.num_transits().saturating_sub(1)
    }

    /// Generalised cost of the whole journey.
    pub fn cost(&self) -> i32 {
        self.cost
    }

    /// The stop the egress leg departs from.
    pub fn egress_stop(&self) -> usize {
        match self.legs[self.legs.len() - 1] {
            PathLeg::Egress { from_stop, .. } => from_stop,
            // new() guarantees the last leg is an egress leg
            _ => unreachable!(),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} .. {} ({} rides)",
            time_to_string(self.departure_time()),
            time_to_string(self.arrival_time()),
            self.num_transits()
        )?;
        for leg in &self.legs {
            match *leg {
                PathLeg::Access { to_stop, .. } => write!(f, " access~{to_stop}")?,
                PathLeg::Transit {
                    from_stop, to_stop, ..
                } => write!(f, " {from_stop}-(ride)-{to_stop}")?,
                PathLeg::Transfer {
                    from_stop, to_stop, ..
                } => write!(f, " {from_stop}~walk~{to_stop}")?,
                PathLeg::Egress { from_stop, .. } => write!(f, " {from_stop}~egress")?,
            }
        }
        Ok(())
    }
}
