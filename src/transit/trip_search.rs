//! Trip schedule search.
//!
//! Given a pattern, a stop position and an earliest board time, find the
//! best boardable trip: the earliest departing one in a forward search, the
//! latest arriving one in reverse. Patterns with few trips are scanned
//! linearly; larger scheduled-only patterns use a binary search to locate
//! the scan start.
//!
//! Frequency-defined trips are never boarded here; the frequency boarding
//! rules in the worker handle those.

use crate::domain::Time;

use super::calculator::TransitCalculator;
use super::pattern::{TripPattern, TripSchedule};

/// A successful trip search: which trip to ride and when it is boarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripBoarding {
    pub trip_index: usize,
    pub board_time: Time,
}

/// True when the trip can be used at all: an explicit schedule whose
/// service runs on the search date.
fn is_boardable(trip: &TripSchedule, services_active: &[bool]) -> bool {
    !trip.is_frequency_based() && services_active[trip.service().0]
}

/// True when the trip's time at the stop position is usable, i.e. not
/// before the earliest board time (after it in a reverse search).
fn qualifies<C: TransitCalculator>(
    cal: &C,
    trip: &TripSchedule,
    stop_position: usize,
    earliest_board_time: Time,
) -> bool {
    !cal.is_best(
        cal.board_candidate_time(trip, stop_position),
        earliest_board_time,
    )
}

/// Find the best boardable trip at a stop position, or `None` when no trip
/// qualifies. Ties on time resolve to the lowest trip index.
pub fn find_boarding<C: TransitCalculator>(
    cal: &C,
    pattern: &TripPattern,
    services_active: &[bool],
    stop_position: usize,
    earliest_board_time: Time,
    binary_search_threshold: usize,
) -> Option<TripBoarding> {
    let trips = pattern.trips();

    // The binary search relies on every trip's candidate time being
    // comparable, which does not hold for the relative time profiles of
    // frequency trips mixed into the pattern.
    let use_binary_search =
        trips.len() >= binary_search_threshold && !pattern.has_frequencies();

    if C::FORWARD {
        let start = if use_binary_search {
            trips.partition_point(|t| {
                cal.is_best(cal.board_candidate_time(t, stop_position), earliest_board_time)
            })
        } else {
            0
        };
        for (offset, trip) in trips[start..].iter().enumerate() {
            if !is_boardable(trip, services_active) {
                continue;
            }
            if qualifies(cal, trip, stop_position, earliest_board_time) {
                return Some(TripBoarding {
                    trip_index: start + offset,
                    board_time: cal.board_candidate_time(trip, stop_position),
                });
            }
        }
    } else {
        let end = if use_binary_search {
            trips.partition_point(|t| {
                !cal.is_best(cal.board_candidate_time(t, stop_position), earliest_board_time)
            })
        } else {
            trips.len()
        };
        for trip_index in (0..end).rev() {
            let trip = &trips[trip_index];
            if !is_boardable(trip, services_active) {
                continue;
            }
            if qualifies(cal, trip, stop_position, earliest_board_time) {
                return Some(TripBoarding {
                    trip_index,
                    board_time: cal.board_candidate_time(trip, stop_position),
                });
            }
        }
    }
    None
}

/// Step backwards from a trip already boarded to find a strictly better
/// boardable trip at this stop position. Used when a stop is re-reached
/// sooner via a different route than the one the current trip was boarded
/// from. Returns `None` when the current trip is already the best.
pub fn find_earlier_boarding<C: TransitCalculator>(
    cal: &C,
    pattern: &TripPattern,
    services_active: &[bool],
    stop_position: usize,
    earliest_board_time: Time,
    current_trip_index: usize,
) -> Option<TripBoarding> {
    let trips = pattern.trips();
    let mut found = None;

    let mut earlier;
    let mut later;
    let candidates: &mut dyn Iterator<Item = usize> = if C::FORWARD {
        earlier = (0..current_trip_index).rev();
        &mut earlier
    } else {
        later = current_trip_index + 1..trips.len();
        &mut later
    };

    for trip_index in candidates {
        let trip = &trips[trip_index];
        if !is_boardable(trip, services_active) {
            continue;
        }
        if qualifies(cal, trip, stop_position, earliest_board_time) {
            found = Some(TripBoarding {
                trip_index,
                board_time: cal.board_candidate_time(trip, stop_position),
            });
        } else {
            // Trips are sorted; everything further out is unusable too.
            break;
        }
    }
    found
}
