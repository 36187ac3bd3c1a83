//! Direction-aware time arithmetic.
//!
//! All direction-dependent calculations live here so the worker code reads
//! identically for forward and reverse searches: a reverse search swaps
//! plus and minus, flips comparisons and walks patterns back to front.

use crate::domain::Time;

use super::pattern::TripSchedule;

/// Arithmetic and iteration order for one search direction.
///
/// Times are integer seconds since midnight of the service date; values
/// above 24h are valid for trips crossing midnight. "Best" means earlier in
/// a forward search and later in a reverse search.
pub trait TransitCalculator {
    /// True for the forward (departure-time) search direction.
    const FORWARD: bool;

    /// Move a time forwards in search direction.
    fn add(&self, time: Time, delta: i32) -> Time;

    /// Move a time backwards in search direction.
    fn sub(&self, time: Time, delta: i32) -> Time;

    fn board_slack(&self) -> i32;

    /// Earliest time a vehicle may be boarded after arriving at a stop at
    /// `time`. Board slack applies on boarding, so only the forward search
    /// adds it here.
    fn earliest_board_time(&self, time: Time) -> Time;

    /// The time one is at a stop position after riding `trip` to it.
    fn latest_arrival_time(&self, trip: &TripSchedule, stop_position: usize) -> Time;

    /// The time the trip search compares against the earliest board time:
    /// the departure in a forward search, the arrival in a reverse one.
    fn board_candidate_time(&self, trip: &TripSchedule, stop_position: usize) -> Time;

    /// True when `time` falls outside the acceptable search range.
    fn exceeds_time_limit(&self, time: Time) -> bool;

    /// True when `a` is strictly better than `b` in search direction.
    fn is_best(&self, a: Time, b: Time) -> bool;

    /// Sentinel every real arrival compares better than.
    fn unreached_time(&self) -> Time;

    /// Departure minutes for the range search, best-last first: a forward
    /// search iterates the latest departure minute first so earlier minutes
    /// can reuse its results as upper bounds.
    fn iteration_departure_times(&self) -> impl Iterator<Item = Time> + '_;

    /// Stop positions of a pattern in travel order for this direction.
    fn stop_positions(&self, num_stops: usize) -> impl Iterator<Item = usize>;
}

/// Calculator for the normal earliest-arrival search.
#[derive(Debug, Clone)]
pub struct ForwardCalculator {
    board_slack: i32,
    earliest_departure: Time,
    latest_departure: Time,
    departure_step: i32,
    time_limit: Time,
}

impl ForwardCalculator {
    pub fn new(
        board_slack: i32,
        earliest_departure: Time,
        latest_departure: Time,
        departure_step: i32,
        max_trip_duration: i32,
    ) -> Self {
        Self {
            board_slack,
            earliest_departure,
            latest_departure,
            departure_step,
            time_limit: latest_departure + max_trip_duration,
        }
    }

    /// Latest acceptable arrival time for this search.
    pub fn time_limit(&self) -> Time {
        self.time_limit
    }
}

impl TransitCalculator for ForwardCalculator {
    const FORWARD: bool = true;

    fn add(&self, time: Time, delta: i32) -> Time {
        time + delta
    }

    fn sub(&self, time: Time, delta: i32) -> Time {
        time - delta
    }

    fn board_slack(&self) -> i32 {
        self.board_slack
    }

    fn earliest_board_time(&self, time: Time) -> Time {
        time + self.board_slack
    }

    fn latest_arrival_time(&self, trip: &TripSchedule, stop_position: usize) -> Time {
        trip.arrival(stop_position)
    }

    fn board_candidate_time(&self, trip: &TripSchedule, stop_position: usize) -> Time {
        trip.departure(stop_position)
    }

    fn exceeds_time_limit(&self, time: Time) -> bool {
        time > self.time_limit
    }

    fn is_best(&self, a: Time, b: Time) -> bool {
        a < b
    }

    fn unreached_time(&self) -> Time {
        Time::MAX
    }

    fn iteration_departure_times(&self) -> impl Iterator<Item = Time> + '_ {
        let step = self.departure_step;
        let latest = self.latest_departure;
        let earliest = self.earliest_departure;
        (0..)
            .map(move |i| latest - i * step)
            .take_while(move |&t| t >= earliest)
    }

    fn stop_positions(&self, num_stops: usize) -> impl Iterator<Item = usize> {
        0..num_stops
    }
}

/// Calculator for the reverse (latest-departure) search.
///
/// The reverse search fixes an arrival deadline and searches backwards; it
/// is used to compute per-stop pruning heuristics. "Departure minutes" are
/// arrival minutes here, iterated earliest first.
#[derive(Debug, Clone)]
pub struct ReverseCalculator {
    board_slack: i32,
    earliest_arrival: Time,
    latest_arrival: Time,
    arrival_step: i32,
    time_limit: Time,
}

impl ReverseCalculator {
    pub fn new(
        board_slack: i32,
        earliest_arrival: Time,
        latest_arrival: Time,
        arrival_step: i32,
        max_trip_duration: i32,
    ) -> Self {
        Self {
            board_slack,
            earliest_arrival,
            latest_arrival,
            arrival_step,
            time_limit: earliest_arrival - max_trip_duration,
        }
    }
}

impl TransitCalculator for ReverseCalculator {
    const FORWARD: bool = false;

    fn add(&self, time: Time, delta: i32) -> Time {
        time - delta
    }

    fn sub(&self, time: Time, delta: i32) -> Time {
        time + delta
    }

    fn board_slack(&self) -> i32 {
        self.board_slack
    }

    fn earliest_board_time(&self, time: Time) -> Time {
        time
    }

    fn latest_arrival_time(&self, trip: &TripSchedule, stop_position: usize) -> Time {
        trip.departure(stop_position) - self.board_slack
    }

    fn board_candidate_time(&self, trip: &TripSchedule, stop_position: usize) -> Time {
        trip.arrival(stop_position)
    }

    fn exceeds_time_limit(&self, time: Time) -> bool {
        time < self.time_limit
    }

    fn is_best(&self, a: Time, b: Time) -> bool {
        a > b
    }

    fn unreached_time(&self) -> Time {
        Time::MIN
    }

    fn iteration_departure_times(&self) -> impl Iterator<Item = Time> + '_ {
        let step = self.arrival_step;
        let earliest = self.earliest_arrival;
        let latest = self.latest_arrival;
        (0..)
            .map(move |i| earliest + i * step)
            .take_while(move |&t| t <= latest)
    }

    fn stop_positions(&self, num_stops: usize) -> impl Iterator<Item = usize> {
        (0..num_stops).rev()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hm;
    use crate::transit::pattern::{ServiceId, TripSchedule};

    fn trip() -> TripSchedule {
        TripSchedule::new(
            ServiceId(0),
            vec![hm(8, 0), hm(8, 10)],
            vec![hm(8, 1), hm(8, 11)],
            vec![],
        )
    }

    fn forward() -> ForwardCalculator {
        ForwardCalculator::new(60, hm(7, 50), hm(8, 5), 60, 2 * 3600)
    }

    fn reverse() -> ReverseCalculator {
        ReverseCalculator::new(60, hm(10, 0), hm(10, 0), 60, 2 * 3600)
    }

    #[test]
    fn forward_arithmetic() {
        let cal = forward();
        assert_eq!(cal.add(hm(8, 0), 90), hm(8, 0) + 90);
        assert_eq!(cal.sub(hm(8, 0), 90), hm(8, 0) - 90);
        assert_eq!(cal.earliest_board_time(hm(8, 0)), hm(8, 1));
        assert_eq!(cal.latest_arrival_time(&trip(), 1), hm(8, 10));
        assert_eq!(cal.board_candidate_time(&trip(), 0), hm(8, 1));
        assert!(cal.is_best(hm(8, 0), hm(8, 1)));
        assert!(!cal.is_best(hm(8, 1), hm(8, 1)));
        assert_eq!(cal.unreached_time(), Time::MAX);
        assert!(cal.exceeds_time_limit(hm(10, 6)));
        assert!(!cal.exceeds_time_limit(hm(10, 5)));
    }

    #[test]
    fn reverse_arithmetic_mirrors_forward() {
        let cal = reverse();
        assert_eq!(cal.add(hm(8, 0), 90), hm(8, 0) - 90);
        assert_eq!(cal.sub(hm(8, 0), 90), hm(8, 0) + 90);
        // No slack on the reverse board side; slack applies on alight.
        assert_eq!(cal.earliest_board_time(hm(8, 10)), hm(8, 10));
        assert_eq!(cal.latest_arrival_time(&trip(), 0), hm(8, 1) - 60);
        assert_eq!(cal.board_candidate_time(&trip(), 1), hm(8, 10));
        assert!(cal.is_best(hm(8, 1), hm(8, 0)));
        assert_eq!(cal.unreached_time(), Time::MIN);
        assert!(cal.exceeds_time_limit(hm(7, 59)));
        assert!(!cal.exceeds_time_limit(hm(8, 0)));
    }

    #[test]
    fn forward_minutes_run_latest_to_earliest_inclusive() {
        let minutes: Vec<_> = forward().iteration_departure_times().collect();
        assert_eq!(minutes.len(), 16);
        assert_eq!(minutes[0], hm(8, 5));
        assert_eq!(*minutes.last().unwrap(), hm(7, 50));
    }

    #[test]
    fn stop_positions_follow_direction() {
        let fwd: Vec<_> = forward().stop_positions(3).collect();
        assert_eq!(fwd, vec![0, 1, 2]);
        let rev: Vec<_> = reverse().stop_positions(3).collect();
        assert_eq!(rev, vec![2, 1, 0]);
    }
}
