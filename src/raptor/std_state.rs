//! Stop-arrival state for the single-criterion workers.
//!
//! Tracks, per round and stop, the best arrival time plus the back-link
//! data needed to reconstruct a path: board stop, board time, trip, and the
//! transfer origin when the stop was reached on foot. Best times are kept
//! separately for "any means" and "by transit"; egress only ever connects
//! to transit arrivals.
//!
//! The state is allocated once per worker and reused across all departure
//! minutes of the range search: carried-over times act as upper bounds for
//! earlier minutes, which is what makes Range-RAPTOR cheap per minute.

use crate::domain::Time;
use crate::transit::TransitCalculator;
use crate::util::BitSet;

/// The trip a transit arrival rode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripRef {
    pub pattern: usize,
    pub trip: usize,
}

/// No back-link recorded.
pub const NO_STOP: i32 = -1;

/// Arrival data for one round, arrays indexed by stop.
#[derive(Debug, Clone)]
pub struct RoundArrivals {
    /// Best arrival by any means up to this round.
    pub best_times: Vec<Time>,
    /// Best arrival by transit up to this round.
    pub transit_times: Vec<Time>,
    pub board_stops: Vec<i32>,
    pub board_times: Vec<Time>,
    pub trips: Vec<Option<TripRef>>,
    /// Stop the arrival walked from, or [`NO_STOP`] when it arrived by
    /// transit (or was seeded by an access leg).
    pub transfer_from: Vec<i32>,
    pub transfer_durations: Vec<i32>,
}

impl RoundArrivals {
    fn new(n_stops: usize, unreached: Time) -> Self {
        Self {
            best_times: vec![unreached; n_stops],
            transit_times: vec![unreached; n_stops],
            board_stops: vec![NO_STOP; n_stops],
            board_times: vec![unreached; n_stops],
            trips: vec![None; n_stops],
            transfer_from: vec![NO_STOP; n_stops],
            transfer_durations: vec![0; n_stops],
        }
    }
}

/// Per-round best times and back-links for a whole search.
///
/// Round 0 holds the access-leg seeds; round `k` holds journeys with at
/// most `k` rides. All arrays survive `reset_iteration`, only the
/// round-local touched sets are rewritten per departure minute.
#[derive(Debug, Clone)]
pub struct StdWorkerState<C: TransitCalculator + Clone> {
    cal: C,
    rounds: Vec<RoundArrivals>,
    round: usize,
    /// Stops whose transit time improved in the current round.
    stops_touched: BitSet,
    /// Patterns to sweep in the current round.
    patterns_touched: BitSet,
}

impl<C: TransitCalculator + Clone> StdWorkerState<C> {
    pub fn new(cal: C, n_rounds: usize, n_stops: usize, n_patterns: usize) -> Self {
        let unreached = cal.unreached_time();
        Self {
            cal,
            rounds: (0..n_rounds)
                .map(|_| RoundArrivals::new(n_stops, unreached))
                .collect(),
            round: 0,
            stops_touched: BitSet::new(n_stops),
            patterns_touched: BitSet::new(n_patterns),
        }
    }

    pub fn num_rounds(&self) -> usize {
        self.rounds.len()
    }

    pub fn round(&self) -> usize {
        self.round
    }

    /// Prepare for a new departure minute: clear the touched sets but keep
    /// every carried-over best time as an upper bound.
    pub fn reset_iteration(&mut self) {
        self.round = 0;
        self.stops_touched.clear();
        self.patterns_touched.clear();
    }

    /// Seed an access stop at round 0. Returns true when the time improved.
    /// The initial walk counts as a transfer, so it never touches the
    /// transit times.
    pub fn seed_access(&mut self, stop: usize, arrival_time: Time) -> bool {
        let round = &mut self.rounds[0];
        if self.cal.is_best(arrival_time, round.best_times[stop]) {
            round.best_times[stop] = arrival_time;
            round.transfer_from[stop] = NO_STOP;
            true
        } else {
            false
        }
    }

    /// Enter a round: carry the previous round's times forward as the
    /// starting upper bound, and clear the round-local stop marks.
    pub fn begin_round(&mut self, round: usize) {
        debug_assert!(round > 0 && round < self.rounds.len());
        self.round = round;
        self.stops_touched.clear();
        self.carry_times_forward(round);
    }

    /// Copy every time that is better in `round - 1` into `round`. Only the
    /// times move; back-links stay with the round that produced them, so a
    /// back-link walk looks for the earliest round holding a given time.
    fn carry_times_forward(&mut self, round: usize) {
        let (earlier, later) = self.rounds.split_at_mut(round);
        let prev = &earlier[round - 1];
        let cur = &mut later[0];
        for stop in 0..prev.best_times.len() {
            if self.cal.is_best(prev.best_times[stop], cur.best_times[stop]) {
                cur.best_times[stop] = prev.best_times[stop];
            }
            if self
                .cal
                .is_best(prev.transit_times[stop], cur.transit_times[stop])
            {
                cur.transit_times[stop] = prev.transit_times[stop];
            }
        }
    }

    /// Propagate times through any rounds the round loop never entered, so
    /// the final round always holds the overall best.
    pub fn carry_to_final_round(&mut self) {
        for round in self.round + 1..self.rounds.len() {
            self.carry_times_forward(round);
        }
        self.round = self.rounds.len() - 1;
    }

    /// Record a transit arrival in the current round, if it improves the
    /// stop's transit time. Returns true on improvement.
    pub fn transit_to_stop(
        &mut self,
        stop: usize,
        alight_time: Time,
        board_stop: usize,
        board_time: Time,
        trip: TripRef,
    ) -> bool {
        if self.cal.exceeds_time_limit(alight_time) {
            return false;
        }
        let round = &mut self.rounds[self.round];
        if !self.cal.is_best(alight_time, round.transit_times[stop]) {
            return false;
        }
        round.transit_times[stop] = alight_time;
        round.board_stops[stop] = board_stop as i32;
        round.board_times[stop] = board_time;
        round.trips[stop] = Some(trip);
        self.stops_touched.insert(stop);

        if self.cal.is_best(alight_time, round.best_times[stop]) {
            round.best_times[stop] = alight_time;
            round.transfer_from[stop] = NO_STOP;
        }
        true
    }

    /// Record a transfer arrival in the current round, if it improves the
    /// stop's overall time. Returns true on improvement.
    pub fn transfer_to_stop(
        &mut self,
        from_stop: usize,
        to_stop: usize,
        duration: i32,
        arrival_time: Time,
    ) -> bool {
        if self.cal.exceeds_time_limit(arrival_time) {
            return false;
        }
        let round = &mut self.rounds[self.round];
        if !self.cal.is_best(arrival_time, round.best_times[to_stop]) {
            return false;
        }
        round.best_times[to_stop] = arrival_time;
        round.transfer_from[to_stop] = from_stop as i32;
        round.transfer_durations[to_stop] = duration;
        true
    }

    /// Best arrival by any means in the previous round; the earliest board
    /// time for the current round derives from this.
    pub fn best_time_previous_round(&self, stop: usize) -> Time {
        self.rounds[self.round - 1].best_times[stop]
    }

    /// Best transit arrival in the previous round.
    pub fn transit_time_previous_round(&self, stop: usize) -> Time {
        self.rounds[self.round - 1].transit_times[stop]
    }

    /// The pattern that produced the previous round's arrival at this stop:
    /// the arrival's own pattern, or, for a transfer arrival, the pattern
    /// of the transit arrival it walked from. `None` for access seeds.
    pub fn source_pattern_previous_round(&self, stop: usize) -> Option<usize> {
        let prev = &self.rounds[self.round - 1];
        let transit_stop = match prev.transfer_from[stop] {
            NO_STOP => stop,
            from => from as usize,
        };
        prev.trips[transit_stop].map(|t| t.pattern)
    }

    pub fn stops_touched(&self) -> impl Iterator<Item = usize> + '_ {
        self.stops_touched.iter()
    }

    pub fn mark_pattern(&mut self, pattern: usize) {
        self.patterns_touched.insert(pattern);
    }

    pub fn clear_patterns_touched(&mut self) {
        self.patterns_touched.clear();
    }

    pub fn has_patterns_touched(&self) -> bool {
        !self.patterns_touched.is_empty()
    }

    pub fn patterns_touched(&self) -> Vec<usize> {
        self.patterns_touched.iter().collect()
    }

    /// Arrival arrays of one round, for result extraction and path walks.
    pub fn round_arrivals(&self, round: usize) -> &RoundArrivals {
        &self.rounds[round]
    }

    /// Final-round best transit time, the time an egress leg connects to.
    pub fn final_transit_time(&self, stop: usize) -> Time {
        self.rounds[self.rounds.len() - 1].transit_times[stop]
    }

    pub fn unreached_time(&self) -> Time {
        self.cal.unreached_time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{UNREACHED, hm};
    use crate::transit::ForwardCalculator;

    fn state() -> StdWorkerState<ForwardCalculator> {
        let cal = ForwardCalculator::new(60, hm(8, 0), hm(9, 0), 60, 12 * 3600);
        StdWorkerState::new(cal, 4, 5, 3)
    }

    #[test]
    fn seeding_improves_once() {
        let mut s = state();
        assert!(s.seed_access(0, hm(8, 0)));
        assert!(!s.seed_access(0, hm(8, 5)));
        assert!(s.seed_access(0, hm(7, 55)));
        assert_eq!(s.round_arrivals(0).best_times[0], hm(7, 55));
    }

    #[test]
    fn transit_arrival_updates_both_bests() {
        let mut s = state();
        s.seed_access(0, hm(8, 0));
        s.begin_round(1);
        let trip = TripRef { pattern: 0, trip: 0 };
        assert!(s.transit_to_stop(1, hm(8, 20), 0, hm(8, 5), trip));

        let round = s.round_arrivals(1);
        assert_eq!(round.transit_times[1], hm(8, 20));
        assert_eq!(round.best_times[1], hm(8, 20));
        assert_eq!(round.board_stops[1], 0);
        assert_eq!(round.trips[1], Some(trip));
        assert_eq!(round.transfer_from[1], NO_STOP);
        assert_eq!(s.stops_touched().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn worse_transit_arrival_is_rejected() {
        let mut s = state();
        s.seed_access(0, hm(8, 0));
        s.begin_round(1);
        let trip = TripRef { pattern: 0, trip: 0 };
        assert!(s.transit_to_stop(1, hm(8, 20), 0, hm(8, 5), trip));
        assert!(!s.transit_to_stop(1, hm(8, 25), 0, hm(8, 5), trip));
        assert_eq!(s.round_arrivals(1).transit_times[1], hm(8, 20));
    }

    #[test]
    fn transfer_improves_best_but_not_transit() {
        let mut s = state();
        s.seed_access(0, hm(8, 0));
        s.begin_round(1);
        s.transit_to_stop(1, hm(8, 20), 0, hm(8, 5), TripRef { pattern: 0, trip: 0 });
        assert!(s.transfer_to_stop(1, 2, 120, hm(8, 22)));

        let round = s.round_arrivals(1);
        assert_eq!(round.best_times[2], hm(8, 22));
        assert_eq!(round.transit_times[2], UNREACHED);
        assert_eq!(round.transfer_from[2], 1);
        assert_eq!(round.transfer_durations[2], 120);
    }

    #[test]
    fn times_carry_forward_without_backlinks() {
        let mut s = state();
        s.seed_access(0, hm(8, 0));
        s.begin_round(1);
        s.transit_to_stop(1, hm(8, 20), 0, hm(8, 5), TripRef { pattern: 0, trip: 0 });
        s.begin_round(2);

        let round = s.round_arrivals(2);
        assert_eq!(round.transit_times[1], hm(8, 20));
        // The back-link stays with round 1, where the ride happened.
        assert_eq!(round.trips[1], None);
        assert_eq!(s.best_time_previous_round(1), hm(8, 20));
    }

    #[test]
    fn carry_to_final_round_fills_gap_rounds() {
        let mut s = state();
        s.seed_access(0, hm(8, 0));
        s.begin_round(1);
        s.transit_to_stop(1, hm(8, 20), 0, hm(8, 5), TripRef { pattern: 0, trip: 0 });
        s.carry_to_final_round();
        assert_eq!(s.final_transit_time(1), hm(8, 20));
    }

    #[test]
    fn reset_keeps_times_as_upper_bounds() {
        let mut s = state();
        s.seed_access(0, hm(8, 0));
        s.begin_round(1);
        s.transit_to_stop(1, hm(8, 20), 0, hm(8, 5), TripRef { pattern: 0, trip: 0 });
        s.mark_pattern(2);

        s.reset_iteration();
        assert_eq!(s.round(), 0);
        assert!(!s.has_patterns_touched());
        assert_eq!(s.stops_touched().count(), 0);
        // Times survive: that is the Range-RAPTOR upper bound.
        assert_eq!(s.round_arrivals(1).transit_times[1], hm(8, 20));
    }

    #[test]
    fn source_pattern_follows_transfer_backlink() {
        let mut s = state();
        s.seed_access(0, hm(8, 0));
        s.begin_round(1);
        s.transit_to_stop(1, hm(8, 20), 0, hm(8, 5), TripRef { pattern: 1, trip: 0 });
        s.transfer_to_stop(1, 2, 120, hm(8, 22));
        s.begin_round(2);

        assert_eq!(s.source_pattern_previous_round(1), Some(1));
        assert_eq!(s.source_pattern_previous_round(2), Some(1));
        assert_eq!(s.source_pattern_previous_round(0), None);
    }

    #[test]
    fn time_limit_rejects_late_arrivals() {
        let mut s = state();
        s.seed_access(0, hm(8, 0));
        s.begin_round(1);
        // Limit is latest departure (09:00) + 12h.
        assert!(!s.transit_to_stop(1, hm(21, 1), 0, hm(8, 5), TripRef { pattern: 0, trip: 0 }));
        assert!(!s.transfer_to_stop(0, 1, 60, hm(21, 1)));
    }
}
