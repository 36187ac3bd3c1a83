//! The single-criterion Range-RAPTOR worker.
//!
//! Iterates departure minutes latest to earliest; each minute seeds the
//! access stops, runs rounds until no pattern is touched, and extracts the
//! egress arrivals. Carried-over best times make every earlier minute start
//! from a valid upper bound, so most rounds converge quickly.
//!
//! On networks with frequency-defined trips, each minute additionally runs
//! a best-case, a worst-case and a number of Monte-Carlo iterations on a
//! copy of the scheduled state; range reuse is not valid across randomized
//! schedules, so the copies are discarded after extraction.

use chrono::NaiveDate;
use tracing::{debug, error, trace, warn};

use crate::api::{CostFactors, DebugFlags, IterationResult, SearchRequest, TuningParameters};
use crate::domain::{AccessEgressLeg, Path, Time, UNREACHED, time_to_string};
use crate::transit::{
    ServiceId, TransitCalculator, TransitData, find_boarding, find_earlier_boarding,
};

use super::frequency::{BoardingAssumption, FrequencyOffsets, find_frequency_boarding};
use super::path_builder;
use super::std_state::{StdWorkerState, TripRef};

/// Worker parameters derived from the request and process tuning.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub date: NaiveDate,
    pub binary_search_threshold: usize,
    pub monte_carlo_draws: usize,
    pub enable_frequencies: bool,
    pub monte_carlo_seed: u64,
    pub cost_factors: CostFactors,
    pub debug: DebugFlags,
}

impl WorkerConfig {
    pub fn from_request(request: &SearchRequest, tuning: &TuningParameters) -> Self {
        Self {
            date: request.date,
            binary_search_threshold: tuning.scheduled_trip_binary_search_threshold,
            monte_carlo_draws: request.monte_carlo_draws_per_minute,
            enable_frequencies: true,
            monte_carlo_seed: request.monte_carlo_seed,
            cost_factors: request.cost_factors,
            debug: request.debug.clone(),
        }
    }
}

/// What a worker run produced: per-iteration egress arrivals, and the
/// distinct journeys found by the scheduled search.
#[derive(Debug, Clone)]
pub struct WorkerOutput {
    pub iterations: Vec<IterationResult>,
    pub paths: Vec<Path>,
}

/// Single-criterion Range-RAPTOR worker, generic over the search direction
/// via the calculator. A worker is single-threaded, performs no I/O and is
/// built per request.
pub struct RangeRaptorWorker<'a, D: TransitData, C: TransitCalculator + Clone> {
    data: &'a D,
    cal: C,
    config: WorkerConfig,
    access_legs: Vec<AccessEgressLeg>,
    egress_legs: Vec<AccessEgressLeg>,
    state: StdWorkerState<C>,
    services_active: Vec<bool>,
    offsets: Option<FrequencyOffsets>,
    /// Stops the heuristic search proved useless for reaching the
    /// destination in time; arrivals there are not recorded.
    stop_filter: Option<Vec<bool>>,
    current_departure: Time,
}

impl<'a, D: TransitData, C: TransitCalculator + Clone> RangeRaptorWorker<'a, D, C> {
    pub fn new(
        data: &'a D,
        cal: C,
        config: WorkerConfig,
        n_rounds: usize,
        access_legs: Vec<AccessEgressLeg>,
        egress_legs: Vec<AccessEgressLeg>,
        stop_filter: Option<Vec<bool>>,
    ) -> Self {
        let services_active = (0..data.num_services())
            .map(|s| data.is_service_active(ServiceId(s), config.date))
            .collect();
        let use_frequencies = config.enable_frequencies && C::FORWARD && data.has_frequencies();
        let offsets = use_frequencies.then(|| FrequencyOffsets::new(data, config.monte_carlo_seed));
        let state = StdWorkerState::new(cal.clone(), n_rounds, data.num_stops(), data.num_patterns());
        Self {
            data,
            cal,
            config,
            access_legs,
            egress_legs,
            state,
            services_active,
            offsets,
            stop_filter,
            current_departure: 0,
        }
    }

    /// Run the full range search.
    pub fn route(&mut self) -> WorkerOutput {
        let minutes: Vec<Time> = self.cal.iteration_departure_times().collect();
        debug!(
            minutes = minutes.len(),
            rounds = self.state.num_rounds(),
            frequencies = self.offsets.is_some(),
            "starting range raptor search"
        );

        let mut iterations = Vec::with_capacity(minutes.len());
        let mut paths = Vec::new();
        let mut best_egress_clock = vec![self.cal.unreached_time(); self.egress_legs.len()];

        for minute in minutes {
            let scheduled_rounds = self.run_scheduled_minute(minute);
            self.collect_new_paths(minute, &mut best_egress_clock, &mut paths);

            if self.offsets.is_some() {
                let draws = self.config.monte_carlo_draws;
                for draw in 0..draws + 2 {
                    let assumption = match draw {
                        0 => BoardingAssumption::BestCase,
                        1 => BoardingAssumption::WorstCase,
                        _ => BoardingAssumption::Random,
                    };
                    let frequency_state = self.run_frequency_draw(assumption, scheduled_rounds);
                    iterations.push(Self::extract_iteration(
                        &self.cal,
                        &self.egress_legs,
                        &frequency_state,
                        minute,
                        draw >= 2,
                    ));
                }
            } else {
                iterations.push(Self::extract_iteration(
                    &self.cal,
                    &self.egress_legs,
                    &self.state,
                    minute,
                    true,
                ));
            }
        }

        debug!(
            iterations = iterations.len(),
            paths = paths.len(),
            "range raptor search complete"
        );
        WorkerOutput { iterations, paths }
    }

    /// Best arrival (any means) per stop after the search; consumed by the
    /// heuristic searches.
    pub fn final_best_times(&self) -> Vec<Time> {
        let last = self.state.num_rounds() - 1;
        self.state.round_arrivals(last).best_times.clone()
    }

    /// One departure minute of the scheduled search. Returns the number of
    /// rounds that ran.
    fn run_scheduled_minute(&mut self, departure_time: Time) -> usize {
        trace!(minute = %time_to_string(departure_time), "scheduled search");
        self.current_departure = departure_time;
        self.state.reset_iteration();

        for i in 0..self.access_legs.len() {
            let leg = self.access_legs[i];
            if !self.allows(leg.stop) {
                continue;
            }
            let arrival = self.cal.add(departure_time, leg.duration_seconds);
            if self.state.seed_access(leg.stop, arrival) {
                self.mark_patterns_at(leg.stop);
            }
        }

        let mut rounds_done = 0;
        for round in 1..self.state.num_rounds() {
            if !self.state.has_patterns_touched() {
                break;
            }
            self.state.begin_round(round);
            for pattern in self.state.patterns_touched() {
                self.sweep_pattern(pattern, None);
            }
            self.relax_transfers();
            rounds_done = round;
        }
        self.state.carry_to_final_round();
        rounds_done
    }

    /// One frequency iteration on a copy of the scheduled state. Returns
    /// that copy; the scheduled state is untouched because range reuse is
    /// invalid across randomized frequency schedules.
    fn run_frequency_draw(
        &mut self,
        assumption: BoardingAssumption,
        scheduled_rounds: usize,
    ) -> StdWorkerState<C> {
        if assumption == BoardingAssumption::Random
            && let Some(offsets) = self.offsets.as_mut()
        {
            offsets.randomize(self.data);
        }

        let saved = self.state.clone();
        self.state.clear_patterns_touched();
        self.mark_frequency_patterns();

        let max_round = self.state.num_rounds() - 1;
        let mut round = 1;
        loop {
            self.state.begin_round(round);
            for pattern in self.state.patterns_touched() {
                self.sweep_pattern(pattern, Some(assumption));
            }
            self.relax_transfers();
            // Run at least one round past the scheduled search, so a
            // shorter frequency round count cannot cut it off.
            if round >= max_round
                || (!self.state.has_patterns_touched() && round > scheduled_rounds)
            {
                break;
            }
            round += 1;
            // Frequency patterns may become reachable at any round via
            // scheduled trips, so they are re-marked every round.
            self.mark_frequency_patterns();
        }
        self.state.carry_to_final_round();

        std::mem::replace(&mut self.state, saved)
    }

    fn mark_frequency_patterns(&mut self) {
        for pattern in 0..self.data.num_patterns() {
            if self.data.pattern(pattern).has_frequencies() {
                self.state.mark_pattern(pattern);
            }
        }
    }

    /// Sweep one pattern: ride anything already boarded, record arrivals,
    /// and (re-)board where the previous round reached a stop.
    fn sweep_pattern(&mut self, pattern_index: usize, frequencies: Option<BoardingAssumption>) {
        let pattern = self.data.pattern(pattern_index);
        if !pattern.any_service_active(&self.services_active) {
            return;
        }

        if let Some(assumption) = frequencies
            && pattern.has_frequencies()
        {
            let rode_frequency = self.sweep_pattern_frequency(pattern_index, assumption);
            // A pattern does not mix frequency and scheduled boardings
            // within one round; trip identity would not survive the mix.
            if rode_frequency {
                return;
            }
        }

        let mut on_trip: Option<(usize, usize, Time)> = None; // (trip, board stop, board time)

        for position in self.cal.stop_positions(pattern.num_stops()) {
            let stop = pattern.stop_at(position);

            let mut current_arrival = None;
            if let Some((trip_index, board_stop, board_time)) = on_trip {
                let trip = pattern.trip(trip_index);
                let alight = self.cal.latest_arrival_time(trip, position);
                current_arrival = Some(alight);
                if self.cal.is_best(alight, self.current_departure) {
                    error!(
                        stop,
                        pattern = pattern_index,
                        alight = %time_to_string(alight),
                        departure = %time_to_string(self.current_departure),
                        "arrival before iteration departure, dropping update"
                    );
                } else if self.allows(stop)
                    && self.state.transit_to_stop(
                        stop,
                        alight,
                        board_stop,
                        board_time,
                        TripRef {
                            pattern: pattern_index,
                            trip: trip_index,
                        },
                    )
                {
                    self.trace_stop_update(stop, alight, "transit");
                }
            }

            // Boarding. Skip unreached stops and never re-board the pattern
            // the stop was reached on.
            let previous_time = self.state.best_time_previous_round(stop);
            if previous_time == self.cal.unreached_time() {
                continue;
            }
            if self.state.source_pattern_previous_round(stop) == Some(pattern_index) {
                continue;
            }
            let earliest_board = self.cal.earliest_board_time(previous_time);

            match on_trip {
                None => {
                    if let Some(boarding) = find_boarding(
                        &self.cal,
                        pattern,
                        &self.services_active,
                        position,
                        earliest_board,
                        self.config.binary_search_threshold,
                    ) {
                        on_trip = Some((boarding.trip_index, stop, boarding.board_time));
                    }
                }
                Some((current_trip, _, _)) => {
                    // Re-board an earlier trip when this stop was reached
                    // sooner than the current trip gets here.
                    if current_arrival.is_some_and(|a| self.cal.is_best(previous_time, a))
                        && let Some(boarding) = find_earlier_boarding(
                            &self.cal,
                            pattern,
                            &self.services_active,
                            position,
                            earliest_board,
                            current_trip,
                        )
                    {
                        on_trip = Some((boarding.trip_index, stop, boarding.board_time));
                    }
                }
            }
        }
    }

    /// Frequency pass over a pattern. Returns true when a frequency vehicle
    /// was ridden.
    fn sweep_pattern_frequency(
        &mut self,
        pattern_index: usize,
        assumption: BoardingAssumption,
    ) -> bool {
        let pattern = self.data.pattern(pattern_index);
        let Some(offsets) = self.offsets.as_ref() else {
            return false;
        };

        // (trip, board position, board stop, board time)
        let mut ride: Option<(usize, usize, usize, Time)> = None;
        let mut rode = false;

        for position in self.cal.stop_positions(pattern.num_stops()) {
            let stop = pattern.stop_at(position);

            // Arrival if we stay on the vehicle boarded further back.
            let remain = ride.map(|(trip_index, board_pos, board_stop, board_time)| {
                let trip = pattern.trip(trip_index);
                let travel = trip.arrival(position) - trip.departure(board_pos);
                (trip_index, board_stop, board_time, board_time + travel)
            });

            let previous_time = self.state.best_time_previous_round(stop);
            if previous_time != self.cal.unreached_time() {
                let earliest_board = self.cal.earliest_board_time(previous_time);
                if let Some(boarding) = find_frequency_boarding(
                    pattern_index,
                    pattern,
                    &self.services_active,
                    offsets,
                    position,
                    earliest_board,
                    assumption,
                ) && remain.is_none_or(|(_, _, _, arrival)| boarding.board_time < arrival)
                {
                    ride = Some((boarding.trip_index, position, stop, boarding.board_time));
                    rode = true;
                }
            }

            if let Some((trip_index, board_stop, board_time, arrival)) = remain
                && self.allows(stop)
                && self.state.transit_to_stop(
                    stop,
                    arrival,
                    board_stop,
                    board_time,
                    TripRef {
                        pattern: pattern_index,
                        trip: trip_index,
                    },
                )
            {
                self.trace_stop_update(stop, arrival, "frequency");
            }
        }
        rode
    }

    /// Relax transfers out of every stop whose transit time improved this
    /// round, and mark the patterns to sweep next round.
    fn relax_transfers(&mut self) {
        let touched: Vec<usize> = self.state.stops_touched().collect();
        self.state.clear_patterns_touched();

        for stop in touched {
            self.mark_patterns_at(stop);
            let from_time = self.state.round_arrivals(self.state.round()).transit_times[stop];

            let legs: Vec<_> = if C::FORWARD {
                self.data.transfers_from(stop).collect()
            } else {
                self.data.transfers_to(stop).collect()
            };
            for leg in legs {
                if !self.allows(leg.stop) {
                    continue;
                }
                let arrival = self.cal.add(from_time, leg.duration_seconds);
                if self
                    .state
                    .transfer_to_stop(stop, leg.stop, leg.duration_seconds, arrival)
                {
                    self.trace_stop_update(leg.stop, arrival, "transfer");
                    self.mark_patterns_at(leg.stop);
                }
            }
        }
    }

    fn mark_patterns_at(&mut self, stop: usize) {
        for pattern in self.data.patterns_for_stop(stop) {
            self.state.mark_pattern(pattern);
        }
    }

    fn allows(&self, stop: usize) -> bool {
        self.stop_filter.as_ref().is_none_or(|filter| filter[stop])
    }

    fn trace_stop_update(&self, stop: usize, arrival: Time, how: &str) {
        if self.config.debug.stops.contains(&stop) {
            trace!(stop, arrival = %time_to_string(arrival), how, "stop improved");
        }
    }

    fn extract_iteration(
        cal: &C,
        egress_legs: &[AccessEgressLeg],
        state: &StdWorkerState<C>,
        departure_time: Time,
        include_in_averages: bool,
    ) -> IterationResult {
        let elapsed_seconds = egress_legs
            .iter()
            .map(|leg| {
                let arrival = state.final_transit_time(leg.stop);
                if arrival == cal.unreached_time() {
                    UNREACHED
                } else {
                    let at_destination = cal.add(arrival, leg.duration_seconds);
                    if C::FORWARD {
                        at_destination - departure_time
                    } else {
                        departure_time - at_destination
                    }
                }
            })
            .collect();
        IterationResult {
            departure_time,
            elapsed_seconds,
            include_in_averages,
        }
    }

    /// Reconstruct a path for every egress leg whose arrival improved in
    /// the latest scheduled iteration.
    fn collect_new_paths(
        &self,
        departure_time: Time,
        best_egress_clock: &mut [Time],
        paths: &mut Vec<Path>,
    ) {
        if !C::FORWARD {
            return;
        }
        for (index, leg) in self.egress_legs.iter().enumerate() {
            let arrival = self.state.final_transit_time(leg.stop);
            if arrival == self.cal.unreached_time() {
                continue;
            }
            let clock = self.cal.add(arrival, leg.duration_seconds);
            if !self.cal.is_best(clock, best_egress_clock[index]) {
                continue;
            }
            best_egress_clock[index] = clock;
            match path_builder::extract_path(
                &self.state,
                &self.access_legs,
                *leg,
                departure_time,
                &self.config.cost_factors,
            ) {
                Some(path) => {
                    if self.config.debug.paths {
                        trace!(%path, "new path");
                    }
                    paths.push(path);
                }
                None => warn!(
                    stop = leg.stop,
                    "destination reached but path reconstruction failed"
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hm;
    use crate::transit::{ForwardCalculator, TransitNetwork};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 6, 1).unwrap()
    }

    fn config() -> WorkerConfig {
        WorkerConfig {
            date: date(),
            binary_search_threshold: 50,
            monte_carlo_draws: 1,
            enable_frequencies: true,
            monte_carlo_seed: 7,
            cost_factors: CostFactors::default(),
            debug: DebugFlags::default(),
        }
    }

    fn run(
        network: &TransitNetwork,
        earliest: Time,
        latest: Time,
        access: Vec<AccessEgressLeg>,
        egress: Vec<AccessEgressLeg>,
    ) -> WorkerOutput {
        let cal = ForwardCalculator::new(60, earliest, latest, 60, 12 * 3600);
        let mut worker =
            RangeRaptorWorker::new(network, cal, config(), 4, access, egress, None);
        worker.route()
    }

    /// One route A(0) -> B(1) -> C(2), trip 08:00 -> 08:10/08:11 -> 08:25.
    fn single_route_network() -> TransitNetwork {
        let mut b = TransitNetwork::builder(3);
        let svc = b.service(&[date()]);
        let p = b.pattern(&[0, 1, 2]).unwrap();
        b.trip(
            p,
            svc,
            &[
                (hm(8, 0), hm(8, 0)),
                (hm(8, 10), hm(8, 11)),
                (hm(8, 25), hm(8, 25)),
            ],
        )
        .unwrap();
        b.build()
    }

    #[test]
    fn reaches_destination_on_single_route() {
        let network = single_route_network();
        let output = run(
            &network,
            hm(7, 55),
            hm(7, 55),
            vec![AccessEgressLeg::new(0, 0)],
            vec![AccessEgressLeg::new(2, 0)],
        );

        assert_eq!(output.iterations.len(), 1);
        assert_eq!(
            output.iterations[0].elapsed_seconds[0],
            hm(8, 25) - hm(7, 55)
        );
        assert_eq!(output.paths.len(), 1);
        assert_eq!(output.paths[0].arrival_time(), hm(8, 25));
    }

    #[test]
    fn departure_after_last_trip_is_unreached() {
        let network = single_route_network();
        let output = run(
            &network,
            hm(8, 1),
            hm(8, 1),
            vec![AccessEgressLeg::new(0, 0)],
            vec![AccessEgressLeg::new(2, 0)],
        );
        assert_eq!(output.iterations[0].elapsed_seconds[0], UNREACHED);
        assert!(output.paths.is_empty());
    }

    #[test]
    fn board_slack_is_enforced_on_boarding() {
        // Trip departs 60s after the access arrival; with 60s slack it is
        // boardable exactly, but a trip departing 59s after is not.
        let mut b = TransitNetwork::builder(2);
        let svc = b.service(&[date()]);
        let p = b.pattern(&[0, 1]).unwrap();
        b.trip(p, svc, &[(hm(8, 1), hm(8, 1)), (hm(8, 20), hm(8, 20))])
            .unwrap();
        let network = b.build();

        let output = run(
            &network,
            hm(8, 0),
            hm(8, 0),
            vec![AccessEgressLeg::new(0, 0)],
            vec![AccessEgressLeg::new(1, 0)],
        );
        assert_eq!(output.iterations[0].elapsed_seconds[0], 20 * 60);

        let output = run(
            &network,
            hm(8, 0) + 1,
            hm(8, 0) + 1,
            vec![AccessEgressLeg::new(0, 0)],
            vec![AccessEgressLeg::new(1, 0)],
        );
        assert_eq!(output.iterations[0].elapsed_seconds[0], UNREACHED);
    }

    #[test]
    fn transfer_between_routes() {
        // Route 1: A(0) -> B(1) arriving 08:10; route 2: B(2) -> C(3)
        // departing 08:15; zero-length transfer B -> B.
        let mut b = TransitNetwork::builder(4);
        let svc = b.service(&[date()]);
        let p1 = b.pattern(&[0, 1]).unwrap();
        b.trip(p1, svc, &[(hm(8, 0), hm(8, 0)), (hm(8, 10), hm(8, 10))])
            .unwrap();
        let p2 = b.pattern(&[2, 3]).unwrap();
        b.trip(p2, svc, &[(hm(8, 15), hm(8, 15)), (hm(8, 30), hm(8, 30))])
            .unwrap();
        b.transfer(1, 2, 0, 0).unwrap();
        let network = b.build();

        let output = run(
            &network,
            hm(8, 0),
            hm(8, 0),
            vec![AccessEgressLeg::new(0, 0)],
            vec![AccessEgressLeg::new(3, 0)],
        );

        assert_eq!(output.iterations[0].elapsed_seconds[0], 30 * 60);
        assert_eq!(output.paths.len(), 1);
        let path = &output.paths[0];
        assert_eq!(path.num_transits(), 2);
        // Board slack holds across the transfer: arrive 08:10, board 08:15.
        let board = path.legs()[3].from_time();
        assert!(board >= hm(8, 10) + 60);
    }

    #[test]
    fn reboards_earlier_trip_when_stop_reached_faster() {
        // The slow pattern 0 reaches B(1) at 08:20 having left A at 08:00.
        // An express pattern 1 reaches B at 08:05, early enough to catch
        // pattern 0's *first* trip at B (dep 08:07) instead of waiting for
        // a later one.
        let mut b = TransitNetwork::builder(4);
        let svc = b.service(&[date()]);
        let slow = b.pattern(&[0, 1, 2]).unwrap();
        b.trip(
            slow,
            svc,
            &[
                (hm(8, 0), hm(8, 0)),
                (hm(8, 7), hm(8, 7)),
                (hm(8, 40), hm(8, 40)),
            ],
        )
        .unwrap();
        b.trip(
            slow,
            svc,
            &[
                (hm(8, 30), hm(8, 30)),
                (hm(8, 37), hm(8, 37)),
                (hm(9, 10), hm(9, 10)),
            ],
        )
        .unwrap();
        let express = b.pattern(&[3, 1]).unwrap();
        b.trip(
            express,
            svc,
            &[(hm(8, 1), hm(8, 1)), (hm(8, 5), hm(8, 5))],
        )
        .unwrap();
        b.transfer(1, 1, 0, 0).unwrap();
        let network = b.build();

        // Access reaches both A (slow head) and D (express head).
        let output = run(
            &network,
            hm(8, 0),
            hm(8, 0),
            vec![AccessEgressLeg::new(0, 0), AccessEgressLeg::new(3, 0)],
            vec![AccessEgressLeg::new(2, 0)],
        );

        // Round 1: express to B at 08:05. Round 2: the slow pattern's
        // first trip leaves B at 08:07, within slack (08:05 + 60s), so the
        // worker switches to it and reaches C at 08:40.
        assert_eq!(output.iterations[0].elapsed_seconds[0], 40 * 60);
        let best = output
            .paths
            .iter()
            .min_by_key(|p| p.arrival_time())
            .unwrap();
        assert_eq!(best.arrival_time(), hm(8, 40));
    }

    #[test]
    fn range_reuse_matches_single_minutes() {
        let network = single_route_network();
        let ranged = run(
            &network,
            hm(7, 50),
            hm(8, 5),
            vec![AccessEgressLeg::new(0, 0)],
            vec![AccessEgressLeg::new(2, 0)],
        );
        assert_eq!(ranged.iterations.len(), 16);

        for iteration in &ranged.iterations {
            let single = run(
                &network,
                iteration.departure_time,
                iteration.departure_time,
                vec![AccessEgressLeg::new(0, 0)],
                vec![AccessEgressLeg::new(2, 0)],
            );
            assert_eq!(
                iteration.elapsed_seconds, single.iterations[0].elapsed_seconds,
                "minute {}",
                time_to_string(iteration.departure_time)
            );
        }
    }

    #[test]
    fn round_bound_limits_transits() {
        // Chain 0 -> 1 -> 2 -> 3 needing three rides, worker limited to
        // two rounds (one transfer).
        let mut b = TransitNetwork::builder(4);
        let svc = b.service(&[date()]);
        for (i, dep) in [(0usize, hm(8, 0)), (1, hm(8, 20)), (2, hm(8, 40))] {
            let p = b.pattern(&[i, i + 1]).unwrap();
            b.trip(p, svc, &[(dep, dep), (dep + 600, dep + 600)]).unwrap();
            if i < 2 {
                b.transfer(i + 1, i + 1, 0, 0).unwrap();
            }
        }
        let network = b.build();

        let cal = ForwardCalculator::new(60, hm(8, 0), hm(8, 0), 60, 12 * 3600);
        // n_rounds = 3: round 0 access + two ride rounds.
        let mut worker = RangeRaptorWorker::new(
            &network,
            cal,
            config(),
            3,
            vec![AccessEgressLeg::new(0, 0)],
            vec![AccessEgressLeg::new(3, 0), AccessEgressLeg::new(2, 0)],
            None,
        );
        let output = worker.route();
        assert_eq!(output.iterations[0].elapsed_seconds[0], UNREACHED);
        assert_ne!(output.iterations[0].elapsed_seconds[1], UNREACHED);
        for path in &output.paths {
            assert!(path.num_transits() <= 2);
        }
    }
}
