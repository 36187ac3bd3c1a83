//! The multi-criteria Range-RAPTOR worker.
//!
//! Same outer shape as the single-criterion worker, but the input to each
//! round is the set of arrivals added in the previous round rather than a
//! scalar best time per stop: every such arrival enumerates its own
//! boardings, and every update goes through a per-stop pareto set. Egress
//! stops feed a destination-wide pareto set whose survivors become the
//! response paths.
//!
//! Frequency-defined trips are not explored by this worker; their trip
//! identity does not survive pareto back-links across randomized draws.

use tracing::{debug, trace, warn};

use crate::domain::{AccessEgressLeg, Path, PathLeg, Time, time_to_string};
use crate::transit::{
    ForwardCalculator, ServiceId, TransitCalculator, TransitData, find_boarding,
};
use crate::util::BitSet;

use super::super::std_worker::WorkerConfig;
use super::arrival::{ArrivalKind, ArrivalRef};
use super::state::McWorkerState;

/// A vehicle currently being ridden during one pattern sweep.
#[derive(Debug, Clone, Copy)]
struct Ride {
    trip_index: usize,
    board_stop: usize,
    board_time: Time,
    prev_index: usize,
    prev_time: Time,
    prev_cost: i32,
}

/// Multi-criteria worker over arrival time, number of rides and
/// generalised cost.
pub struct McRangeRaptorWorker<'a, D: TransitData> {
    data: &'a D,
    cal: ForwardCalculator,
    config: WorkerConfig,
    n_rounds: usize,
    access_legs: Vec<AccessEgressLeg>,
    state: McWorkerState,
    services_active: Vec<bool>,
    /// Previous-round arrivals per stop, valid during one round.
    round_input: Vec<Vec<ArrivalRef>>,
}

impl<'a, D: TransitData> McRangeRaptorWorker<'a, D> {
    pub fn new(
        data: &'a D,
        cal: ForwardCalculator,
        config: WorkerConfig,
        n_rounds: usize,
        access_legs: Vec<AccessEgressLeg>,
        egress_legs: Vec<AccessEgressLeg>,
    ) -> Self {
        let services_active = (0..data.num_services())
            .map(|s| data.is_service_active(ServiceId(s), config.date))
            .collect();
        let state = McWorkerState::new(data.num_stops(), &egress_legs, config.cost_factors);
        Self {
            data,
            cal,
            config,
            n_rounds,
            access_legs,
            state,
            services_active,
            round_input: vec![Vec::new(); data.num_stops()],
        }
    }

    /// Run the range search and return the destination pareto set as
    /// reconstructed paths, best arrival first.
    pub fn route(&mut self) -> Vec<Path> {
        let minutes: Vec<Time> = self.cal.iteration_departure_times().collect();
        debug!(
            minutes = minutes.len(),
            rounds = self.n_rounds,
            "starting multi-criteria search"
        );
        for minute in minutes {
            self.run_minute(minute);
        }
        let mut paths = self.extract_paths();
        paths.sort_by(|a, b| {
            a.arrival_time()
                .cmp(&b.arrival_time())
                .then(a.num_transits().cmp(&b.num_transits()))
                .then(a.cost().cmp(&b.cost()))
        });
        debug!(paths = paths.len(), "multi-criteria search complete");
        paths
    }

    fn run_minute(&mut self, departure_time: Time) {
        trace!(minute = %time_to_string(departure_time), "multi-criteria iteration");
        self.state.reset_iteration();
        for i in 0..self.access_legs.len() {
            let leg = self.access_legs[i];
            self.state.seed_access(leg, departure_time);
        }

        for round in 1..self.n_rounds {
            if !self.state.has_touched_stops() {
                break;
            }
            let input_stops = self.consume_round_input();
            if input_stops.is_empty() {
                break;
            }

            let mut patterns = BitSet::new(self.data.num_patterns());
            for &stop in &input_stops {
                for pattern in self.data.patterns_for_stop(stop) {
                    patterns.insert(pattern);
                }
            }
            let patterns: Vec<usize> = patterns.iter().collect();
            for pattern in patterns {
                self.sweep_pattern(round, pattern);
            }

            self.relax_transfers(round);

            for stop in input_stops {
                self.round_input[stop].clear();
            }
        }
    }

    /// Move the arrivals added in the previous round into `round_input`.
    /// Returns the stops that have input.
    fn consume_round_input(&mut self) -> Vec<usize> {
        let touched = self.state.touched_stops();
        self.state.clear_touched();
        let mut stops = Vec::with_capacity(touched.len());
        for stop in touched {
            let input = self.state.take_round_input(stop);
            if !input.is_empty() {
                self.round_input[stop] = input;
                stops.push(stop);
            }
        }
        stops
    }

    fn sweep_pattern(&mut self, round: usize, pattern_index: usize) {
        let pattern = self.data.pattern(pattern_index);
        if !pattern.any_service_active(&self.services_active) {
            return;
        }

        let mut rides: Vec<Ride> = Vec::new();

        for position in 0..pattern.num_stops() {
            let stop = pattern.stop_at(position);

            // Alight everything boarded further back in the pattern.
            for ride_index in 0..rides.len() {
                let ride = rides[ride_index];
                let trip = pattern.trip(ride.trip_index);
                let alight = trip.arrival(position);
                if self.cal.exceeds_time_limit(alight) {
                    continue;
                }
                let wait = ride.board_time - ride.prev_time;
                let in_vehicle = alight - ride.board_time;
                let factors = *self.state.factors();
                let cost = ride.prev_cost
                    + factors.board_cost
                    + factors.wait_cost(wait)
                    + in_vehicle;
                self.state.transit_to_stop(
                    round,
                    stop,
                    alight,
                    cost,
                    pattern_index,
                    ride.trip_index,
                    ride.board_stop,
                    ride.board_time,
                    ride.prev_index,
                );
            }

            // Board from every previous-round arrival at this stop.
            if self.round_input[stop].is_empty() {
                continue;
            }
            let input: Vec<ArrivalRef> = self.round_input[stop].clone();
            for arrival in input {
                if self.arrived_on_pattern(&arrival, pattern_index) {
                    continue;
                }
                let earliest_board = self.cal.earliest_board_time(arrival.arrival_time);
                if let Some(boarding) = find_boarding(
                    &self.cal,
                    pattern,
                    &self.services_active,
                    position,
                    earliest_board,
                    self.config.binary_search_threshold,
                ) {
                    rides.push(Ride {
                        trip_index: boarding.trip_index,
                        board_stop: stop,
                        board_time: boarding.board_time,
                        prev_index: arrival.index,
                        prev_time: arrival.arrival_time,
                        prev_cost: arrival.cost,
                    });
                }
            }
        }
    }

    /// True when the arrival rode transit on this very pattern; boarding it
    /// again would only ping-pong along the same stops.
    fn arrived_on_pattern(&self, arrival: &ArrivalRef, pattern_index: usize) -> bool {
        arrival.arrived_by_transit
            && matches!(
                self.state.arrival(arrival.index).kind,
                ArrivalKind::Transit { pattern, .. } if pattern == pattern_index
            )
    }

    /// Walk transfers out of every transit arrival added this round.
    fn relax_transfers(&mut self, round: usize) {
        let touched = self.state.touched_stops();
        for stop in touched {
            let transit_arrivals = self.state.new_transit_arrivals(stop);
            if transit_arrivals.is_empty() {
                continue;
            }
            let legs: Vec<_> = self.data.transfers_from(stop).collect();
            for leg in legs {
                for arrival in &transit_arrivals {
                    let arrival_time = arrival.arrival_time + leg.duration_seconds;
                    if self.cal.exceeds_time_limit(arrival_time) {
                        continue;
                    }
                    let cost = arrival.cost
                        + self.state.factors().walk_cost(leg.duration_seconds)
                        + leg.cost;
                    self.state.transfer_to_stop(
                        round,
                        leg.stop,
                        arrival_time,
                        cost,
                        stop,
                        leg.duration_seconds,
                        arrival.index,
                    );
                }
            }
        }
    }

    /// Map every destination arrival to a freshly allocated path.
    fn extract_paths(&self) -> Vec<Path> {
        let mut paths = Vec::new();
        for destination in self.state.destination_arrivals() {
            let mut legs_reversed = vec![PathLeg::Egress {
                from_stop: self.state.arrival(destination.arrival_index).stop,
                from_time: destination.arrival_time - destination.egress.duration_seconds,
                to_time: destination.arrival_time,
            }];

            let mut index = destination.arrival_index;
            let complete = loop {
                let arrival = self.state.arrival(index);
                match arrival.kind {
                    ArrivalKind::Transit {
                        pattern,
                        trip,
                        board_stop,
                        board_time,
                    } => {
                        legs_reversed.push(PathLeg::Transit {
                            pattern,
                            trip,
                            from_stop: board_stop,
                            to_stop: arrival.stop,
                            from_time: board_time,
                            to_time: arrival.arrival_time,
                        });
                    }
                    ArrivalKind::Transfer { from_stop, duration } => {
                        legs_reversed.push(PathLeg::Transfer {
                            from_stop,
                            to_stop: arrival.stop,
                            from_time: arrival.arrival_time - duration,
                            to_time: arrival.arrival_time,
                        });
                    }
                    ArrivalKind::Access { duration } => {
                        legs_reversed.push(PathLeg::Access {
                            to_stop: arrival.stop,
                            from_time: arrival.arrival_time - duration,
                            to_time: arrival.arrival_time,
                        });
                        break true;
                    }
                }
                match arrival.previous {
                    Some(previous) => index = previous,
                    None => break false,
                }
            };

            if !complete {
                warn!("destination back-link chain does not end in an access leg");
                continue;
            }
            legs_reversed.reverse();
            match Path::new(legs_reversed, destination.cost) {
                Ok(path) => paths.push(path),
                Err(err) => warn!(%err, "destination path failed validation, dropped"),
            }
        }
        paths
    }
}
