//! Multi-criteria stop-arrival state.
//!
//! One pareto set of arrivals per stop, plus a destination-wide pareto set
//! fed by transit arrivals at egress stops. The per-stop sets persist
//! across departure minutes: arrivals found for a later departure remain
//! valid upper bounds for earlier ones and reject anything they dominate.

use tracing::trace;

use crate::api::CostFactors;
use crate::domain::{AccessEgressLeg, Time, time_to_string};
use crate::raptor::pareto::ParetoSet;
use crate::util::BitSet;

use super::arrival::{ArrivalArena, ArrivalKind, ArrivalRef, McArrival, stop_arrival_dominance};

type StopSet = ParetoSet<ArrivalRef, fn(&ArrivalRef, &ArrivalRef) -> bool>;
type DestinationSet = ParetoSet<DestinationArrival, fn(&DestinationArrival, &DestinationArrival) -> bool>;

/// An egress-completed journey candidate in the destination pareto set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestinationArrival {
    /// Arena index of the transit arrival at the egress stop.
    pub arrival_index: usize,
    pub egress: AccessEgressLeg,
    pub arrival_time: Time,
    pub num_rides: usize,
    pub cost: i32,
}

/// Earlier arrival, fewer rides or lower cost each dominate.
fn destination_dominance(a: &DestinationArrival, b: &DestinationArrival) -> bool {
    a.arrival_time < b.arrival_time || a.num_rides < b.num_rides || a.cost < b.cost
}

/// State of one multi-criteria search: the arrival arena, the per-stop
/// pareto sets and the destination set.
pub struct McWorkerState {
    arena: ArrivalArena,
    stops: Vec<StopSet>,
    /// Egress legs grouped by stop; arrivals there feed the destination.
    egress_for_stop: Vec<Vec<AccessEgressLeg>>,
    destination: DestinationSet,
    /// Stops holding arrivals not yet consumed as round input.
    touched: BitSet,
    factors: CostFactors,
}

impl McWorkerState {
    pub fn new(n_stops: usize, egress_legs: &[AccessEgressLeg], factors: CostFactors) -> Self {
        let mut egress_for_stop = vec![Vec::new(); n_stops];
        for leg in egress_legs {
            egress_for_stop[leg.stop].push(*leg);
        }
        Self {
            arena: ArrivalArena::default(),
            stops: (0..n_stops)
                .map(|_| ParetoSet::new(stop_arrival_dominance as fn(&_, &_) -> bool))
                .collect(),
            egress_for_stop,
            destination: ParetoSet::new(destination_dominance as fn(&_, &_) -> bool),
            touched: BitSet::new(n_stops),
            factors,
        }
    }

    /// Prepare for a new departure minute. Arrivals from later minutes are
    /// kept as dominance bounds but never re-expanded: every marker moves
    /// to the end so the new minute only streams its own additions.
    pub fn reset_iteration(&mut self) {
        self.touched.clear();
        for set in &mut self.stops {
            set.mark_at_end();
        }
    }

    /// Seed an access leg at the given departure minute.
    pub fn seed_access(&mut self, leg: AccessEgressLeg, departure_time: Time) -> bool {
        let arrival_time = departure_time + leg.duration_seconds;
        let cost = self.factors.walk_cost(leg.duration_seconds) + leg.cost;
        self.add_arrival(McArrival {
            stop: leg.stop,
            round: 0,
            arrival_time,
            cost,
            previous: None,
            kind: ArrivalKind::Access {
                duration: leg.duration_seconds,
            },
        })
    }

    /// Add a transit arrival; an accepted arrival at an egress stop also
    /// offers a candidate to the destination set.
    #[allow(clippy::too_many_arguments)]
    pub fn transit_to_stop(
        &mut self,
        round: usize,
        stop: usize,
        arrival_time: Time,
        cost: i32,
        pattern: usize,
        trip: usize,
        board_stop: usize,
        board_time: Time,
        previous: usize,
    ) -> bool {
        self.add_arrival(McArrival {
            stop,
            round,
            arrival_time,
            cost,
            previous: Some(previous),
            kind: ArrivalKind::Transit {
                pattern,
                trip,
                board_stop,
                board_time,
            },
        })
    }

    /// Add a transfer arrival.
    pub fn transfer_to_stop(
        &mut self,
        round: usize,
        to_stop: usize,
        arrival_time: Time,
        cost: i32,
        from_stop: usize,
        duration: i32,
        previous: usize,
    ) -> bool {
        self.add_arrival(McArrival {
            stop: to_stop,
            round,
            arrival_time,
            cost,
            previous: Some(previous),
            kind: ArrivalKind::Transfer { from_stop, duration },
        })
    }

    fn add_arrival(&mut self, arrival: McArrival) -> bool {
        let stop = arrival.stop;
        let candidate = ArrivalRef {
            index: self.arena.len(),
            round: arrival.round,
            arrival_time: arrival.arrival_time,
            cost: arrival.cost,
            arrived_by_transit: arrival.arrived_by_transit(),
        };
        // qualify() first keeps rejected candidates out of the arena.
        if !self.stops[stop].qualify(&candidate) {
            return false;
        }
        let index = self.arena.push(arrival);
        debug_assert_eq!(index, candidate.index);
        self.stops[stop].add(candidate);
        self.touched.insert(stop);

        if arrival.arrived_by_transit() {
            for i in 0..self.egress_for_stop[stop].len() {
                let egress = self.egress_for_stop[stop][i];
                self.offer_destination(candidate, egress);
            }
        }
        true
    }

    fn offer_destination(&mut self, arrival: ArrivalRef, egress: AccessEgressLeg) {
        let candidate = DestinationArrival {
            arrival_index: arrival.index,
            egress,
            arrival_time: arrival.arrival_time + egress.duration_seconds,
            num_rides: arrival.round,
            cost: arrival.cost + self.factors.walk_cost(egress.duration_seconds) + egress.cost,
        };
        if self.destination.add(candidate) {
            trace!(
                arrival = %time_to_string(candidate.arrival_time),
                rides = candidate.num_rides,
                cost = candidate.cost,
                "destination arrival accepted"
            );
        }
    }

    /// Stops with unconsumed arrivals.
    pub fn touched_stops(&self) -> Vec<usize> {
        self.touched.iter().collect()
    }

    pub fn has_touched_stops(&self) -> bool {
        !self.touched.is_empty()
    }

    /// Consume the arrivals added since the stop was last consumed: they
    /// are returned, the marker advances past them, and the stop is no
    /// longer touched.
    pub fn take_round_input(&mut self, stop: usize) -> Vec<ArrivalRef> {
        let input: Vec<ArrivalRef> = self.stops[stop].stream_after_marker().copied().collect();
        self.stops[stop].mark_at_end();
        input
    }

    pub fn clear_touched(&mut self) {
        self.touched.clear();
    }

    /// Transit arrivals added in the current round at a stop, without
    /// consuming the marker; input to the transfer relaxation.
    pub fn new_transit_arrivals(&self, stop: usize) -> Vec<ArrivalRef> {
        self.stops[stop]
            .stream_after_marker()
            .filter(|a| a.arrived_by_transit)
            .copied()
            .collect()
    }

    pub fn arrival(&self, index: usize) -> &McArrival {
        self.arena.get(index)
    }

    pub fn destination_arrivals(&self) -> impl Iterator<Item = &DestinationArrival> {
        self.destination.iter()
    }

    pub fn factors(&self) -> &CostFactors {
        &self.factors
    }

    /// Live arrivals at a stop, mainly for tests and diagnostics.
    pub fn arrivals_at(&self, stop: usize) -> Vec<ArrivalRef> {
        self.stops[stop].iter().copied().collect()
    }
}
