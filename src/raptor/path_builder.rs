//! Path reconstruction for the single-criterion search.
//!
//! The per-round arrival records form an implicit back-link graph: a
//! transit arrival points at its board stop in the previous round, a
//! transfer arrival at the stop it walked from. Carried times move between
//! rounds without their back-links, so the walk always resolves a time to
//! the earliest round that actually produced it; that round's record holds
//! the valid link data.

use tracing::warn;

use crate::api::CostFactors;
use crate::domain::{AccessEgressLeg, Path, PathLeg, Time};
use crate::transit::TransitCalculator;

use super::std_state::{NO_STOP, StdWorkerState};

/// Reconstruct the journey behind the current best transit arrival at an
/// egress stop. Returns `None` when the stop is unreached, or when the
/// record chain is inconsistent (an internal bug, logged).
pub fn extract_path<C: TransitCalculator + Clone>(
    state: &StdWorkerState<C>,
    access_legs: &[AccessEgressLeg],
    egress_leg: AccessEgressLeg,
    departure_time: Time,
    factors: &CostFactors,
) -> Option<Path> {
    if !C::FORWARD {
        return None;
    }
    let destination_stop = egress_leg.stop;
    let arrival = state.final_transit_time(destination_stop);
    if arrival == state.unreached_time() {
        return None;
    }

    let mut legs_reversed = vec![PathLeg::Egress {
        from_stop: destination_stop,
        from_time: arrival,
        to_time: arrival + egress_leg.duration_seconds,
    }];

    let last_round = state.num_rounds() - 1;
    let mut round = earliest_round_with_transit_time(state, destination_stop, arrival, last_round)?;
    let mut stop = destination_stop;

    loop {
        let record = state.round_arrivals(round);
        let Some(trip) = record.trips[stop] else {
            warn!(stop, round, "transit arrival record has no trip, path dropped");
            return None;
        };
        let board_stop = record.board_stops[stop];
        if board_stop == NO_STOP {
            warn!(stop, round, "transit arrival record has no board stop, path dropped");
            return None;
        }
        let board_stop = board_stop as usize;
        let board_time = record.board_times[stop];
        legs_reversed.push(PathLeg::Transit {
            pattern: trip.pattern,
            trip: trip.trip,
            from_stop: board_stop,
            to_stop: stop,
            from_time: board_time,
            to_time: record.transit_times[stop],
        });

        // Resolve the arrival the boarding departed from.
        let boarded_from = state.round_arrivals(round - 1).best_times[board_stop];
        let prev_round =
            earliest_round_with_best_time(state, board_stop, boarded_from, round - 1)?;
        let prev_record = state.round_arrivals(prev_round);

        if prev_round == 0 && prev_record.transfer_from[board_stop] == NO_STOP {
            // Seeded by an access leg; recover its duration from the request.
            let access = access_legs
                .iter()
                .filter(|leg| leg.stop == board_stop)
                .min_by_key(|leg| leg.duration_seconds)?;
            legs_reversed.push(PathLeg::Access {
                to_stop: board_stop,
                from_time: departure_time,
                to_time: departure_time + access.duration_seconds,
            });
            break;
        }

        if prev_record.transfer_from[board_stop] != NO_STOP {
            let walked_from = prev_record.transfer_from[board_stop] as usize;
            let duration = prev_record.transfer_durations[board_stop];
            legs_reversed.push(PathLeg::Transfer {
                from_stop: walked_from,
                to_stop: board_stop,
                from_time: boarded_from - duration,
                to_time: boarded_from,
            });
            let transit_time = prev_record.transit_times[walked_from];
            if transit_time == state.unreached_time() {
                warn!(
                    stop = walked_from,
                    round = prev_round,
                    "transfer origin has no transit arrival, path dropped"
                );
                return None;
            }
            round = earliest_round_with_transit_time(state, walked_from, transit_time, prev_round)?;
            stop = walked_from;
        } else {
            // Arrived by transit; continue from that record's own round.
            round = earliest_round_with_transit_time(state, board_stop, boarded_from, prev_round)?;
            stop = board_stop;
        }
    }

    legs_reversed.reverse();
    let cost = generalized_cost(&legs_reversed, factors);
    match Path::new(legs_reversed, cost) {
        Ok(path) => Some(path),
        Err(err) => {
            warn!(%err, "reconstructed path failed validation, dropped");
            None
        }
    }
}

fn earliest_round_with_transit_time<C: TransitCalculator + Clone>(
    state: &StdWorkerState<C>,
    stop: usize,
    time: Time,
    upto_round: usize,
) -> Option<usize> {
    (1..=upto_round).find(|&r| state.round_arrivals(r).transit_times[stop] == time)
}

fn earliest_round_with_best_time<C: TransitCalculator + Clone>(
    state: &StdWorkerState<C>,
    stop: usize,
    time: Time,
    upto_round: usize,
) -> Option<usize> {
    (0..=upto_round).find(|&r| state.round_arrivals(r).best_times[stop] == time)
}

/// Generalised cost of a finished leg chain, using the same formula as the
/// multi-criteria search.
fn generalized_cost(legs: &[PathLeg], factors: &CostFactors) -> i32 {
    let mut walk = 0;
    let mut in_vehicle = 0;
    let mut rides = 0;
    for leg in legs {
        match leg {
            PathLeg::Access { .. } | PathLeg::Egress { .. } | PathLeg::Transfer { .. } => {
                walk += leg.duration_seconds();
            }
            PathLeg::Transit { .. } => {
                in_vehicle += leg.duration_seconds();
                rides += 1;
            }
        }
    }
    let total = legs[legs.len() - 1].to_time() - legs[0].from_time();
    let wait = total - walk - in_vehicle;
    factors.board_cost * rides + factors.walk_cost(walk) + factors.wait_cost(wait) + in_vehicle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hm;
    use crate::raptor::std_state::TripRef;
    use crate::transit::ForwardCalculator;

    fn state() -> StdWorkerState<ForwardCalculator> {
        let cal = ForwardCalculator::new(60, hm(8, 0), hm(8, 0), 60, 12 * 3600);
        StdWorkerState::new(cal, 3, 4, 2)
    }

    #[test]
    fn rebuilds_single_ride_path() {
        let mut s = state();
        s.seed_access(0, hm(8, 1));
        s.begin_round(1);
        s.transit_to_stop(2, hm(8, 25), 0, hm(8, 5), TripRef { pattern: 0, trip: 0 });
        s.carry_to_final_round();

        let path = extract_path(
            &s,
            &[AccessEgressLeg::new(0, 60)],
            AccessEgressLeg::new(2, 120),
            hm(8, 0),
            &CostFactors::default(),
        )
        .unwrap();

        assert_eq!(path.num_transits(), 1);
        assert_eq!(path.departure_time(), hm(8, 0));
        assert_eq!(path.arrival_time(), hm(8, 25) + 120);
        let legs = path.legs();
        assert_eq!(
            legs[0],
            PathLeg::Access {
                to_stop: 0,
                from_time: hm(8, 0),
                to_time: hm(8, 1)
            }
        );
        assert_eq!(
            legs[1],
            PathLeg::Transit {
                pattern: 0,
                trip: 0,
                from_stop: 0,
                to_stop: 2,
                from_time: hm(8, 5),
                to_time: hm(8, 25)
            }
        );
    }

    #[test]
    fn rebuilds_transfer_path() {
        let mut s = state();
        s.seed_access(0, hm(8, 0));
        s.begin_round(1);
        s.transit_to_stop(1, hm(8, 10), 0, hm(8, 2), TripRef { pattern: 0, trip: 0 });
        s.transfer_to_stop(1, 2, 60, hm(8, 11));
        s.begin_round(2);
        s.transit_to_stop(3, hm(8, 30), 2, hm(8, 15), TripRef { pattern: 1, trip: 0 });
        s.carry_to_final_round();

        let path = extract_path(
            &s,
            &[AccessEgressLeg::new(0, 0)],
            AccessEgressLeg::new(3, 0),
            hm(8, 0),
            &CostFactors::default(),
        )
        .unwrap();

        assert_eq!(path.num_transits(), 2);
        assert_eq!(path.num_transfers(), 1);
        let legs = path.legs();
        assert_eq!(legs.len(), 5);
        assert_eq!(
            legs[2],
            PathLeg::Transfer {
                from_stop: 1,
                to_stop: 2,
                from_time: hm(8, 10),
                to_time: hm(8, 11)
            }
        );
    }

    #[test]
    fn unreached_destination_has_no_path() {
        let mut s = state();
        s.seed_access(0, hm(8, 1));
        s.carry_to_final_round();
        let path = extract_path(
            &s,
            &[AccessEgressLeg::new(0, 60)],
            AccessEgressLeg::new(3, 0),
            hm(8, 0),
            &CostFactors::default(),
        );
        assert!(path.is_none());
    }

    #[test]
    fn cost_combines_all_components() {
        // access 60s + ride 8:05-8:25 + egress 120s, departure 8:00.
        let legs = vec![
            PathLeg::Access {
                to_stop: 0,
                from_time: hm(8, 0),
                to_time: hm(8, 1),
            },
            PathLeg::Transit {
                pattern: 0,
                trip: 0,
                from_stop: 0,
                to_stop: 2,
                from_time: hm(8, 5),
                to_time: hm(8, 25),
            },
            PathLeg::Egress {
                from_stop: 2,
                from_time: hm(8, 25),
                to_time: hm(8, 27),
            },
        ];
        let factors = CostFactors::default();
        // walk 180s, in-vehicle 1200s, wait 240s.
        let expected = 300 + factors.walk_cost(180) + factors.wait_cost(240) + 1200;
        assert_eq!(generalized_cost(&legs, &factors), expected);
    }
}
