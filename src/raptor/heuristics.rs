//! Heuristic pre-searches for destination pruning.
//!
//! Two independent single-iteration standard searches bound every stop:
//! a forward search from the access legs gives the earliest possible
//! arrival, and a reverse search from the egress legs gives the latest
//! departure that still reaches the destination within the time budget. A
//! stop whose earliest arrival lies after its latest feasible departure can
//! never be part of an acceptable journey, so the main search skips it.
//!
//! The two searches are independent and may be dispatched in parallel on a
//! small thread pool.

use tracing::{debug, warn};

use crate::api::{CostFactors, DebugFlags, SearchRequest, TuningParameters};
use crate::domain::Time;
use crate::transit::{ForwardCalculator, ReverseCalculator, TransitData};

use super::std_worker::{RangeRaptorWorker, WorkerConfig};

fn heuristic_config(request: &SearchRequest, tuning: &TuningParameters) -> WorkerConfig {
    WorkerConfig {
        date: request.date,
        binary_search_threshold: tuning.scheduled_trip_binary_search_threshold,
        monte_carlo_draws: 0,
        // Heuristic bounds from a schedule-only search would over-prune a
        // network with frequency trips; callers must not ask for a filter
        // on such networks.
        enable_frequencies: false,
        monte_carlo_seed: request.monte_carlo_seed,
        cost_factors: CostFactors::default(),
        debug: DebugFlags::default(),
    }
}

/// Earliest possible arrival per stop, departing at the window start.
fn forward_heuristic_times<D: TransitData>(
    data: &D,
    request: &SearchRequest,
    tuning: &TuningParameters,
    n_rounds: usize,
) -> Vec<Time> {
    // The single-minute search must admit everything the whole window
    // admits, so its time budget is widened by the window length.
    let window = request.latest_departure_time - request.earliest_departure_time;
    let cal = ForwardCalculator::new(
        request.board_slack_seconds,
        request.earliest_departure_time,
        request.earliest_departure_time,
        request.iteration_departure_step_seconds,
        window + request.max_trip_duration_seconds,
    );
    let mut worker = RangeRaptorWorker::new(
        data,
        cal,
        heuristic_config(request, tuning),
        n_rounds,
        request.access_legs.clone(),
        request.egress_legs.clone(),
        None,
    );
    worker.route();
    worker.final_best_times()
}

/// Latest departure per stop that still reaches the destination by the end
/// of the time budget.
fn reverse_heuristic_times<D: TransitData>(
    data: &D,
    request: &SearchRequest,
    tuning: &TuningParameters,
    n_rounds: usize,
) -> Vec<Time> {
    // Searching back from the deadline must reach departures as early as
    // the window start, so the budget covers the window length too.
    let window = request.latest_departure_time - request.earliest_departure_time;
    let arrival_deadline = request.latest_departure_time + request.max_trip_duration_seconds;
    let cal = ReverseCalculator::new(
        request.board_slack_seconds,
        arrival_deadline,
        arrival_deadline,
        request.iteration_departure_step_seconds,
        window + request.max_trip_duration_seconds,
    );
    let mut worker = RangeRaptorWorker::new(
        data,
        cal,
        heuristic_config(request, tuning),
        n_rounds,
        request.egress_legs.clone(),
        request.access_legs.clone(),
        None,
    );
    worker.route();
    worker.final_best_times()
}

/// Compute the per-stop filter for the main search, or `None` when the
/// network has frequency trips (the schedule-only bounds would not be
/// valid there).
pub fn compute_stop_filter<D: TransitData + Sync>(
    data: &D,
    request: &SearchRequest,
    tuning: &TuningParameters,
) -> Option<Vec<bool>> {
    if data.has_frequencies() {
        warn!("network has frequency trips, skipping heuristic pruning");
        return None;
    }
    let n_rounds = request.max_number_of_transfers + 2;

    let (earliest_arrival, latest_departure) = if tuning.search_thread_pool_size > 0 {
        std::thread::scope(|scope| {
            let forward =
                scope.spawn(|| forward_heuristic_times(data, request, tuning, n_rounds));
            let reverse =
                scope.spawn(|| reverse_heuristic_times(data, request, tuning, n_rounds));
            (join(forward), join(reverse))
        })
    } else {
        (
            forward_heuristic_times(data, request, tuning, n_rounds),
            reverse_heuristic_times(data, request, tuning, n_rounds),
        )
    };

    let allowed: Vec<bool> = earliest_arrival
        .iter()
        .zip(&latest_departure)
        .map(|(&arrival, &departure)| {
            arrival != Time::MAX && departure != Time::MIN && arrival <= departure
        })
        .collect();

    debug!(
        allowed = allowed.iter().filter(|&&a| a).count(),
        stops = allowed.len(),
        "heuristic stop filter computed"
    );
    Some(allowed)
}

fn join<T>(handle: std::thread::ScopedJoinHandle<'_, T>) -> T {
    match handle.join() {
        Ok(value) => value,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Profile;
    use crate::domain::{AccessEgressLeg, hm};
    use crate::transit::{FrequencyEntry, TransitNetwork};
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 6, 1).unwrap()
    }

    /// A main line 0 -> 1 -> 2 and a dead-end branch 1 -> 3 that cannot
    /// continue to the egress stop.
    fn network() -> TransitNetwork {
        let mut b = TransitNetwork::builder(4);
        let svc = b.service(&[date()]);
        let main = b.pattern(&[0, 1, 2]).unwrap();
        b.trip(
            main,
            svc,
            &[
                (hm(8, 0), hm(8, 0)),
                (hm(8, 10), hm(8, 11)),
                (hm(8, 25), hm(8, 25)),
            ],
        )
        .unwrap();
        let branch = b.pattern(&[1, 3]).unwrap();
        b.trip(
            branch,
            svc,
            &[(hm(8, 15), hm(8, 15)), (hm(8, 30), hm(8, 30))],
        )
        .unwrap();
        b.build()
    }

    fn request() -> SearchRequest {
        SearchRequest::builder(date(), Profile::StdRangeRaptorWithHeuristics)
            .departure_window(hm(7, 50), hm(8, 5))
            .access(AccessEgressLeg::new(0, 0))
            .egress(AccessEgressLeg::new(2, 0))
            .build()
            .unwrap()
    }

    #[test]
    fn filter_keeps_line_and_drops_dead_end() {
        let network = network();
        let filter = compute_stop_filter(&network, &request(), &TuningParameters::default())
            .expect("scheduled network yields a filter");

        assert!(filter[0]);
        assert!(filter[1]);
        assert!(filter[2]);
        // Stop 3 is reachable forwards but can never reach the egress.
        assert!(!filter[3]);
    }

    #[test]
    fn parallel_dispatch_agrees_with_sequential() {
        let network = network();
        let sequential =
            compute_stop_filter(&network, &request(), &TuningParameters::default());
        let tuning = TuningParameters {
            search_thread_pool_size: 2,
            ..TuningParameters::default()
        };
        let parallel = compute_stop_filter(&network, &request(), &tuning);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn frequency_network_gets_no_filter() {
        let mut b = TransitNetwork::builder(2);
        let svc = b.service(&[date()]);
        let p = b.pattern(&[0, 1]).unwrap();
        b.frequency_trip(
            p,
            svc,
            &[(0, 0), (60, 60)],
            &[FrequencyEntry {
                start_time: hm(8, 0),
                end_time: hm(9, 0),
                headway_seconds: 600,
            }],
        )
        .unwrap();
        let network = b.build();

        assert_eq!(
            compute_stop_filter(&network, &request(), &TuningParameters::default()),
            None
        );
    }
}
