//! Profile dispatch for routing requests.
//!
//! The service owns the process-level tuning and builds one worker per
//! request. Workers are single-threaded; the only concurrency here is the
//! optional parallel dispatch of the two heuristic pre-searches.

use tracing::{info, instrument};

use crate::api::{Profile, SearchRequest, SearchResponse, TuningParameters};
use crate::domain::Time;
use crate::raptor::heuristics::compute_stop_filter;
use crate::raptor::mc::McRangeRaptorWorker;
use crate::raptor::std_worker::{RangeRaptorWorker, WorkerConfig};
use crate::transit::{ForwardCalculator, TransitData};

/// Entry point for routing requests.
#[derive(Debug, Clone, Default)]
pub struct RaptorService {
    tuning: TuningParameters,
}

impl RaptorService {
    pub fn new(tuning: TuningParameters) -> Self {
        Self { tuning }
    }

    pub fn tuning(&self) -> &TuningParameters {
        &self.tuning
    }

    /// Answer a request with the worker its profile selects. The request
    /// was validated at construction; an unreachable destination yields an
    /// empty response, not an error.
    #[instrument(skip_all, fields(profile = ?request.profile))]
    pub fn route<D: TransitData + Sync>(
        &self,
        data: &D,
        request: &SearchRequest,
    ) -> SearchResponse {
        info!(
            window_minutes = request.search_window_length_minutes(),
            access = request.access_legs.len(),
            egress = request.egress_legs.len(),
            "routing request"
        );
        let response = match request.profile {
            Profile::Standard => {
                // A plain single search at the window start.
                self.run_standard(
                    data,
                    request,
                    request.earliest_departure_time,
                    request.earliest_departure_time,
                    None,
                )
            }
            Profile::RangeRaptor => self.run_standard(
                data,
                request,
                request.earliest_departure_time,
                request.latest_departure_time,
                None,
            ),
            Profile::StdRangeRaptorWithHeuristics => {
                let filter = compute_stop_filter(data, request, &self.tuning);
                self.run_standard(
                    data,
                    request,
                    request.earliest_departure_time,
                    request.latest_departure_time,
                    filter,
                )
            }
            Profile::MultiCriteria => {
                let cal = self.calculator(
                    request,
                    request.earliest_departure_time,
                    request.latest_departure_time,
                );
                let mut worker = McRangeRaptorWorker::new(
                    data,
                    cal,
                    WorkerConfig::from_request(request, &self.tuning),
                    self.num_rounds(request),
                    request.access_legs.clone(),
                    request.egress_legs.clone(),
                );
                SearchResponse {
                    iterations: Vec::new(),
                    paths: worker.route(),
                }
            }
        };
        info!(
            iterations = response.iterations.len(),
            paths = response.paths.len(),
            unreached = response.is_unreached(),
            "request complete"
        );
        response
    }

    fn run_standard<D: TransitData>(
        &self,
        data: &D,
        request: &SearchRequest,
        earliest: Time,
        latest: Time,
        stop_filter: Option<Vec<bool>>,
    ) -> SearchResponse {
        let cal = self.calculator(request, earliest, latest);
        let mut worker = RangeRaptorWorker::new(
            data,
            cal,
            WorkerConfig::from_request(request, &self.tuning),
            self.num_rounds(request),
            request.access_legs.clone(),
            request.egress_legs.clone(),
            stop_filter,
        );
        let output = worker.route();
        SearchResponse {
            iterations: output.iterations,
            paths: output.paths,
        }
    }

    fn calculator(
        &self,
        request: &SearchRequest,
        earliest: Time,
        latest: Time,
    ) -> ForwardCalculator {
        ForwardCalculator::new(
            request.board_slack_seconds,
            earliest,
            latest,
            request.iteration_departure_step_seconds,
            request.max_trip_duration_seconds,
        )
    }

    /// Round 0 holds the access seeds; one extra round per permitted ride.
    fn num_rounds(&self, request: &SearchRequest) -> usize {
        request.max_number_of_transfers + 2
    }
}
