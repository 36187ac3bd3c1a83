//! Routing request and configuration.
//!
//! A [`SearchRequest`] is validated at construction: the worker never
//! starts on an invalid request. Process-level tuning knobs live in
//! [`TuningParameters`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{AccessEgressLeg, Time};

/// Which worker answers the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Single-criterion earliest-arrival search at one departure minute.
    Standard,
    /// Single-criterion search over the whole departure window.
    RangeRaptor,
    /// Range search with reverse-search destination pruning.
    StdRangeRaptorWithHeuristics,
    /// Pareto search over arrival time, rides and generalised cost.
    MultiCriteria,
}

/// Weights for the generalised cost used by the multi-criteria search.
///
/// A ride costs `board_cost` plus its in-vehicle seconds; walking and
/// waiting seconds are scaled by their reluctance factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostFactors {
    pub board_cost: i32,
    pub walk_reluctance: f32,
    pub wait_reluctance: f32,
}

impl Default for CostFactors {
    fn default() -> Self {
        Self {
            board_cost: 300,
            walk_reluctance: 4.0,
            wait_reluctance: 1.0,
        }
    }
}

impl CostFactors {
    pub fn walk_cost(&self, seconds: i32) -> i32 {
        (self.walk_reluctance * seconds as f32).round() as i32
    }

    pub fn wait_cost(&self, seconds: i32) -> i32 {
        (self.wait_reluctance * seconds as f32).round() as i32
    }
}

/// Process-level tuning, read once when the service is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuningParameters {
    /// Rounds performed = transfers + 1.
    pub max_number_of_transfers: usize,
    /// Trip count above which the trip search switches to binary search.
    pub scheduled_trip_binary_search_threshold: usize,
    /// Step between departure minutes of the range search.
    pub iteration_departure_step_seconds: i32,
    /// Threads for dispatching heuristic searches; 0 runs in the caller.
    pub search_thread_pool_size: usize,
}

impl Default for TuningParameters {
    fn default() -> Self {
        Self {
            max_number_of_transfers: 12,
            scheduled_trip_binary_search_threshold: 50,
            iteration_departure_step_seconds: 60,
            search_thread_pool_size: 0,
        }
    }
}

/// Diagnostic-only flags; they add logging and never change results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugFlags {
    /// Stops whose arrival updates are traced.
    pub stops: Vec<usize>,
    /// Trace reconstructed paths.
    pub paths: bool,
}

/// Request construction failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// The departure window is inverted
    #[error("invalid departure window: latest ({1}) is before earliest ({0})")]
    InvalidWindow(Time, Time),

    /// No access or egress legs were supplied
    #[error("request must have at least one {0} leg")]
    NoLegs(&'static str),

    /// A leg has a negative duration
    #[error("{0} leg to stop {1} has a negative duration")]
    NegativeLegDuration(&'static str, usize),

    /// A non-positive tuning value that must be positive
    #[error("{0} must be positive")]
    NonPositive(&'static str),

    /// Board slack is negative
    #[error("board slack must be non-negative")]
    NegativeBoardSlack,
}

/// A validated routing request.
///
/// Build through [`SearchRequest::builder`]; the builder applies defaults
/// and `build()` rejects inconsistent requests, so a constructed request is
/// always safe to hand to a worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub earliest_departure_time: Time,
    pub latest_departure_time: Time,
    pub date: NaiveDate,
    pub profile: Profile,
    pub max_number_of_transfers: usize,
    pub board_slack_seconds: i32,
    pub iteration_departure_step_seconds: i32,
    pub max_trip_duration_seconds: i32,
    pub monte_carlo_draws_per_minute: usize,
    /// Seed for the frequency offset draws; a request is reproducible for a
    /// fixed seed.
    pub monte_carlo_seed: u64,
    pub access_legs: Vec<AccessEgressLeg>,
    pub egress_legs: Vec<AccessEgressLeg>,
    pub cost_factors: CostFactors,
    pub debug: DebugFlags,
}

impl SearchRequest {
    pub fn builder(date: NaiveDate, profile: Profile) -> RequestBuilder {
        RequestBuilder::new(date, profile)
    }

    /// Length of the departure window in whole minutes.
    pub fn search_window_length_minutes(&self) -> i32 {
        (self.latest_departure_time - self.earliest_departure_time) / 60
    }

    /// Number of departure minutes the range search iterates.
    pub fn num_iteration_minutes(&self) -> usize {
        let window = self.latest_departure_time - self.earliest_departure_time;
        (window / self.iteration_departure_step_seconds) as usize + 1
    }
}

/// Builder for [`SearchRequest`].
pub struct RequestBuilder {
    request: SearchRequest,
}

impl RequestBuilder {
    fn new(date: NaiveDate, profile: Profile) -> Self {
        let tuning = TuningParameters::default();
        Self {
            request: SearchRequest {
                earliest_departure_time: 0,
                latest_departure_time: 0,
                date,
                profile,
                max_number_of_transfers: tuning.max_number_of_transfers,
                board_slack_seconds: 60,
                iteration_departure_step_seconds: tuning.iteration_departure_step_seconds,
                max_trip_duration_seconds: 24 * 3600,
                monte_carlo_draws_per_minute: 1,
                monte_carlo_seed: 0,
                access_legs: Vec::new(),
                egress_legs: Vec::new(),
                cost_factors: CostFactors::default(),
                debug: DebugFlags::default(),
            },
        }
    }

    /// Set the departure window. For a single-minute search pass the same
    /// value twice.
    pub fn departure_window(mut self, earliest: Time, latest: Time) -> Self {
        self.request.earliest_departure_time = earliest;
        self.request.latest_departure_time = latest;
        self
    }

    pub fn access(mut self, leg: AccessEgressLeg) -> Self {
        self.request.access_legs.push(leg);
        self
    }

    pub fn egress(mut self, leg: AccessEgressLeg) -> Self {
        self.request.egress_legs.push(leg);
        self
    }

    pub fn max_number_of_transfers(mut self, transfers: usize) -> Self {
        self.request.max_number_of_transfers = transfers;
        self
    }

    pub fn board_slack_seconds(mut self, slack: i32) -> Self {
        self.request.board_slack_seconds = slack;
        self
    }

    pub fn iteration_departure_step_seconds(mut self, step: i32) -> Self {
        self.request.iteration_departure_step_seconds = step;
        self
    }

    pub fn max_trip_duration_seconds(mut self, duration: i32) -> Self {
        self.request.max_trip_duration_seconds = duration;
        self
    }

    pub fn monte_carlo_draws_per_minute(mut self, draws: usize) -> Self {
        self.request.monte_carlo_draws_per_minute = draws;
        self
    }

    pub fn monte_carlo_seed(mut self, seed: u64) -> Self {
        self.request.monte_carlo_seed = seed;
        self
    }

    pub fn cost_factors(mut self, factors: CostFactors) -> Self {
        self.request.cost_factors = factors;
        self
    }

    pub fn debug(mut self, debug: DebugFlags) -> Self {
        self.request.debug = debug;
        self
    }

    /// Validate and produce the request.
    pub fn build(self) -> Result<SearchRequest, RequestError> {
        let r = self.request;

        if r.latest_departure_time < r.earliest_departure_time {
            return Err(RequestError::InvalidWindow(
                r.earliest_departure_time,
                r.latest_departure_time,
            ));
        }
        if r.access_legs.is_empty() {
            return Err(RequestError::NoLegs("access"));
        }
        if r.egress_legs.is_empty() {
            return Err(RequestError::NoLegs("egress"));
        }
        for leg in &r.access_legs {
            if leg.duration_seconds < 0 {
                return Err(RequestError::NegativeLegDuration("access", leg.stop));
            }
        }
        for leg in &r.egress_legs {
            if leg.duration_seconds < 0 {
                return Err(RequestError::NegativeLegDuration("egress", leg.stop));
            }
        }
        if r.board_slack_seconds < 0 {
            return Err(RequestError::NegativeBoardSlack);
        }
        if r.iteration_departure_step_seconds <= 0 {
            return Err(RequestError::NonPositive("iteration departure step"));
        }
        if r.max_trip_duration_seconds <= 0 {
            return Err(RequestError::NonPositive("max trip duration"));
        }
        if r.iteration_departure_step_seconds < 60 {
            // Timetables are minute-resolution; a finer step only repeats work.
            warn!(
                step = r.iteration_departure_step_seconds,
                "iteration departure step below 60s degrades performance without \
                 improving results"
            );
        }
        Ok(r)
    }
}
