//! Search results.

use serde::{Deserialize, Serialize};

use crate::domain::{Path, Time, UNREACHED};

/// Results of one search iteration (departure minute, or departure minute
/// plus one frequency draw).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationResult {
    /// The departure time this iteration searched from.
    pub departure_time: Time,
    /// Elapsed seconds to each egress leg (same order as the request's
    /// egress legs), [`UNREACHED`] when the leg's stop was never reached.
    pub elapsed_seconds: Vec<Time>,
    /// False for the frequency best-case and worst-case iterations, which
    /// bound the distribution but must not enter statistical averages.
    pub include_in_averages: bool,
}

impl IterationResult {
    /// Elapsed seconds for one egress leg, `None` when unreached.
    pub fn elapsed_to(&self, egress_index: usize) -> Option<Time> {
        let elapsed = self.elapsed_seconds[egress_index];
        (elapsed != UNREACHED).then_some(elapsed)
    }
}

/// Response of a routing request.
///
/// Standard profiles fill `iterations` (one entry per departure minute and
/// frequency draw, latest minute first) and reconstruct the distinct
/// journeys into `paths`. The multi-criteria profile returns the
/// destination pareto set as `paths` and leaves `iterations` empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub iterations: Vec<IterationResult>,
    pub paths: Vec<Path>,
}

impl SearchResponse {
    /// True when no egress leg was ever reached and no path was found.
    pub fn is_unreached(&self) -> bool {
        self.paths.is_empty()
            && self
                .iterations
                .iter()
                .all(|it| it.elapsed_seconds.iter().all(|&e| e == UNREACHED))
    }

    /// Best elapsed seconds to an egress leg over all iterations.
    pub fn best_elapsed_to(&self, egress_index: usize) -> Option<Time> {
        self.iterations
            .iter()
            .filter_map(|it| it.elapsed_to(egress_index))
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_lookup_hides_sentinel() {
        let iteration = IterationResult {
            departure_time: 0,
            elapsed_seconds: vec![600, UNREACHED],
            include_in_averages: true,
        };
        assert_eq!(iteration.elapsed_to(0), Some(600));
        assert_eq!(iteration.elapsed_to(1), None);
    }

    #[test]
    fn unreached_response() {
        let response = SearchResponse {
            iterations: vec![IterationResult {
                departure_time: 0,
                elapsed_seconds: vec![UNREACHED],
                include_in_averages: true,
            }],
            paths: vec![],
        };
        assert!(response.is_unreached());
        assert_eq!(response.best_elapsed_to(0), None);
    }

    #[test]
    fn best_elapsed_over_iterations() {
        let response = SearchResponse {
            iterations: vec![
                IterationResult {
                    departure_time: 120,
                    elapsed_seconds: vec![900],
                    include_in_averages: true,
                },
                IterationResult {
                    departure_time: 60,
                    elapsed_seconds: vec![840],
                    include_in_averages: true,
                },
            ],
            paths: vec![],
        };
        assert_eq!(response.best_elapsed_to(0), Some(840));
    }
}
