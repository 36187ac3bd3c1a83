//! In-memory transit network.
//!
//! A concrete [`TransitData`] implementation built up front and then
//! immutable, used by the service layer and by every test suite. The builder
//! validates schedules at construction so the search never has to.

use std::collections::HashSet;

use chrono::NaiveDate;

use super::pattern::{FrequencyEntry, ServiceId, TripPattern, TripSchedule};
use super::provider::TransitData;
use crate::domain::{Time, TransferLeg};

/// Timetable construction failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// Stop index out of range
    #[error("stop {0} is out of range (network has {1} stops)")]
    UnknownStop(usize, usize),

    /// Pattern index out of range
    #[error("pattern {0} is out of range")]
    UnknownPattern(usize),

    /// Service index out of range
    #[error("service {0} is out of range")]
    UnknownService(usize),

    /// Schedule arrays do not match the pattern's stop count
    #[error("trip has {actual} stop times but the pattern has {expected} stops")]
    StopCountMismatch { expected: usize, actual: usize },

    /// Stop times decrease along the pattern
    #[error("stop times decrease at stop position {0}")]
    NonMonotoneTimes(usize),

    /// A frequency entry is empty or has a non-positive headway
    #[error("invalid frequency entry: headway must be positive and start <= end")]
    InvalidFrequencyEntry,

    /// A transfer has a negative duration
    #[error("transfer duration must be non-negative")]
    NegativeTransferDuration,
}

/// A pattern under construction: stops fixed, trips still being added.
struct PatternDraft {
    stops: Vec<usize>,
    trips: Vec<TripSchedule>,
}

/// Builder for [`TransitNetwork`].
///
/// Typical use: register services, patterns, trips and transfers, then
/// `build()`. Trips are sorted by first departure per pattern at build time.
pub struct TransitNetworkBuilder {
    num_stops: usize,
    services: Vec<HashSet<NaiveDate>>,
    patterns: Vec<PatternDraft>,
    transfers: Vec<(usize, TransferLeg)>,
}

impl TransitNetworkBuilder {
    pub fn new(num_stops: usize) -> Self {
        Self {
            num_stops,
            services: Vec::new(),
            patterns: Vec::new(),
            transfers: Vec::new(),
        }
    }

    /// Register a service running on the given dates.
    pub fn service(&mut self, active_dates: &[NaiveDate]) -> ServiceId {
        self.services.push(active_dates.iter().copied().collect());
        ServiceId(self.services.len() - 1)
    }

    /// Register a pattern over the given stop sequence and return its index.
    pub fn pattern(&mut self, stops: &[usize]) -> Result<usize, NetworkError> {
        for &stop in stops {
            if stop >= self.num_stops {
                return Err(NetworkError::UnknownStop(stop, self.num_stops));
            }
        }
        self.patterns.push(PatternDraft {
            stops: stops.to_vec(),
            trips: Vec::new(),
        });
        Ok(self.patterns.len() - 1)
    }

    /// Add a scheduled trip to a pattern. `stop_times` holds one
    /// `(arrival, departure)` pair per stop position.
    pub fn trip(
        &mut self,
        pattern: usize,
        service: ServiceId,
        stop_times: &[(Time, Time)],
    ) -> Result<(), NetworkError> {
        let arrivals = stop_times.iter().map(|t| t.0).collect();
        let departures = stop_times.iter().map(|t| t.1).collect();
        self.add_trip(
            pattern,
            TripSchedule::new(service, arrivals, departures, vec![]),
        )
    }

    /// Add a frequency-defined trip. `profile` holds relative
    /// `(arrival, departure)` offsets from the first-stop departure, and
    /// `entries` the `(start, end, headway)` windows.
    pub fn frequency_trip(
        &mut self,
        pattern: usize,
        service: ServiceId,
        profile: &[(Time, Time)],
        entries: &[FrequencyEntry],
    ) -> Result<(), NetworkError> {
        if entries.is_empty() {
            return Err(NetworkError::InvalidFrequencyEntry);
        }
        for entry in entries {
            if entry.headway_seconds <= 0 || entry.start_time > entry.end_time {
                return Err(NetworkError::InvalidFrequencyEntry);
            }
        }
        let arrivals = profile.iter().map(|t| t.0).collect();
        let departures = profile.iter().map(|t| t.1).collect();
        self.add_trip(
            pattern,
            TripSchedule::new(service, arrivals, departures, entries.to_vec()),
        )
    }

    /// Add a one-directional transfer. Use twice for a symmetric pair.
    pub fn transfer(
        &mut self,
        from_stop: usize,
        to_stop: usize,
        duration_seconds: i32,
        cost: i32,
    ) -> Result<(), NetworkError> {
        if from_stop >= self.num_stops {
            return Err(NetworkError::UnknownStop(from_stop, self.num_stops));
        }
        if to_stop >= self.num_stops {
            return Err(NetworkError::UnknownStop(to_stop, self.num_stops));
        }
        if duration_seconds < 0 {
            return Err(NetworkError::NegativeTransferDuration);
        }
        self.transfers
            .push((from_stop, TransferLeg::new(to_stop, duration_seconds, cost)));
        Ok(())
    }

    pub fn build(self) -> TransitNetwork {
        let num_stops = self.num_stops;
        let patterns: Vec<TripPattern> = self
            .patterns
            .into_iter()
            .map(|draft| TripPattern::new(draft.stops, draft.trips))
            .collect();

        let mut patterns_for_stop: Vec<Vec<usize>> = vec![Vec::new(); num_stops];
        for (index, pattern) in patterns.iter().enumerate() {
            for &stop in pattern.stops() {
                // A looping pattern visits a stop twice; list it once.
                if patterns_for_stop[stop].last() != Some(&index) {
                    patterns_for_stop[stop].push(index);
                }
            }
        }

        let mut transfers_from: Vec<Vec<TransferLeg>> = vec![Vec::new(); num_stops];
        let mut transfers_to: Vec<Vec<TransferLeg>> = vec![Vec::new(); num_stops];
        for (from_stop, leg) in self.transfers {
            transfers_to[leg.stop].push(TransferLeg::new(
                from_stop,
                leg.duration_seconds,
                leg.cost,
            ));
            transfers_from[from_stop].push(leg);
        }

        let has_frequencies = patterns.iter().any(TripPattern::has_frequencies);

        TransitNetwork {
            num_stops,
            patterns,
            patterns_for_stop,
            transfers_from,
            transfers_to,
            services: self.services,
            has_frequencies,
        }
    }

    fn add_trip(&mut self, pattern: usize, trip: TripSchedule) -> Result<(), NetworkError> {
        if trip.service().0 >= self.services.len() {
            return Err(NetworkError::UnknownService(trip.service().0));
        }
        let draft = self
            .patterns
            .get_mut(pattern)
            .ok_or(NetworkError::UnknownPattern(pattern))?;
        if trip.num_stops() != draft.stops.len() {
            return Err(NetworkError::StopCountMismatch {
                expected: draft.stops.len(),
                actual: trip.num_stops(),
            });
        }
        for pos in 0..trip.num_stops() {
            if trip.arrival(pos) > trip.departure(pos) {
                return Err(NetworkError::NonMonotoneTimes(pos));
            }
            if pos > 0 && trip.arrival(pos) < trip.departure(pos - 1) {
                return Err(NetworkError::NonMonotoneTimes(pos));
            }
        }
        draft.trips.push(trip);
        Ok(())
    }
}

/// Immutable in-memory transit network.
#[derive(Debug)]
pub struct TransitNetwork {
    num_stops: usize,
    patterns: Vec<TripPattern>,
    patterns_for_stop: Vec<Vec<usize>>,
    transfers_from: Vec<Vec<TransferLeg>>,
    transfers_to: Vec<Vec<TransferLeg>>,
    services: Vec<HashSet<NaiveDate>>,
    has_frequencies: bool,
}

impl TransitNetwork {
    pub fn builder(num_stops: usize) -> TransitNetworkBuilder {
        TransitNetworkBuilder::new(num_stops)
    }
}

impl TransitData for TransitNetwork {
    fn num_stops(&self) -> usize {
        self.num_stops
    }

    fn num_patterns(&self) -> usize {
        self.patterns.len()
    }

    fn num_services(&self) -> usize {
        self.services.len()
    }

    fn pattern(&self, pattern_index: usize) -> &TripPattern {
        &self.patterns[pattern_index]
    }

    fn patterns_for_stop(&self, stop: usize) -> impl Iterator<Item = usize> + '_ {
        self.patterns_for_stop[stop].iter().copied()
    }

    fn transfers_from(&self, stop: usize) -> impl Iterator<Item = TransferLeg> + '_ {
        self.transfers_from[stop].iter().copied()
    }

    fn transfers_to(&self, stop: usize) -> impl Iterator<Item = TransferLeg> + '_ {
        self.transfers_to[stop].iter().copied()
    }

    fn is_service_active(&self, service: ServiceId, date: NaiveDate) -> bool {
        self.services[service.0].contains(&date)
    }

    fn has_frequencies(&self) -> bool {
        self.has_frequencies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hm;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 6, 1).unwrap()
    }

    #[test]
    fn build_small_network() {
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
        b.transfer(1, 2, 120, 480).unwrap();
        let network = b.build();

        assert_eq!(network.num_stops(), 3);
        assert_eq!(network.num_patterns(), 1);
        assert!(network.is_service_active(svc, date()));
        assert!(!network.is_service_active(svc, date().succ_opt().unwrap()));
        assert!(!network.has_frequencies());

        let from_one: Vec<_> = network.transfers_from(1).collect();
        assert_eq!(from_one, vec![TransferLeg::new(2, 120, 480)]);
        let to_two: Vec<_> = network.transfers_to(2).collect();
        assert_eq!(to_two, vec![TransferLeg::new(1, 120, 480)]);

        let patterns: Vec<_> = network.patterns_for_stop(1).collect();
        assert_eq!(patterns, vec![0]);
    }

    #[test]
    fn rejects_unknown_stop_in_pattern() {
        let mut b = TransitNetwork::builder(2);
        assert_eq!(b.pattern(&[0, 5]), Err(NetworkError::UnknownStop(5, 2)));
    }

    #[test]
    fn rejects_decreasing_stop_times() {
        let mut b = TransitNetwork::builder(2);
        let svc = b.service(&[date()]);
        let p = b.pattern(&[0, 1]).unwrap();
        let result = b.trip(p, svc, &[(hm(8, 30), hm(8, 30)), (hm(8, 10), hm(8, 10))]);
        assert_eq!(result, Err(NetworkError::NonMonotoneTimes(1)));

        // Departure before arrival at the same stop is also invalid.
        let result = b.trip(p, svc, &[(hm(8, 0), hm(7, 55)), (hm(8, 10), hm(8, 10))]);
        assert_eq!(result, Err(NetworkError::NonMonotoneTimes(0)));
    }

    #[test]
    fn rejects_mismatched_stop_count() {
        let mut b = TransitNetwork::builder(3);
        let svc = b.service(&[date()]);
        let p = b.pattern(&[0, 1, 2]).unwrap();
        let result = b.trip(p, svc, &[(hm(8, 0), hm(8, 0)), (hm(8, 10), hm(8, 10))]);
        assert_eq!(
            result,
            Err(NetworkError::StopCountMismatch {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn rejects_bad_frequency_entry() {
        let mut b = TransitNetwork::builder(2);
        let svc = b.service(&[date()]);
        let p = b.pattern(&[0, 1]).unwrap();
        let result = b.frequency_trip(
            p,
            svc,
            &[(0, 0), (60, 60)],
            &[FrequencyEntry {
                start_time: hm(9, 0),
                end_time: hm(8, 0),
                headway_seconds: 600,
            }],
        );
        assert_eq!(result, Err(NetworkError::InvalidFrequencyEntry));
    }

    #[test]
    fn frequency_network_is_flagged() {
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
        assert!(b.build().has_frequencies());
    }
}
