//! Trip patterns and trip schedules.
//!
//! A trip pattern is an ordered sequence of stops traversed by a set of
//! trips. A trip is either fully scheduled (explicit arrival and departure
//! per stop position) or frequency-defined (a relative travel-time profile
//! plus `(start, end, headway)` entries).

use crate::domain::Time;

/// Identifier of a service calendar entry, assigned by the network builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceId(pub usize);

/// One `(start, end, headway)` window of a frequency-defined trip.
///
/// Start and end bound the departure from the trip's first stop; a vehicle
/// departing the first stop at `start + k * headway + offset` is a
/// realisation of the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyEntry {
    pub start_time: Time,
    pub end_time: Time,
    pub headway_seconds: i32,
}

/// The schedule of one trip within a pattern.
///
/// For frequency-defined trips the arrival/departure arrays hold the travel
/// time profile relative to the departure from the first stop, and
/// `frequencies` is non-empty.
#[derive(Debug, Clone)]
pub struct TripSchedule {
    service: ServiceId,
    arrivals: Vec<Time>,
    departures: Vec<Time>,
    frequencies: Vec<FrequencyEntry>,
}

impl TripSchedule {
    pub(crate) fn new(
        service: ServiceId,
        arrivals: Vec<Time>,
        departures: Vec<Time>,
        frequencies: Vec<FrequencyEntry>,
    ) -> Self {
        Self {
            service,
            arrivals,
            departures,
            frequencies,
        }
    }

    pub fn service(&self) -> ServiceId {
        self.service
    }

    /// Arrival time at the given stop position.
    pub fn arrival(&self, stop_position: usize) -> Time {
        self.arrivals[stop_position]
    }

    /// Departure time from the given stop position.
    pub fn departure(&self, stop_position: usize) -> Time {
        self.departures[stop_position]
    }

    /// True when this trip's service is defined by headway entries rather
    /// than explicit times. Such trips are skipped by the scheduled trip
    /// search and boarded by the frequency rules instead.
    pub fn is_frequency_based(&self) -> bool {
        !self.frequencies.is_empty()
    }

    pub fn frequencies(&self) -> &[FrequencyEntry] {
        &self.frequencies
    }

    pub fn num_stops(&self) -> usize {
        self.arrivals.len()
    }
}

/// An ordered sequence of stops traversed by a set of trips.
///
/// Trips are sorted by their departure from the first stop position; the
/// trip searches rely on this ordering.
#[derive(Debug, Clone)]
pub struct TripPattern {
    stops: Vec<usize>,
    trips: Vec<TripSchedule>,
    has_frequencies: bool,
}

impl TripPattern {
    pub(crate) fn new(stops: Vec<usize>, mut trips: Vec<TripSchedule>) -> Self {
        trips.sort_by_key(|t| t.departure(0));
        let has_frequencies = trips.iter().any(TripSchedule::is_frequency_based);
        Self {
            stops,
            trips,
            has_frequencies,
        }
    }

    pub fn stops(&self) -> &[usize] {
        &self.stops
    }

    /// Stop index at the given position in the pattern.
    pub fn stop_at(&self, stop_position: usize) -> usize {
        self.stops[stop_position]
    }

    pub fn num_stops(&self) -> usize {
        self.stops.len()
    }

    pub fn trips(&self) -> &[TripSchedule] {
        &self.trips
    }

    pub fn trip(&self, trip_index: usize) -> &TripSchedule {
        &self.trips[trip_index]
    }

    /// True when any trip on this pattern is frequency-defined.
    pub fn has_frequencies(&self) -> bool {
        self.has_frequencies
    }

    /// True when any trip on this pattern has an explicit schedule.
    pub fn has_scheduled_trips(&self) -> bool {
        self.trips.iter().any(|t| !t.is_frequency_based())
    }

    /// True when any trip's service is active in the given activity mask
    /// (indexed by service id).
    pub fn any_service_active(&self, services_active: &[bool]) -> bool {
        self.trips.iter().any(|t| services_active[t.service().0])
    }
}
