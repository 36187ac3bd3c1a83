//! The data seam between the engine and whatever owns the timetable.
//!
//! This abstraction allows the workers to run against any transit data
//! source, and to be tested with small hand-built networks.

use chrono::NaiveDate;

use super::pattern::{ServiceId, TripPattern};
use crate::domain::TransferLeg;

/// Read-only view of a transit network: patterns, stops, transfers and the
/// service calendar.
///
/// Stops are contiguous integers in `[0, num_stops())`, patterns in
/// `[0, num_patterns())`, services in `[0, num_services())`. The view must
/// be safe for concurrent reads: no interior mutation, no lazily initialised
/// state.
///
/// The transfer iterators may be implemented as cursors over flattened
/// storage; callers must not retain a yielded leg across iterator steps.
pub trait TransitData {
    fn num_stops(&self) -> usize;

    fn num_patterns(&self) -> usize;

    fn num_services(&self) -> usize;

    fn pattern(&self, pattern_index: usize) -> &TripPattern;

    /// Indices of every pattern visiting the given stop.
    fn patterns_for_stop(&self, stop: usize) -> impl Iterator<Item = usize> + '_;

    /// Walking connections leaving the given stop. The yielded leg's `stop`
    /// is the transfer target.
    fn transfers_from(&self, stop: usize) -> impl Iterator<Item = TransferLeg> + '_;

    /// Walking connections arriving at the given stop. The yielded leg's
    /// `stop` is the transfer source. Only reverse-direction searches use
    /// this transposed view.
    fn transfers_to(&self, stop: usize) -> impl Iterator<Item = TransferLeg> + '_;

    /// Whether a service runs on the given date.
    fn is_service_active(&self, service: ServiceId, date: NaiveDate) -> bool;

    /// True when any pattern carries frequency-defined trips.
    fn has_frequencies(&self) -> bool {
        (0..self.num_patterns()).any(|p| self.pattern(p).has_frequencies())
    }
}
