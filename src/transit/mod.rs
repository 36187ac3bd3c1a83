//! Transit data model and the seams the search consumes it through.
//!
//! The worker algorithms only ever see the [`TransitData`] trait, the
//! direction-aware [`TransitCalculator`] and the trip searches; the concrete
//! [`TransitNetwork`] is one in-memory implementation, also used by the test
//! suites.

mod calculator;
mod network;
mod pattern;
mod provider;
mod trip_search;

pub use calculator::{ForwardCalculator, ReverseCalculator, TransitCalculator};
pub use network::{NetworkError, TransitNetwork, TransitNetworkBuilder};
pub use pattern::{FrequencyEntry, ServiceId, TripPattern, TripSchedule};
pub use provider::TransitData;
pub use trip_search::{TripBoarding, find_boarding, find_earlier_boarding};
