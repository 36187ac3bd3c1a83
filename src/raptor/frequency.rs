//! Boarding rules for frequency-defined trips.
//!
//! A frequency trip has no fixed departures, so the search runs under a
//! boarding assumption: board immediately when possible (best case), wait a
//! full headway (worst case), or use a randomly drawn schedule offset. The
//! best and worst cases bound the arrival-time distribution; the random
//! draws sample it.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::domain::Time;
use crate::transit::{FrequencyEntry, TransitData, TripPattern, TripSchedule};

/// How a frequency vehicle's departure relates to the passenger's arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardingAssumption {
    BestCase,
    WorstCase,
    Random,
}

/// One random offset per (pattern, trip, frequency entry), resampled
/// uniformly in `[0, headway)` before each Monte-Carlo draw.
///
/// Offsets are drawn from a seeded generator, so a request is reproducible
/// end to end.
#[derive(Debug)]
pub struct FrequencyOffsets {
    /// offsets[pattern][trip][entry]; empty vectors for scheduled trips.
    offsets: Vec<Vec<Vec<i32>>>,
    rng: StdRng,
}

impl FrequencyOffsets {
    pub fn new<D: TransitData>(data: &D, seed: u64) -> Self {
        let offsets = (0..data.num_patterns())
            .map(|p| {
                data.pattern(p)
                    .trips()
                    .iter()
                    .map(|trip| vec![0; trip.frequencies().len()])
                    .collect()
            })
            .collect();
        Self {
            offsets,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draw a fresh offset for every frequency entry.
    pub fn randomize<D: TransitData>(&mut self, data: &D) {
        for (p, pattern_offsets) in self.offsets.iter_mut().enumerate() {
            let pattern = data.pattern(p);
            for (t, trip_offsets) in pattern_offsets.iter_mut().enumerate() {
                let entries = pattern.trip(t).frequencies();
                for (e, offset) in trip_offsets.iter_mut().enumerate() {
                    *offset = self.rng.random_range(0..entries[e].headway_seconds);
                }
            }
        }
    }

    fn offset(&self, pattern: usize, trip: usize, entry: usize) -> i32 {
        self.offsets[pattern][trip][entry]
    }
}

/// Board time on one frequency entry under the given assumption, or `None`
/// when the entry cannot be boarded. `earliest_board_time` must already
/// include board slack. Frequency trips carry relative time profiles;
/// `entry.start/end` bound the departure from the trip's first stop.
fn entry_board_time(
    trip: &TripSchedule,
    entry: &FrequencyEntry,
    offset: i32,
    stop_position: usize,
    earliest_board_time: Time,
    assumption: BoardingAssumption,
) -> Option<Time> {
    let travel = trip.departure(stop_position);
    match assumption {
        BoardingAssumption::BestCase => {
            if earliest_board_time > entry.end_time + travel {
                return None;
            }
            Some(earliest_board_time.max(entry.start_time + travel))
        }
        BoardingAssumption::WorstCase => {
            // A full headway must remain before the entry ends, or the
            // vehicle may already be gone.
            if earliest_board_time > entry.end_time + travel - entry.headway_seconds {
                return None;
            }
            Some(
                (earliest_board_time + entry.headway_seconds)
                    .max(entry.start_time + travel + entry.headway_seconds),
            )
        }
        BoardingAssumption::Random => {
            let mut board = entry.start_time + travel + offset;
            while board < earliest_board_time {
                board += entry.headway_seconds;
                if board - travel > entry.end_time {
                    return None;
                }
            }
            Some(board)
        }
    }
}

/// A frequency boarding: which trip, and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyBoarding {
    pub trip_index: usize,
    pub board_time: Time,
}

/// Find the best boardable frequency trip on a pattern at a stop position.
/// Each trip's board time is the best over its entries; entries are treated
/// as uncorrelated. Ties resolve to the lowest trip index.
pub fn find_frequency_boarding(
    pattern_index: usize,
    pattern: &TripPattern,
    services_active: &[bool],
    offsets: &FrequencyOffsets,
    stop_position: usize,
    earliest_board_time: Time,
    assumption: BoardingAssumption,
) -> Option<FrequencyBoarding> {
    let mut best: Option<FrequencyBoarding> = None;
    for (trip_index, trip) in pattern.trips().iter().enumerate() {
        if !trip.is_frequency_based() || !services_active[trip.service().0] {
            continue;
        }
        let mut trip_board: Option<Time> = None;
        for (entry_index, entry) in trip.frequencies().iter().enumerate() {
            let offset = offsets.offset(pattern_index, trip_index, entry_index);
            if let Some(board) = entry_board_time(
                trip,
                entry,
                offset,
                stop_position,
                earliest_board_time,
                assumption,
            ) {
                trip_board = Some(trip_board.map_or(board, |b: Time| b.min(board)));
            }
        }
        if let Some(board_time) = trip_board
            && best.is_none_or(|b| board_time < b.board_time)
        {
            best = Some(FrequencyBoarding {
                trip_index,
                board_time,
            });
        }
    }
    best
}
