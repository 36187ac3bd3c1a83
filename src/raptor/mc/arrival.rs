//! Stop arrivals of the multi-criteria search.
//!
//! Arrivals live in an arena and reference their predecessor by index, so
//! the back-link graph is explicit and survives pareto evictions: an
//! evicted arrival drops out of its stop's pareto set but stays in the
//! arena, keeping every surviving chain walkable. Chains are acyclic
//! because a successor's round never precedes its predecessor's.

use crate::domain::Time;

/// How an arrival got to its stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrivalKind {
    /// Seeded by an access leg.
    Access { duration: i32 },
    /// Rode a trip from `board_stop`.
    Transit {
        pattern: usize,
        trip: usize,
        board_stop: usize,
        board_time: Time,
    },
    /// Walked a transfer from `from_stop`.
    Transfer { from_stop: usize, duration: i32 },
}

/// One arrival at one stop, with its back-link.
#[derive(Debug, Clone, Copy)]
pub struct McArrival {
    pub stop: usize,
    pub round: usize,
    pub arrival_time: Time,
    pub cost: i32,
    /// Arena index of the predecessor arrival; `None` only for access.
    pub previous: Option<usize>,
    pub kind: ArrivalKind,
}

impl McArrival {
    pub fn arrived_by_transit(&self) -> bool {
        matches!(self.kind, ArrivalKind::Transit { .. })
    }
}

/// The criteria vector kept in the per-stop pareto sets, with the arena
/// index of the full arrival. Small and `Copy` so dominance checks stay in
/// registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrivalRef {
    pub index: usize,
    pub round: usize,
    pub arrival_time: Time,
    pub cost: i32,
    pub arrived_by_transit: bool,
}

/// Per-criterion dominance for stop arrivals: fewer rounds, earlier
/// arrival, lower cost. At equal time and cost a transit arrival dominates
/// a transfer arrival, so the state that can still be relaxed further
/// (egress, next boarding without a second walk) wins the tie.
pub fn stop_arrival_dominance(a: &ArrivalRef, b: &ArrivalRef) -> bool {
    a.round < b.round
        || a.arrival_time < b.arrival_time
        || a.cost < b.cost
        || (a.arrived_by_transit && !b.arrived_by_transit)
}

/// Append-only arrival pool.
#[derive(Debug, Default)]
pub struct ArrivalArena {
    arrivals: Vec<McArrival>,
}

impl ArrivalArena {
    pub fn push(&mut self, arrival: McArrival) -> usize {
        self.arrivals.push(arrival);
        self.arrivals.len() - 1
    }

    pub fn get(&self, index: usize) -> &McArrival {
        &self.arrivals[index]
    }

    pub fn len(&self) -> usize {
        self.arrivals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hm;

    fn aref(round: usize, time: Time, cost: i32, transit: bool) -> ArrivalRef {
        ArrivalRef {
            index: 0,
            round,
            arrival_time: time,
            cost,
            arrived_by_transit: transit,
        }
    }

    #[test]
    fn dominance_per_criterion() {
        let base = aref(2, hm(8, 30), 900, true);
        assert!(stop_arrival_dominance(&aref(1, hm(8, 30), 900, true), &base));
        assert!(stop_arrival_dominance(&aref(2, hm(8, 29), 900, true), &base));
        assert!(stop_arrival_dominance(&aref(2, hm(8, 30), 899, true), &base));
        // Equal on everything: no dominance either way.
        assert!(!stop_arrival_dominance(&base, &base.clone()));
    }

    #[test]
    fn transit_breaks_ties_against_transfer() {
        let by_transit = aref(2, hm(8, 30), 900, true);
        let by_transfer = aref(2, hm(8, 30), 900, false);
        assert!(stop_arrival_dominance(&by_transit, &by_transfer));
        assert!(!stop_arrival_dominance(&by_transfer, &by_transit));
    }

    #[test]
    fn arena_links_survive() {
        let mut arena = ArrivalArena::default();
        let access = arena.push(McArrival {
            stop: 0,
            round: 0,
            arrival_time: hm(8, 0),
            cost: 0,
            previous: None,
            kind: ArrivalKind::Access { duration: 120 },
        });
        let ride = arena.push(McArrival {
            stop: 3,
            round: 1,
            arrival_time: hm(8, 20),
            cost: 1500,
            previous: Some(access),
            kind: ArrivalKind::Transit {
                pattern: 0,
                trip: 0,
                board_stop: 0,
                board_time: hm(8, 5),
            },
        });

        let arrival = arena.get(ride);
        assert!(arrival.arrived_by_transit());
        let previous = arena.get(arrival.previous.unwrap());
        assert_eq!(previous.stop, 0);
        assert!(previous.previous.is_none());
    }
}
