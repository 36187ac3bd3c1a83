//! Small support structures for the search.

mod bitset;

pub use bitset::BitSet;
