//! State encoding
//!
//! Collapses a [`FeatureVector`] into one of `2^13` discrete states by
//! thresholding every feature to a single bit. Bit `i` belongs to feature
//! slot `i`:
//!
//! | Slots        | Bit set when                                  |
//! |--------------|-----------------------------------------------|
//! | 0, 3, 6, 9   | free-run length > 0                           |
//! | 1, 4, 7, 10  | terminal material is wall                     |
//! | 2, 5, 8, 11  | neighbour visited                             |
//! | 12           | goal distance < previous goal distance        |
//!
//! The last bit depends on the distance seen by the previous encoding, which
//! [`DistanceTracker`] carries between calls within an episode.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    features::{FEATURE_COUNT, FEATURES_PER_DIRECTION, FeatureVector, GOAL_DISTANCE_SLOT},
    types::{ACTION_COUNT, Material},
};

/// Number of distinct states.
pub const STATE_COUNT: usize = 1 << FEATURE_COUNT;

/// Row index into the Q-table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateIndex(u16);

impl StateIndex {
    /// Wrap a raw index, returning `None` if it is not below [`STATE_COUNT`].
    pub fn new(raw: usize) -> Option<Self> {
        if raw < STATE_COUNT {
            Some(Self(raw as u16))
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// Whether the bit for feature `slot` is set.
    pub fn bit(self, slot: usize) -> bool {
        slot < FEATURE_COUNT && self.0 & (1 << slot) != 0
    }
}

impl fmt::Display for StateIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:013b}", self.0)
    }
}

/// Encode `features` against the distance seen by the previous encoding.
///
/// Returns the state together with the distance the next call should be
/// compared against.
pub fn encode_state(features: &FeatureVector, previous_distance: f64) -> (StateIndex, f64) {
    let values = features.values();
    let mut bits: u16 = 0;

    for direction in 0..ACTION_COUNT {
        let base = direction * FEATURES_PER_DIRECTION;
        if values[base] > 0.0 {
            bits |= 1 << base;
        }
        if values[base + 1] == f64::from(Material::Wall.code()) {
            bits |= 1 << (base + 1);
        }
        if values[base + 2] != 0.0 {
            bits |= 1 << (base + 2);
        }
    }

    let distance = values[GOAL_DISTANCE_SLOT];
    if distance < previous_distance {
        bits |= 1 << GOAL_DISTANCE_SLOT;
    }

    (StateIndex(bits), distance)
}

/// Goal distance carried between encodings within one episode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceTracker {
    previous: f64,
}

impl DistanceTracker {
    pub fn new(initial_distance: f64) -> Self {
        Self {
            previous: initial_distance,
        }
    }

    pub fn previous(&self) -> f64 {
        self.previous
    }

    /// Encode without advancing the tracker.
    pub fn peek(&self, features: &FeatureVector) -> StateIndex {
        encode_state(features, self.previous).0
    }

    /// Encode and remember this distance for the next call.
    pub fn encode(&mut self, features: &FeatureVector) -> StateIndex {
        let (state, distance) = encode_state(features, self.previous);
        self.previous = distance;
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(values: [f64; FEATURE_COUNT]) -> FeatureVector {
        FeatureVector::from_values(values)
    }

    #[test]
    fn test_each_slot_maps_to_its_bit() {
        let all = features([
            3.0, 2.0, 1.0, 1.0, 2.0, 1.0, 5.0, 2.0, 1.0, 2.0, 2.0, 1.0, 4.0,
        ]);
        let (state, distance) = encode_state(&all, 10.0);
        assert_eq!(state.index(), STATE_COUNT - 1);
        assert_eq!(distance, 4.0);

        let none = features([
            0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 4.0,
        ]);
        assert_eq!(encode_state(&none, 4.0).0.index(), 0);
    }

    #[test]
    fn test_left_wall_and_progress_bits() {
        let f = features([
            0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 2.0,
        ]);
        let (state, _) = encode_state(&f, 3.0);
        assert_eq!(state.index(), 2 + 4096);
        assert!(state.bit(1));
        assert!(state.bit(12));
        assert!(!state.bit(0));
    }

    #[test]
    fn test_progress_bit_is_strict() {
        let f = features([0.0; FEATURE_COUNT]);
        assert_eq!(encode_state(&f, 0.0).0.index(), 0);
    }

    #[test]
    fn test_tracker_peek_does_not_advance() {
        let f = features([
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 5.0,
        ]);
        let mut tracker = DistanceTracker::new(6.0);
        assert!(tracker.peek(&f).bit(12));
        assert_eq!(tracker.previous(), 6.0);

        assert!(tracker.encode(&f).bit(12));
        assert_eq!(tracker.previous(), 5.0);
        assert!(!tracker.encode(&f).bit(12));
    }

    #[test]
    fn test_state_index_bounds() {
        assert!(StateIndex::new(STATE_COUNT - 1).is_some());
        assert!(StateIndex::new(STATE_COUNT).is_none());
    }
}
