//! Dense Q-table for the maze agent

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    state::{STATE_COUNT, StateIndex},
    types::{ACTION_COUNT, Action},
};

/// Q-table mapping (state, action) pairs to Q-values
///
/// Stored densely as one `[f64; 4]` row per state. Rows are indexed by
/// [`StateIndex`] and columns by [`Action::index`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QTable {
    /// Q-values, one row per state
    rows: Vec<[f64; ACTION_COUNT]>,
    /// Learning rate α
    learning_rate: f64,
    /// Discount factor γ
    discount_factor: f64,
}

impl QTable {
    /// Create a Q-table with every entry drawn uniformly from the integers
    /// `0..4`.
    pub fn new_random<R: Rng>(learning_rate: f64, discount_factor: f64, rng: &mut R) -> Self {
        let rows: Vec<[f64; ACTION_COUNT]> = (0..STATE_COUNT)
            .map(|_| std::array::from_fn(|_| rng.random_range(0..ACTION_COUNT) as f64))
            .collect();
        Self {
            rows,
            learning_rate,
            discount_factor,
        }
    }

    /// Create a Q-table with every entry set to `value`.
    pub fn filled(learning_rate: f64, discount_factor: f64, value: f64) -> Self {
        Self {
            rows: vec![[value; ACTION_COUNT]; STATE_COUNT],
            learning_rate,
            discount_factor,
        }
    }

    /// Get Q-value for a state-action pair
    pub fn get(&self, state: StateIndex, action: Action) -> f64 {
        self.rows[state.index()][action.index()]
    }

    /// Set Q-value for a state-action pair
    pub fn set(&mut self, state: StateIndex, action: Action, value: f64) {
        self.rows[state.index()][action.index()] = value;
    }

    /// All Q-values of a state, in action order
    pub fn row(&self, state: StateIndex) -> &[f64; ACTION_COUNT] {
        &self.rows[state.index()]
    }

    /// Maximum Q-value over all actions in a state
    pub fn max_q(&self, state: StateIndex) -> f64 {
        self.row(state).iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Greedy action: the first action (in index order) holding the maximum
    /// Q-value
    pub fn greedy_action(&self, state: StateIndex) -> Action {
        self.greedy_action_excluding(state, &[])
            .unwrap_or(Action::Left)
    }

    /// Greedy action among the actions not listed in `excluded`
    ///
    /// Returns `None` when every action is excluded.
    pub fn greedy_action_excluding(&self, state: StateIndex, excluded: &[Action]) -> Option<Action> {
        let row = self.row(state);
        let mut best: Option<(Action, f64)> = None;
        for action in Action::ALL {
            if excluded.contains(&action) {
                continue;
            }
            let value = row[action.index()];
            if best.is_none_or(|(_, best_value)| value > best_value) {
                best = Some((action, value));
            }
        }
        best.map(|(action, _)| action)
    }

    /// Q-learning update: off-policy TD control
    ///
    /// Q(s,a) ← (1-α)·Q(s,a) + α·(r + γ·max_a' Q(s',a'))
    ///
    /// Returns the new value of Q(s,a).
    pub fn q_learning_update(
        &mut self,
        state: StateIndex,
        action: Action,
        reward: f64,
        next_state: StateIndex,
    ) -> f64 {
        let current_q = self.get(state, action);
        let td_target = reward + self.discount_factor * self.max_q(next_state);
        let new_q = (1.0 - self.learning_rate) * current_q + self.learning_rate * td_target;
        self.set(state, action, new_q);
        new_q
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn discount_factor(&self) -> f64 {
        self.discount_factor
    }

    /// Number of state rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether the table has one row per state
    pub fn has_full_shape(&self) -> bool {
        self.rows.len() == STATE_COUNT
    }

    /// Iterate over (state, row) pairs
    pub fn iter(&self) -> impl Iterator<Item = (StateIndex, &[f64; ACTION_COUNT])> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| StateIndex::new(index).map(|state| (state, row)))
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn state(raw: usize) -> StateIndex {
        StateIndex::new(raw).unwrap()
    }

    #[test]
    fn test_random_initialization_range() {
        let mut rng = StdRng::seed_from_u64(5);
        let table = QTable::new_random(0.9, 0.8, &mut rng);
        assert_eq!(table.len(), STATE_COUNT);
        for (_, row) in table.iter() {
            for &value in row {
                assert!((0.0..4.0).contains(&value));
                assert_eq!(value.fract(), 0.0);
            }
        }
    }

    #[test]
    fn test_qtable_set_get() {
        let mut table = QTable::filled(0.9, 0.8, 0.0);
        table.set(state(17), Action::Up, 1.5);
        assert_eq!(table.get(state(17), Action::Up), 1.5);
        assert_eq!(table.get(state(17), Action::Down), 0.0);
    }

    #[test]
    fn test_max_q() {
        let mut table = QTable::filled(0.9, 0.8, 0.0);
        table.set(state(3), Action::Left, 0.5);
        table.set(state(3), Action::Right, 1.5);
        table.set(state(3), Action::Down, -0.8);
        assert_eq!(table.max_q(state(3)), 1.5);
    }

    #[test]
    fn test_greedy_action_first_max_wins() {
        let mut table = QTable::filled(0.9, 0.8, 1.0);
        assert_eq!(table.greedy_action(state(0)), Action::Left);

        table.set(state(0), Action::Up, 2.0);
        table.set(state(0), Action::Down, 2.0);
        assert_eq!(table.greedy_action(state(0)), Action::Up);
    }

    #[test]
    fn test_greedy_action_excluding() {
        let mut table = QTable::filled(0.9, 0.8, 0.0);
        table.set(state(9), Action::Right, 3.0);
        table.set(state(9), Action::Up, 2.0);

        assert_eq!(
            table.greedy_action_excluding(state(9), &[Action::Right]),
            Some(Action::Up)
        );
        assert_eq!(
            table.greedy_action_excluding(state(9), &[Action::Right, Action::Up]),
            Some(Action::Left)
        );
        assert_eq!(table.greedy_action_excluding(state(9), &Action::ALL), None);
    }

    #[test]
    fn test_q_learning_update() {
        let mut table = QTable::filled(0.9, 0.8, 0.0);
        table.set(state(2), Action::Left, 1.0);
        table.set(state(2), Action::Up, 2.0);

        let updated = table.q_learning_update(state(1), Action::Right, -1.0, state(2));

        // Q(s,a) = 0.1 * 0.0 + 0.9 * (-1.0 + 0.8 * 2.0) = 0.54
        assert!((updated - 0.54).abs() < 1e-12);
        assert_eq!(table.get(state(1), Action::Right), updated);
    }
}
