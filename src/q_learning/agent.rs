//! Q-learning maze agent
//!
//! The agent owns its Q-table for its whole lifetime and an [`Episode`] while
//! a maze is being played. Each call to [`MazeAgent::step`] picks an action
//! ε-greedily, learns from the tentative move when training, and only returns
//! once a move has been accepted by the maze.

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use super::{
    episode::{Episode, EpisodePhase},
    q_table::QTable,
};
use crate::{
    error::{Error, Result},
    maze::{Maze, MazeGrid},
    state::StateIndex,
    types::{ACTION_COUNT, Action, Position},
};

/// Default learning rate α.
pub const DEFAULT_LEARNING_RATE: f64 = 0.9;
/// Default discount factor γ.
pub const DEFAULT_DISCOUNT_FACTOR: f64 = 0.8;
/// Default probability of a random move while training.
pub const DEFAULT_EXPLORATION_RATE: f64 = 0.4;
/// Default cap on tentative moves per step.
pub const DEFAULT_MAX_MOVE_ATTEMPTS: usize = 64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AgentState {
    pub q_table: QTable,
    pub training_round: u64,
    pub exploration_rate: f64,
    pub max_move_attempts: usize,
    pub rng_seed: Option<u64>,
    /// Seed for the RNG of the next loaded copy, drawn from the live stream
    pub resume_seed: u64,
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Result of a finished episode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// Training round after this episode was counted
    pub training_round: u64,
    /// Accepted moves during the episode
    pub steps: usize,
    /// Whether the agent stood on the goal when the episode ended
    pub reached_goal: bool,
    /// Resource level reported by the caller
    pub final_resource: f64,
}

/// Tabular Q-learning agent for grid mazes
#[derive(Debug, Clone)]
pub struct MazeAgent {
    q_table: QTable,
    exploration_rate: f64,
    max_move_attempts: usize,
    training_round: u64,
    episode: Option<Episode>,
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl MazeAgent {
    /// Create a new agent with a randomly initialised Q-table
    ///
    /// # Arguments
    ///
    /// * `learning_rate` - α parameter (0.0 to 1.0)
    /// * `discount_factor` - γ parameter (0.0 to 1.0)
    /// * `exploration_rate` - probability of a random move while training
    pub fn new(learning_rate: f64, discount_factor: f64, exploration_rate: f64) -> Self {
        let mut rng = build_rng(None);
        Self {
            q_table: QTable::new_random(learning_rate, discount_factor, &mut rng),
            exploration_rate,
            max_move_attempts: DEFAULT_MAX_MOVE_ATTEMPTS,
            training_round: 0,
            episode: None,
            rng,
            rng_seed: None,
        }
    }

    /// Reseed the agent and redraw its initial Q-table from the seed.
    ///
    /// Intended for freshly created agents; any learning is discarded.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
        self.q_table = QTable::new_random(
            self.q_table.learning_rate(),
            self.q_table.discount_factor(),
            &mut self.rng,
        );
        self
    }

    pub fn with_max_move_attempts(mut self, attempts: usize) -> Self {
        self.max_move_attempts = attempts.max(1);
        self
    }

    /// Replace the Q-table wholesale (its α and γ come with it).
    pub fn with_q_table(mut self, q_table: QTable) -> Self {
        self.q_table = q_table;
        self
    }

    /// Begin an episode in `maze`, starting at `start` and heading for `goal`.
    ///
    /// The maze is copied; later changes to the caller's maze are not seen
    /// until the next episode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PositionOutOfBounds`] if `start` is outside the grid.
    pub fn init_episode<M: MazeGrid + ?Sized>(
        &mut self,
        maze: &M,
        start: Position,
        goal: Position,
    ) -> Result<()> {
        if !maze.contains(start) {
            return Err(Error::PositionOutOfBounds {
                position: start,
                dimension: maze.dimension(),
            });
        }
        self.episode = Some(Episode::new(Maze::snapshot(maze), start, goal));
        Ok(())
    }

    /// Choose and perform the next move.
    ///
    /// Rejected moves are retried from the same position and state. While
    /// training, every tentative move (accepted or not) updates the Q-table.
    /// Greedy choices skip actions already rejected during this call.
    ///
    /// # Errors
    ///
    /// * [`Error::NoActiveEpisode`] if no episode is running.
    /// * [`Error::ExhaustedRetries`] if every direction was rejected or the
    ///   attempt cap was reached.
    pub fn step(&mut self, training: bool) -> Result<Action> {
        let episode = self.episode.as_mut().ok_or(Error::NoActiveEpisode)?;
        let origin = episode.position();
        let state = episode.state();
        let mut rejected: Vec<Action> = Vec::with_capacity(ACTION_COUNT);
        let mut attempts = 0;

        while attempts < self.max_move_attempts && rejected.len() < ACTION_COUNT {
            attempts += 1;

            let action = choose_action(
                &self.q_table,
                &mut self.rng,
                self.exploration_rate,
                state,
                training,
                &rejected,
            );
            let candidate = origin.offset(action);
            let (features, next_state) = episode.probe(candidate);

            if training {
                let reward = episode.reward(candidate);
                self.q_table
                    .q_learning_update(state, action, reward, next_state);
            }

            if episode.is_valid_move(candidate) {
                episode.advance(candidate, features);
                return Ok(action);
            }

            if !rejected.contains(&action) {
                rejected.push(action);
            }
        }

        Err(Error::ExhaustedRetries {
            attempts,
            position: origin,
        })
    }

    /// ε-greedy choice for `state`.
    ///
    /// When `training` is false, or the exploration draw fails, this is the
    /// greedy action.
    pub fn select_action(&mut self, state: StateIndex, training: bool) -> Action {
        choose_action(
            &self.q_table,
            &mut self.rng,
            self.exploration_rate,
            state,
            training,
            &[],
        )
    }

    /// Apply one TD update for taking `action` in `state` and arriving at
    /// `resulting_position` in the current episode.
    ///
    /// Returns the new Q-value.
    pub fn update_q(
        &mut self,
        state: StateIndex,
        action: Action,
        resulting_position: Position,
    ) -> Result<f64> {
        let episode = self.episode.as_ref().ok_or(Error::NoActiveEpisode)?;
        let (_, next_state) = episode.probe(resulting_position);
        let reward = episode.reward(resulting_position);
        Ok(self
            .q_table
            .q_learning_update(state, action, reward, next_state))
    }

    /// Reward for arriving at `position` in the current episode.
    pub fn reward(&self, position: Position) -> Result<f64> {
        self.episode
            .as_ref()
            .map(|episode| episode.reward(position))
            .ok_or(Error::NoActiveEpisode)
    }

    /// Whether the current episode's maze accepts a move to `position`.
    pub fn is_valid_move(&self, position: Position) -> Result<bool> {
        self.episode
            .as_ref()
            .map(|episode| episode.is_valid_move(position))
            .ok_or(Error::NoActiveEpisode)
    }

    /// Close the current episode and count a training round.
    ///
    /// `final_resource` is reported back in the summary but does not
    /// influence learning.
    pub fn end_episode(&mut self, final_resource: f64) -> EpisodeSummary {
        self.training_round += 1;
        self.close_episode(final_resource)
    }

    /// Close the current episode without counting a training round.
    pub fn close_episode(&mut self, final_resource: f64) -> EpisodeSummary {
        let episode = self.episode.take();
        EpisodeSummary {
            training_round: self.training_round,
            steps: episode.as_ref().map_or(0, Episode::steps),
            reached_goal: episode.as_ref().is_some_and(Episode::reached_goal),
            final_resource,
        }
    }

    pub fn phase(&self) -> EpisodePhase {
        if self.episode.is_some() {
            EpisodePhase::Active
        } else {
            EpisodePhase::Idle
        }
    }

    pub fn episode(&self) -> Option<&Episode> {
        self.episode.as_ref()
    }

    /// Current position, if an episode is running.
    pub fn position(&self) -> Option<Position> {
        self.episode.as_ref().map(Episode::position)
    }

    /// Current state, if an episode is running.
    pub fn current_state(&self) -> Option<StateIndex> {
        self.episode.as_ref().map(Episode::state)
    }

    pub fn training_round(&self) -> u64 {
        self.training_round
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn q_table_mut(&mut self) -> &mut QTable {
        &mut self.q_table
    }

    pub fn exploration_rate(&self) -> f64 {
        self.exploration_rate
    }

    pub fn set_exploration_rate(&mut self, rate: f64) {
        self.exploration_rate = rate;
    }

    pub fn max_move_attempts(&self) -> usize {
        self.max_move_attempts
    }

    pub fn rng_seed(&self) -> Option<u64> {
        self.rng_seed
    }

    pub(crate) fn export_state(&self) -> AgentState {
        AgentState {
            q_table: self.q_table.clone(),
            training_round: self.training_round,
            exploration_rate: self.exploration_rate,
            max_move_attempts: self.max_move_attempts,
            rng_seed: self.rng_seed,
            resume_seed: self.rng.clone().random(),
        }
    }

    pub(crate) fn from_state(state: AgentState) -> Self {
        Self {
            q_table: state.q_table,
            exploration_rate: state.exploration_rate,
            max_move_attempts: state.max_move_attempts.max(1),
            training_round: state.training_round,
            episode: None,
            rng: StdRng::seed_from_u64(state.resume_seed),
            rng_seed: state.rng_seed,
        }
    }
}

impl Default for MazeAgent {
    fn default() -> Self {
        Self::new(
            DEFAULT_LEARNING_RATE,
            DEFAULT_DISCOUNT_FACTOR,
            DEFAULT_EXPLORATION_RATE,
        )
    }
}

/// ε-greedy action selection
fn choose_action(
    q_table: &QTable,
    rng: &mut StdRng,
    exploration_rate: f64,
    state: StateIndex,
    training: bool,
    rejected: &[Action],
) -> Action {
    if training && rng.random::<f64>() < exploration_rate {
        // Explore: uniformly random action
        Action::ALL[rng.random_range(0..ACTION_COUNT)]
    } else {
        // Exploit: best action not yet rejected this step
        q_table
            .greedy_action_excluding(state, rejected)
            .unwrap_or_else(|| q_table.greedy_action(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Material;

    fn open_agent(value: f64) -> MazeAgent {
        MazeAgent::default()
            .with_seed(3)
            .with_q_table(QTable::filled(0.9, 0.8, value))
    }

    #[test]
    fn test_step_requires_episode() {
        let mut agent = MazeAgent::default().with_seed(1);
        assert!(matches!(agent.step(true), Err(Error::NoActiveEpisode)));
    }

    #[test]
    fn test_init_episode_rejects_start_outside_grid() {
        let mut agent = MazeAgent::default().with_seed(1);
        let maze = Maze::walled(5);
        let result = agent.init_episode(&maze, Position::new(5, 1), Position::new(3, 2));
        assert!(matches!(result, Err(Error::PositionOutOfBounds { .. })));
    }

    #[test]
    fn test_greedy_step_skips_walls() {
        // Uniform table: greedy prefers Left, which is a wall from (1, 1)
        let mut agent = open_agent(0.0);
        let maze = Maze::walled(5);
        agent
            .init_episode(&maze, Position::new(1, 1), Position::new(3, 2))
            .unwrap();

        let action = agent.step(false).unwrap();
        assert_eq!(action, Action::Up);
        assert_eq!(agent.position(), Some(Position::new(1, 2)));
        assert_eq!(agent.episode().unwrap().steps(), 1);
    }

    #[test]
    fn test_only_accepted_move_is_committed() {
        // Left is rejected first; only the accepted Up move may be committed
        let mut agent = open_agent(0.0);
        let maze = Maze::walled(5);
        agent
            .init_episode(&maze, Position::new(1, 1), Position::new(3, 2))
            .unwrap();
        let (features, expected) = agent.episode().unwrap().probe(Position::new(1, 2));

        assert_eq!(agent.step(false).unwrap(), Action::Up);

        let episode = agent.episode().unwrap();
        assert_eq!(episode.previous_distance(), 2.0);
        assert_eq!(episode.features(), &features);
        assert_eq!(agent.current_state(), Some(expected));
        assert!(expected.bit(12));
        assert!(episode.visited().is_visited(Position::new(1, 2)));
        assert!(!episode.visited().is_visited(Position::new(0, 1)));
    }

    #[test]
    fn test_rejected_training_move_still_learns() {
        let mut agent = open_agent(0.0);
        agent.set_exploration_rate(0.0);
        let maze = Maze::walled(5);
        agent
            .init_episode(&maze, Position::new(1, 1), Position::new(3, 2))
            .unwrap();
        let state = agent.current_state().unwrap();

        agent.step(true).unwrap();

        // Left hit the wall: 0.1 * 0 + 0.9 * (-100 + 0.8 * 0)
        assert!((agent.q_table().get(state, Action::Left) + 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_boxed_in_agent_exhausts_retries() {
        let mut maze = Maze::walled(5);
        for (x, y) in [(2, 2), (1, 2), (3, 2), (2, 1), (2, 3)] {
            maze.set(Position::new(x, y), Material::Wall);
        }
        maze.set(Position::new(2, 2), Material::Open);

        let mut agent = open_agent(0.0);
        agent
            .init_episode(&maze, Position::new(2, 2), Position::new(3, 3))
            .unwrap();

        let err = agent.step(false).unwrap_err();
        assert!(matches!(
            err,
            Error::ExhaustedRetries {
                attempts: 4,
                position: Position { x: 2, y: 2 }
            }
        ));
        assert_eq!(agent.position(), Some(Position::new(2, 2)));
    }

    #[test]
    fn test_training_retry_cap() {
        let mut maze = Maze::walled(5);
        for (x, y) in [(1, 2), (3, 2), (2, 1), (2, 3)] {
            maze.set(Position::new(x, y), Material::Wall);
        }

        let mut agent = open_agent(0.0).with_max_move_attempts(3);
        agent.set_exploration_rate(1.0);
        agent
            .init_episode(&maze, Position::new(2, 2), Position::new(3, 3))
            .unwrap();

        match agent.step(true) {
            Err(Error::ExhaustedRetries { attempts, .. }) => assert!(attempts <= 3),
            other => panic!("expected ExhaustedRetries, got {other:?}"),
        }
    }

    #[test]
    fn test_end_episode_counts_rounds() {
        let mut agent = open_agent(0.0);
        let maze = Maze::walled(5);
        agent
            .init_episode(&maze, Position::new(1, 1), Position::new(1, 2))
            .unwrap();
        agent.step(false).unwrap();

        let summary = agent.end_episode(42.0);
        assert_eq!(summary.training_round, 1);
        assert_eq!(summary.steps, 1);
        assert!(summary.reached_goal);
        assert_eq!(summary.final_resource, 42.0);
        assert_eq!(agent.phase(), EpisodePhase::Idle);

        let summary = agent.end_episode(0.0);
        assert_eq!(summary.training_round, 2);
        assert_eq!(summary.steps, 0);
    }

    #[test]
    fn test_close_episode_does_not_count() {
        let mut agent = open_agent(0.0);
        let maze = Maze::walled(5);
        agent
            .init_episode(&maze, Position::new(1, 1), Position::new(1, 2))
            .unwrap();
        agent.step(false).unwrap();

        let summary = agent.close_episode(7.0);
        assert_eq!(summary.training_round, 0);
        assert!(summary.reached_goal);
        assert_eq!(agent.training_round(), 0);
        assert_eq!(agent.phase(), EpisodePhase::Idle);
    }

    fn exploring_draws(agent: &mut MazeAgent) -> Vec<Action> {
        let state = StateIndex::new(0).unwrap();
        (0..32).map(|_| agent.select_action(state, true)).collect()
    }

    #[test]
    fn test_successive_resumes_continue_the_stream() {
        let mut agent = MazeAgent::default().with_seed(21);
        agent.set_exploration_rate(1.0);

        let mut first = MazeAgent::from_state(agent.export_state());
        let mut second = MazeAgent::from_state(first.export_state());
        assert_eq!(first.rng_seed(), Some(21));
        assert_eq!(second.rng_seed(), Some(21));
        assert_ne!(exploring_draws(&mut first), exploring_draws(&mut second));

        // The same snapshot always resumes the same way
        let snapshot = agent.export_state();
        assert_eq!(
            exploring_draws(&mut MazeAgent::from_state(snapshot.clone())),
            exploring_draws(&mut MazeAgent::from_state(snapshot))
        );
    }

    #[test]
    fn test_seed_reproduces_table() {
        let a = MazeAgent::default().with_seed(11);
        let b = MazeAgent::default().with_seed(11);
        assert_eq!(a.q_table(), b.q_table());
    }
}
