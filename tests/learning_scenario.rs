//! End-to-end learning on a small open maze.
//!
//! A 5x5 maze whose 3x3 interior is open, start at (1, 1) and goal at (3, 2).
//! Agents trained with exploration must beat untrained agents once both play
//! greedily on held-out episodes.

use maze_learner::MazeAgent;

mod common;

use common::{OPEN_GOAL, OPEN_START, average_steps, capped_game, goals_reached, open_maze, seeded_agent};

const TRAINING_EPISODES: usize = 500;
const EVALUATION_EPISODES: usize = 50;
const MAX_STEPS: usize = 100;

fn trained_agent(seed: u64) -> MazeAgent {
    let maze = open_maze();
    let game = capped_game(MAX_STEPS);
    let mut agent = seeded_agent(seed);
    assert_eq!(agent.exploration_rate(), 0.4);

    average_steps(
        &mut agent,
        &maze,
        OPEN_START,
        OPEN_GOAL,
        &game,
        TRAINING_EPISODES,
        true,
    );
    agent
}

#[test]
fn trained_agent_needs_fewer_steps_than_fresh_agents() {
    let maze = open_maze();
    let game = capped_game(MAX_STEPS);

    let trained_seeds = [1u64, 2, 3];
    let trained: f64 = trained_seeds
        .iter()
        .map(|&seed| {
            let mut agent = trained_agent(seed);
            average_steps(
                &mut agent,
                &maze,
                OPEN_START,
                OPEN_GOAL,
                &game,
                EVALUATION_EPISODES,
                false,
            )
        })
        .sum::<f64>()
        / trained_seeds.len() as f64;

    // Ten untrained agents, five held-out episodes each
    let fresh_seeds: Vec<u64> = (100..110).collect();
    let fresh: f64 = fresh_seeds
        .iter()
        .map(|&seed| {
            let mut agent = seeded_agent(seed);
            average_steps(
                &mut agent,
                &maze,
                OPEN_START,
                OPEN_GOAL,
                &game,
                EVALUATION_EPISODES / fresh_seeds.len(),
                false,
            )
        })
        .sum::<f64>()
        / fresh_seeds.len() as f64;

    assert!(
        trained < fresh,
        "trained agents averaged {trained:.1} steps, fresh agents {fresh:.1}"
    );
}

#[test]
fn training_counts_rounds_and_changes_the_table() {
    let initial = seeded_agent(4);
    let trained = trained_agent(4);

    assert_eq!(trained.training_round(), TRAINING_EPISODES as u64);
    assert_ne!(trained.q_table(), initial.q_table());
}

#[test]
fn evaluation_leaves_the_table_untouched() {
    let maze = open_maze();
    let game = capped_game(MAX_STEPS);
    let mut agent = trained_agent(5);
    let before = agent.q_table().clone();

    let goals = goals_reached(&mut agent, &maze, &game, 10, false);
    assert!(goals <= 10);
    assert_eq!(agent.q_table(), &before);
    assert_eq!(agent.training_round(), TRAINING_EPISODES as u64);
}
