//! Training and evaluation pipeline abstractions
//!
//! This module provides composable pipelines for:
//! - Playing single episodes against a simulated resource budget
//! - Training an agent over many (optionally growing) mazes
//! - Evaluating a learned policy with exploration switched off
//! - Recording observations during training

pub mod episode;
pub mod observers;
pub mod training;

pub use episode::{
    EpisodeOutcome, EpisodeReport, EpisodeRun, EpisodeSetup, GameConfig, StepObservation,
    run_episode,
};
// Re-export observer implementations (adapters)
pub use observers::{
    CsvObserver, EpisodeRow, JsonlObserver, MetricsObserver, MetricsSummary, Observation,
    ProgressObserver,
};
pub use training::{MazeSource, TrainingConfig, TrainingPipeline, TrainingResult};

pub use crate::ports::Observer;
