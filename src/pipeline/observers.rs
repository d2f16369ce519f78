//! Observer pattern for training pipelines
//!
//! Observers allow composable data collection during training without coupling
//! training logic to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use super::episode::{EpisodeOutcome, EpisodeReport, EpisodeSetup, StepObservation};
use crate::{Result, ports::Observer};

/// Complete observation of a training episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    #[serde(flatten)]
    pub report: EpisodeReport,
    /// Accepted moves in order
    pub moves: Vec<StepObservation>,
}

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    goals: usize,
    exhausted: usize,
    stuck: usize,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            goals: 0,
            exhausted: 0,
            stuck: 0,
        }
    }

    fn message(&self) -> String {
        format!(
            "goal:{} exhausted:{} stuck:{}",
            self.goals, self.exhausted, self.stuck
        )
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, report: &EpisodeReport) -> Result<()> {
        match report.outcome {
            EpisodeOutcome::ReachedGoal => self.goals += 1,
            EpisodeOutcome::ResourceExhausted => self.exhausted += 1,
            EpisodeOutcome::Stuck => self.stuck += 1,
        }

        if let Some(pb) = &self.progress_bar {
            pb.set_position(report.episode as u64 + 1);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Metrics observer - Tracks training metrics
pub struct MetricsObserver {
    goals: usize,
    exhausted: usize,
    stuck: usize,
    total_episodes: usize,
    step_counts: Vec<usize>,
    final_resources: Vec<f64>,
    largest_dimension: usize,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self {
            goals: 0,
            exhausted: 0,
            stuck: 0,
            total_episodes: 0,
            step_counts: Vec::new(),
            final_resources: Vec::new(),
            largest_dimension: 0,
        }
    }

    /// Fraction of episodes that reached the goal
    pub fn goal_rate(&self) -> f64 {
        if self.total_episodes == 0 {
            0.0
        } else {
            self.goals as f64 / self.total_episodes as f64
        }
    }

    /// Average accepted moves per episode
    pub fn avg_steps(&self) -> f64 {
        if self.step_counts.is_empty() {
            0.0
        } else {
            self.step_counts.iter().sum::<usize>() as f64 / self.step_counts.len() as f64
        }
    }

    /// Average resource left at the end of an episode
    pub fn avg_final_resource(&self) -> f64 {
        if self.final_resources.is_empty() {
            0.0
        } else {
            self.final_resources.iter().sum::<f64>() / self.final_resources.len() as f64
        }
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_episodes: self.total_episodes,
            goals: self.goals,
            exhausted: self.exhausted,
            stuck: self.stuck,
            goal_rate: self.goal_rate(),
            avg_steps: self.avg_steps(),
            avg_final_resource: self.avg_final_resource(),
            largest_dimension: self.largest_dimension,
        }
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_episodes: usize,
    pub goals: usize,
    pub exhausted: usize,
    pub stuck: usize,
    pub goal_rate: f64,
    pub avg_steps: f64,
    pub avg_final_resource: f64,
    pub largest_dimension: usize,
}

impl Default for MetricsObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for MetricsObserver {
    fn on_episode_start(&mut self, setup: &EpisodeSetup) -> Result<()> {
        self.largest_dimension = self.largest_dimension.max(setup.dimension);
        Ok(())
    }

    fn on_episode_end(&mut self, report: &EpisodeReport) -> Result<()> {
        self.total_episodes += 1;
        match report.outcome {
            EpisodeOutcome::ReachedGoal => self.goals += 1,
            EpisodeOutcome::ResourceExhausted => self.exhausted += 1,
            EpisodeOutcome::Stuck => self.stuck += 1,
        }
        self.step_counts.push(report.steps);
        self.final_resources.push(report.final_resource);
        Ok(())
    }
}

/// JSONL observer - Exports observations to JSON Lines format
pub struct JsonlObserver {
    writer: BufWriter<File>,
    current_steps: Vec<StepObservation>,
}

impl JsonlObserver {
    /// Create a new JSONL observer
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        Ok(Self {
            writer,
            current_steps: Vec::new(),
        })
    }
}

impl Observer for JsonlObserver {
    fn on_episode_start(&mut self, _setup: &EpisodeSetup) -> Result<()> {
        self.current_steps.clear();
        Ok(())
    }

    fn on_step(&mut self, step: &StepObservation) -> Result<()> {
        self.current_steps.push(step.clone());
        Ok(())
    }

    fn on_episode_end(&mut self, report: &EpisodeReport) -> Result<()> {
        let observation = Observation {
            report: *report,
            moves: std::mem::take(&mut self.current_steps),
        };

        // Write as JSONL (one JSON object per line)
        serde_json::to_writer(&mut self.writer, &observation)?;
        writeln!(&mut self.writer)?;
        self.writer.flush()?;

        Ok(())
    }
}

/// One CSV row per episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeRow {
    pub episode: usize,
    pub dimension: usize,
    pub start_x: i32,
    pub start_y: i32,
    pub goal_x: i32,
    pub goal_y: i32,
    pub outcome: EpisodeOutcome,
    pub steps: usize,
    pub final_resource: f64,
    pub training_round: u64,
}

impl From<&EpisodeReport> for EpisodeRow {
    fn from(report: &EpisodeReport) -> Self {
        Self {
            episode: report.episode,
            dimension: report.dimension,
            start_x: report.start.x,
            start_y: report.start.y,
            goal_x: report.goal.x,
            goal_y: report.goal.y,
            outcome: report.outcome,
            steps: report.steps,
            final_resource: report.final_resource,
            training_round: report.training_round,
        }
    }
}

/// CSV observer - Writes one summary row per episode
pub struct CsvObserver {
    writer: csv::Writer<File>,
}

impl CsvObserver {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let writer = csv::Writer::from_path(path)?;
        Ok(Self { writer })
    }
}

impl Observer for CsvObserver {
    fn on_episode_end(&mut self, report: &EpisodeReport) -> Result<()> {
        self.writer.serialize(EpisodeRow::from(report))?;
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
