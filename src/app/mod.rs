//! Application layer with dependency injection container.
//!
//! This module provides the dependency injection infrastructure for the
//! maze-learner application, following hexagonal architecture principles. The
//! container owns infrastructure dependencies and provides factory methods for
//! creating domain objects.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │           Application Layer (app)           │
//! │  ┌──────────────────────────────────────┐   │
//! │  │            App (DI Container)        │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ owns (optionally)          │
//! │                 ▼                            │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Infrastructure (adapters)           │   │
//! │  │  - MsgPackRepository                 │   │
//! │  │  - InMemoryRepository (testing)      │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ implements                 │
//! │                 ▼                            │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Domain Ports (ports)                │   │
//! │  │  - AgentRepository trait             │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ used by                    │
//! │                 ▼                            │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Domain Logic                        │   │
//! │  │  - MazeAgent                         │   │
//! │  │  - SavedAgent                        │   │
//! │  └──────────────────────────────────────┘   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use maze_learner::app::{AgentConfig, App};
//! use maze_learner::adapters::InMemoryRepository;
//!
//! let app = App::for_testing()
//!     .with_repository(InMemoryRepository::new())
//!     .with_default_seed(42)
//!     .build();
//!
//! let agent = app.create_agent(AgentConfig::new())?;
//! let slot = app.save_agent(&agent)?;
//! let restored = app.load_agent(slot)?;
//! assert_eq!(restored.q_table(), agent.q_table());
//! # Ok::<(), maze_learner::Error>(())
//! ```

pub mod config;
pub mod container;

pub use config::AgentConfig;
pub use container::{App, AppBuilder};
