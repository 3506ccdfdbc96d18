//! Mock data tools for a planning/fitness agent team.
//!
//! The crate provides:
//! - A tool interface (`Tool` and `ToolRegistry`) keyed by name with JSON arguments.
//! - Weather, personal schedule and healthy meal toolkits with injectable randomness.
//! - Planning Agent, Fitness Agent and Fitness Team profiles that route tool calls
//!   for an external agent runtime.

mod agent;
mod catalog;
mod config;
mod context;
mod error;
mod team;
mod telemetry;
mod tool;
pub mod tools;

pub use agent::AgentProfile;
pub use catalog::{MealCatalog, Recipe, DEFAULT_CALORIES, MEAT_INGREDIENTS, PROTEIN_INGREDIENTS};
pub use config::{AgentsConfig, AppConfig, ModelConfig, TelemetryConfig, ToolsConfig};
pub use context::{Calendar, RandomSource, ToolContext};
pub use error::{CoachError, MealError, Result};
pub use team::{fitness_agent, fitness_team, planning_agent, Team};
pub use telemetry::{init_tracing, FailureRecord, TelemetryCollector, TelemetryEvent};
pub use tool::{Tool, ToolDescription, ToolRegistry};
pub use tools::fitness_toolkit;
