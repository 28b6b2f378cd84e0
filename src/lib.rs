//! Committee planning: forms evaluator committees per time slot from availability
//! data and allocates cases to them so that no sponsor judges their own case.

pub mod cli;
pub mod config;
pub mod data;
pub mod model;
pub mod pipeline;
pub mod planner;
pub mod server;
pub mod telemetry;

pub use config::{EngineConfig, PartialCommitteePolicy, RunConfig};
pub use planner::{Engine, PlanInput, RunReport, RunStats, RunWarning};
