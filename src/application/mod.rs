//! Application layer wiring the screener, strategy, and monitor together.

pub mod orchestrator;

pub use orchestrator::{Orchestrator, OrchestratorError};
