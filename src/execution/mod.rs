//! Pipeline execution: the orchestrator and what it needs to run

pub mod collaborators;
pub mod events;
pub mod orchestrator;

pub use collaborators::Collaborators;
pub use events::{EventHandler, ExecutionEvent};
pub use orchestrator::{CancellationHandle, Orchestrator, OrchestratorConfig, StageTimeouts};
