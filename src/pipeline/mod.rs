//! Pipeline module: orchestration and the external result contract

mod orchestrator;
mod result;

pub use orchestrator::PipelineOrchestrator;
pub use result::{status_for, PipelineResult};
