//! Orchestration services for the pipeline movement core.

mod board;
mod movement;

pub use board::PipelineBoard;
pub use movement::MovementController;
