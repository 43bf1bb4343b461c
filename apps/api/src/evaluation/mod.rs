// Resume evaluation pipeline.
// Deterministic keyword score + LLM qualitative analysis with contract
// enforcement and a pre-authored fallback, merged by the orchestrator.

pub mod contract;
pub mod fallback;
pub mod generator;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod scorer;
pub mod taxonomy;

pub use models::{EvaluationRequest, EvaluationResult};
pub use orchestrator::{EvaluationError, Evaluator};
