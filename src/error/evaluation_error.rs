//! Evaluation-cycle error types.

use thiserror::Error;

/// Errors raised while running one evaluation cycle.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("Evaluator failure: {0}")]
    EvaluatorFailure(String),
    #[error("State store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Errors raised when submitting a request to the sequencer.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Sequencer worker has shut down")]
    WorkerShutDown,
}
