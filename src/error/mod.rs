//! Error types for the evaluation engine.
//!
//! - [`EvaluationError`] — Failures of an evaluation cycle (evaluator, store).
//! - [`FetchError`] — Failures of a single dynamic-value fetch.
//! - [`SubmitError`] — Failures to enqueue a request with the sequencer.
//! - [`ErrorReporter`] — Structured log + exception-capture sink.

pub mod evaluation_error;
pub mod fetch_error;
pub mod reporter;

pub use evaluation_error::{EvaluationError, SubmitError};
pub use fetch_error::FetchError;
pub use reporter::{ErrorReporter, TracingReporter};

/// Convenience alias for evaluation-cycle results.
pub type EvaluationResult<T> = Result<T, EvaluationError>;
/// Convenience alias for fetch results.
pub type FetchResult<T> = Result<T, FetchError>;
