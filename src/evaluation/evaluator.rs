//! Seam for the external form evaluation function.

use async_trait::async_trait;

use crate::error::EvaluationError;
use crate::evaluation::schema::{EvaluationRequest, FormEvaluationState};

/// External evaluation function.
///
/// Given a request and the current aggregate state, produces the next
/// aggregate state covering all forms, not just the requested one. The crate
/// ships no concrete implementation; the host application provides one.
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(
        &self,
        request: &EvaluationRequest,
        current: &FormEvaluationState,
    ) -> Result<FormEvaluationState, EvaluationError>;
}
