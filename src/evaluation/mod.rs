pub mod evaluator;
pub mod schema;

pub use evaluator::Evaluator;
pub use schema::{
    ConditionalOutput, DynamicValues, DynamicValuesConfig, EvaluationOutput, EvaluationRequest,
    FormEvaluationState,
};
