//! Seam for the host application's state container.

use parking_lot::RwLock;

use crate::evaluation::schema::{EvaluationOutput, FormEvaluationState};

/// A state update published by the engine.
///
/// Exactly two kinds are recognized: wholesale replacement of the evaluation
/// state, and a scoped merge for a single form after its fetch cascade.
#[derive(Debug, Clone)]
pub enum StateUpdate {
    SetEvaluation(FormEvaluationState),
    MergeFormEvaluation {
        form_id: String,
        output: EvaluationOutput,
    },
}

/// The host application's state container (external collaborator).
///
/// Published state is a full replacement snapshot under
/// [`StateUpdate::SetEvaluation`], and a per-form merge under
/// [`StateUpdate::MergeFormEvaluation`].
pub trait StateStore: Send + Sync {
    /// Read the current aggregate evaluation state.
    fn evaluation_state(&self) -> FormEvaluationState;
    /// Publish a state update.
    fn publish(&self, update: StateUpdate);
}

/// RwLock-backed store for embedding and tests.
///
/// Applies updates to an in-memory state and records every published update
/// in order for inspection.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    state: RwLock<FormEvaluationState>,
    published: RwLock<Vec<StateUpdate>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        InMemoryStateStore::default()
    }

    /// Every update published so far, in publish order.
    pub fn published(&self) -> Vec<StateUpdate> {
        self.published.read().clone()
    }

    pub fn publish_count(&self) -> usize {
        self.published.read().len()
    }
}

impl StateStore for InMemoryStateStore {
    fn evaluation_state(&self) -> FormEvaluationState {
        self.state.read().clone()
    }

    fn publish(&self, update: StateUpdate) {
        match &update {
            StateUpdate::SetEvaluation(next) => {
                *self.state.write() = next.clone();
            }
            StateUpdate::MergeFormEvaluation { form_id, output } => {
                self.state.write().insert(form_id.clone(), output.clone());
            }
        }
        self.published.write().push(update);
    }
}
