//! Top-level trigger listener.
//!
//! [`EvaluationListener`] consumes trigger actions from the host
//! application's action bus. Nothing is processed until the one-time
//! [`TriggerAction::Start`] gate is seen; thereafter every evaluation trigger
//! is handed to the sequencer fire-and-forget. A failure in one iteration is
//! logged and reported, never fatal — listening continues until the channel
//! closes.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::core::sequencer::RequestSequencer;
use crate::error::ErrorReporter;
use crate::evaluation::schema::EvaluationRequest;

/// Actions the listener reacts to.
#[derive(Debug, Clone)]
pub enum TriggerAction {
    /// One-time gate; actions arriving before the first `Start` are ignored.
    Start,
    /// Evaluate a form for the first time.
    InitFormEvaluation(EvaluationRequest),
    /// Re-evaluate a form after a change.
    RunFormEvaluation(EvaluationRequest),
}

/// Trigger action sender.
pub type TriggerSender = mpsc::UnboundedSender<TriggerAction>;

/// Trigger action receiver.
pub type TriggerReceiver = mpsc::UnboundedReceiver<TriggerAction>;

/// Create a trigger channel.
pub fn create_trigger_channel() -> (TriggerSender, TriggerReceiver) {
    mpsc::unbounded_channel()
}

/// Process-wide listener loop over trigger actions.
pub struct EvaluationListener {
    rx: TriggerReceiver,
    sequencer: Arc<RequestSequencer>,
    reporter: Arc<dyn ErrorReporter>,
}

impl EvaluationListener {
    pub fn new(
        rx: TriggerReceiver,
        sequencer: Arc<RequestSequencer>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        EvaluationListener {
            rx,
            sequencer,
            reporter,
        }
    }

    /// Run until the trigger channel closes.
    pub async fn run(mut self) {
        // Start gate: drop everything until the host signals readiness.
        loop {
            match self.rx.recv().await {
                None => return,
                Some(TriggerAction::Start) => break,
                Some(action) => {
                    tracing::debug!(?action, "trigger ignored before start signal");
                }
            }
        }
        tracing::info!("form evaluation listener started");

        while let Some(action) = self.rx.recv().await {
            if let Err(error) = self.dispatch(action) {
                tracing::error!(error = %error, "listener iteration failed");
                self.reporter.capture("evaluation listener", &error);
            }
        }
        tracing::debug!("trigger channel closed; listener exiting");
    }

    fn dispatch(&self, action: TriggerAction) -> Result<(), crate::error::SubmitError> {
        match action {
            // Duplicate start signals are harmless.
            TriggerAction::Start => Ok(()),
            TriggerAction::InitFormEvaluation(request)
            | TriggerAction::RunFormEvaluation(request) => self.sequencer.submit(request),
        }
    }
}
