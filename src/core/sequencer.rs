//! Request sequencer — the evaluation cycle driver.
//!
//! [`RequestSequencer`] guarantees at most one evaluation cycle in flight at
//! a time. Requests submitted while a cycle runs are queued and replayed in
//! strict arrival order; the unit of serialization is one request plus all of
//! its cascading dynamic-value fetches. The queue and the busy state are
//! owned by a single worker task, with [`RequestSequencer::submit`] as the
//! only entry point.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::core::event_bus::{EventSender, SequencerEvent};
use crate::core::signals::ReadinessSignals;
use crate::core::state_store::{StateStore, StateUpdate};
use crate::error::{ErrorReporter, EvaluationError, SubmitError};
use crate::evaluation::evaluator::Evaluator;
use crate::evaluation::schema::EvaluationRequest;
use crate::fetch::DynamicValueFetcher;

/// Configuration for the sequencer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequencerConfig {
    /// Settle delay between the readiness signal and the fetch cascade.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Upper bound on the readiness-signal wait; elapsing proceeds anyway.
    #[serde(default = "default_readiness_timeout_ms")]
    pub readiness_timeout_ms: u64,
}

fn default_settle_delay_ms() -> u64 {
    500
}

fn default_readiness_timeout_ms() -> u64 {
    5_000
}

impl Default for SequencerConfig {
    fn default() -> Self {
        SequencerConfig {
            settle_delay_ms: default_settle_delay_ms(),
            readiness_timeout_ms: default_readiness_timeout_ms(),
        }
    }
}

/// Collaborators the sequencer drives.
pub struct SequencerDeps {
    pub evaluator: Arc<dyn Evaluator>,
    pub store: Arc<dyn StateStore>,
    pub fetcher: Arc<DynamicValueFetcher>,
    pub signals: Arc<ReadinessSignals>,
    pub reporter: Arc<dyn ErrorReporter>,
    /// Optional lifecycle event channel; emission is skipped when absent.
    pub events: Option<EventSender>,
}

/// Handle to the sequencer worker task.
pub struct RequestSequencer {
    tx: mpsc::UnboundedSender<EvaluationRequest>,
    busy: Arc<AtomicBool>,
    queued: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl RequestSequencer {
    /// Start the worker task.
    pub fn spawn(deps: SequencerDeps, config: SequencerConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let busy = Arc::new(AtomicBool::new(false));
        let queued = Arc::new(AtomicUsize::new(0));

        let worker = SequencerWorker {
            rx,
            deps,
            config,
            busy: busy.clone(),
            queued: queued.clone(),
        };
        let handle = tokio::spawn(worker.run());

        RequestSequencer {
            tx,
            busy,
            queued,
            handle,
        }
    }

    /// Enqueue a request.
    ///
    /// Never blocks: while a cycle is in flight the request waits its turn;
    /// while idle the cycle starts promptly.
    pub fn submit(&self, request: EvaluationRequest) -> Result<(), SubmitError> {
        self.queued.fetch_add(1, Ordering::SeqCst);
        self.tx.send(request).map_err(|_| {
            self.queued.fetch_sub(1, Ordering::SeqCst);
            SubmitError::WorkerShutDown
        })
    }

    /// Whether an evaluation cycle (cascade included) is currently in
    /// flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Number of requests accepted but not yet started.
    pub fn queued_len(&self) -> usize {
        self.queued.load(Ordering::SeqCst)
    }

    /// Close the queue and wait for the worker to drain it.
    pub async fn shutdown(self) {
        let RequestSequencer { tx, handle, .. } = self;
        drop(tx);
        let _ = handle.await;
    }
}

struct SequencerWorker {
    rx: mpsc::UnboundedReceiver<EvaluationRequest>,
    deps: SequencerDeps,
    config: SequencerConfig,
    busy: Arc<AtomicBool>,
    queued: Arc<AtomicUsize>,
}

impl SequencerWorker {
    async fn run(mut self) {
        while let Some(request) = self.rx.recv().await {
            self.queued.fetch_sub(1, Ordering::SeqCst);
            self.busy.store(true, Ordering::SeqCst);
            self.emit(SequencerEvent::CycleStarted {
                form_id: request.form_id.clone(),
                timestamp: Utc::now(),
            });

            match self.run_cycle(&request).await {
                Ok(()) => {
                    self.emit(SequencerEvent::CycleFinished {
                        form_id: request.form_id.clone(),
                        timestamp: Utc::now(),
                    });
                }
                Err(error) => {
                    tracing::error!(
                        form_id = %request.form_id,
                        error = %error,
                        "evaluation cycle failed"
                    );
                    self.deps.reporter.capture("evaluation cycle", &error);
                    self.emit(SequencerEvent::CycleFailed {
                        form_id: request.form_id.clone(),
                        error: error.to_string(),
                        detail: None,
                        timestamp: Utc::now(),
                    });
                }
            }

            self.busy.store(false, Ordering::SeqCst);
        }
        tracing::debug!("sequencer queue closed; worker exiting");
    }

    async fn run_cycle(&self, request: &EvaluationRequest) -> Result<(), EvaluationError> {
        let current = self.deps.store.evaluation_state();
        let worker_response = self.deps.evaluator.evaluate(request, &current).await?;

        if worker_response.is_empty() {
            tracing::warn!(
                form_id = %request.form_id,
                "evaluator returned an empty response; nothing to publish"
            );
            return Ok(());
        }

        self.deps
            .store
            .publish(StateUpdate::SetEvaluation(worker_response.clone()));
        self.emit(SequencerEvent::EvaluationPublished {
            form_id: request.form_id.clone(),
            form_count: worker_response.len(),
            timestamp: Utc::now(),
        });

        let Some(output) = worker_response.get(&request.form_id) else {
            return Ok(());
        };

        let pending: Vec<String> = output
            .iter()
            .filter(|(_, value)| value.allowed_to_fetch())
            .map(|(key, _)| key.clone())
            .collect();
        if pending.is_empty() {
            return Ok(());
        }

        let ready = self
            .deps
            .signals
            .wait_any(Duration::from_millis(self.config.readiness_timeout_ms))
            .await;
        if !ready {
            tracing::warn!(
                form_id = %request.form_id,
                timeout_ms = self.config.readiness_timeout_ms,
                "readiness signals did not fire; proceeding with fetch cascade"
            );
        }
        tokio::time::sleep(Duration::from_millis(self.config.settle_delay_ms)).await;

        self.emit(SequencerEvent::FetchCascadeStarted {
            form_id: request.form_id.clone(),
            field_count: pending.len(),
            timestamp: Utc::now(),
        });

        let datasource_id = request.datasource_id.clone().unwrap_or_default();
        let plugin_id = request.plugin_id.clone().unwrap_or_default();
        let resolved = self
            .deps
            .fetcher
            .fetch_all(
                &pending,
                &request.form_id,
                output.clone(),
                &datasource_id,
                &plugin_id,
            )
            .await;

        let failed_fields = resolved
            .values()
            .filter(|value| {
                value
                    .fetch_dynamic_values
                    .as_ref()
                    .is_some_and(|d| d.has_fetch_failed)
            })
            .count();
        self.emit(SequencerEvent::FetchCascadeFinished {
            form_id: request.form_id.clone(),
            failed_fields,
            timestamp: Utc::now(),
        });

        Ok(())
    }

    fn emit(&self, event: SequencerEvent) {
        if let Some(events) = &self.deps.events {
            let _ = events.send(event);
        }
    }
}
