//! Shared stub collaborators for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use formflow::error::{EvaluationError, FetchError};
use formflow::{
    ConditionalOutput, DynamicValues, EvaluationOutput, EvaluationRequest, Evaluator,
    FormEvaluationState, PluginApi, TriggerRequest, TriggerResponse,
};

/// Shared call log across stubs, in call order.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &CallLog) -> Vec<String> {
    log.lock().clone()
}

/// Evaluator stub: logs each invocation, tracks concurrent activity, and
/// answers with a pre-scripted state per form id (empty when unscripted).
pub struct ScriptedEvaluator {
    log: CallLog,
    delay: Duration,
    outputs: HashMap<String, FormEvaluationState>,
    active: AtomicUsize,
    max_active: Arc<AtomicUsize>,
}

impl ScriptedEvaluator {
    pub fn new(log: CallLog, delay: Duration) -> Self {
        ScriptedEvaluator {
            log,
            delay,
            outputs: HashMap::new(),
            active: AtomicUsize::new(0),
            max_active: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_response(mut self, form_id: &str, state: FormEvaluationState) -> Self {
        self.outputs.insert(form_id.to_string(), state);
        self
    }

    /// Highest number of concurrently running `evaluate` calls observed.
    pub fn max_active(&self) -> Arc<AtomicUsize> {
        self.max_active.clone()
    }
}

#[async_trait]
impl Evaluator for ScriptedEvaluator {
    async fn evaluate(
        &self,
        request: &EvaluationRequest,
        _current: &FormEvaluationState,
    ) -> Result<FormEvaluationState, EvaluationError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        self.log.lock().push(format!("eval:{}", request.form_id));

        tokio::time::sleep(self.delay).await;

        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(self
            .outputs
            .get(&request.form_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Plugin API stub: logs each trigger call and answers with a canned
/// payload.
pub struct RecordingApi {
    log: CallLog,
    delay: Duration,
}

impl RecordingApi {
    pub fn new(log: CallLog, delay: Duration) -> Self {
        RecordingApi { log, delay }
    }
}

#[async_trait]
impl PluginApi for RecordingApi {
    fn default_trigger_url(&self, datasource_id: &str) -> String {
        format!("test://{datasource_id}/trigger")
    }

    async fn fetch_dynamic_values(
        &self,
        _url: &str,
        body: &TriggerRequest,
    ) -> Result<TriggerResponse, FetchError> {
        self.log
            .lock()
            .push(format!("fetch:{}:{}", body.action_id, body.config_property));

        tokio::time::sleep(self.delay).await;

        serde_json::from_value(json!({
            "responseMeta": {"status": 200},
            "data": {"trigger": [1, 2]}
        }))
        .map_err(|e| FetchError::MalformedBody(e.to_string()))
    }
}

/// A field flagged for a remote dynamic-value fetch.
pub fn fetchable_field() -> ConditionalOutput {
    ConditionalOutput {
        visible: Some(true),
        enabled: None,
        fetch_dynamic_values: Some(DynamicValues {
            allowed_to_fetch: true,
            ..Default::default()
        }),
    }
}

/// A field with nothing to fetch.
pub fn plain_field() -> ConditionalOutput {
    ConditionalOutput {
        visible: Some(true),
        ..Default::default()
    }
}

pub fn output_of(fields: Vec<(&str, ConditionalOutput)>) -> EvaluationOutput {
    let mut output = EvaluationOutput::new();
    for (key, value) in fields {
        output.insert(key.to_string(), value);
    }
    output
}

pub fn state_for(form_id: &str, output: EvaluationOutput) -> FormEvaluationState {
    let mut state = FormEvaluationState::new();
    state.insert(form_id.to_string(), output);
    state
}
