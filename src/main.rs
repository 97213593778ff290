use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use formflow::error::FetchError;
use formflow::{
    create_event_channel, create_trigger_channel, ConditionalOutput, DynamicValueFetcher,
    DynamicValues, DynamicValuesConfig, EntityState, EvaluationError, EvaluationListener,
    EvaluationOutput, EvaluationRequest, Evaluator, FormEvaluationState, InMemoryDataTree,
    InMemoryStateStore, PluginApi, ReadinessSignals, RequestSequencer, SequencerConfig,
    SequencerDeps, StateStore, TracingReporter, TriggerAction, TriggerRequest, TriggerResponse,
};

/// Demo evaluator: marks the `bucket` field of the requested form as needing
/// a remote dynamic-value fetch.
struct DemoEvaluator;

#[async_trait]
impl Evaluator for DemoEvaluator {
    async fn evaluate(
        &self,
        request: &EvaluationRequest,
        _current: &FormEvaluationState,
    ) -> Result<FormEvaluationState, EvaluationError> {
        let mut params = Map::new();
        params.insert(
            "command".into(),
            json!("{{actionConfiguration.formData.command.data}}"),
        );

        let mut output = EvaluationOutput::new();
        output.insert(
            "command".into(),
            ConditionalOutput {
                visible: Some(true),
                ..Default::default()
            },
        );
        output.insert(
            "bucket".into(),
            ConditionalOutput {
                visible: Some(true),
                enabled: Some(true),
                fetch_dynamic_values: Some(DynamicValues {
                    allowed_to_fetch: true,
                    evaluated_config: DynamicValuesConfig {
                        url: None,
                        params: Some(params),
                    },
                    ..Default::default()
                }),
            },
        );

        let mut state = FormEvaluationState::new();
        state.insert(request.form_id.clone(), output);
        Ok(state)
    }
}

/// Demo plugin API: answers every trigger call with a canned dropdown list.
struct DemoPluginApi;

#[async_trait]
impl PluginApi for DemoPluginApi {
    fn default_trigger_url(&self, datasource_id: &str) -> String {
        format!("demo://datasources/{datasource_id}/trigger")
    }

    async fn fetch_dynamic_values(
        &self,
        url: &str,
        body: &TriggerRequest,
    ) -> Result<TriggerResponse, FetchError> {
        tracing::info!(url, config_property = %body.config_property, "trigger call");
        serde_json::from_value(json!({
            "responseMeta": {"status": 200},
            "data": {"trigger": [
                {"label": "users", "value": "users"},
                {"label": "orders", "value": "orders"},
            ]}
        }))
        .map_err(|e| FetchError::MalformedBody(e.to_string()))
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== Formflow Evaluation Engine ===\n");

    let store = Arc::new(InMemoryStateStore::new());
    let tree = Arc::new(InMemoryDataTree::new());
    tree.insert(EntityState::new(
        "Query1",
        json!({"formData": {"command": {"data": "LIST"}}}),
    ));

    let signals = Arc::new(ReadinessSignals::new());
    let fetcher = Arc::new(DynamicValueFetcher::new(
        Arc::new(DemoPluginApi),
        tree,
        store.clone(),
    ));

    let (events, mut event_rx) = create_event_channel();
    let sequencer = Arc::new(RequestSequencer::spawn(
        SequencerDeps {
            evaluator: Arc::new(DemoEvaluator),
            store: store.clone(),
            fetcher,
            signals: signals.clone(),
            reporter: Arc::new(TracingReporter),
            events: Some(events),
        },
        SequencerConfig {
            settle_delay_ms: 50,
            readiness_timeout_ms: 1_000,
        },
    ));

    let (triggers, trigger_rx) = create_trigger_channel();
    let listener = EvaluationListener::new(trigger_rx, sequencer, Arc::new(TracingReporter));
    let listener_handle = tokio::spawn(listener.run());

    let mut request = EvaluationRequest::new("Query1");
    request.datasource_id = Some("ds-s3".into());
    request.plugin_id = Some("plugin-s3".into());

    triggers
        .send(TriggerAction::Start)
        .expect("listener alive");
    triggers
        .send(TriggerAction::InitFormEvaluation(request))
        .expect("listener alive");
    signals.notify_loading_entities_updated();

    drop(triggers);
    let _ = listener_handle.await;

    while let Some(event) = event_rx.recv().await {
        println!("event: {}", serde_json::to_string(&event).unwrap_or_default());
    }

    let state = store.evaluation_state();
    let resolved: Value = state["Query1"]["bucket"]
        .fetch_dynamic_values
        .as_ref()
        .map(|d| d.data.clone())
        .unwrap_or(Value::Null);
    println!("\nresolved bucket options: {resolved}");
}
