//! Dynamic-value fetcher — resolves remotely-computed field values.
//!
//! After an evaluation cycle publishes its output, fields flagged as
//! fetchable are resolved one at a time against the backend plugin API. The
//! per-form merge is published only once the whole pending set has been
//! processed.

pub mod binding;
pub mod plugin_api;

pub use plugin_api::{HttpPluginApi, PluginApi, TriggerRequest, TriggerResponse};

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::core::data_tree::DataTree;
use crate::core::state_store::{StateStore, StateUpdate};
use crate::error::FetchError;
use crate::evaluation::schema::{ConditionalOutput, DynamicValues, EvaluationOutput};
use binding::substitute_params;

/// Resolves dynamic values for the fetchable subset of a form's fields.
pub struct DynamicValueFetcher {
    api: Arc<dyn PluginApi>,
    data_tree: Arc<dyn DataTree>,
    store: Arc<dyn StateStore>,
}

impl DynamicValueFetcher {
    pub fn new(
        api: Arc<dyn PluginApi>,
        data_tree: Arc<dyn DataTree>,
        store: Arc<dyn StateStore>,
    ) -> Self {
        DynamicValueFetcher {
            api,
            data_tree,
            store,
        }
    }

    /// Fetch every pending field sequentially, then publish the per-form
    /// merge exactly once.
    ///
    /// `pending` holds the field keys flagged for fetching, in the output's
    /// insertion order. A failure on one field never blocks the rest; it is
    /// recorded on that field's state instead.
    pub async fn fetch_all(
        &self,
        pending: &[String],
        form_id: &str,
        mut output: EvaluationOutput,
        datasource_id: &str,
        plugin_id: &str,
    ) -> EvaluationOutput {
        for field_key in pending {
            let Some(value) = output.get(field_key).cloned() else {
                continue;
            };
            let resolved = self
                .fetch_one(&value, form_id, datasource_id, plugin_id, field_key)
                .await;
            if let Some(slot) = output.get_mut(field_key) {
                slot.fetch_dynamic_values = Some(resolved);
            }
        }

        self.store.publish(StateUpdate::MergeFormEvaluation {
            form_id: form_id.to_string(),
            output: output.clone(),
        });

        output
    }

    /// Resolve one field's dynamic values.
    ///
    /// Never fails: any error is logged and recorded as `has_fetch_failed`
    /// with empty data.
    pub async fn fetch_one(
        &self,
        value: &ConditionalOutput,
        form_id: &str,
        datasource_id: &str,
        plugin_id: &str,
        field_key: &str,
    ) -> DynamicValues {
        let mut dynamic = value.fetch_dynamic_values.clone().unwrap_or_default();
        dynamic.has_started = true;
        dynamic.is_loading = true;

        match self
            .try_fetch(&dynamic, form_id, datasource_id, plugin_id, field_key)
            .await
        {
            Ok(Some(payload)) => {
                dynamic.data = payload;
                dynamic.has_fetch_failed = false;
            }
            Ok(None) => {
                dynamic.has_fetch_failed = true;
                dynamic.data = Value::Array(Vec::new());
            }
            Err(error) => {
                tracing::error!(
                    form_id,
                    field_key,
                    error = %error,
                    "dynamic value fetch failed"
                );
                dynamic.has_fetch_failed = true;
                dynamic.data = Value::Array(Vec::new());
            }
        }

        dynamic.is_loading = false;
        dynamic
    }

    /// Returns the trigger payload on success, `None` when the backend
    /// answered without one.
    async fn try_fetch(
        &self,
        dynamic: &DynamicValues,
        form_id: &str,
        datasource_id: &str,
        plugin_id: &str,
        field_key: &str,
    ) -> Result<Option<Value>, FetchError> {
        let evaluated = &dynamic.evaluated_config;

        let url = match evaluated.url.as_deref().filter(|u| !u.is_empty()) {
            Some(explicit) => explicit.to_string(),
            None => self.api.default_trigger_url(datasource_id),
        };

        // Substitution only applies when the config declares a params key;
        // otherwise parameters pass through unchanged.
        let params = match &evaluated.params {
            Some(declared) => {
                let mut merged = declared.clone();
                if let Some(entity) = self.data_tree.lookup(form_id) {
                    merged.extend(substitute_params(declared, &entity.evaluated_values));
                }
                merged
            }
            None => Map::new(),
        };

        let request = TriggerRequest {
            action_id: form_id.to_string(),
            config_property: field_key.to_string(),
            datasource_id: datasource_id.to_string(),
            plugin_id: plugin_id.to_string(),
            params,
        };

        let response = self.api.fetch_dynamic_values(&url, &request).await?;
        if response.is_success() {
            if let Some(trigger) = response.trigger() {
                return Ok(Some(trigger.clone()));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data_tree::{EntityState, InMemoryDataTree};
    use crate::core::state_store::InMemoryStateStore;
    use crate::evaluation::schema::DynamicValuesConfig;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;

    /// Scripted plugin API: maps configProperty → canned result.
    struct ScriptedApi {
        responses: Mutex<std::collections::HashMap<String, Result<TriggerResponse, ()>>>,
        calls: Mutex<Vec<TriggerRequest>>,
        urls: Mutex<Vec<String>>,
    }

    impl ScriptedApi {
        fn new() -> Self {
            ScriptedApi {
                responses: Mutex::new(std::collections::HashMap::new()),
                calls: Mutex::new(Vec::new()),
                urls: Mutex::new(Vec::new()),
            }
        }

        fn respond(&self, field_key: &str, response: TriggerResponse) {
            self.responses
                .lock()
                .insert(field_key.to_string(), Ok(response));
        }

        fn fail(&self, field_key: &str) {
            self.responses.lock().insert(field_key.to_string(), Err(()));
        }

        fn calls(&self) -> Vec<TriggerRequest> {
            self.calls.lock().clone()
        }

        fn urls(&self) -> Vec<String> {
            self.urls.lock().clone()
        }
    }

    #[async_trait]
    impl PluginApi for ScriptedApi {
        fn default_trigger_url(&self, datasource_id: &str) -> String {
            format!("test://{datasource_id}/trigger")
        }

        async fn fetch_dynamic_values(
            &self,
            url: &str,
            body: &TriggerRequest,
        ) -> Result<TriggerResponse, FetchError> {
            self.urls.lock().push(url.to_string());
            self.calls.lock().push(body.clone());
            match self.responses.lock().get(&body.config_property) {
                Some(Ok(response)) => Ok(response.clone()),
                Some(Err(())) => Err(FetchError::Transport("connection reset".into())),
                None => Err(FetchError::UnexpectedStatus(404)),
            }
        }
    }

    fn success_response(trigger: Value) -> TriggerResponse {
        serde_json::from_value(json!({
            "responseMeta": {"status": 200},
            "data": {"trigger": trigger}
        }))
        .unwrap()
    }

    fn fetchable_field(params: Option<Map<String, Value>>) -> ConditionalOutput {
        ConditionalOutput {
            visible: Some(true),
            enabled: None,
            fetch_dynamic_values: Some(DynamicValues {
                allowed_to_fetch: true,
                evaluated_config: DynamicValuesConfig { url: None, params },
                ..Default::default()
            }),
        }
    }

    fn fetcher_with(api: Arc<ScriptedApi>) -> (DynamicValueFetcher, Arc<InMemoryStateStore>) {
        let store = Arc::new(InMemoryStateStore::new());
        let tree = Arc::new(InMemoryDataTree::new());
        let fetcher = DynamicValueFetcher::new(api, tree, store.clone());
        (fetcher, store)
    }

    #[tokio::test]
    async fn test_mixed_success_and_failure_cascade() {
        let api = Arc::new(ScriptedApi::new());
        api.respond("a", success_response(json!([1, 2])));
        api.fail("b");

        let (fetcher, store) = fetcher_with(api.clone());

        let mut output = EvaluationOutput::new();
        output.insert("a".into(), fetchable_field(None));
        output.insert("b".into(), fetchable_field(None));

        let pending = vec!["a".to_string(), "b".to_string()];
        let resolved = fetcher
            .fetch_all(&pending, "form1", output, "ds1", "plugin1")
            .await;

        let a = resolved["a"].fetch_dynamic_values.as_ref().unwrap();
        assert!(a.has_started);
        assert!(!a.is_loading);
        assert!(!a.has_fetch_failed);
        assert_eq!(a.data, json!([1, 2]));

        let b = resolved["b"].fetch_dynamic_values.as_ref().unwrap();
        assert!(b.has_started);
        assert!(!b.is_loading);
        assert!(b.has_fetch_failed);
        assert_eq!(b.data, json!([]));

        // one publish event containing both fields
        assert_eq!(store.publish_count(), 1);
        match &store.published()[0] {
            StateUpdate::MergeFormEvaluation { form_id, output } => {
                assert_eq!(form_id, "form1");
                assert_eq!(output.len(), 2);
            }
            other => panic!("unexpected update: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fields_are_fetched_sequentially_in_key_order() {
        let api = Arc::new(ScriptedApi::new());
        api.respond("first", success_response(json!(["x"])));
        api.respond("second", success_response(json!(["y"])));

        let (fetcher, _store) = fetcher_with(api.clone());

        let mut output = EvaluationOutput::new();
        output.insert("first".into(), fetchable_field(None));
        output.insert("second".into(), fetchable_field(None));

        let pending = vec!["first".to_string(), "second".to_string()];
        fetcher
            .fetch_all(&pending, "form1", output, "ds1", "plugin1")
            .await;

        let order: Vec<String> = api.calls().iter().map(|c| c.config_property.clone()).collect();
        assert_eq!(order, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_missing_trigger_payload_marks_failure() {
        let api = Arc::new(ScriptedApi::new());
        api.respond(
            "a",
            serde_json::from_value(json!({"responseMeta": {"status": 200}})).unwrap(),
        );

        let (fetcher, _store) = fetcher_with(api);

        let resolved = fetcher
            .fetch_one(&fetchable_field(None), "form1", "ds1", "plugin1", "a")
            .await;
        assert!(resolved.has_fetch_failed);
        assert_eq!(resolved.data, json!([]));
    }

    #[tokio::test]
    async fn test_non_success_status_in_body_marks_failure() {
        let api = Arc::new(ScriptedApi::new());
        api.respond(
            "a",
            serde_json::from_value(json!({
                "responseMeta": {"status": 500},
                "data": {"trigger": ["ignored"]}
            }))
            .unwrap(),
        );

        let (fetcher, _store) = fetcher_with(api);

        let resolved = fetcher
            .fetch_one(&fetchable_field(None), "form1", "ds1", "plugin1", "a")
            .await;
        assert!(resolved.has_fetch_failed);
    }

    #[tokio::test]
    async fn test_params_substituted_from_data_tree() {
        let api = Arc::new(ScriptedApi::new());
        api.respond("bucket", success_response(json!(["b1"])));

        let store = Arc::new(InMemoryStateStore::new());
        let tree = Arc::new(InMemoryDataTree::new());
        tree.insert(EntityState::new(
            "form1",
            json!({"formData": {"command": {"data": "LIST"}}}),
        ));
        let fetcher = DynamicValueFetcher::new(api.clone(), tree, store);

        let mut params = Map::new();
        params.insert(
            "command".into(),
            json!("{{actionConfiguration.formData.command.data}}"),
        );

        fetcher
            .fetch_one(
                &fetchable_field(Some(params)),
                "form1",
                "ds1",
                "plugin1",
                "bucket",
            )
            .await;

        let calls = api.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].params["command"], json!("LIST"));
        assert_eq!(calls[0].action_id, "form1");
        assert_eq!(calls[0].datasource_id, "ds1");
    }

    #[tokio::test]
    async fn test_explicit_url_overrides_default() {
        let api = Arc::new(ScriptedApi::new());
        api.respond("a", success_response(json!([])));

        let (fetcher, _store) = fetcher_with(api.clone());

        let mut field = fetchable_field(None);
        if let Some(dynamic) = field.fetch_dynamic_values.as_mut() {
            dynamic.evaluated_config.url = Some("test://override".into());
        }

        fetcher
            .fetch_one(&field, "form1", "ds1", "plugin1", "a")
            .await;

        assert_eq!(api.urls(), vec!["test://override"]);
    }

    #[tokio::test]
    async fn test_default_url_from_datasource() {
        let api = Arc::new(ScriptedApi::new());
        api.respond("a", success_response(json!([])));

        let (fetcher, _store) = fetcher_with(api.clone());

        fetcher
            .fetch_one(&fetchable_field(None), "form1", "ds1", "plugin1", "a")
            .await;

        assert_eq!(api.urls(), vec!["test://ds1/trigger"]);
    }
}
