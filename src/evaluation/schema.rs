//! Data model for form evaluation requests and their results.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A single request to re-evaluate a form against current application state.
///
/// Immutable once submitted to the sequencer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    /// Identifier of the target form (e.g. a data action).
    pub form_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_id: Option<String>,
    /// The action configuration the form is bound to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_config: Option<Value>,
    /// Editor field definitions.
    #[serde(default)]
    pub editor_config: Vec<Value>,
    /// Settings field definitions.
    #[serde(default)]
    pub settings_config: Vec<Value>,
    /// Path of the property whose change triggered this request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_path: Option<String>,
}

impl EvaluationRequest {
    pub fn new(form_id: impl Into<String>) -> Self {
        EvaluationRequest {
            form_id: form_id.into(),
            datasource_id: None,
            plugin_id: None,
            action_config: None,
            editor_config: Vec::new(),
            settings_config: Vec::new(),
            diff_path: None,
        }
    }
}

/// Per-form evaluation result: field key → [`ConditionalOutput`].
///
/// Iteration order is insertion order; the fetch cascade walks fields in this
/// order.
pub type EvaluationOutput = IndexMap<String, ConditionalOutput>;

/// Aggregate evaluation state: form id → [`EvaluationOutput`].
pub type FormEvaluationState = HashMap<String, EvaluationOutput>;

/// Evaluation result for a single form field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Present when the field's values must be resolved remotely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_dynamic_values: Option<DynamicValues>,
}

impl ConditionalOutput {
    /// Whether this field is flagged for a remote dynamic-value fetch.
    pub fn allowed_to_fetch(&self) -> bool {
        self.fetch_dynamic_values
            .as_ref()
            .is_some_and(|d| d.allowed_to_fetch)
    }
}

/// Remote fetch descriptor and lifecycle state for a single field.
///
/// Terminal states: populated `data` with `has_fetch_failed == false`, or an
/// empty `data` array with `has_fetch_failed == true`. `is_loading` is false
/// at either terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicValues {
    #[serde(default)]
    pub allowed_to_fetch: bool,
    #[serde(default)]
    pub has_started: bool,
    #[serde(default)]
    pub is_loading: bool,
    #[serde(default)]
    pub has_fetch_failed: bool,
    /// Resolved values, or `[]` when empty/failed.
    #[serde(default = "empty_data")]
    pub data: Value,
    /// Raw fetch configuration as declared on the field.
    #[serde(default)]
    pub config: DynamicValuesConfig,
    /// Fetch configuration with parameter values already evaluated against
    /// application state.
    #[serde(default)]
    pub evaluated_config: DynamicValuesConfig,
}

fn empty_data() -> Value {
    Value::Array(Vec::new())
}

impl Default for DynamicValues {
    fn default() -> Self {
        DynamicValues {
            allowed_to_fetch: false,
            has_started: false,
            is_loading: false,
            has_fetch_failed: false,
            data: empty_data(),
            config: DynamicValuesConfig::default(),
            evaluated_config: DynamicValuesConfig::default(),
        }
    }
}

/// How to call the backend for a dynamic-value fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicValuesConfig {
    /// Explicit URL override; when absent or empty the per-plugin default
    /// trigger URL is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Declared parameter map; values may be dynamic-binding expressions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
}
