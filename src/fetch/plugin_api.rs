//! Backend plugin API used to resolve dynamic form values.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::http_client::{HttpClientProvider, HttpPoolConfig};
use crate::error::FetchError;

/// Wire body for a dynamic-value trigger call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerRequest {
    pub action_id: String,
    pub config_property: String,
    pub datasource_id: String,
    pub plugin_id: String,
    /// Substituted parameters, flattened into the body.
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMeta {
    pub status: u16,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriggerData {
    #[serde(default)]
    pub trigger: Option<Value>,
}

/// Wire response of a dynamic-value trigger call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerResponse {
    pub response_meta: ResponseMeta,
    #[serde(default)]
    pub data: Option<TriggerData>,
}

impl TriggerResponse {
    pub fn is_success(&self) -> bool {
        self.response_meta.status == 200
    }

    pub fn trigger(&self) -> Option<&Value> {
        self.data.as_ref()?.trigger.as_ref()
    }
}

/// The backend plugin API (external collaborator).
#[async_trait]
pub trait PluginApi: Send + Sync {
    /// Default trigger URL for a datasource.
    fn default_trigger_url(&self, datasource_id: &str) -> String;

    /// POST a trigger request and decode the response envelope.
    async fn fetch_dynamic_values(
        &self,
        url: &str,
        body: &TriggerRequest,
    ) -> Result<TriggerResponse, FetchError>;
}

/// reqwest-backed [`PluginApi`] implementation.
#[derive(Debug)]
pub struct HttpPluginApi {
    base_url: String,
    provider: HttpClientProvider,
}

impl HttpPluginApi {
    pub fn new(base_url: impl Into<String>, config: HttpPoolConfig) -> Result<Self, FetchError> {
        Ok(Self {
            base_url: base_url.into(),
            provider: HttpClientProvider::new(config)?,
        })
    }
}

#[async_trait]
impl PluginApi for HttpPluginApi {
    fn default_trigger_url(&self, datasource_id: &str) -> String {
        format!(
            "{}/v1/datasources/{}/trigger",
            self.base_url.trim_end_matches('/'),
            datasource_id
        )
    }

    async fn fetch_dynamic_values(
        &self,
        url: &str,
        body: &TriggerRequest,
    ) -> Result<TriggerResponse, FetchError> {
        let response = self
            .provider
            .client()
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus(status.as_u16()));
        }

        response
            .json::<TriggerResponse>()
            .await
            .map_err(|e| FetchError::MalformedBody(e.to_string()))
    }
}
